//! Integration tests for the SettingsStore:
//! - Recursive diffing (nested structs)
//! - Persisting only changed (delta) fields
//! - Reloading after external file modification

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;

use settings::{Settings, SettingsError, SettingsStore};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct Backoff {
    enabled: bool,
    delay_secs: u64,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            enabled: true,
            delay_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct Stream {
    server_address: String,
    backoff: Backoff,
}

impl Default for Stream {
    fn default() -> Self {
        Self {
            server_address: "https://push.example.com".into(),
            backoff: Backoff::default(),
        }
    }
}

impl Settings for Stream {
    const SECTION: &'static str = "stream";
}

fn settings_path(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("app.settings.ron")
}

fn string_keys(map: &ron::Map) -> HashSet<String> {
    map.iter()
        .filter_map(|(k, _)| match k {
            ron::Value::String(s) => Some(s.clone()),
            _ => None,
        })
        .collect()
}

fn section<'a>(map: &'a ron::Map, key: &str) -> &'a ron::Map {
    let value = map
        .iter()
        .find(|(k, _)| matches!(k, ron::Value::String(s) if s == key))
        .map(|(_, v)| v)
        .unwrap_or_else(|| panic!("{key} missing"));
    let ron::Value::Map(inner) = value else {
        panic!("{key} should be a map");
    };
    inner
}

#[test]
fn register_get_update_persists_only_delta() {
    let dir = tempfile::tempdir().unwrap();
    let path = settings_path(&dir);

    let store = SettingsStore::builder()
        .with_settings_file(path.clone())
        .build()
        .expect("build store");
    store.register::<Stream>().expect("register stream");

    assert!(!path.exists(), "no file before first update");

    let stream = store.get::<Stream>().expect("get initial");
    assert_eq!(*stream, Stream::default());

    store
        .update::<Stream, _>(|s| s.backoff.delay_secs = 30)
        .expect("update backoff.delay_secs");

    let content = fs::read_to_string(&path).expect("read delta file");
    let root: HashMap<String, ron::Value> = ron::from_str(&content).expect("parse delta RON");
    let Some(ron::Value::Map(stream_delta)) = root.get("stream") else {
        panic!("stream section should be a map");
    };

    let top = string_keys(stream_delta);
    assert!(!top.contains("server_address"), "unchanged field persisted");
    assert!(top.contains("backoff"));

    let nested = string_keys(section(stream_delta, "backoff"));
    assert!(nested.contains("delay_secs"));
    assert!(!nested.contains("enabled"));

    let stream = store.get::<Stream>().expect("get after update");
    assert_eq!(stream.backoff.delay_secs, 30);
    assert!(stream.backoff.enabled);
}

#[test]
fn reverting_to_defaults_empties_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = settings_path(&dir);

    let store = SettingsStore::builder()
        .with_settings_file(path.clone())
        .build()
        .unwrap();
    store.register::<Stream>().unwrap();

    store
        .update::<Stream, _>(|s| s.server_address = "http://localhost:8080".into())
        .unwrap();
    store
        .update::<Stream, _>(|s| *s = Stream::default())
        .unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let root: HashMap<String, ron::Value> = ron::from_str(&content).unwrap();
    assert!(root.is_empty());
}

#[test]
fn reload_applies_external_changes() {
    let dir = tempfile::tempdir().unwrap();
    let path = settings_path(&dir);

    let store = SettingsStore::builder()
        .with_settings_file(path.clone())
        .build()
        .unwrap();
    store.register::<Stream>().unwrap();

    let external = r#"
    {
        "stream": {
            "server_address": "http://127.0.0.1:9000",
            "backoff": { "enabled": false }
        }
    }
    "#;
    fs::write(&path, external).expect("write external delta");

    store.reload().expect("reload after external change");

    let stream = store.get::<Stream>().unwrap();
    assert_eq!(stream.server_address, "http://127.0.0.1:9000");
    assert!(!stream.backoff.enabled);
    assert_eq!(stream.backoff.delay_secs, 5, "untouched field keeps its default");
}

#[test]
fn unregistered_section_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = SettingsStore::builder()
        .with_settings_file(settings_path(&dir))
        .build()
        .unwrap();

    assert!(matches!(
        store.get::<Stream>(),
        Err(SettingsError::NotRegistered)
    ));
    store.register::<Stream>().unwrap();
    assert!(store.register::<Stream>().is_err());
}
