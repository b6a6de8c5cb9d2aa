use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{Settings, SettingsError};

use ron::value::{Map as RonMap, Value as RonValue};
use serde::{Serialize, de::DeserializeOwned};

/// Convert any serializable struct to `ron::Value`.
fn to_ron_value<T: Serialize>(value: &T) -> Result<RonValue, SettingsError> {
    let s = ron::to_string(value)?;
    ron::from_str(&s).map_err(|_| SettingsError::Invalid("parse ron value (internal)"))
}

/// Turn a merged `ron::Value` back into the typed section.
fn from_ron_value<T: DeserializeOwned>(value: &RonValue) -> Result<T, SettingsError> {
    Ok(value.clone().into_rust()?)
}

fn to_map(value: RonValue) -> Result<RonMap, SettingsError> {
    match value {
        RonValue::Map(m) => Ok(m),
        _ => Err(SettingsError::Invalid("section must serialize to a map")),
    }
}

/// Merge default + delta recursively (maps only).
fn merge_maps(default: &RonMap, delta: &RonMap) -> RonMap {
    let mut merged = default.clone();
    for (k, v_delta) in delta.iter() {
        let next = match (merged.get(k), v_delta) {
            (Some(RonValue::Map(def_m)), RonValue::Map(delta_m)) => {
                RonValue::Map(merge_maps(def_m, delta_m))
            }
            _ => v_delta.clone(),
        };
        merged.insert(k.clone(), next);
    }
    merged
}

/// Recursive diff (new vs default). Keys equal to their default are dropped.
fn diff_map(new_m: &RonMap, def_m: &RonMap) -> RonMap {
    let mut out = RonMap::new();
    for (k, new_v) in new_m.iter() {
        match (def_m.get(k), new_v) {
            (Some(RonValue::Map(def_sub)), RonValue::Map(new_sub)) => {
                let sub = diff_map(new_sub, def_sub);
                if !sub.is_empty() {
                    out.insert(k.clone(), RonValue::Map(sub));
                }
            }
            (Some(def_v), _) if def_v == new_v => {}
            _ => {
                out.insert(k.clone(), new_v.clone());
            }
        }
    }
    out
}

fn merged_section(default_map: &RonMap, delta: Option<&RonValue>) -> RonValue {
    match delta {
        Some(RonValue::Map(delta_m)) => RonValue::Map(merge_maps(default_map, delta_m)),
        Some(other) => other.clone(),
        None => RonValue::Map(default_map.clone()),
    }
}

fn read_deltas(path: &Path) -> Result<HashMap<String, RonValue>, SettingsError> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(HashMap::new());
    }
    ron::from_str(&content).map_err(|_| SettingsError::Invalid("parse settings file"))
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Builder for `SettingsStore` (single delta file).
#[derive(Default)]
pub struct SettingsStoreBuilder {
    settings_file: Option<PathBuf>,
}

impl SettingsStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.settings_file = Some(path.into());
        self
    }

    pub fn build(self) -> Result<SettingsStore, SettingsError> {
        let file_path = self
            .settings_file
            .ok_or(SettingsError::Invalid("settings file not specified"))?;

        if let Some(dir) = file_path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }

        let deltas = read_deltas(&file_path)?;

        Ok(SettingsStore {
            file_path,
            deltas: RwLock::new(deltas),
            defaults: RwLock::new(HashMap::new()),
            values: RwLock::new(HashMap::new()),
        })
    }
}

/// Settings store (thread-safe).
///
/// - Recursive diff/merge (nested maps)
/// - `reload` re-reads the delta file and re-merges every registered section
pub struct SettingsStore {
    file_path: PathBuf,
    deltas: RwLock<HashMap<String, RonValue>>, // section -> delta value (usually Map)
    defaults: RwLock<HashMap<&'static str, RonMap>>, // section -> full default map
    values: RwLock<HashMap<&'static str, RonValue>>, // section -> full effective merged value
}

impl SettingsStore {
    pub fn builder() -> SettingsStoreBuilder {
        SettingsStoreBuilder::new()
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn is_registered<T: Settings>(&self) -> bool {
        read(&self.values).contains_key(T::name())
    }

    /// Register a section type (loads defaults and applies existing delta if present).
    pub fn register<T>(&self) -> Result<(), SettingsError>
    where
        T: Settings + Default + Serialize + DeserializeOwned,
    {
        let section = T::name();
        if self.is_registered::<T>() {
            return Err(SettingsError::Invalid("section already registered"));
        }

        let default_map = to_map(to_ron_value(&T::default())?)?;
        let merged = merged_section(&default_map, read(&self.deltas).get(section));

        // Fail on registration rather than on first read if the file holds garbage.
        from_ron_value::<T>(&merged)?;

        write(&self.defaults).insert(section, default_map);
        write(&self.values).insert(section, merged);
        Ok(())
    }

    /// Snapshot get (Arc).
    pub fn get<T>(&self) -> Result<Arc<T>, SettingsError>
    where
        T: Settings + DeserializeOwned,
    {
        let values = read(&self.values);
        let value = values.get(T::name()).ok_or(SettingsError::NotRegistered)?;
        from_ron_value(value).map(Arc::new)
    }

    /// Update via mutable closure. Only the recursive delta against defaults is persisted.
    pub fn update<T, F>(&self, mutator: F) -> Result<(), SettingsError>
    where
        T: Settings + Default + Serialize + DeserializeOwned,
        F: FnOnce(&mut T),
    {
        let section = T::name();

        let mut instance: T = {
            let values = read(&self.values);
            from_ron_value(values.get(section).ok_or(SettingsError::NotRegistered)?)?
        };
        mutator(&mut instance);

        let new_map = to_map(to_ron_value(&instance)?)?;
        let diff_root = {
            let defaults = read(&self.defaults);
            let default_map = defaults.get(section).ok_or(SettingsError::NotRegistered)?;
            diff_map(&new_map, default_map)
        };

        write(&self.values).insert(section, RonValue::Map(new_map));
        {
            let mut deltas = write(&self.deltas);
            if diff_root.is_empty() {
                deltas.remove(section);
            } else {
                deltas.insert(section.to_string(), RonValue::Map(diff_root));
            }
        }

        self.persist_deltas()
    }

    /// Reload deltas from disk and re-merge all registered sections.
    pub fn reload(&self) -> Result<(), SettingsError> {
        let new_deltas = read_deltas(&self.file_path)?;

        let defaults = read(&self.defaults);
        let mut values = write(&self.values);
        for (section, default_map) in defaults.iter() {
            values.insert(*section, merged_section(default_map, new_deltas.get(*section)));
        }

        *write(&self.deltas) = new_deltas;
        Ok(())
    }

    fn persist_deltas(&self) -> Result<(), SettingsError> {
        let clean: HashMap<String, RonValue> = read(&self.deltas)
            .iter()
            .filter(|(_, v)| !matches!(v, RonValue::Map(m) if m.is_empty()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let pretty = ron::ser::PrettyConfig::default();
        let ron_string = ron::ser::to_string_pretty(&clean, pretty)?;

        let tmp = self.file_path.with_extension("tmp");
        fs::write(&tmp, ron_string)?;
        fs::rename(&tmp, &self.file_path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, RonValue)]) -> RonMap {
        let mut m = RonMap::new();
        for (k, v) in entries {
            m.insert(RonValue::String((*k).to_string()), v.clone());
        }
        m
    }

    #[test]
    fn diff_drops_unchanged_nested_keys() {
        let defaults = map(&[
            ("host", RonValue::String("localhost".into())),
            (
                "nested",
                RonValue::Map(map(&[("a", RonValue::Bool(false)), ("b", RonValue::Bool(true))])),
            ),
        ]);
        let changed = map(&[
            ("host", RonValue::String("localhost".into())),
            (
                "nested",
                RonValue::Map(map(&[("a", RonValue::Bool(true)), ("b", RonValue::Bool(true))])),
            ),
        ]);

        let diff = diff_map(&changed, &defaults);
        assert_eq!(
            diff,
            map(&[("nested", RonValue::Map(map(&[("a", RonValue::Bool(true))])))])
        );
        assert_eq!(merge_maps(&defaults, &diff), changed);
    }
}
