//! On-disk locations of the viewer: the settings file and one log file per run.
//!
//! ```text
//! <root>/
//!   <app_id>.settings.ron
//!   logs/<app_id>.<yyyymmdd-hhmmss>.log
//! ```

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

/// Folder shared by the ISS Live tools, below the platform data directory.
const DATA_FOLDER: &str = "iss_live";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDirs {
    root: PathBuf,
    app_id: &'static str,
}

impl DataDirs {
    /// Debug builds keep their files in `<workspace>/.out` so `cargo run` never
    /// touches the user's data directory. Release builds use the platform's
    /// local data directory (LocalAppData, Application Support, XDG_DATA_HOME).
    pub fn locate(app_id: &'static str) -> Self {
        Self::at(default_root(), app_id)
    }

    pub fn at(root: impl Into<PathBuf>, app_id: &'static str) -> Self {
        Self {
            root: root.into(),
            app_id,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn app_id(&self) -> &'static str {
        self.app_id
    }

    pub fn settings_file(&self) -> PathBuf {
        self.root.join(format!("{}.settings.ron", self.app_id))
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// Log file for a run started at `started` (local time).
    pub fn log_file(&self, started: NaiveDateTime) -> PathBuf {
        self.logs_dir().join(format!(
            "{}.{}.log",
            self.app_id,
            started.format("%Y%m%d-%H%M%S")
        ))
    }

    pub fn log_file_now(&self) -> PathBuf {
        self.log_file(chrono::Local::now().naive_local())
    }

    /// Creates the root and the logs directory.
    pub fn ensure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.logs_dir())
    }
}

#[cfg(debug_assertions)]
fn default_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join(".out")
        .join(DATA_FOLDER)
}

#[cfg(not(debug_assertions))]
fn default_root() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATA_FOLDER)
}
