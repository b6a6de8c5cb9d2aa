//! Process bootstrap: data directories and the global `tracing` subscriber.

use paths::DataDirs;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    Layer, filter::LevelFilter, filter::filter_fn, fmt, layer::SubscriberExt,
    util::SubscriberInitExt,
};

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies that log setup chatter at `info`; they only get through at `warn`.
const QUIET_TARGETS: &[&str] = &["wgpu", "naga", "hyper", "reqwest", "rustls", "gilrs"];

/// State that has to outlive the application loop.
pub struct AppContext {
    dirs: DataDirs,
    version: &'static str,
    /// Flushes the file log on drop.
    _log_guard: WorkerGuard,
}

impl AppContext {
    /// Creates the data directories and installs console and file logging.
    /// Fails if a global subscriber is already set.
    pub fn init(app_id: &'static str, version: &'static str) -> Result<Self, BoxError> {
        let dirs = DataDirs::locate(app_id);
        dirs.ensure()?;

        let guard = install_subscriber(&dirs, default_level())?;
        tracing::info!(
            app = app_id,
            version,
            root = %dirs.root().display(),
            "logging initialised"
        );

        Ok(Self {
            dirs,
            version,
            _log_guard: guard,
        })
    }

    pub fn version(&self) -> &'static str {
        self.version
    }

    pub fn dirs(&self) -> &DataDirs {
        &self.dirs
    }
}

fn default_level() -> LevelFilter {
    if cfg!(debug_assertions) {
        LevelFilter::INFO
    } else {
        LevelFilter::WARN
    }
}

fn install_subscriber(dirs: &DataDirs, max: LevelFilter) -> Result<WorkerGuard, BoxError> {
    let log_file = dirs.log_file_now();
    let file_name = log_file
        .file_name()
        .ok_or("log file path has no file name")?;
    let file_appender = tracing_appender::rolling::never(dirs.logs_dir(), file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::Layer::default()
        .with_target(true)
        .with_ansi(false)
        .with_writer(non_blocking)
        .with_filter(filter_fn(move |meta| enabled(meta.target(), meta.level(), max)));

    let console_layer = fmt::Layer::default()
        .with_target(true)
        .with_filter(filter_fn(move |meta| enabled(meta.target(), meta.level(), max)));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init()?;
    Ok(guard)
}

fn enabled(target: &str, level: &Level, max: LevelFilter) -> bool {
    let quiet = QUIET_TARGETS.iter().any(|t| target.starts_with(t));
    let max = if quiet { max.min(LevelFilter::WARN) } else { max };
    *level <= max
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn own_targets_follow_the_level() {
        assert!(enabled("canadarm2::telemetry", &Level::INFO, LevelFilter::INFO));
        assert!(enabled("lightstreamer::client", &Level::WARN, LevelFilter::INFO));
        assert!(!enabled("lightstreamer::client", &Level::DEBUG, LevelFilter::INFO));
        assert!(!enabled("ssrms::signal", &Level::INFO, LevelFilter::WARN));
    }

    #[test]
    fn chatty_dependencies_are_held_at_warn() {
        assert!(!enabled("wgpu_core::device", &Level::INFO, LevelFilter::INFO));
        assert!(!enabled("naga::front", &Level::INFO, LevelFilter::TRACE));
        assert!(enabled("wgpu_hal::vulkan", &Level::WARN, LevelFilter::INFO));
        assert!(enabled("reqwest::connect", &Level::ERROR, LevelFilter::INFO));
        assert!(!enabled("hyper_util::client", &Level::WARN, LevelFilter::ERROR));
    }
}
