//! Typed settings sections backed by a single RON delta file.
//!
//! Each section is one struct implementing [`Settings`]; its `Default` impl holds
//! the defaults and only the fields that differ from them are written to disk.

#[cfg(feature = "bevy")]
mod bevy_adapter;
mod store;

#[cfg(feature = "bevy")]
pub use bevy_adapter::*;

pub use store::{SettingsStore, SettingsStoreBuilder};

use thiserror::Error;

/// A strongly typed settings section.
pub trait Settings: Send + Sync + 'static {
    /// Name of the section inside the settings file.
    const SECTION: &'static str;

    fn name() -> &'static str {
        Self::SECTION
    }
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ron error: {0}")]
    Ron(#[from] ron::Error),

    #[error("section not registered")]
    NotRegistered,

    #[error("invalid settings: {0}")]
    Invalid(&'static str),
}
