use bevy::{app::App, ecs::resource::Resource, prelude::Deref};
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;

use crate::{Settings, SettingsError, SettingsStore};

/// Shared handle to the store, available to systems that want to persist changes.
#[derive(Resource, Clone)]
pub struct SettingsStoreRef(pub Arc<SettingsStore>);

/// Snapshot of one settings section as a Bevy resource.
#[derive(Resource, Deref, Clone)]
pub struct SettingsArc<T: Send + Sync + 'static>(pub Arc<T>);

pub trait AppSettingsExt {
    fn insert_settings_store(&mut self, store: SettingsStore) -> &mut Self;

    /// Registers `S` in the store and seeds `SettingsArc<S>`.
    ///
    /// Requires `insert_settings_store` to have been called first.
    fn register_settings_section<S>(&mut self) -> Result<&mut Self, SettingsError>
    where
        S: Settings + Default + Serialize + DeserializeOwned;
}

impl AppSettingsExt for App {
    fn insert_settings_store(&mut self, store: SettingsStore) -> &mut Self {
        self.insert_resource(SettingsStoreRef(Arc::new(store)))
    }

    fn register_settings_section<S>(&mut self) -> Result<&mut Self, SettingsError>
    where
        S: Settings + Default + Serialize + DeserializeOwned,
    {
        let store = self
            .world()
            .get_resource::<SettingsStoreRef>()
            .ok_or(SettingsError::Invalid("settings store not inserted"))?
            .0
            .clone();
        if !store.is_registered::<S>() {
            store.register::<S>()?;
        }
        let section = store.get::<S>()?;
        Ok(self.insert_resource(SettingsArc(section)))
    }
}
