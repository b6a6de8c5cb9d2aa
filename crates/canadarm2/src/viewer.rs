use app::{AppContext, BoxError};
use bevy::{log::LogPlugin, prelude::*};
use settings::{AppSettingsExt, SettingsStore};

use crate::config::{SceneSettings, StreamSettings};
use crate::hud::HudPlugin;
use crate::scene::ArmScenePlugin;
use crate::telemetry::TelemetryPlugin;

/// Assembles the Bevy app: window, settings sections and the three feature plugins.
pub fn build(ctx: &AppContext) -> Result<App, BoxError> {
    let settings_file = ctx.dirs().settings_file();
    tracing::info!(path = %settings_file.display(), "loading settings");
    let store = SettingsStore::builder()
        .with_settings_file(settings_file)
        .build()?;

    let mut app = App::new();
    // AppContext already installed the global subscriber.
    app.add_plugins(
        DefaultPlugins
            .build()
            .disable::<LogPlugin>()
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: format!("Canadarm2 Live ({})", ctx.version()),
                    ..default()
                }),
                ..default()
            }),
    );

    app.insert_settings_store(store);
    app.register_settings_section::<StreamSettings>()?
        .register_settings_section::<SceneSettings>()?;

    app.add_plugins((TelemetryPlugin, ArmScenePlugin, HudPlugin));
    Ok(app)
}
