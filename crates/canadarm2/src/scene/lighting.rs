use bevy::prelude::*;
use settings::SettingsArc;

use crate::config::SceneSettings;

/// Plugin for managing scene lighting
pub struct LightingPlugin;

impl Plugin for LightingPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_lighting);
    }
}

fn setup_lighting(
    mut commands: Commands,
    mut ambient_light: Option<ResMut<AmbientLight>>,
    scene: Res<SettingsArc<SceneSettings>>,
) {
    if let Some(ambient_light) = ambient_light.as_mut() {
        ambient_light.brightness = scene.ambient_brightness;
        ambient_light.color = Color::WHITE;
    }

    // Directional lights only use their orientation; the position sets the direction.
    commands.spawn((
        DirectionalLight {
            illuminance: scene.light_illuminance,
            ..default()
        },
        Transform::from_translation(Vec3::from_array(scene.light_position))
            .looking_at(Vec3::ZERO, Vec3::Y),
        Name::new("Sun"),
    ));
}
