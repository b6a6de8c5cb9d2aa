use bevy::prelude::*;
use bevy_panorbit_camera::{PanOrbitCamera, PanOrbitCameraPlugin};
use settings::SettingsArc;

use crate::config::SceneSettings;

/// Orbit camera around the arm. Orbit and zoom only, pitch stays on the horizon.
pub struct ArmCameraPlugin;

impl Plugin for ArmCameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(PanOrbitCameraPlugin)
            .add_systems(Startup, spawn_camera);
    }
}

fn spawn_camera(mut commands: Commands, scene: Res<SettingsArc<SceneSettings>>) {
    let position = Vec3::from_array(scene.camera_position);
    let focus = Vec3::from_array(scene.camera_focus);

    commands.spawn((
        Camera3d::default(),
        Transform::from_translation(position).looking_at(focus, Vec3::Y),
        PanOrbitCamera {
            // Yaw and radius are derived from the transform on the first frame.
            focus,
            pitch: Some(0.0),
            pitch_upper_limit: Some(0.0),
            pitch_lower_limit: Some(0.0),
            pan_sensitivity: 0.0,
            ..default()
        },
        Name::new("Arm Camera"),
    ));
}
