use std::f32::consts::FRAC_PI_2;

use bevy::prelude::*;
use settings::SettingsArc;

use crate::config::SceneSettings;

/// Ground grid drawn with gizmos every frame, centered on the origin.
pub struct GridPlugin;

impl Plugin for GridPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, draw_grid);
    }
}

fn draw_grid(mut gizmos: Gizmos, scene: Res<SettingsArc<SceneSettings>>) {
    let divisions = scene.grid_divisions.max(1);
    let spacing = scene.grid_size / divisions as f32;

    // Gizmo grids lie in the XY plane; tip it over onto XZ.
    gizmos.grid(
        Isometry3d::from_rotation(Quat::from_rotation_x(FRAC_PI_2)),
        UVec2::splat(divisions),
        Vec2::splat(spacing),
        Color::srgb(0.53, 0.53, 0.53),
    );
}
