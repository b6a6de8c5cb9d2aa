mod camera;
mod grid;
mod lighting;
mod model;

use bevy::prelude::*;

/// Everything in the 3D view: lights, grid, orbit camera and the arm model.
pub struct ArmScenePlugin;

impl Plugin for ArmScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            lighting::LightingPlugin,
            grid::GridPlugin,
            camera::ArmCameraPlugin,
            model::ArmModelPlugin,
        ));
    }
}
