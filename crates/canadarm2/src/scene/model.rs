//! The arm model and the joint rotation mapping.
//!
//! Nodes named after a joint (`SR`, `SY`, ...) are tagged with their rest
//! orientation once the scene has spawned. From then on their rotation is
//! recomputed from [`ArmJoints`] whenever the angles change.

use bevy::asset::LoadState;
use bevy::prelude::*;
use settings::SettingsArc;
use ssrms::NodeBinding;
use ssrms::rig::binding_for_label;

use crate::config::SceneSettings;
use crate::telemetry::ArmJoints;

pub struct ArmModelPlugin;

impl Plugin for ArmModelPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, (create_arm_material, spawn_arm_model))
            .add_systems(
                Update,
                (
                    report_model_failure,
                    apply_arm_material,
                    (tag_joint_nodes, apply_joint_rotations).chain(),
                ),
            );
    }
}

/// Root of the spawned model scene.
#[derive(Component)]
pub struct ArmModel;

/// A model node driven by one joint.
#[derive(Component, Debug, Clone, Copy)]
pub struct JointNode {
    pub binding: &'static NodeBinding,
    /// XYZ Euler angles of the node as authored, in radians.
    pub rest: [f64; 3],
}

#[derive(Resource)]
struct ArmModelScene(Handle<Scene>);

#[derive(Resource)]
struct ArmMaterial(Handle<StandardMaterial>);

fn create_arm_material(
    mut commands: Commands,
    mut materials: ResMut<Assets<StandardMaterial>>,
    scene: Res<SettingsArc<SceneSettings>>,
) {
    let [r, g, b] = scene.model_rgb();
    let material = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(r, g, b),
        perceptual_roughness: 0.6,
        ..default()
    });
    commands.insert_resource(ArmMaterial(material));
}

fn spawn_arm_model(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    scene: Res<SettingsArc<SceneSettings>>,
) {
    let handle = asset_server.load(GltfAssetLabel::Scene(0).from_asset(scene.model_path.clone()));
    info!(path = %scene.model_path, "loading arm model");

    commands.spawn((
        SceneRoot(handle.clone()),
        Transform::from_translation(Vec3::from_array(scene.model_offset))
            .with_rotation(Quat::from_rotation_x(scene.model_flip_x_degrees.to_radians())),
        ArmModel,
        Name::new("Canadarm2"),
    ));
    commands.insert_resource(ArmModelScene(handle));
}

fn report_model_failure(
    asset_server: Res<AssetServer>,
    model: Option<Res<ArmModelScene>>,
    mut reported: Local<bool>,
) {
    if *reported {
        return;
    }
    let Some(model) = model else {
        return;
    };
    if let LoadState::Failed(err) = asset_server.load_state(model.0.id()) {
        error!(%err, "arm model failed to load, the scene stays empty");
        *reported = true;
    }
}

fn under_arm_model(
    entity: Entity,
    parents: &Query<&ChildOf>,
    roots: &Query<(), With<ArmModel>>,
) -> bool {
    parents
        .iter_ancestors(entity)
        .any(|ancestor| roots.contains(ancestor))
}

/// One shared plain material for every mesh of the model.
fn apply_arm_material(
    mut commands: Commands,
    material: Option<Res<ArmMaterial>>,
    meshes: Query<Entity, Added<Mesh3d>>,
    parents: Query<&ChildOf>,
    roots: Query<(), With<ArmModel>>,
) {
    let Some(material) = material else {
        return;
    };
    for entity in &meshes {
        if under_arm_model(entity, &parents, &roots) {
            commands
                .entity(entity)
                .insert(MeshMaterial3d(material.0.clone()));
        }
    }
}

pub(crate) fn tag_joint_nodes(
    mut commands: Commands,
    nodes: Query<(Entity, &Name, &Transform), Added<Name>>,
    parents: Query<&ChildOf>,
    roots: Query<(), With<ArmModel>>,
) {
    for (entity, name, transform) in &nodes {
        let Some(binding) = binding_for_label(name.as_str()) else {
            continue;
        };
        if !under_arm_model(entity, &parents, &roots) {
            continue;
        }
        let (x, y, z) = transform.rotation.to_euler(EulerRot::XYZ);
        debug!(node = binding.label, joint = ?binding.joint, "joint node found");
        commands.entity(entity).insert(JointNode {
            binding,
            rest: [x as f64, y as f64, z as f64],
        });
    }
}

/// Recompute and apply: every tagged node gets its rest pose with the bound
/// axis replaced by the current joint angle.
pub(crate) fn apply_joint_rotations(
    joints: Res<ArmJoints>,
    added: Query<(), Added<JointNode>>,
    mut nodes: Query<(&JointNode, &mut Transform)>,
) {
    if !joints.is_changed() && added.is_empty() {
        return;
    }
    for (node, mut transform) in &mut nodes {
        let [x, y, z] = node.binding.pose(node.rest, &joints);
        transform.rotation = Quat::from_euler(EulerRot::XYZ, x as f32, y as f32, z as f32);
    }
}
