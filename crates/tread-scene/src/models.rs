//! Tank model loading and rig binding

use bevy::asset::LoadState;
use bevy::gltf::Gltf;
use bevy::prelude::*;
use tread_core::{CameraView, RigRest};

use crate::scene::{TankRoot, ViewCamera};
use crate::{FrameSet, SceneConfig, TankSim};

/// Offset of the model inside the tank root
const MODEL_OFFSET: Vec3 = Vec3::new(0.0, 0.1, 2.0);

/// Progress of the one tank model load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelState {
    #[default]
    Loading,
    /// Scene root spawned, waiting for its hierarchy to appear
    Spawned(Entity),
    Bound,
    Failed,
}

/// Handle and state of the tank model
#[derive(Resource, Default)]
pub struct TankModel {
    pub handle: Handle<Gltf>,
    pub state: ModelState,
}

/// Entities and materials of the bound tank rig
#[derive(Resource, Default)]
pub struct TankRig {
    pub turret: Option<Entity>,
    /// Node the turret transform is relative to
    pub turret_parent: Option<Entity>,
    pub barrel: Option<Entity>,
    /// Rest Y and Z euler angles of the barrel; only X is animated
    pub barrel_rest: Vec2,
    /// Replacement materials, in the order the simulation tracks them
    pub materials: Vec<Handle<StandardMaterial>>,
}

/// Plugin for model loading
pub struct ModelsPlugin;

impl Plugin for ModelsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TankModel>()
            .init_resource::<TankRig>()
            .add_systems(Startup, start_tank_load)
            .add_systems(
                Update,
                (poll_tank_model, bind_tank_rig).chain().in_set(FrameSet::Load),
            );
    }
}

fn start_tank_load(
    config: Res<SceneConfig>,
    asset_server: Res<AssetServer>,
    mut model: ResMut<TankModel>,
) {
    let path = config.0.assets.tank_model.clone();
    tracing::info!("Starting to load tank model: {}", path);
    model.handle = asset_server.load(path);
    model.state = ModelState::Loading;
}

/// Wait for the glTF and attach its scene under the tank root
fn poll_tank_model(
    mut commands: Commands,
    mut model: ResMut<TankModel>,
    mut sim: ResMut<TankSim>,
    asset_server: Res<AssetServer>,
    gltf_assets: Res<Assets<Gltf>>,
    tank: Query<Entity, With<TankRoot>>,
) {
    if model.state != ModelState::Loading {
        return;
    }

    match asset_server.get_load_state(model.handle.id()) {
        Some(LoadState::Loaded) => {
            let scene = gltf_assets.get(&model.handle).and_then(|gltf| {
                gltf.default_scene
                    .clone()
                    .or_else(|| gltf.scenes.first().cloned())
            });
            let (Some(scene), Ok(tank)) = (scene, tank.single()) else {
                tracing::error!("Tank model has no scene to spawn");
                model.state = ModelState::Failed;
                sim.0.model_failed();
                return;
            };

            let root = commands
                .spawn((
                    SceneRoot(scene),
                    Transform::from_translation(MODEL_OFFSET),
                    Name::new("tank_model"),
                ))
                .id();
            commands.entity(tank).add_child(root);
            model.state = ModelState::Spawned(root);
            tracing::info!("Tank model loaded, spawning scene");
        }
        Some(LoadState::Failed(err)) => {
            tracing::error!("Failed to load tank model: {}", err);
            model.state = ModelState::Failed;
            sim.0.model_failed();
        }
        _ => {
            // Still loading
        }
    }
}

/// Once the scene hierarchy exists, find turret and barrel, swap in plain
/// white materials and tell the simulation the rig is ready
#[allow(clippy::too_many_arguments)]
fn bind_tank_rig(
    mut commands: Commands,
    mut model: ResMut<TankModel>,
    mut rig: ResMut<TankRig>,
    mut sim: ResMut<TankSim>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    children_query: Query<&Children>,
    mesh_nodes: Query<(), With<Mesh3d>>,
    mesh_materials: Query<Entity, With<MeshMaterial3d<StandardMaterial>>>,
    transforms: Query<&Transform>,
    cameras: Query<(Entity, &ViewCamera)>,
) {
    let ModelState::Spawned(model_root) = model.state else {
        return;
    };
    // The scene instance has not been spawned yet
    let Some(scene_root) = children_query
        .get(model_root)
        .ok()
        .and_then(|children| children.first().copied())
    else {
        return;
    };

    let node_children = |entity: Entity| -> Vec<Entity> {
        children_query
            .get(entity)
            .map(|children| {
                children
                    .iter()
                    .filter(|child| !mesh_nodes.contains(*child))
                    .collect()
            })
            .unwrap_or_default()
    };

    let turret_config = &sim.0.config().turret;
    let turret_path = turret_config.turret_path.clone();
    let barrel_path = turret_config.barrel_path.clone();
    let parent_path = &turret_path[..turret_path.len().saturating_sub(1)];

    let turret = resolve_node_path(scene_root, &turret_path, &node_children);
    let turret_parent = resolve_node_path(scene_root, parent_path, &node_children);
    let barrel = resolve_node_path(scene_root, &barrel_path, &node_children);

    let (Some(turret), Some(turret_parent), Some(barrel)) = (turret, turret_parent, barrel) else {
        tracing::warn!(
            turret = ?turret_path,
            barrel = ?barrel_path,
            "Tank model does not contain the configured turret/barrel nodes"
        );
        model.state = ModelState::Failed;
        sim.0.model_failed();
        return;
    };

    // Every mesh gets its own plain white material
    let mut tracked = Vec::new();
    for entity in children_query.iter_descendants(model_root) {
        if mesh_materials.contains(entity) {
            let handle = materials.add(StandardMaterial {
                base_color: Color::WHITE,
                ..default()
            });
            commands.entity(entity).insert(MeshMaterial3d(handle.clone()));
            tracked.push(handle);
        }
    }

    if let Some((camera, _)) = cameras.iter().find(|(_, view)| view.0 == CameraView::Barrel) {
        commands.entity(barrel).add_child(camera);
    }

    let turret_rest = transforms
        .get(turret)
        .map(|t| t.rotation)
        .unwrap_or(Quat::IDENTITY);
    let (pitch, yaw, roll) = transforms
        .get(barrel)
        .map(|t| t.rotation.to_euler(EulerRot::XYZ))
        .unwrap_or((0.0, 0.0, 0.0));

    sim.0.model_loaded(
        RigRest {
            turret: turret_rest,
            barrel_pitch: pitch,
        },
        tracked.len(),
    );

    *rig = TankRig {
        turret: Some(turret),
        turret_parent: Some(turret_parent),
        barrel: Some(barrel),
        barrel_rest: Vec2::new(yaw, roll),
        materials: tracked,
    };
    model.state = ModelState::Bound;
}

/// Follow a child-index path from `root`. `children` lists the node children
/// of an entity; mesh primitive entities are expected to be filtered out.
pub fn resolve_node_path(
    root: Entity,
    path: &[usize],
    children: impl Fn(Entity) -> Vec<Entity>,
) -> Option<Entity> {
    path.iter()
        .try_fold(root, |node, &index| children(node).get(index).copied())
}
