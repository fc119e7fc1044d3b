//! Per-frame simulation tick and the write-back of its state

use bevy::prelude::*;
use bevy_picking::mesh_picking::ray_cast::{MeshRayCast, MeshRayCastSettings, RayCastVisibility};
use tread_core::input::denormalize_pointer;
use tread_core::{
    CameraView, DecorationKind, FrameReport, HitTarget, RayHit, SceneProbe, TurretFrame,
};

use crate::models::TankRig;
use crate::scene::{AimProxy, DecorationIndex, TankRoot, ViewCamera};
use crate::{FrameSet, TankSim};

/// Report of the most recent tick
#[derive(Resource, Default)]
pub struct LastFrame(pub Option<FrameReport>);

/// Plugin for the frame driver
pub struct FramePlugin;

impl Plugin for FramePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LastFrame>()
            .add_systems(Update, drive_frame.in_set(FrameSet::Drive))
            .add_systems(
                Update,
                (
                    apply_tank_pose,
                    apply_rig,
                    apply_cameras,
                    apply_decorations,
                    apply_tank_materials,
                )
                    .chain()
                    .in_set(FrameSet::Apply),
            );
    }
}

/// Scene answers gathered right before the tick. Camera and pointer do not
/// change during a tick, so the hits cast up front are the ones it asks for.
struct CapturedProbe {
    camera: CameraView,
    pointer: Vec2,
    hits: Vec<RayHit>,
    turret: Option<TurretFrame>,
}

impl SceneProbe for CapturedProbe {
    fn pointer_hits(&self, camera: CameraView, pointer: Vec2) -> Vec<RayHit> {
        if camera != self.camera || pointer != self.pointer {
            tracing::debug!(%camera, "Pointer ray requested for an uncaptured view");
            return Vec::new();
        }
        self.hits.clone()
    }

    fn turret_frame(&self) -> Option<TurretFrame> {
        self.turret
    }
}

#[allow(clippy::too_many_arguments)]
fn drive_frame(
    time: Res<Time>,
    mut sim: ResMut<TankSim>,
    mut last: ResMut<LastFrame>,
    rig: Res<TankRig>,
    mut ray_cast: MeshRayCast,
    cameras: Query<(&Camera, &GlobalTransform, &ViewCamera)>,
    tank: Query<Entity, With<TankRoot>>,
    proxy: Query<Entity, With<AimProxy>>,
    children_query: Query<&Children>,
    globals: Query<&GlobalTransform>,
) {
    let camera = sim.0.active_camera();
    let pointer = sim.0.input().pointer();

    let mut hits = Vec::new();
    if sim.0.readiness().is_ready() {
        if let Ok(tank) = tank.single() {
            // Only the tank's direct children are candidates
            let candidates: Vec<Entity> = children_query
                .get(tank)
                .map(|children| children.iter().collect())
                .unwrap_or_default();
            hits = cast_pointer_ray(
                &mut ray_cast,
                &cameras,
                camera,
                pointer,
                &candidates,
                proxy.single().ok(),
            );
        }
    }

    let probe = CapturedProbe {
        camera,
        pointer,
        hits,
        turret: turret_frame(&rig, &globals),
    };
    last.0 = Some(sim.0.tick(time.delta_secs(), &probe));
}

fn cast_pointer_ray(
    ray_cast: &mut MeshRayCast,
    cameras: &Query<(&Camera, &GlobalTransform, &ViewCamera)>,
    view: CameraView,
    pointer: Vec2,
    candidates: &[Entity],
    proxy: Option<Entity>,
) -> Vec<RayHit> {
    let Some((camera, camera_transform, _)) = cameras.iter().find(|(_, _, v)| v.0 == view) else {
        return Vec::new();
    };
    let Some(viewport) = camera.logical_viewport_size() else {
        return Vec::new();
    };
    let cursor = denormalize_pointer(pointer, viewport);
    let Ok(ray) = camera.viewport_to_world(camera_transform, cursor) else {
        return Vec::new();
    };

    // The aim disc is hidden, so visibility must not filter it out
    let filter = |entity: Entity| candidates.contains(&entity);
    let settings = MeshRayCastSettings::default()
        .with_visibility(RayCastVisibility::Any)
        .with_filter(&filter)
        .never_early_exit();

    ray_cast
        .cast_ray(ray, &settings)
        .iter()
        .map(|(entity, hit)| RayHit {
            target: if Some(*entity) == proxy {
                HitTarget::Proxy
            } else {
                HitTarget::Other
            },
            point: hit.point,
            distance: hit.distance,
        })
        .collect()
}

fn turret_frame(rig: &TankRig, globals: &Query<&GlobalTransform>) -> Option<TurretFrame> {
    let turret = globals.get(rig.turret?).ok()?;
    let parent = globals.get(rig.turret_parent?).ok()?;
    Some(TurretFrame {
        origin: turret.translation(),
        parent_rotation: parent.rotation(),
    })
}

fn apply_tank_pose(sim: Res<TankSim>, mut tank: Query<&mut Transform, With<TankRoot>>) {
    for mut transform in &mut tank {
        transform.translation = sim.0.tank_position();
        transform.rotation = sim.0.tank_rotation();
    }
}

fn apply_rig(sim: Res<TankSim>, rig: Res<TankRig>, mut transforms: Query<&mut Transform>) {
    if !sim.0.readiness().is_ready() {
        return;
    }
    if let Some(mut turret) = rig.turret.and_then(|e| transforms.get_mut(e).ok()) {
        turret.rotation = sim.0.turret_rotation();
    }
    if let Some(mut barrel) = rig.barrel.and_then(|e| transforms.get_mut(e).ok()) {
        barrel.rotation = Quat::from_euler(
            EulerRot::XYZ,
            sim.0.barrel_pitch(),
            rig.barrel_rest.x,
            rig.barrel_rest.y,
        );
    }
}

fn apply_cameras(sim: Res<TankSim>, mut cameras: Query<(&mut Camera, &ViewCamera)>) {
    let active = sim.0.active_camera();
    for (mut camera, view) in &mut cameras {
        let wanted = view.0 == active;
        if camera.is_active != wanted {
            camera.is_active = wanted;
        }
    }
}

fn apply_decorations(
    sim: Res<TankSim>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut decorations: Query<(&DecorationIndex, &MeshMaterial3d<StandardMaterial>, &mut Transform)>,
) {
    for (index, material, mut transform) in &mut decorations {
        let Some(decoration) = sim.0.decorations().get(index.0) else {
            continue;
        };
        write_color(&mut materials, &material.0, decoration.color.rgb());
        if decoration.kind == DecorationKind::Cylinder {
            transform.rotation = Quat::from_rotation_y(decoration.spin);
        }
    }
}

fn apply_tank_materials(
    sim: Res<TankSim>,
    rig: Res<TankRig>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (handle, color) in rig.materials.iter().zip(sim.0.tank_materials()) {
        write_color(&mut materials, handle, color.rgb());
    }
}

/// Set a material's base color, leaving the asset untouched when unchanged
fn write_color(
    materials: &mut Assets<StandardMaterial>,
    handle: &Handle<StandardMaterial>,
    rgb: [f32; 3],
) {
    let color = Color::srgb(rgb[0], rgb[1], rgb[2]);
    let stale = materials
        .get(handle)
        .is_some_and(|material| material.base_color != color);
    if stale {
        if let Some(material) = materials.get_mut(handle) {
            material.base_color = color;
        }
    }
}
