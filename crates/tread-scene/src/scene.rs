//! Scene setup - lights, ground, corner cylinders, tank root and cameras

use std::f32::consts::{FRAC_PI_2, PI};

use bevy::prelude::*;
use bevy_picking::mesh_picking::ray_cast::RayCastBackfaces;
use tread_core::{CameraView, DecorationKind};

use crate::TankSim;

/// Radius and height of the corner cylinders
const CYLINDER_SIZE: f32 = 5.0;
/// Cylinders sit this far in from each corner
const CYLINDER_INSET: f32 = 5.0;
const CYLINDER_Y: f32 = 10.0;
const CAMERA_FOV_DEGREES: f32 = 75.0;

/// Marker for the tank's root entity, the one the simulation moves
#[derive(Component)]
pub struct TankRoot;

/// Marker for the invisible disc around the tank that pointer rays aim at
#[derive(Component)]
pub struct AimProxy;

/// One of the four switchable viewpoints
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewCamera(pub CameraView);

/// Index into the simulation's decoration list
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecorationIndex(pub usize);

/// Marker for the main directional light
#[derive(Component)]
pub struct MainDirectionalLight;

/// Plugin for scene setup
pub struct SceneSetupPlugin;

impl Plugin for SceneSetupPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(Color::srgb_u8(0x7e, 0xc0, 0xee)))
            .add_systems(Startup, (setup_lighting, setup_arena, setup_tank).chain());
    }
}

fn setup_lighting(mut commands: Commands) {
    commands.insert_resource(AmbientLight {
        color: Color::srgb(0.93, 0.93, 1.0),
        brightness: 400.0,
        ..default()
    });

    commands.spawn((
        DirectionalLight {
            illuminance: 8000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(0.0, 20.0, 0.0).looking_at(Vec3::new(2.0, 0.0, 1.0), Vec3::Y),
        MainDirectionalLight,
    ));
}

/// Ground plane sized to the play area plus a cylinder at each corner
fn setup_arena(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    sim: Res<TankSim>,
) {
    let area = *sim.0.play_area();
    let mut corners = area.corners(CYLINDER_INSET, CYLINDER_Y).into_iter();
    let cylinder_mesh = meshes.add(Cylinder::new(CYLINDER_SIZE, CYLINDER_SIZE));

    for (index, decoration) in sim.0.decorations().iter().enumerate() {
        let [r, g, b] = decoration.color.rgb();
        let material = materials.add(StandardMaterial {
            base_color: Color::srgb(r, g, b),
            perceptual_roughness: 0.8,
            ..default()
        });

        match decoration.kind {
            DecorationKind::Ground => {
                commands.spawn((
                    Mesh3d(meshes.add(Plane3d::default().mesh().size(area.width, area.height))),
                    MeshMaterial3d(material),
                    Transform::IDENTITY,
                    DecorationIndex(index),
                    Name::new("ground"),
                ));
            }
            DecorationKind::Cylinder => {
                let Some(position) = corners.next() else {
                    tracing::warn!(index, "More cylinders than arena corners, skipping");
                    continue;
                };
                commands.spawn((
                    Mesh3d(cylinder_mesh.clone()),
                    MeshMaterial3d(material),
                    Transform::from_translation(position),
                    DecorationIndex(index),
                    Name::new(format!("cylinder_{index}")),
                ));
            }
        }
    }

    tracing::debug!(width = area.width, height = area.height, "Arena spawned");
}

/// Tank root with its aim disc and the tank-relative cameras. The tank model
/// itself is attached later by the models plugin.
fn setup_tank(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    sim: Res<TankSim>,
) {
    let active = sim.0.active_camera();
    let proxy_radius = sim.0.config().turret.proxy_radius;

    commands
        .spawn((
            Transform::from_translation(sim.0.tank_position()).with_rotation(sim.0.tank_rotation()),
            Visibility::default(),
            TankRoot,
            Name::new("tank"),
        ))
        .with_children(|tank| {
            tank.spawn((
                Mesh3d(meshes.add(Circle::new(proxy_radius))),
                MeshMaterial3d(materials.add(StandardMaterial {
                    base_color: Color::srgb(1.0, 1.0, 0.0),
                    unlit: true,
                    ..default()
                })),
                Transform::from_rotation(Quat::from_rotation_x(-FRAC_PI_2)),
                Visibility::Hidden,
                RayCastBackfaces,
                AimProxy,
                Name::new("aim_proxy"),
            ));

            tank.spawn(view_camera(
                CameraView::Tank,
                active,
                Transform::from_translation(Vec3::new(0.0, 3.0, 3.0) * 1.5)
                    .with_rotation(Quat::from_rotation_x(-30f32.to_radians())),
            ));
            tank.spawn(view_camera(
                CameraView::Rear,
                active,
                Transform::from_xyz(0.0, 3.0, -8.0).with_rotation(Quat::from_rotation_y(PI)),
            ));
            // Moves onto the barrel once the rig is bound
            tank.spawn(view_camera(
                CameraView::Barrel,
                active,
                Transform::from_xyz(0.0, 3.0, -15.0),
            ));
        });

    // Overhead view, fixed in the world
    commands.spawn(view_camera(
        CameraView::Default,
        active,
        Transform::from_xyz(0.0, 50.0, 0.0).looking_at(Vec3::ZERO, Vec3::NEG_Z),
    ));
}

fn view_camera(view: CameraView, active: CameraView, transform: Transform) -> impl Bundle {
    (
        Camera3d::default(),
        Camera {
            is_active: view == active,
            ..default()
        },
        Projection::Perspective(PerspectiveProjection {
            fov: CAMERA_FOV_DEGREES.to_radians(),
            near: 0.1,
            far: 1000.0,
            ..default()
        }),
        transform,
        ViewCamera(view),
        Name::new(format!("{view}_camera")),
    )
}
