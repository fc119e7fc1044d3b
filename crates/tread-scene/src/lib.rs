//! Tread Scene - Bevy front end for the tank demo
//!
//! Builds the arena, loads the tank model, feeds window input into the
//! [`tread_core::Simulation`] and writes its state back onto transforms,
//! materials and cameras every frame.

pub mod frame;
pub mod input;
pub mod models;
pub mod scene;
pub mod ui;

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use tread_core::{Config, Simulation};

/// Demo configuration as loaded from disk
#[derive(Debug, Clone, Resource)]
pub struct SceneConfig(pub Config);

/// The simulation driving the scene
#[derive(Resource)]
pub struct TankSim(pub Simulation);

/// Ordering of the per-frame work
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameSet {
    /// Window messages are folded into the simulation
    Input,
    /// Model loading and rig binding
    Load,
    /// The simulation tick
    Drive,
    /// Simulation state is written back to the ECS
    Apply,
}

/// Plugin that sets up the whole demo scene
pub struct TreadScenePlugin {
    pub config: Config,
}

impl TreadScenePlugin {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl Plugin for TreadScenePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(SceneConfig(self.config.clone()))
            .configure_sets(
                Update,
                (FrameSet::Input, FrameSet::Load, FrameSet::Drive, FrameSet::Apply).chain(),
            )
            .add_systems(PreStartup, init_simulation)
            .add_plugins(scene::SceneSetupPlugin)
            .add_plugins(models::ModelsPlugin)
            .add_plugins(input::InputPlugin)
            .add_plugins(frame::FramePlugin)
            .add_plugins(ui::HudPlugin);
    }
}

/// Create the simulation, sizing the play area from the primary window
fn init_simulation(
    mut commands: Commands,
    config: Res<SceneConfig>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    let mut config = config.0.clone();
    match windows.single() {
        Ok(window) if window.width() > 0.0 && window.height() > 0.0 => {
            config.window.width = window.width();
            config.window.height = window.height();
        }
        _ => {
            tracing::warn!(
                width = config.window.width,
                height = config.window.height,
                "No primary window size available, using configured size"
            );
        }
    }

    let sim = Simulation::new(config);
    let area = sim.play_area();
    tracing::info!(
        width = area.width,
        height = area.height,
        camera = %sim.active_camera(),
        "Simulation initialized"
    );
    commands.insert_resource(TankSim(sim));
}
