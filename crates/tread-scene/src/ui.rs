//! Heads-up overlay using bevy_egui

use bevy::prelude::*;
use bevy_egui::{
    egui, EguiContexts, EguiGlobalSettings, EguiPrimaryContextPass, PrimaryEguiContext,
};
use tread_core::{CameraView, Readiness};

use crate::frame::LastFrame;
use crate::TankSim;

/// Whether the overlay is drawn; toggled with H
#[derive(Resource)]
pub struct HudVisible(pub bool);

impl Default for HudVisible {
    fn default() -> Self {
        Self(true)
    }
}

/// Overlay camera that owns the egui context. It stays active while the
/// scene cameras are switched on and off.
#[derive(Component)]
pub struct HudCamera;

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        // The context goes on the overlay camera, not the first scene camera spawned
        let mut settings = app
            .world_mut()
            .remove_resource::<EguiGlobalSettings>()
            .unwrap_or_default();
        settings.auto_create_primary_context = false;

        app.insert_resource(settings)
            .init_resource::<HudVisible>()
            .add_systems(Startup, spawn_hud_camera)
            .add_systems(Update, toggle_hud)
            // Runs in EguiPrimaryContextPass for proper input handling (bevy_egui 0.38+)
            .add_systems(EguiPrimaryContextPass, hud_system);
    }
}

fn spawn_hud_camera(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        Camera {
            order: 1,
            clear_color: ClearColorConfig::None,
            ..default()
        },
        PrimaryEguiContext,
        HudCamera,
        Name::new("hud_camera"),
    ));
}

fn toggle_hud(keys: Res<ButtonInput<KeyCode>>, mut visible: ResMut<HudVisible>) {
    if keys.just_pressed(KeyCode::KeyH) {
        visible.0 = !visible.0;
    }
}

fn hud_system(
    mut contexts: EguiContexts,
    visible: Res<HudVisible>,
    sim: Res<TankSim>,
    last: Res<LastFrame>,
) {
    if !visible.0 {
        return;
    }
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    let sim = &sim.0;
    egui::Area::new(egui::Id::new("tread_hud"))
        .anchor(egui::Align2::LEFT_TOP, [12.0, 12.0])
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.label(egui::RichText::new("Tread").strong());
                ui.separator();

                let (status, color) = readiness_label(sim.readiness());
                ui.horizontal(|ui| {
                    ui.label("Model:");
                    ui.colored_label(color, status);
                });

                ui.horizontal(|ui| {
                    ui.label("Camera:");
                    for (digit, view) in CameraView::ALL.iter().enumerate() {
                        let text = format!("{} {}", digit + 1, view);
                        if *view == sim.active_camera() {
                            ui.label(egui::RichText::new(text).strong());
                        } else {
                            ui.weak(text);
                        }
                    }
                });

                let pos = sim.tank_position();
                ui.label(format!("Tank: x {:.1}  z {:.1}", pos.x, pos.z));
                ui.label(format!(
                    "Barrel: {:.1}°",
                    sim.barrel_pitch().to_degrees()
                ));
                if last.0.is_some_and(|report| report.turret_aimed) {
                    ui.weak("Turret following pointer");
                }

                ui.separator();
                ui.weak("W/S drive  A/D rotate");
                ui.weak("Arrows turret and barrel, wheel elevates");
                ui.weak("1-4 camera  Space repaint  H hide");
            });
        });
}

fn readiness_label(readiness: Readiness) -> (&'static str, egui::Color32) {
    match readiness {
        Readiness::Pending => ("loading", egui::Color32::YELLOW),
        Readiness::Ready => ("ready", egui::Color32::GREEN),
        Readiness::Failed => ("failed", egui::Color32::RED),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;

    #[test]
    fn test_hud_camera_owns_egui_context() {
        let mut world = World::new();
        world.run_system_once(spawn_hud_camera).unwrap();

        let mut contexts = world.query_filtered::<&Camera, With<PrimaryEguiContext>>();
        let cameras: Vec<&Camera> = contexts.iter(&world).collect();
        assert_eq!(cameras.len(), 1);
        assert!(cameras[0].is_active);
        assert_eq!(cameras[0].order, 1);
    }
}
