//! Keyboard, pointer, wheel and resize intake

use bevy::input::keyboard::KeyboardInput;
use bevy::input::mouse::MouseWheel;
use bevy::input::ButtonState;
use bevy::prelude::*;
use bevy::window::{CursorMoved, WindowResized};
use tread_core::ControlKey;

use crate::{FrameSet, TankSim};

/// Plugin for input handling
pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (handle_keyboard, handle_pointer, handle_wheel, handle_resize)
                .in_set(FrameSet::Input),
        );
    }
}

/// Held control bound to `key`
pub fn control_key(key: KeyCode) -> Option<ControlKey> {
    match key {
        KeyCode::KeyW => Some(ControlKey::Forward),
        KeyCode::KeyS => Some(ControlKey::Back),
        KeyCode::KeyA => Some(ControlKey::RotateLeft),
        KeyCode::KeyD => Some(ControlKey::RotateRight),
        KeyCode::ArrowLeft => Some(ControlKey::TurretLeft),
        KeyCode::ArrowRight => Some(ControlKey::TurretRight),
        KeyCode::ArrowUp => Some(ControlKey::TurretUp),
        KeyCode::ArrowDown => Some(ControlKey::TurretDown),
        _ => None,
    }
}

/// Camera digit bound to `key`
pub fn camera_digit(key: KeyCode) -> Option<u8> {
    match key {
        KeyCode::Digit1 | KeyCode::Numpad1 => Some(1),
        KeyCode::Digit2 | KeyCode::Numpad2 => Some(2),
        KeyCode::Digit3 | KeyCode::Numpad3 => Some(3),
        KeyCode::Digit4 | KeyCode::Numpad4 => Some(4),
        _ => None,
    }
}

fn handle_keyboard(mut events: MessageReader<KeyboardInput>, mut sim: ResMut<TankSim>) {
    for event in events.read() {
        match event.state {
            ButtonState::Pressed => {
                if let Some(key) = control_key(event.key_code) {
                    sim.0.key_down(key);
                }
            }
            ButtonState::Released => {
                if let Some(key) = control_key(event.key_code) {
                    sim.0.key_up(key);
                }
                if let Some(digit) = camera_digit(event.key_code) {
                    sim.0.digit_released(digit);
                }
                if event.key_code == KeyCode::Space && sim.0.color_trigger_released() {
                    tracing::debug!("Tank colors retargeted");
                }
            }
        }
    }
}

fn handle_pointer(mut events: MessageReader<CursorMoved>, mut sim: ResMut<TankSim>) {
    for event in events.read() {
        sim.0.pointer_moved(event.position);
    }
}

fn handle_wheel(mut events: MessageReader<MouseWheel>, mut sim: ResMut<TankSim>) {
    for event in events.read() {
        sim.0.wheel(event.y);
    }
}

fn handle_resize(mut events: MessageReader<WindowResized>, mut sim: ResMut<TankSim>) {
    for event in events.read() {
        tracing::debug!(width = event.width, height = event.height, "Viewport resized");
        sim.0.resize(Vec2::new(event.width, event.height));
    }
}
