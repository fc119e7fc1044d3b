//! Barrel elevation and manual turret traverse

use glam::Quat;

use crate::config::{BarrelConfig, TurretConfig};
use crate::input::{ControlKey, InputState};
use crate::tween::{Ease, Tweened};

/// Direction of a barrel nudge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Elevate {
    Up,
    Down,
}

/// Drives barrel pitch within `[min, max]` and turns the turret from arrow keys
#[derive(Debug, Clone, PartialEq)]
pub struct BarrelActuator {
    min: f32,
    max: f32,
    step: f32,
    wheel_duration: f32,
    key_duration: f32,
    /// Manual turret traverse per frame (radians)
    traverse_step: f32,
}

impl BarrelActuator {
    pub fn new(barrel: &BarrelConfig, turret: &TurretConfig) -> Self {
        Self {
            min: barrel.min_elevation,
            max: barrel.max_elevation,
            step: barrel.step,
            wheel_duration: barrel.wheel_duration,
            key_duration: barrel.key_duration,
            traverse_step: turret.manual_degrees.to_radians(),
        }
    }

    pub fn limits(&self) -> (f32, f32) {
        (self.min, self.max)
    }

    /// Start a pitch transition unless the barrel is already headed for the
    /// limit in that direction. A step that would pass the limit is shortened
    /// to land on it. Returns whether a transition started.
    pub fn nudge(&self, pitch: &mut Tweened, direction: Elevate, duration: f32) -> bool {
        let projected = pitch.projected();
        let delta = match direction {
            Elevate::Up => {
                if projected >= self.max {
                    return false;
                }
                self.step.min(self.max - projected)
            }
            Elevate::Down => {
                if projected <= self.min {
                    return false;
                }
                -self.step.min(projected - self.min)
            }
        };
        pitch.by(delta, duration, Ease::QuadOut);
        true
    }

    /// Wheel path: negative deltas lower the barrel, anything else raises it
    pub fn wheel(&self, pitch: &mut Tweened, delta_y: f32) -> bool {
        let direction = if delta_y < 0.0 {
            Elevate::Down
        } else {
            Elevate::Up
        };
        self.nudge(pitch, direction, self.wheel_duration)
    }

    /// Held-key pass: arrow left/right traverse the turret instantly, arrow
    /// up/down start a short pitch transition every frame they stay held
    pub fn manual_pass(&self, input: &InputState, turret: &mut Quat, pitch: &mut Tweened) {
        for key in input.held() {
            match key {
                ControlKey::TurretLeft => {
                    *turret = (*turret * Quat::from_rotation_y(self.traverse_step)).normalize();
                }
                ControlKey::TurretRight => {
                    *turret = (*turret * Quat::from_rotation_y(-self.traverse_step)).normalize();
                }
                ControlKey::TurretUp => {
                    self.nudge(pitch, Elevate::Up, self.key_duration);
                }
                ControlKey::TurretDown => {
                    self.nudge(pitch, Elevate::Down, self.key_duration);
                }
                _ => {}
            }
        }
    }

    /// Pull an evaluated pitch back into range
    pub fn clamp(&self, pitch: &mut Tweened) {
        let value = pitch.value();
        let clamped = value.clamp(self.min, self.max);
        if clamped != value {
            pitch.set(clamped);
        }
    }
}
