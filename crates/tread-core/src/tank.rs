//! Tank root pose and the movement pass

use glam::{Quat, Vec3};

use crate::arena::PlayArea;
use crate::config::TankConfig;
use crate::input::{ControlKey, InputState};
use crate::tween::{Ease, Tweened};

/// Position and yaw of the tank root
#[derive(Debug, Clone, PartialEq)]
pub struct TankPose {
    pub position: Vec3,
    /// Yaw about +Y, animated by stacked rotation transitions
    pub yaw: Tweened,
}

impl TankPose {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            yaw: Tweened::new(0.0),
        }
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw.value())
    }

    /// Move along the tank's local Z axis
    pub fn translate_z(&mut self, distance: f32) {
        self.position += self.rotation() * Vec3::new(0.0, 0.0, distance);
    }
}

/// Applies held movement keys to the tank pose
#[derive(Debug, Clone, PartialEq)]
pub struct TankController {
    fast_step: f32,
    slow_step: f32,
    rotation_step: f32,
    rotation_duration: f32,
}

impl TankController {
    pub fn new(config: &TankConfig) -> Self {
        Self {
            fast_step: config.fast_step,
            slow_step: config.slow_step,
            rotation_step: config.rotation_step,
            rotation_duration: config.rotation_duration,
        }
    }

    /// One movement pass over the held keys.
    ///
    /// Outside the interior zone forward translates by `+fast_step` and back
    /// by `-fast_step` along local Z; inside, forward is `-slow_step` and back
    /// is `+slow_step`.
    pub fn drive(&self, input: &InputState, pose: &mut TankPose, area: &PlayArea) {
        for key in input.held() {
            match key {
                ControlKey::Forward => {
                    let step = if area.is_outside_interior(pose.position) {
                        self.fast_step
                    } else {
                        -self.slow_step
                    };
                    pose.translate_z(step);
                }
                ControlKey::Back => {
                    let step = if area.is_outside_interior(pose.position) {
                        -self.fast_step
                    } else {
                        self.slow_step
                    };
                    pose.translate_z(step);
                }
                ControlKey::RotateLeft => {
                    pose.yaw
                        .by(self.rotation_step, self.rotation_duration, Ease::QuadOut);
                }
                ControlKey::RotateRight => {
                    pose.yaw
                        .by(-self.rotation_step, self.rotation_duration, Ease::QuadOut);
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    const EPS: f32 = 1e-4;

    fn setup() -> (TankController, PlayArea) {
        let config = TankConfig::default();
        let area = PlayArea::from_viewport(Vec2::new(1650.0, 825.0), 16.5, 2.25);
        (TankController::new(&config), area)
    }

    #[test]
    fn test_no_keys_no_change() {
        let (controller, area) = setup();
        let mut pose = TankPose::new(Vec3::new(1.0, 0.1, 2.0));
        let before = pose.clone();
        controller.drive(&InputState::new(), &mut pose, &area);
        assert_eq!(pose, before);
    }

    #[test]
    fn test_forward_inside_creeps() {
        let (controller, area) = setup();
        let mut pose = TankPose::new(Vec3::ZERO);
        let mut input = InputState::new();
        input.press(ControlKey::Forward);

        controller.drive(&input, &mut pose, &area);
        assert!((pose.position.z + 0.15).abs() < EPS);
        assert!(pose.position.x.abs() < EPS);
    }

    #[test]
    fn test_back_inside_creeps() {
        let (controller, area) = setup();
        let mut pose = TankPose::new(Vec3::ZERO);
        let mut input = InputState::new();
        input.press(ControlKey::Back);

        controller.drive(&input, &mut pose, &area);
        assert!((pose.position.z - 0.15).abs() < EPS);
    }

    #[test]
    fn test_forward_outside_jumps() {
        let (controller, area) = setup();
        let start = Vec3::new(0.0, 0.0, area.height);
        let mut pose = TankPose::new(start);
        let mut input = InputState::new();
        input.press(ControlKey::Forward);

        controller.drive(&input, &mut pose, &area);
        assert!(((pose.position.z - start.z).abs() - 2.5).abs() < EPS);
    }

    #[test]
    fn test_back_outside_on_x_axis() {
        let (controller, area) = setup();
        let start = Vec3::new(area.interior_x + 1.0, 0.0, 0.0);
        let mut pose = TankPose::new(start);
        let mut input = InputState::new();
        input.press(ControlKey::Back);

        controller.drive(&input, &mut pose, &area);
        assert!((pose.position.z + 2.5).abs() < EPS);
        assert!((pose.position.x - start.x).abs() < EPS);
    }

    #[test]
    fn test_forward_follows_yaw() {
        let (controller, area) = setup();
        let mut pose = TankPose::new(Vec3::ZERO);
        pose.yaw.set(std::f32::consts::FRAC_PI_2);
        let mut input = InputState::new();
        input.press(ControlKey::Forward);

        controller.drive(&input, &mut pose, &area);
        // Local -Z rotated a quarter turn about +Y points along -X
        assert!((pose.position.x + 0.15).abs() < EPS);
        assert!(pose.position.z.abs() < EPS);
    }

    #[test]
    fn test_rotation_is_eased_and_stacks() {
        let (controller, area) = setup();
        let mut pose = TankPose::new(Vec3::ZERO);
        let mut input = InputState::new();
        input.press(ControlKey::RotateLeft);

        controller.drive(&input, &mut pose, &area);
        assert_eq!(pose.yaw.value(), 0.0);
        pose.yaw.advance(1.0 / 60.0);
        controller.drive(&input, &mut pose, &area);
        assert_eq!(pose.yaw.in_flight(), 2);
        assert!((pose.yaw.projected() - 0.2).abs() < EPS);

        pose.yaw.advance(1.0);
        assert!((pose.yaw.value() - 0.2).abs() < EPS);
    }

    #[test]
    fn test_opposite_rotations_cancel() {
        let (controller, area) = setup();
        let mut pose = TankPose::new(Vec3::ZERO);
        let mut input = InputState::new();
        input.press(ControlKey::RotateLeft);
        input.press(ControlKey::RotateRight);

        controller.drive(&input, &mut pose, &area);
        pose.yaw.advance(1.0);
        assert!(pose.yaw.value().abs() < EPS);
    }
}
