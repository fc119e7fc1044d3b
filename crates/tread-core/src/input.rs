//! Held-key and pointer state read by the per-frame passes

use glam::Vec2;

/// Keys whose held state drives the tank, turret and barrel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKey {
    Forward,
    Back,
    RotateLeft,
    RotateRight,
    TurretLeft,
    TurretUp,
    TurretRight,
    TurretDown,
}

impl ControlKey {
    /// Every control key, in the order the frame passes scan them
    pub const ALL: [ControlKey; 8] = [
        ControlKey::Forward,
        ControlKey::Back,
        ControlKey::RotateLeft,
        ControlKey::RotateRight,
        ControlKey::TurretLeft,
        ControlKey::TurretUp,
        ControlKey::TurretRight,
        ControlKey::TurretDown,
    ];

    fn index(self) -> usize {
        match self {
            ControlKey::Forward => 0,
            ControlKey::Back => 1,
            ControlKey::RotateLeft => 2,
            ControlKey::RotateRight => 3,
            ControlKey::TurretLeft => 4,
            ControlKey::TurretUp => 5,
            ControlKey::TurretRight => 6,
            ControlKey::TurretDown => 7,
        }
    }
}

/// Pressed flags plus the pointer position in normalized device coordinates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputState {
    pressed: [bool; 8],
    /// Pointer position, both axes in [-1, 1], y pointing up
    pointer: Vec2,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: ControlKey) {
        self.pressed[key.index()] = true;
    }

    pub fn release(&mut self, key: ControlKey) {
        self.pressed[key.index()] = false;
    }

    pub fn is_pressed(&self, key: ControlKey) -> bool {
        self.pressed[key.index()]
    }

    /// Held keys in scan order
    pub fn held(&self) -> impl Iterator<Item = ControlKey> + '_ {
        ControlKey::ALL
            .into_iter()
            .filter(|key| self.is_pressed(*key))
    }

    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    /// Update the pointer from a cursor position in viewport pixels
    /// (origin top-left, y down)
    pub fn set_pointer_from_cursor(&mut self, cursor: Vec2, viewport: Vec2) {
        if viewport.x <= 0.0 || viewport.y <= 0.0 {
            return;
        }
        self.pointer = normalize_cursor(cursor, viewport);
    }
}

/// Convert a cursor position in viewport pixels to [-1, 1] coordinates
pub fn normalize_cursor(cursor: Vec2, viewport: Vec2) -> Vec2 {
    Vec2::new(
        (cursor.x / viewport.x) * 2.0 - 1.0,
        -(cursor.y / viewport.y) * 2.0 + 1.0,
    )
}

/// Inverse of [`normalize_cursor`]
pub fn denormalize_pointer(pointer: Vec2, viewport: Vec2) -> Vec2 {
    Vec2::new(
        (pointer.x + 1.0) * 0.5 * viewport.x,
        (1.0 - pointer.y) * 0.5 * viewport.y,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_and_release() {
        let mut input = InputState::new();
        assert_eq!(input.held().count(), 0);

        input.press(ControlKey::Forward);
        input.press(ControlKey::TurretUp);
        assert!(input.is_pressed(ControlKey::Forward));
        assert_eq!(
            input.held().collect::<Vec<_>>(),
            vec![ControlKey::Forward, ControlKey::TurretUp]
        );

        input.release(ControlKey::Forward);
        assert!(!input.is_pressed(ControlKey::Forward));
        input.release(ControlKey::TurretUp);
        assert_eq!(input.held().count(), 0);
    }

    #[test]
    fn test_pointer_normalization() {
        let viewport = Vec2::new(800.0, 600.0);
        let mut input = InputState::new();

        input.set_pointer_from_cursor(Vec2::new(400.0, 300.0), viewport);
        assert_eq!(input.pointer(), Vec2::ZERO);

        input.set_pointer_from_cursor(Vec2::new(0.0, 0.0), viewport);
        assert_eq!(input.pointer(), Vec2::new(-1.0, 1.0));

        input.set_pointer_from_cursor(Vec2::new(800.0, 600.0), viewport);
        assert_eq!(input.pointer(), Vec2::new(1.0, -1.0));
    }

    #[test]
    fn test_pointer_ignores_degenerate_viewport() {
        let mut input = InputState::new();
        input.set_pointer_from_cursor(Vec2::new(10.0, 10.0), Vec2::new(0.0, 600.0));
        assert_eq!(input.pointer(), Vec2::ZERO);
    }

    #[test]
    fn test_denormalize_round_trip() {
        let viewport = Vec2::new(1280.0, 720.0);
        let cursor = Vec2::new(320.0, 180.0);
        let back = denormalize_pointer(normalize_cursor(cursor, viewport), viewport);
        assert!((back - cursor).length() < 1e-3);
    }
}
