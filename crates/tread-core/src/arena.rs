//! Rectangular play area derived from the viewport

use glam::{Vec2, Vec3};

/// Ground extent and the interior zone where the tank creeps slowly
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayArea {
    /// Full extent along X
    pub width: f32,
    /// Full extent along Z
    pub height: f32,
    /// Interior threshold on |x|
    pub interior_x: f32,
    /// Interior threshold on |z|
    pub interior_z: f32,
}

impl PlayArea {
    /// Build the area for a viewport of `viewport` pixels.
    ///
    /// Extent is `pixels / extent_divisor`; the interior threshold on each
    /// axis is `extent / interior_divisor`.
    pub fn from_viewport(viewport: Vec2, extent_divisor: f32, interior_divisor: f32) -> Self {
        let width = viewport.x / extent_divisor;
        let height = viewport.y / extent_divisor;
        Self {
            width,
            height,
            interior_x: width / interior_divisor,
            interior_z: height / interior_divisor,
        }
    }

    /// True when `position` lies outside the interior zone on either axis.
    ///
    /// Z is tested against the height threshold and X against the width
    /// threshold regardless of which way the tank is facing.
    pub fn is_outside_interior(&self, position: Vec3) -> bool {
        position.z < -self.interior_z
            || position.z > self.interior_z
            || position.x < -self.interior_x
            || position.x > self.interior_x
    }

    /// Corner positions for the decorative cylinders, inset by `inset`
    pub fn corners(&self, inset: f32, y: f32) -> [Vec3; 4] {
        let hx = self.width / 2.0 - inset;
        let hz = self.height / 2.0 - inset;
        [
            Vec3::new(-hx, y, -hz),
            Vec3::new(hx, y, -hz),
            Vec3::new(hx, y, hz),
            Vec3::new(-hx, y, hz),
        ]
    }
}
