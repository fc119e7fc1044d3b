//! Pointer-driven turret aiming

use glam::{Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Which horizontal hit positions are close enough to the tank to be ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadZoneRule {
    /// Aim only when `(x <= -1 || x >= 1) && (z <= -1 || z >= 1)`
    #[default]
    Axes,
    /// Aim when `x <= -1 || (x >= 1 && z <= -1) || z >= 1`
    Legacy,
}

impl DeadZoneRule {
    /// True when a hit at horizontal position (`x`, `z`) may steer the turret
    pub fn allows(self, x: f32, z: f32) -> bool {
        match self {
            DeadZoneRule::Axes => (x <= -1.0 || x >= 1.0) && (z <= -1.0 || z >= 1.0),
            DeadZoneRule::Legacy => x <= -1.0 || (x >= 1.0 && z <= -1.0) || z >= 1.0,
        }
    }
}

/// What a pointer ray struck
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// The hidden aiming disc attached to the tank
    Proxy,
    /// Any other part of the tank
    Other,
}

/// One intersection of the pointer ray, in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub target: HitTarget,
    pub point: Vec3,
    pub distance: f32,
}

/// World-space frame of the turret node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurretFrame {
    /// Turret origin in world space
    pub origin: Vec3,
    /// World rotation of the turret's parent node
    pub parent_rotation: Quat,
}

/// Chooses a look-at target from the pointer ray hits
#[derive(Debug, Clone, PartialEq)]
pub struct TurretAimer {
    pub dead_zone: DeadZoneRule,
    pub aim_height: f32,
}

impl TurretAimer {
    pub fn new(dead_zone: DeadZoneRule, aim_height: f32) -> Self {
        Self {
            dead_zone,
            aim_height,
        }
    }

    /// World point the turret should face, if any hit qualifies.
    ///
    /// Hits are walked nearest first and each qualifying proxy hit replaces
    /// the previous target, so the farthest qualifying hit wins.
    pub fn aim_point(&self, hits: &[RayHit]) -> Option<Vec3> {
        let mut ordered: Vec<&RayHit> = hits.iter().collect();
        ordered.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        let mut target = None;
        for hit in ordered {
            if hit.target != HitTarget::Proxy {
                continue;
            }
            if self.dead_zone.allows(hit.point.x, hit.point.z) {
                target = Some(Vec3::new(hit.point.x, self.aim_height, hit.point.z));
            }
        }
        target
    }

    /// Local turret rotation that points its +Z axis at `target`
    pub fn local_rotation(&self, frame: &TurretFrame, target: Vec3) -> Option<Quat> {
        let world = facing_rotation(frame.origin, target)?;
        Some((frame.parent_rotation.inverse() * world).normalize())
    }
}

/// Rotation whose +Z axis points from `origin` towards `target`, keeping +Y up.
///
/// Returns `None` when the two points coincide or the direction is vertical.
pub fn facing_rotation(origin: Vec3, target: Vec3) -> Option<Quat> {
    let forward = (target - origin).try_normalize()?;
    let right = Vec3::Y.cross(forward).try_normalize()?;
    let up = forward.cross(right);
    Some(Quat::from_mat3(&Mat3::from_cols(right, up, forward)))
}
