//! Simulation state and the per-frame driver
//!
//! [`Simulation`] owns every piece of mutable demo state. Input handlers and
//! the frame tick are plain `&mut self` methods, so whatever schedules them
//! only has to call them from one thread.

use glam::{Quat, Vec2, Vec3};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::arena::PlayArea;
use crate::barrel::BarrelActuator;
use crate::camera::{CameraSelector, CameraView};
use crate::config::Config;
use crate::cosmetic::{CosmeticAnimator, Decoration, default_decorations};
use crate::input::{ControlKey, InputState};
use crate::tank::{TankController, TankPose};
use crate::turret::{RayHit, TurretAimer, TurretFrame};
use crate::tween::{Tweened, TweenedColor};

/// What the frame driver needs to know about the rendered scene
pub trait SceneProbe {
    /// Hits of the ray from `camera` through `pointer` (normalized device
    /// coordinates) against the tank's child objects
    fn pointer_hits(&self, camera: CameraView, pointer: Vec2) -> Vec<RayHit>;

    /// World frame of the turret, once the model's rig is bound
    fn turret_frame(&self) -> Option<TurretFrame>;
}

/// One-shot state of the asynchronous tank model load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Readiness {
    #[default]
    Pending,
    Ready,
    /// Load failed; everything gated on the model stays off
    Failed,
}

impl Readiness {
    pub fn is_ready(self) -> bool {
        self == Readiness::Ready
    }
}

/// Rest pose of the loaded rig nodes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigRest {
    pub turret: Quat,
    pub barrel_pitch: f32,
}

impl Default for RigRest {
    fn default() -> Self {
        Self {
            turret: Quat::IDENTITY,
            barrel_pitch: 0.0,
        }
    }
}

/// Summary of one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// Camera to render this frame with
    pub camera: CameraView,
    /// Turret was re-aimed from the pointer this frame
    pub turret_aimed: bool,
    /// Decorative colors were retargeted this frame
    pub colors_retargeted: bool,
}

pub struct Simulation {
    config: Config,
    area: PlayArea,
    viewport: Vec2,
    input: InputState,
    tank: TankPose,
    turret: Quat,
    barrel: Tweened,
    cameras: CameraSelector,
    readiness: Readiness,
    decorations: Vec<Decoration>,
    tank_materials: Vec<TweenedColor>,
    controller: TankController,
    aimer: TurretAimer,
    actuator: BarrelActuator,
    cosmetics: CosmeticAnimator,
    rng: StdRng,
}

impl Simulation {
    pub fn new(config: Config) -> Self {
        Self::with_rng(config, StdRng::from_rng(&mut rand::rng()))
    }

    /// Deterministic colors, for tests and replays
    pub fn with_seed(config: Config, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: Config, rng: StdRng) -> Self {
        let viewport = Vec2::new(config.window.width, config.window.height);
        let area = PlayArea::from_viewport(
            viewport,
            config.tank.extent_divisor,
            config.tank.interior_divisor,
        );
        let initial_camera = CameraView::from_name(&config.camera.initial);
        if initial_camera == CameraView::Default
            && !config.camera.initial.trim().eq_ignore_ascii_case("default")
        {
            warn!(
                requested = %config.camera.initial,
                using = %initial_camera,
                "Unrecognized initial camera"
            );
        }

        Self {
            area,
            viewport,
            input: InputState::new(),
            tank: TankPose::new(Vec3::new(0.0, config.tank.spawn_height, 0.0)),
            turret: Quat::IDENTITY,
            barrel: Tweened::new(0.0),
            cameras: CameraSelector::new(initial_camera),
            readiness: Readiness::Pending,
            decorations: default_decorations(),
            tank_materials: Vec::new(),
            controller: TankController::new(&config.tank),
            aimer: TurretAimer::new(config.turret.dead_zone, config.turret.aim_height),
            actuator: BarrelActuator::new(&config.barrel, &config.turret),
            cosmetics: CosmeticAnimator::new(&config.cosmetics),
            rng,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn play_area(&self) -> &PlayArea {
        &self.area
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn readiness(&self) -> Readiness {
        self.readiness
    }

    pub fn active_camera(&self) -> CameraView {
        self.cameras.active()
    }

    pub fn tank_position(&self) -> Vec3 {
        self.tank.position
    }

    pub fn tank_rotation(&self) -> Quat {
        self.tank.rotation()
    }

    #[cfg(test)]
    fn set_tank_position(&mut self, position: Vec3) {
        self.tank.position = position;
    }

    /// Local rotation of the turret node
    pub fn turret_rotation(&self) -> Quat {
        self.turret
    }

    /// Current barrel pitch, always within the elevation limits
    pub fn barrel_pitch(&self) -> f32 {
        self.barrel.value()
    }

    #[cfg(test)]
    fn barrel(&self) -> &Tweened {
        &self.barrel
    }

    pub fn decorations(&self) -> &[Decoration] {
        &self.decorations
    }

    pub fn tank_materials(&self) -> &[TweenedColor] {
        &self.tank_materials
    }

    /// The model finished loading: bind the rig rest pose and start tracking
    /// `material_count` tank materials. Only the first call has any effect.
    pub fn model_loaded(&mut self, rest: RigRest, material_count: usize) {
        if self.readiness != Readiness::Pending {
            warn!(state = ?self.readiness, "Ignoring repeated model readiness signal");
            return;
        }
        let (min, max) = self.actuator.limits();
        self.turret = rest.turret;
        self.barrel = Tweened::new(rest.barrel_pitch.clamp(min, max));
        self.tank_materials = vec![TweenedColor::new([1.0, 1.0, 1.0]); material_count];
        self.readiness = Readiness::Ready;
        info!(materials = material_count, "Tank model ready");
    }

    /// The model failed to load; gated components stay off for good
    pub fn model_failed(&mut self) {
        if self.readiness == Readiness::Pending {
            self.readiness = Readiness::Failed;
        }
    }

    pub fn key_down(&mut self, key: ControlKey) {
        if self.readiness.is_ready() {
            self.input.press(key);
        }
    }

    pub fn key_up(&mut self, key: ControlKey) {
        self.input.release(key);
    }

    /// Number key released; returns the newly selected view, if any
    pub fn digit_released(&mut self, digit: u8) -> Option<CameraView> {
        let view = self.cameras.on_digit_released(digit)?;
        debug!(camera = %view, "Camera switched");
        Some(view)
    }

    /// Tank color trigger released. Returns whether a retarget started.
    pub fn color_trigger_released(&mut self) -> bool {
        if !self.readiness.is_ready() {
            return false;
        }
        self.cosmetics
            .randomize_tank(&mut self.tank_materials, &mut self.rng)
    }

    /// Cursor moved, in viewport pixels
    pub fn pointer_moved(&mut self, cursor: Vec2) {
        if self.readiness.is_ready() {
            self.input.set_pointer_from_cursor(cursor, self.viewport);
        }
    }

    /// Wheel scrolled. Returns whether a barrel transition started.
    pub fn wheel(&mut self, delta_y: f32) -> bool {
        if !self.readiness.is_ready() {
            return false;
        }
        self.actuator.wheel(&mut self.barrel, delta_y)
    }

    /// The viewport changed size. Only pointer normalization follows it; the
    /// play area keeps the size it was built with.
    pub fn resize(&mut self, viewport: Vec2) {
        if viewport.x > 0.0 && viewport.y > 0.0 {
            self.viewport = viewport;
        }
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Run one frame: tank movement, pointer aiming, manual turret and barrel
    /// keys, camera choice, then decorative spin.
    pub fn tick(&mut self, dt: f32, probe: &impl SceneProbe) -> FrameReport {
        self.advance_transitions(dt);
        let colors_retargeted = self
            .cosmetics
            .tick(dt, &mut self.decorations, &mut self.rng);

        self.controller
            .drive(&self.input, &mut self.tank, &self.area);

        let turret_aimed = self.aim_turret(probe);

        if self.readiness.is_ready() {
            self.actuator
                .manual_pass(&self.input, &mut self.turret, &mut self.barrel);
        }

        let camera = self.cameras.active();

        self.cosmetics.spin(&mut self.decorations);

        FrameReport {
            camera,
            turret_aimed,
            colors_retargeted,
        }
    }

    fn advance_transitions(&mut self, dt: f32) {
        self.tank.yaw.advance(dt);
        self.barrel.advance(dt);
        self.actuator.clamp(&mut self.barrel);
        for decoration in &mut self.decorations {
            decoration.color.advance(dt);
        }
        for material in &mut self.tank_materials {
            material.advance(dt);
        }
    }

    fn aim_turret(&mut self, probe: &impl SceneProbe) -> bool {
        if !self.readiness.is_ready() {
            return false;
        }
        let hits = probe.pointer_hits(self.cameras.active(), self.input.pointer());
        let Some(target) = self.aimer.aim_point(&hits) else {
            return false;
        };
        let Some(frame) = probe.turret_frame() else {
            return false;
        };
        match self.aimer.local_rotation(&frame, target) {
            Some(rotation) => {
                self.turret = rotation;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::turret::HitTarget;

    const DT: f32 = 1.0 / 60.0;
    const EPS: f32 = 1e-4;

    /// Probe returning fixed hits and a turret at the tank origin
    #[derive(Default)]
    struct FakeProbe {
        hits: Vec<RayHit>,
        frame: Option<TurretFrame>,
    }

    impl FakeProbe {
        fn with_proxy_hit(x: f32, z: f32) -> Self {
            Self {
                hits: vec![RayHit {
                    target: HitTarget::Proxy,
                    point: Vec3::new(x, 0.1, z),
                    distance: 40.0,
                }],
                frame: Some(TurretFrame {
                    origin: Vec3::new(0.0, 3.0, 0.0),
                    parent_rotation: Quat::IDENTITY,
                }),
            }
        }
    }

    impl SceneProbe for FakeProbe {
        fn pointer_hits(&self, _camera: CameraView, _pointer: Vec2) -> Vec<RayHit> {
            self.hits.clone()
        }

        fn turret_frame(&self) -> Option<TurretFrame> {
            self.frame
        }
    }

    fn ready_sim() -> Simulation {
        let mut sim = Simulation::with_seed(Config::default(), 3);
        sim.model_loaded(RigRest::default(), 4);
        sim
    }

    #[test]
    fn test_idle_frame_leaves_pose() {
        let mut sim = ready_sim();
        let probe = FakeProbe::default();
        let position = sim.tank_position();
        for _ in 0..30 {
            sim.tick(DT, &probe);
        }
        assert_eq!(sim.tank_position(), position);
        assert_eq!(sim.tank_rotation(), Quat::IDENTITY);
    }

    #[test]
    fn test_forward_one_tick_from_origin() {
        let mut sim = ready_sim();
        sim.key_down(ControlKey::Forward);
        let z = sim.tank_position().z;
        sim.tick(DT, &FakeProbe::default());
        assert!((sim.tank_position().z - (z - 0.15)).abs() < EPS);
    }

    #[test]
    fn test_forward_outside_interior() {
        let mut sim = ready_sim();
        let height = sim.play_area().height;
        sim.set_tank_position(Vec3::new(0.0, 0.1, height));
        sim.key_down(ControlKey::Forward);
        sim.tick(DT, &FakeProbe::default());
        assert!(((sim.tank_position().z - height).abs() - 2.5).abs() < EPS);
    }

    #[test]
    fn test_keys_ignored_until_ready() {
        let mut sim = Simulation::with_seed(Config::default(), 3);
        sim.key_down(ControlKey::Forward);
        assert!(!sim.wheel(1.0));
        sim.pointer_moved(Vec2::new(0.0, 0.0));
        assert_eq!(sim.input().pointer(), Vec2::ZERO);
        assert!(!sim.color_trigger_released());
        assert!(sim.tank_materials().is_empty());

        let position = sim.tank_position();
        sim.tick(DT, &FakeProbe::with_proxy_hit(5.0, 5.0));
        assert_eq!(sim.readiness(), Readiness::Pending);
        assert_eq!(sim.tank_position(), position);
        assert_eq!(sim.turret_rotation(), Quat::IDENTITY);
    }

    #[test]
    fn test_wheel_without_vertical_delta_raises() {
        let mut sim = ready_sim();
        let before = sim.barrel().projected();
        assert!(sim.wheel(0.0));
        assert!(sim.barrel().projected() > before);
    }

    #[test]
    fn test_failed_load_keeps_cameras() {
        let mut sim = Simulation::with_seed(Config::default(), 3);
        sim.model_failed();
        sim.model_loaded(RigRest::default(), 2);
        assert_eq!(sim.readiness(), Readiness::Failed);
        assert!(!sim.color_trigger_released());

        assert_eq!(sim.digit_released(3), Some(CameraView::Rear));
        let report = sim.tick(DT, &FakeProbe::default());
        assert_eq!(report.camera, CameraView::Rear);
    }

    #[test]
    fn test_camera_switch_persists() {
        let mut sim = ready_sim();
        sim.digit_released(2);
        for _ in 0..3 {
            assert_eq!(sim.tick(DT, &FakeProbe::default()).camera, CameraView::Tank);
        }
        assert_eq!(sim.digit_released(9), None);
        assert_eq!(sim.tick(DT, &FakeProbe::default()).camera, CameraView::Tank);
    }

    #[test]
    fn test_turret_aims_at_proxy_hit() {
        let mut sim = ready_sim();
        let report = sim.tick(DT, &FakeProbe::with_proxy_hit(6.0, -6.0));
        assert!(report.turret_aimed);

        let forward = sim.turret_rotation() * Vec3::Z;
        let expected = Vec3::new(6.0, 0.0, -6.0).normalize();
        assert!((forward - expected).length() < EPS);
    }

    #[test]
    fn test_turret_ignores_dead_zone() {
        let mut sim = ready_sim();
        let report = sim.tick(DT, &FakeProbe::with_proxy_hit(0.5, 8.0));
        assert!(!report.turret_aimed);
        assert_eq!(sim.turret_rotation(), Quat::IDENTITY);
    }

    #[test]
    fn test_turret_ignores_non_proxy() {
        let mut sim = ready_sim();
        let mut probe = FakeProbe::with_proxy_hit(6.0, 6.0);
        probe.hits[0].target = HitTarget::Other;
        assert!(!sim.tick(DT, &probe).turret_aimed);
    }

    #[test]
    fn test_barrel_held_at_max() {
        let mut sim = Simulation::with_seed(Config::default(), 3);
        sim.model_loaded(
            RigRest {
                turret: Quat::IDENTITY,
                barrel_pitch: 0.3,
            },
            1,
        );
        sim.key_down(ControlKey::TurretUp);
        for _ in 0..10 {
            sim.tick(DT, &FakeProbe::default());
            assert_eq!(sim.barrel_pitch(), 0.3);
            assert!(!sim.barrel().is_animating());
        }
    }

    #[test]
    fn test_barrel_rest_pitch_clamped() {
        let mut sim = Simulation::with_seed(Config::default(), 3);
        sim.model_loaded(
            RigRest {
                turret: Quat::IDENTITY,
                barrel_pitch: 1.2,
            },
            0,
        );
        assert_eq!(sim.barrel_pitch(), 0.3);
    }

    #[test]
    fn test_tank_colors_only_on_trigger() {
        let mut sim = ready_sim();
        let probe = FakeProbe::default();
        for _ in 0..300 {
            sim.tick(DT, &probe);
        }
        assert!(sim.tank_materials().iter().all(|m| m.rgb() == [1.0, 1.0, 1.0]));

        assert!(sim.color_trigger_released());
        for _ in 0..30 {
            sim.tick(DT, &probe);
        }
        assert!(sim.tank_materials().iter().any(|m| m.rgb() != [1.0, 1.0, 1.0]));
    }

    #[test]
    fn test_decorations_retarget_within_window() {
        let mut sim = ready_sim();
        let probe = FakeProbe::default();
        let mut retargets = 0;
        for _ in 0..(60 * 4 + 5) {
            if sim.tick(DT, &probe).colors_retargeted {
                retargets += 1;
            }
        }
        assert_eq!(retargets, 1);
    }

    #[test]
    fn test_spin_advances_per_frame() {
        let mut sim = ready_sim();
        for _ in 0..10 {
            sim.tick(0.5, &FakeProbe::default());
        }
        assert!((sim.decorations()[1].spin - 0.1).abs() < EPS);
    }

    #[test]
    fn test_pointer_uses_current_viewport() {
        let mut sim = ready_sim();
        sim.resize(Vec2::new(200.0, 100.0));
        sim.pointer_moved(Vec2::new(150.0, 25.0));
        assert_eq!(sim.input().pointer(), Vec2::new(0.5, 0.5));
        // Play area is fixed at construction
        assert!((sim.play_area().width - 1280.0 / 16.5).abs() < EPS);
    }
}
