//! Tread Core - Engine-independent tank demo simulation
//!
//! This crate holds everything the demo does per frame, without any
//! rendering engine:
//! - Held-key and pointer input state
//! - Tank movement inside a viewport-derived play area
//! - Pointer-driven turret aiming and barrel elevation
//! - Camera selection and cosmetic color animation
//! - Eased, stackable transitions
//! - TOML configuration

pub mod arena;
pub mod barrel;
pub mod camera;
pub mod config;
pub mod cosmetic;
pub mod input;
pub mod sim;
pub mod tank;
pub mod turret;
pub mod tween;

pub use arena::PlayArea;
pub use camera::{CameraSelector, CameraView};
pub use config::{Config, ConfigError, load_config, save_default_config};
pub use cosmetic::{Decoration, DecorationKind};
pub use input::{ControlKey, InputState};
pub use sim::{FrameReport, Readiness, RigRest, SceneProbe, Simulation};
pub use turret::{DeadZoneRule, HitTarget, RayHit, TurretFrame};
pub use tween::{Ease, Tweened, TweenedColor};
