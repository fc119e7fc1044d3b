//! Configuration loading and validation

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::turret::DeadZoneRule;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize configuration: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
    #[serde(default)]
    pub tank: TankConfig,
    #[serde(default)]
    pub turret: TurretConfig,
    #[serde(default)]
    pub barrel: BarrelConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub cosmetics: CosmeticsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Initial window width in logical pixels (also the play-area basis)
    #[serde(default = "default_width")]
    pub width: f32,
    /// Initial window height in logical pixels (also the play-area basis)
    #[serde(default = "default_height")]
    pub height: f32,
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            title: default_title(),
        }
    }
}

fn default_width() -> f32 {
    1280.0
}

fn default_height() -> f32 {
    720.0
}

fn default_title() -> String {
    "Tread".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// Asset directory handed to the asset server
    #[serde(default = "default_assets_root")]
    pub root: String,
    /// Tank model path, relative to the asset root
    #[serde(default = "default_tank_model")]
    pub tank_model: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            root: default_assets_root(),
            tank_model: default_tank_model(),
        }
    }
}

fn default_assets_root() -> String {
    "assets".to_string()
}

fn default_tank_model() -> String {
    "tank.gltf".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TankConfig {
    /// Step applied while outside the interior zone
    #[serde(default = "default_fast_step")]
    pub fast_step: f32,
    /// Step applied inside the interior zone
    #[serde(default = "default_slow_step")]
    pub slow_step: f32,
    /// Yaw change per rotation transition (radians)
    #[serde(default = "default_rotation_step")]
    pub rotation_step: f32,
    /// Duration of each rotation transition (seconds)
    #[serde(default = "default_rotation_duration")]
    pub rotation_duration: f32,
    /// Play-area extent = viewport pixels / this
    #[serde(default = "default_extent_divisor")]
    pub extent_divisor: f32,
    /// Interior threshold = extent / this
    #[serde(default = "default_interior_divisor")]
    pub interior_divisor: f32,
    /// Height of the tank root above the ground
    #[serde(default = "default_spawn_height")]
    pub spawn_height: f32,
}

impl Default for TankConfig {
    fn default() -> Self {
        Self {
            fast_step: default_fast_step(),
            slow_step: default_slow_step(),
            rotation_step: default_rotation_step(),
            rotation_duration: default_rotation_duration(),
            extent_divisor: default_extent_divisor(),
            interior_divisor: default_interior_divisor(),
            spawn_height: default_spawn_height(),
        }
    }
}

fn default_fast_step() -> f32 {
    2.5
}

fn default_slow_step() -> f32 {
    0.15
}

fn default_rotation_step() -> f32 {
    0.1
}

fn default_rotation_duration() -> f32 {
    0.3
}

fn default_extent_divisor() -> f32 {
    16.5
}

fn default_interior_divisor() -> f32 {
    2.25
}

fn default_spawn_height() -> f32 {
    0.1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurretConfig {
    #[serde(default)]
    pub dead_zone: DeadZoneRule,
    /// World height of the look-at target
    #[serde(default = "default_aim_height")]
    pub aim_height: f32,
    /// Manual turret rotation per frame (degrees)
    #[serde(default = "default_manual_degrees")]
    pub manual_degrees: f32,
    /// Radius of the hidden aiming disc around the tank
    #[serde(default = "default_proxy_radius")]
    pub proxy_radius: f32,
    /// Child-index path from the model root to the turret node
    #[serde(default = "default_turret_path")]
    pub turret_path: Vec<usize>,
    /// Child-index path from the model root to the barrel node
    #[serde(default = "default_barrel_path")]
    pub barrel_path: Vec<usize>,
}

impl Default for TurretConfig {
    fn default() -> Self {
        Self {
            dead_zone: DeadZoneRule::default(),
            aim_height: default_aim_height(),
            manual_degrees: default_manual_degrees(),
            proxy_radius: default_proxy_radius(),
            turret_path: default_turret_path(),
            barrel_path: default_barrel_path(),
        }
    }
}

fn default_aim_height() -> f32 {
    3.0
}

fn default_manual_degrees() -> f32 {
    2.5
}

fn default_proxy_radius() -> f32 {
    12.5
}

fn default_turret_path() -> Vec<usize> {
    vec![0, 2]
}

fn default_barrel_path() -> Vec<usize> {
    vec![0, 2, 0]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarrelConfig {
    #[serde(default = "default_min_elevation")]
    pub min_elevation: f32,
    #[serde(default = "default_max_elevation")]
    pub max_elevation: f32,
    /// Elevation change per nudge (radians)
    #[serde(default = "default_elevation_step")]
    pub step: f32,
    /// Duration of a wheel nudge (seconds)
    #[serde(default = "default_wheel_duration")]
    pub wheel_duration: f32,
    /// Duration of a held-key nudge (seconds)
    #[serde(default = "default_key_duration")]
    pub key_duration: f32,
}

impl Default for BarrelConfig {
    fn default() -> Self {
        Self {
            min_elevation: default_min_elevation(),
            max_elevation: default_max_elevation(),
            step: default_elevation_step(),
            wheel_duration: default_wheel_duration(),
            key_duration: default_key_duration(),
        }
    }
}

fn default_min_elevation() -> f32 {
    -0.125
}

fn default_max_elevation() -> f32 {
    0.3
}

fn default_elevation_step() -> f32 {
    0.033
}

fn default_wheel_duration() -> f32 {
    1.0
}

fn default_key_duration() -> f32 {
    0.3
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Camera shown at startup (default, tank, rear, barrel)
    #[serde(default = "default_initial_camera")]
    pub initial: String,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            initial: default_initial_camera(),
        }
    }
}

fn default_initial_camera() -> String {
    "default".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CosmeticsConfig {
    /// Decorative color retarget period (seconds)
    #[serde(default = "default_color_period")]
    pub color_period: f32,
    #[serde(default = "default_decoration_duration")]
    pub decoration_duration: f32,
    #[serde(default = "default_tank_color_duration")]
    pub tank_color_duration: f32,
    /// Cylinder spin per frame (radians)
    #[serde(default = "default_spin_step")]
    pub spin_step: f32,
}

impl Default for CosmeticsConfig {
    fn default() -> Self {
        Self {
            color_period: default_color_period(),
            decoration_duration: default_decoration_duration(),
            tank_color_duration: default_tank_color_duration(),
            spin_step: default_spin_step(),
        }
    }
}

fn default_color_period() -> f32 {
    4.0
}

fn default_decoration_duration() -> f32 {
    1.0
}

fn default_tank_color_duration() -> f32 {
    0.3
}

fn default_spin_step() -> f32 {
    0.01
}

impl Config {
    /// Parse a configuration from a TOML string and validate it
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the simulation relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !positive(self.window.width) || !positive(self.window.height) {
            return Err(ConfigError::Invalid(format!(
                "window size must be positive, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        if !positive(self.tank.extent_divisor) || !positive(self.tank.interior_divisor) {
            return Err(ConfigError::Invalid(
                "play-area divisors must be positive".to_string(),
            ));
        }
        if !self.barrel.min_elevation.is_finite()
            || !self.barrel.max_elevation.is_finite()
            || self.barrel.min_elevation > self.barrel.max_elevation
        {
            return Err(ConfigError::Invalid(format!(
                "barrel elevation range is invalid: [{}, {}]",
                self.barrel.min_elevation, self.barrel.max_elevation
            )));
        }
        if !positive(self.cosmetics.color_period) {
            return Err(ConfigError::Invalid(
                "cosmetics.color_period must be positive".to_string(),
            ));
        }
        if self.turret.turret_path.is_empty() || self.turret.barrel_path.is_empty() {
            return Err(ConfigError::Invalid(
                "turret and barrel paths must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Finite and strictly positive; rejects NaN and infinities
fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

/// Load configuration from file, falling back to defaults when it is missing
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config = Config::from_toml(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}

/// Save default configuration to file
pub fn save_default_config(path: &Path) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(&Config::default())?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_demo_tuning() {
        let config = Config::default();
        assert_eq!(config.tank.fast_step, 2.5);
        assert_eq!(config.tank.slow_step, 0.15);
        assert_eq!(config.barrel.min_elevation, -0.125);
        assert_eq!(config.barrel.max_elevation, 0.3);
        assert_eq!(config.cosmetics.color_period, 4.0);
        assert_eq!(config.turret.barrel_path, vec![0, 2, 0]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let toml = r#"
[window]
width = 1920.0

[turret]
dead_zone = "legacy"

[camera]
initial = "rear"
"#;
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.window.width, 1920.0);
        assert_eq!(config.window.height, 720.0);
        assert_eq!(config.turret.dead_zone, DeadZoneRule::Legacy);
        assert_eq!(config.camera.initial, "rear");
        assert_eq!(config.tank.fast_step, 2.5);
    }

    #[test]
    fn test_rejects_inverted_elevation() {
        let toml = r#"
[barrel]
min_elevation = 0.5
max_elevation = 0.1
"#;
        let err = Config::from_toml(toml).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_non_finite_sizes() {
        for toml in [
            "[window]\nwidth = nan\n",
            "[window]\nheight = inf\n",
            "[tank]\nextent_divisor = nan\n",
            "[tank]\ninterior_divisor = -inf\n",
            "[cosmetics]\ncolor_period = inf\n",
            "[barrel]\nmax_elevation = nan\n",
        ] {
            let err = Config::from_toml(toml).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "accepted {toml:?}");
        }
    }

    #[test]
    fn test_rejects_bad_toml() {
        let err = Config::from_toml("[window\nwidth = ").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_save_and_load_default() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tread.toml");

        save_default_config(&path).unwrap();
        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let loaded = load_config(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, Config::default());
    }
}
