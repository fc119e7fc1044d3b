//! Tread - Main entry point
//!
//! Drive a tank around a small arena, aim its turret with the mouse and
//! flip between four cameras.

use anyhow::Result;
use bevy::asset::AssetMetaCheck;
use bevy::prelude::*;
use bevy::window::WindowResolution;
use bevy::winit::WinitSettings;
use bevy_egui::EguiPlugin;
use bevy_picking::{DefaultPickingPlugins, prelude::MeshPickingPlugin};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use tread_core::{load_config, save_default_config, CameraView};
use tread_scene::TreadScenePlugin;

#[derive(Parser, Debug)]
#[command(name = "tread")]
#[command(about = "Drive a tank, aim its turret, switch cameras")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "tread.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Asset directory (overrides the config file)
    #[arg(short, long)]
    assets: Option<String>,

    /// Camera to start with: default, tank, rear or barrel
    #[arg(long)]
    camera: Option<String>,

    /// Write the default configuration to --config and exit
    #[arg(long)]
    write_default_config: bool,
}

fn parse_level(name: &str) -> Level {
    match name.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; render backends stay quiet unless RUST_LOG asks
    let level = parse_level(&args.log_level);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{level},wgpu=error,naga=warn")));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Tread v{}", env!("CARGO_PKG_VERSION"));

    if args.write_default_config {
        save_default_config(&args.config)?;
        println!("Wrote default configuration to {}", args.config.display());
        return Ok(());
    }

    // Load configuration
    let mut config = load_config(&args.config)?;

    if let Some(assets) = args.assets {
        config.assets.root = assets;
    }
    if let Some(camera) = args.camera {
        config.camera.initial = camera;
    }

    info!(
        assets = %config.assets.root,
        model = %config.assets.tank_model,
        camera = %CameraView::from_name(&config.camera.initial),
        "Configuration loaded"
    );

    let mut resolution = WindowResolution::default();
    resolution.set(config.window.width, config.window.height);

    let exit = App::new()
        .insert_resource(WinitSettings::default())
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: config.window.title.clone(),
                        resolution,
                        ..default()
                    }),
                    ..default()
                })
                .set(AssetPlugin {
                    file_path: config.assets.root.clone(),
                    meta_check: AssetMetaCheck::Never,
                    ..default()
                }),
        )
        // Picking plugins are needed for bevy_egui to detect pointer over UI
        .add_plugins(DefaultPickingPlugins)
        .add_plugins(MeshPickingPlugin)
        .add_plugins(EguiPlugin::default())
        .add_plugins(TreadScenePlugin::new(config))
        .run();

    if let AppExit::Error(code) = exit {
        anyhow::bail!("Tread exited with error code {}", code);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Level::DEBUG);
        assert_eq!(parse_level("WARN"), Level::WARN);
        assert_eq!(parse_level("verbose"), Level::INFO);
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["tread"]).unwrap();
        assert_eq!(args.config, PathBuf::from("tread.toml"));
        assert_eq!(args.log_level, "info");
        assert!(args.assets.is_none());
        assert!(!args.write_default_config);
    }

    #[test]
    fn test_args_overrides() {
        let args = Args::try_parse_from([
            "tread",
            "--config",
            "arena.toml",
            "--camera",
            "barrel",
            "--assets",
            "/srv/tread",
        ])
        .unwrap();
        assert_eq!(args.config, PathBuf::from("arena.toml"));
        assert_eq!(args.camera.as_deref(), Some("barrel"));
        assert_eq!(args.assets.as_deref(), Some("/srv/tread"));
    }
}
