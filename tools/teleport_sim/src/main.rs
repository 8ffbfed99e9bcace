use std::path::PathBuf;

use anyhow::Result;
use cgmath::{Vector2, Vector3};
use clap::{Parser, Subcommand, ValueEnum};
use engine::logging::{Level, LogConfig};
use tracing::info;

mod commands;

#[derive(Parser)]
#[command(name = "teleport_sim")]
#[command(about = "Probe and simulate teleport navigation on a JSON scene")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (also turns on the navigation debug flag)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a single ray and print the landing, if any
    Probe {
        /// Scene description (JSON)
        scene: PathBuf,

        /// Navigation config (TOML); defaults apply when omitted
        #[arg(long)]
        config: Option<PathBuf>,

        /// Ray origin as x,y,z
        #[arg(long, allow_hyphen_values = true, value_parser = parse_vec3)]
        origin: Vector3<f32>,

        /// Ray direction as x,y,z
        #[arg(long, allow_hyphen_values = true, value_parser = parse_vec3, default_value = "0,-1,0")]
        direction: Vector3<f32>,

        /// Skip the occlusion pass and test only navmesh surfaces
        #[arg(long)]
        collidable_only: bool,
    },
    /// Confirm one teleport and run frames until the rig arrives
    Simulate {
        /// Scene description (JSON)
        scene: PathBuf,

        /// Navigation config (TOML); defaults apply when omitted
        #[arg(long)]
        config: Option<PathBuf>,

        /// How the teleport is confirmed
        #[arg(long, value_enum, default_value_t = InputKind::Mouse)]
        input: InputKind,

        /// Pointer position in pixels as x,y (mouse input)
        #[arg(long, value_parser = parse_vec2)]
        pointer: Option<Vector2<f32>>,

        /// Ray origin as x,y,z (cursor and hand input)
        #[arg(long, allow_hyphen_values = true, value_parser = parse_vec3)]
        origin: Option<Vector3<f32>>,

        /// Ray direction as x,y,z (cursor and hand input)
        #[arg(long, allow_hyphen_values = true, value_parser = parse_vec3, default_value = "0,-1,0")]
        direction: Vector3<f32>,

        /// Viewport size in pixels as width,height
        #[arg(long, value_parser = parse_vec2, default_value = "1280,720")]
        viewport: Vector2<f32>,

        /// Frame length in milliseconds
        #[arg(long, default_value_t = 11)]
        frame_ms: u64,

        /// Give up after this many frames
        #[arg(long, default_value_t = 1000)]
        max_frames: usize,

        /// Saved positions file
        #[arg(long, default_value = "teleport_positions.json")]
        store: PathBuf,

        /// Place the rig at this saved position before simulating
        #[arg(long)]
        restore: Option<String>,

        /// Save the final rig pose under this name
        #[arg(long)]
        save: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum InputKind {
    /// Desktop click at --pointer
    Mouse,
    /// Gaze cursor click along --origin/--direction
    Cursor,
    /// Right controller trigger held and released along --origin/--direction
    Hand,
}

fn parse_floats<const N: usize>(value: &str) -> Result<[f32; N], String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    if parts.len() != N {
        return Err(format!("expected {N} comma separated numbers, got '{value}'"));
    }
    let mut out = [0.0; N];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part
            .parse()
            .map_err(|_| format!("'{part}' is not a number"))?;
    }
    Ok(out)
}

fn parse_vec3(value: &str) -> Result<Vector3<f32>, String> {
    parse_floats::<3>(value).map(Vector3::from)
}

fn parse_vec2(value: &str) -> Result<Vector2<f32>, String> {
    parse_floats::<2>(value).map(Vector2::from)
}

fn init_logging(verbose: bool) {
    let mut config = LogConfig::from_env("TELEPORT_LOG");
    if verbose {
        config.set_default_level(Level::DEBUG);
    } else if config == LogConfig::default() {
        config.set_default_level(Level::INFO);
    }
    engine::logging::init_with_config(config);
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    info!("Starting teleport_sim");

    match cli.command {
        Commands::Probe {
            scene,
            config,
            origin,
            direction,
            collidable_only,
        } => {
            commands::probe(&scene, config.as_deref(), origin, direction, collidable_only, cli.verbose)?;
        }
        Commands::Simulate {
            scene,
            config,
            input,
            pointer,
            origin,
            direction,
            viewport,
            frame_ms,
            max_frames,
            store,
            restore,
            save,
        } => {
            let options = commands::SimulateOptions {
                input,
                pointer,
                origin,
                direction,
                viewport,
                frame_ms,
                max_frames,
                store,
                restore,
                save,
                verbose: cli.verbose,
            };
            commands::simulate(&scene, config.as_deref(), &options)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vectors() {
        assert_eq!(parse_vec3("1, -2.5,3"), Ok(Vector3::new(1.0, -2.5, 3.0)));
        assert_eq!(parse_vec2("1280,720"), Ok(Vector2::new(1280.0, 720.0)));
        assert!(parse_vec3("1,2").is_err());
        assert!(parse_vec2("a,b").is_err());
    }
}
