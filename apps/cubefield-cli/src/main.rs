use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, Subcommand};
use cubefield_input::{KeyEvent, KeyEventKind};
use cubefield_render_wgpu::{ProgramSource, shaders};
use cubefield_scene::{
    DIR_TO_LIGHT, FIXED_PROJECTION, FrameState, FrameTransforms, GridLayout, RotationRates,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cubefield-cli", about = "Headless tools for the cube field")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the fixed render constants
    Info,
    /// Compile and link the shader program without a GPU
    CheckShaders {
        /// WGSL vertex stage to check instead of the built-in one
        #[arg(long)]
        vertex: Option<PathBuf>,
        /// WGSL fragment stage to check instead of the built-in one
        #[arg(long)]
        fragment: Option<PathBuf>,
    },
    /// Print every cube instance translation
    Grid,
    /// Hold movement keys for a while and report where the camera ends up
    Simulate {
        /// Forward velocity: 1 holds w, -1 holds s
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        forward: i8,
        /// Side velocity: 1 holds d, -1 holds a
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        side: i8,
        /// Simulated seconds
        #[arg(long, default_value = "1.0")]
        seconds: f64,
        /// Number of frames spread over the simulated time
        #[arg(long, default_value = "60")]
        steps: u32,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("cubefield-cli v{}", env!("CARGO_PKG_VERSION"));
            let rates = RotationRates::default();
            println!("rotation rates: x={} y={} rad/s", rates.x, rates.y);
            println!("light direction: {DIR_TO_LIGHT}");
            println!("projection columns:");
            for col in FIXED_PROJECTION.to_cols_array_2d() {
                println!("  {col:?}");
            }
            println!("instances: {}", GridLayout::default().instance_count());
        }
        Commands::CheckShaders { vertex, fragment } => {
            let vertex_src = read_or(vertex.as_ref(), shaders::VERTEX_SHADER)?;
            let fragment_src = read_or(fragment.as_ref(), shaders::FRAGMENT_SHADER)?;
            ProgramSource {
                vertex: &vertex_src,
                fragment: &fragment_src,
            }
            .build()?;
            println!("shader program OK");
        }
        Commands::Grid => {
            for (i, t) in GridLayout::default().translations().iter().enumerate() {
                println!("{i:3}: ({:6.1}, {:4.1}, {:5.1})", t.x, t.y, t.z);
            }
        }
        Commands::Simulate {
            forward,
            side,
            seconds,
            steps,
        } => {
            let (frame, transforms) = run_simulation(forward, side, seconds, steps)?;

            println!(
                "camera after {seconds}s: x={:.4} z={:.4}",
                frame.camera.x, frame.camera.z
            );
            if let Some(t) = transforms {
                println!(
                    "rotation angles: x={:.4} y={:.4}",
                    t.rotation.angle_x, t.rotation.angle_y
                );
                println!("view translation: {}", t.view.w_axis.truncate());
            }
        }
    }

    Ok(())
}

fn read_or(path: Option<&PathBuf>, builtin: &str) -> anyhow::Result<String> {
    match path {
        Some(p) => std::fs::read_to_string(p).with_context(|| format!("reading {}", p.display())),
        None => Ok(builtin.to_string()),
    }
}

/// Hold the requested keys and advance `steps` evenly spaced frames over
/// `seconds` of synthetic time. Durations that do not fit in `Duration` or
/// `Instant` are rejected instead of overflowing.
fn run_simulation(
    forward: i8,
    side: i8,
    seconds: f64,
    steps: u32,
) -> anyhow::Result<(FrameState, Option<FrameTransforms>)> {
    anyhow::ensure!(steps > 0, "steps must be positive");
    anyhow::ensure!(seconds >= 0.0, "seconds must not be negative");

    let step = Duration::try_from_secs_f64(seconds / f64::from(steps)).with_context(|| {
        format!("{seconds}s over {steps} steps is not a representable frame time")
    })?;

    let t0 = Instant::now();
    let mut frame = FrameState::new(t0);
    for key in held_keys(forward, side)? {
        tracing::debug!(key, "holding key");
        frame.handle_key(&KeyEvent::character(KeyEventKind::KeyDown, key));
    }

    let mut transforms = None;
    for i in 1..=steps {
        let now = step
            .checked_mul(i)
            .and_then(|offset| t0.checked_add(offset))
            .with_context(|| format!("simulated time overflows at step {i} of {steps}"))?;
        transforms = Some(frame.advance(now));
    }
    Ok((frame, transforms))
}

/// Keys to hold for the requested velocities.
fn held_keys(forward: i8, side: i8) -> anyhow::Result<Vec<&'static str>> {
    let mut keys = Vec::new();
    match forward {
        1 => keys.push("w"),
        -1 => keys.push("s"),
        0 => {}
        v => anyhow::bail!("forward must be -1, 0 or 1, got {v}"),
    }
    match side {
        1 => keys.push("d"),
        -1 => keys.push("a"),
        0 => {}
        v => anyhow::bail!("side must be -1, 0 or 1, got {v}"),
    }
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_keys_map_velocities() {
        assert_eq!(held_keys(1, -1).unwrap(), vec!["w", "a"]);
        assert_eq!(held_keys(-1, 1).unwrap(), vec!["s", "d"]);
        assert!(held_keys(0, 0).unwrap().is_empty());
        assert!(held_keys(2, 0).is_err());
    }

    #[test]
    fn simulation_moves_camera() {
        let (frame, transforms) = run_simulation(1, 0, 1.5, 60).unwrap();
        assert!((frame.camera.x - 6.0).abs() < 1e-3);
        assert_eq!(frame.camera.z, 0.0);
        assert!(transforms.is_some());
    }

    #[test]
    fn simulation_rejects_unrepresentable_durations() {
        assert!(run_simulation(0, 0, f64::INFINITY, 60).is_err());
        assert!(run_simulation(0, 0, 1e300, 1).is_err());
        assert!(run_simulation(0, 0, f64::NAN, 1).is_err());
        assert!(run_simulation(0, 0, -1.0, 1).is_err());
        assert!(run_simulation(0, 0, 1.0, 0).is_err());
    }

    #[test]
    fn simulation_rejects_overflowing_instants() {
        // each step fits in a Duration but the later frame times do not
        assert!(run_simulation(1, 0, 1e19, 2).is_err());
    }

    #[test]
    fn cli_parses_negative_velocity() {
        let cli = Cli::try_parse_from(["cubefield-cli", "simulate", "--forward", "-1"]).unwrap();
        match cli.command {
            Commands::Simulate { forward, side, .. } => {
                assert_eq!(forward, -1);
                assert_eq!(side, 0);
            }
            _ => panic!("expected simulate"),
        }
    }
}
