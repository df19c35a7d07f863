//! Headless driver for the boids simulation.
//!
//! Runs the same engine the browser build uses, without a window: useful for tuning
//! parameters, reproducing a seed, or rendering a clip.
//!
//! # Examples
//!
//! ```bash
//! # 600 steps on a 640x480 field, stats every 60 steps, final frame as PNG
//! boids-cli run --width 640 --height 480 --steps 600 --report-every 60 --png flock.png
//!
//! # Tune from a JSON file, then override a single value
//! boids-cli run --config tuned.json --set alignment_bias=3 --gif flock.gif --gif-every 2
//!
//! # Print the effective parameters
//! boids-cli params --config tuned.json --bounce
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use boids_core::prelude::*;
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod export;

use config::Overrides;
use export::GifRecorder;

#[derive(Parser, Debug)]
#[command(name = "boids-cli")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Simulate a flock for a number of steps.
    Run(RunArgs),

    /// Print the effective parameters as JSON.
    Params(ParamArgs),
}

/// Flags that shape the parameters. Shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct ParamArgs {
    /// JSON parameter file; missing fields keep their defaults
    #[arg(long, env = "BOIDS_CONFIG")]
    config: Option<PathBuf>,

    /// Field width in world units (one pixel each)
    #[arg(long)]
    width: Option<u32>,

    /// Field height in world units
    #[arg(long)]
    height: Option<u32>,

    /// Number of boids
    #[arg(long)]
    boids: Option<usize>,

    /// Bounce off the edges instead of wrapping around
    #[arg(long)]
    bounce: bool,

    /// Override any parameter, e.g. `--set cohesion_force=3` (repeatable, applied last)
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = config::parse_assignment)]
    sets: Vec<(ParamKey, f32)>,
}

impl ParamArgs {
    fn resolve(&self) -> Result<Parameters> {
        let overrides = Overrides {
            width: self.width,
            height: self.height,
            boids: self.boids,
            bounce: self.bounce,
        };
        config::resolve(self.config.as_deref(), &overrides, &self.sets)
    }
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    params: ParamArgs,

    /// Number of steps to simulate
    #[arg(long, default_value_t = 600)]
    steps: u32,

    /// Seconds per step
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// RNG seed; the same seed and parameters replay identically
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Write the final frame to this PNG file
    #[arg(long)]
    png: Option<PathBuf>,

    /// Record an animated GIF to this file
    #[arg(long)]
    gif: Option<PathBuf>,

    /// Record one GIF frame every N steps
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u32).range(1..))]
    gif_every: u32,

    /// Log flock statistics every N steps (0 disables)
    #[arg(long, default_value_t = 0)]
    report_every: u32,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Commands::Run(args) => run(&args),
        Commands::Params(args) => print_params(&args),
    }
}

/// Sets up tracing on stderr; stdout is kept for JSON output.
fn init_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .context("failed to initialize logging")?;

    Ok(())
}

fn print_params(args: &ParamArgs) -> Result<()> {
    let params = args.resolve()?;
    println!("{}", serde_json::to_string_pretty(&params)?);
    Ok(())
}

/// Largest canvas side we render, in pixels.
const MAX_CANVAS_SIDE: u32 = 8192;

/// Framebuffer size for a field, at least one pixel per side.
fn canvas_size(params: &Parameters) -> Result<(u32, u32)> {
    let side = |name: &str, v: f32| -> Result<u32> {
        let px = v.ceil().max(1.0);
        anyhow::ensure!(
            px <= MAX_CANVAS_SIDE as f32,
            "{name} {v} exceeds the {MAX_CANVAS_SIDE} px canvas limit"
        );
        Ok(px as u32)
    };
    Ok((
        side("width", params.window_width)?,
        side("height", params.window_height)?,
    ))
}

fn run(args: &RunArgs) -> Result<()> {
    anyhow::ensure!(
        args.dt.is_finite() && args.dt > 0.0,
        "--dt must be a positive number of seconds, got {}",
        args.dt
    );

    let params = args.params.resolve()?;
    debug!(?params, "effective parameters");

    let (width, height) = canvas_size(&params)?;
    let mut flock = Flock::new(params, args.seed).context("failed to spawn flock")?;
    let mut fb = Framebuffer::new(width, height);

    let mut gif = match &args.gif {
        Some(path) => Some(GifRecorder::create(
            path,
            width,
            height,
            export::gif_delay(args.dt, args.gif_every),
        )?),
        None => None,
    };

    info!(
        boids = flock.len(),
        width,
        height,
        steps = args.steps,
        seed = args.seed,
        "starting simulation"
    );

    for step in 1..=args.steps {
        flock.step(args.dt, None)?;

        if args.report_every > 0 && step % args.report_every == 0 {
            let stats = flock.stats();
            info!(
                step,
                mean_speed = stats.mean_speed,
                polarization = stats.polarization,
                centroid_x = stats.centroid.x,
                centroid_y = stats.centroid.y,
                "flock"
            );
        }

        if let Some(gif) = gif.as_mut() {
            if step % args.gif_every == 0 {
                draw_flock(&flock, &mut fb);
                gif.push(&fb)?;
            }
        }
    }

    if let Some(gif) = gif {
        let frames = gif.finish()?;
        if let Some(path) = &args.gif {
            info!(frames, path = %path.display(), "wrote gif");
        }
    }

    if let Some(path) = &args.png {
        draw_flock(&flock, &mut fb);
        export::write_png(path, &fb)?;
        info!(path = %path.display(), "wrote png");
    }

    println!("{}", serde_json::to_string_pretty(&flock.stats())?);
    Ok(())
}
