//! # Cinder Headless Host
//!
//! Drives a [`ParticleEngine`] from a frame clock and reads its columns the
//! way a renderer would, without opening a window.
//!
//! ## Usage
//!
//! ```bash
//! cinder_headless --frames 600 --dt 0.016 --spawners 100000 --strategy swap
//! RUST_LOG=cinder_core=debug cinder_headless --config particles.toml
//! ```

mod clock;
mod probe;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use cinder_core::{EngineConfig, ParticleEngine, RemovalStrategy};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use clock::FrameClock;
use probe::{FrameProbe, StatsWindow};

/// Command line options.
#[derive(Debug, Default)]
struct Options {
    config: Option<PathBuf>,
    frames: Option<u64>,
    fixed_dt: Option<f32>,
    spawners: Option<usize>,
    strategy: Option<RemovalStrategy>,
}

enum Command {
    Run(Options),
    Help,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let options = match parse_args(std::env::args().skip(1)) {
        Command::Run(options) => options,
        Command::Help => {
            print_help();
            return ExitCode::SUCCESS;
        }
    };

    let config = match build_config(&options) {
        Ok(config) => config,
        Err(err) => {
            error!(%err, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let mut engine = match ParticleEngine::new(&config) {
        Ok(engine) => engine,
        Err(err) => {
            error!(%err, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let mut clock = options.fixed_dt.map_or_else(FrameClock::wall, FrameClock::fixed);
    let mut stats = StatsWindow::new(1.0);
    let mut probe = FrameProbe::default();
    let started = Instant::now();

    info!(
        spawners = config.spawner_count,
        strategy = ?config.removal,
        frames = ?options.frames,
        fixed_dt = ?options.fixed_dt,
        "simulation starting"
    );

    let mut frame = 0u64;
    while options.frames.map_or(true, |limit| frame < limit) {
        let dt = clock.delta();
        let report = match engine.tick(dt) {
            Ok(report) => report,
            Err(err) => {
                warn!(%err, frame, "frame skipped");
                frame += 1;
                continue;
            }
        };
        probe.observe(&engine);

        if let Some(line) = stats.record(dt, &report) {
            info!(
                "Alive: {} Dead: {} dt: {:.2} ms log alive(10): {:.1}",
                line.alive,
                line.dead,
                line.mean_dt_ms,
                line.log_alive
            );
        }
        frame += 1;
    }

    info!(
        frames = frame,
        wall_secs = started.elapsed().as_secs_f64(),
        alive = engine.alive_count(),
        dead = engine.dead_count(),
        peak_alive = probe.peak_alive(),
        peak_dead = probe.peak_dead(),
        last_alpha = probe.last_alpha(),
        "simulation finished"
    );
    ExitCode::SUCCESS
}

fn build_config(options: &Options) -> cinder_core::ConfigResult<EngineConfig> {
    let mut config = match &options.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(count) = options.spawners {
        config.spawner_count = count;
    }
    if let Some(strategy) = options.strategy {
        config.removal = strategy;
    }
    Ok(config)
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Command {
    let mut options = Options::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => options.config = args.next().map(PathBuf::from),
            "--frames" | "-f" => options.frames = parse_value(&arg, args.next()),
            "--dt" => {
                options.fixed_dt = parse_value::<f32>(&arg, args.next())
                    .filter(|dt| dt.is_finite() && *dt >= 0.0);
            }
            "--spawners" | "-s" => options.spawners = parse_value(&arg, args.next()),
            "--strategy" => {
                options.strategy = match args.next().as_deref() {
                    Some("count") => Some(RemovalStrategy::CountThenCompact),
                    Some("swap") => Some(RemovalStrategy::SwapRemove),
                    other => {
                        warn!(value = ?other, "unknown strategy, keeping configured one");
                        None
                    }
                };
            }
            "--help" | "-h" => return Command::Help,
            other => warn!(arg = other, "ignoring unknown argument"),
        }
    }
    Command::Run(options)
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: Option<String>) -> Option<T> {
    let parsed = value.as_deref().and_then(|v| v.parse().ok());
    if parsed.is_none() {
        warn!(flag, value = ?value, "ignoring unparsable value");
    }
    parsed
}

fn print_help() {
    println!("Usage: cinder_headless [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -c, --config <PATH>        TOML engine configuration");
    println!("  -f, --frames <N>           Stop after N frames (default: run forever)");
    println!("      --dt <SECONDS>         Fixed frame step instead of the wall clock");
    println!("  -s, --spawners <N>         Override the spawner count");
    println!("      --strategy <count|swap> Removal strategy");
    println!("  -h, --help                 Show this help");
}
