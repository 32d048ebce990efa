#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays an Olive Grove session headlessly.

mod autopilot;
mod headless;

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use olive_grove_core::{Event, SessionConfig};
use olive_grove_rendering::{Color, Presentation, RenderingBackend, Scene};
use olive_grove_session::Session;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::{autopilot::Autopilot, headless::HeadlessBackend};

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "olive-grove")]
#[command(
    author,
    version,
    about = "Plays an Olive Grove session with a scripted gardener",
    long_about = None
)]
struct Args {
    /// TOML file with session parameters; missing keys use defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed overriding the configured one.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Session length in seconds, overriding the configured one.
    #[arg(long)]
    seconds: Option<u64>,
}

/// Entry point for the Olive Grove command-line interface.
fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();
    let config = load_config(&args)?;

    let mut session = Session::new(config.clone()).context("invalid session configuration")?;
    let scene = Scene::from_snapshot(&session.snapshot(), &config)
        .context("failed to build the initial scene")?;
    let presentation = Presentation::new("Olive Grove", Color::from_rgb_u8(86, 140, 60), scene);
    let backend = HeadlessBackend::new(Autopilot::new(), &config);

    backend.run(presentation, move |dt, input, scene| {
        for event in session.step(&input, dt) {
            match event {
                Event::TimeAdvanced { .. } => {}
                other => debug!(event = ?other, "world event"),
            }
        }
        match Scene::from_snapshot(&session.snapshot(), session.config()) {
            Ok(next) => *scene = next,
            Err(error) => warn!(%error, "scene refresh failed"),
        }
    })
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(args: &Args) -> Result<SessionConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            toml::from_str(&text)
                .with_context(|| format!("failed to parse config file {}", path.display()))?
        }
        None => SessionConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(seconds) = args.seconds {
        config.session_duration_ms = seconds.saturating_mul(1_000);
    }
    info!(seed = config.seed, duration_ms = config.session_duration_ms, "configuration loaded");
    Ok(config)
}
