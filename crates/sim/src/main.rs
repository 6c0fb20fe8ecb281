//! gametimer sim - Headless frame loop
//!
//! Runs a fixed number of frames at a fixed tick rate against a
//! `TimerRegistry`, logging every timer that fires.

mod config;
mod sim;

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use gametimer_core::OverrunPolicy;
use tracing_subscriber::EnvFilter;

use config::SimConfig;
use sim::SimError;

#[derive(Parser)]
#[command(version, about = "Drive a timer registry with a fixed-step frame loop")]
struct Cli {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of frames to simulate
    #[arg(short, long)]
    frames: Option<u64>,

    /// Frames per second of virtual time
    #[arg(short, long)]
    tick_rate: Option<u32>,

    /// How repeating timers handle frames longer than their period
    #[arg(long, value_enum)]
    overrun: Option<Overrun>,
}

/// Same spelling as `overrun` in the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
enum Overrun {
    Carry,
    Skip,
    CatchUp,
}

impl From<Overrun> for OverrunPolicy {
    fn from(value: Overrun) -> Self {
        match value {
            Overrun::Carry => OverrunPolicy::Carry,
            Overrun::Skip => OverrunPolicy::Skip,
            Overrun::CatchUp => OverrunPolicy::CatchUp,
        }
    }
}

fn main() -> Result<(), SimError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = SimConfig::load(cli.config.as_deref())?;
    if let Some(frames) = cli.frames {
        config.frames = frames;
    }
    if let Some(tick_rate) = cli.tick_rate {
        config.tick_rate = tick_rate;
    }
    if let Some(overrun) = cli.overrun {
        config.timers.overrun = overrun.into();
    }

    tracing::info!(
        "Simulating {} frames at {} Hz ({:?} overrun)",
        config.frames,
        config.tick_rate,
        config.timers.overrun
    );

    let summary = sim::run(&config)?;

    tracing::info!(
        "Done: {} frames, {:?} virtual time, {} fires ({} announcements, {} heartbeats), {} timers live",
        summary.frames,
        summary.virtual_time,
        summary.fires,
        summary.announcements,
        summary.heartbeats,
        summary.live_timers
    );
    Ok(())
}
