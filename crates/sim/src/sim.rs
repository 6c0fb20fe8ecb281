//! Fixed-step frame loop
//!
//! Plays the part of the game: it owns the registry, registers a handful of
//! gameplay timers and calls `update` exactly once per frame with the fixed
//! frame delta. Halfway through, a level change resets level-scoped timers.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use gametimer_core::{ConfigError, TimerError, TimerFlags, TimerRegistry};

use crate::config::SimConfig;

/// Errors that stop the simulation
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Timer error: {0}")]
    Timer(#[from] TimerError),

    #[error("Tick rate must be greater than zero")]
    InvalidTickRate,
}

pub type SimResult<T> = Result<T, SimError>;

/// Messages cycled by the announcement timer
const MESSAGES: &[&str] = &[
    "Welcome! Type !help for commands.",
    "Round timers are frame-locked, pausing really pauses.",
    "Report bugs with !report <description>",
];

/// Outcome of a simulation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub frames: u64,
    pub virtual_time: Duration,
    pub fires: usize,
    pub announcements: usize,
    pub heartbeats: usize,
    pub warmup_done: bool,
    pub live_timers: usize,
}

/// Context bound to the announcement interval
struct Announcer {
    index: usize,
    sent: Arc<AtomicUsize>,
}

impl Announcer {
    fn announce(&mut self) {
        let message = MESSAGES[self.index % MESSAGES.len()];
        self.index += 1;
        self.sent.fetch_add(1, Ordering::Relaxed);
        tracing::info!("[Announcement] {}", message);
    }
}

/// Run the frame loop described by `config`
pub fn run(config: &SimConfig) -> SimResult<Summary> {
    let delta = config.frame_delta().ok_or(SimError::InvalidTickRate)?;
    let timers = TimerRegistry::<Duration>::with_config(config.timers.clone());

    let warmup_done = Arc::new(AtomicBool::new(false));
    let warmup_flag = Arc::clone(&warmup_done);
    timers.set_timeout(
        move || {
            warmup_flag.store(true, Ordering::Relaxed);
            tracing::info!("Warmup over, round is live");
        },
        Duration::from_millis(config.warmup_ms),
    )?;

    let announcements = Arc::new(AtomicUsize::new(0));
    timers.set_interval_with_context(
        Announcer::announce,
        Duration::from_millis(config.announce_every_ms),
        Announcer {
            index: 0,
            sent: Arc::clone(&announcements),
        },
    )?;

    let heartbeats = Arc::new(AtomicUsize::new(0));
    let beats = Arc::clone(&heartbeats);
    timers.set_timer_with_flags(
        move || {
            let n = beats.fetch_add(1, Ordering::Relaxed) + 1;
            tracing::debug!("Level heartbeat {}", n);
        },
        Duration::from_millis(config.heartbeat_ms),
        TimerFlags::REPEAT | TimerFlags::STOP_ON_RESET,
    )?;

    let level_change = config.frames / 2;
    let mut fires = 0;
    for frame in 1..=config.frames {
        fires += timers.update(delta)?;

        if frame == level_change {
            let removed = timers.reset();
            tracing::info!(
                "Level change at frame {}: removed {} scoped timers",
                frame,
                removed
            );
        }
    }

    Ok(Summary {
        frames: config.frames,
        virtual_time: timers.now(),
        fires,
        announcements: announcements.load(Ordering::Relaxed),
        heartbeats: heartbeats.load(Ordering::Relaxed),
        warmup_done: warmup_done.load(Ordering::Relaxed),
        live_timers: timers.len(),
    })
}

#[cfg(test)]
mod tests {
    use gametimer_core::{OverrunPolicy, TimerConfig};

    use super::*;

    #[test]
    fn test_default_run() {
        let summary = run(&SimConfig::default()).unwrap();

        assert_eq!(summary.frames, 640);
        assert_eq!(summary.virtual_time, Duration::from_secs(10));
        assert!(summary.warmup_done);
        assert_eq!(summary.announcements, 3);
        // Level change at 5s, right after the fifth beat
        assert_eq!(summary.heartbeats, 5);
        assert_eq!(summary.fires, 9);
        assert_eq!(summary.live_timers, 1);
    }

    #[test]
    fn test_zero_tick_rate_is_rejected() {
        let config = SimConfig {
            tick_rate: 0,
            ..SimConfig::default()
        };
        assert!(matches!(run(&config), Err(SimError::InvalidTickRate)));
    }

    #[test]
    fn test_zero_announce_period_is_rejected() {
        let config = SimConfig {
            announce_every_ms: 0,
            ..SimConfig::default()
        };
        assert!(matches!(
            run(&config),
            Err(SimError::Timer(TimerError::ZeroInterval))
        ));
    }

    #[test]
    fn test_slow_tick_rate_with_catch_up() {
        // Two frames per second of 500ms each, heartbeat every 200ms
        let config = SimConfig {
            tick_rate: 2,
            frames: 4,
            warmup_ms: 0,
            announce_every_ms: 10_000,
            heartbeat_ms: 200,
            timers: TimerConfig {
                overrun: OverrunPolicy::CatchUp,
            },
        };
        let summary = run(&config).unwrap();

        // 500ms and 1000ms: 2 beats + 3 beats, then the level change
        assert_eq!(summary.heartbeats, 5);
        assert!(summary.warmup_done);
        assert_eq!(summary.announcements, 0);
    }
}
