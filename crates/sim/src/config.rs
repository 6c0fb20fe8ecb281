//! Simulation configuration
//!
//! Loaded from an optional TOML file:
//!
//! ```toml
//! tick_rate = 64
//! frames = 640
//! warmup_ms = 2000
//! announce_every_ms = 3000
//! heartbeat_ms = 1000
//!
//! [timers]
//! overrun = "carry"
//! ```

use std::path::Path;
use std::time::Duration;

use gametimer_core::{ConfigResult, TimerConfig};
use serde::{Deserialize, Serialize};

/// Frame loop settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Frames per second of virtual time
    pub tick_rate: u32,

    /// Number of frames to simulate
    pub frames: u64,

    /// Delay before the one-shot warmup timer fires
    pub warmup_ms: u64,

    /// Period of the rotating announcement interval
    pub announce_every_ms: u64,

    /// Period of the level-scoped heartbeat, removed by the level change
    pub heartbeat_ms: u64,

    /// Registry settings
    pub timers: TimerConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_rate: 64,
            frames: 640,
            warmup_ms: 2_000,
            announce_every_ms: 3_000,
            heartbeat_ms: 1_000,
            timers: TimerConfig::default(),
        }
    }
}

impl SimConfig {
    /// Load config from file, or use defaults when no file is given or it is missing
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            tracing::debug!("Loaded sim config from {:?}", path);
            Ok(config)
        } else {
            tracing::warn!("Config {:?} not found, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Virtual time covered by one frame, `None` for a zero tick rate
    pub fn frame_delta(&self) -> Option<Duration> {
        (self.tick_rate > 0).then(|| Duration::from_secs(1) / self.tick_rate)
    }
}
