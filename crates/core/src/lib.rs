//! gametimer - Deterministic frame-driven timers
//!
//! This crate provides an interval/timeout registry for game loops. Instead of
//! relying on wall-clock timers, the loop advances every registered timer by
//! an explicit delta once per tick, which keeps timing deterministic and lets
//! the game pause, fast-forward or lock timers to its frame rate.
//!
//! # Modules
//!
//! - [`timers`] - The [`TimerRegistry`] and its ids and flags
//! - [`time`] - The [`VirtualTime`] trait for the units timers count in
//! - [`config`] - TOML-backed [`TimerConfig`]

pub mod config;
pub mod error;
pub mod time;
pub mod timers;

// Re-export commonly used items
pub use config::{ConfigError, ConfigResult, OverrunPolicy, TimerConfig};
pub use error::{TimerError, TimerResult};
pub use time::VirtualTime;
pub use timers::{TimerFlags, TimerId, TimerRegistry};
