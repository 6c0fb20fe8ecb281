//! Registry configuration
//!
//! Configuration is plain serde data stored as TOML:
//!
//! ```toml
//! # What an interval does when one update overshoots several periods
//! overrun = "catch_up"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration system errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read or write config file
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML content
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to serialize config to TOML
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

/// Result type for config operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// How a repeating timer handles an update that overshoots more than one period
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrunPolicy {
    /// Fire once and subtract a single period. Any leftover whole periods
    /// fire on the following updates, one per update.
    #[default]
    Carry,
    /// Fire once and drop the missed periods, keeping only the remainder
    Skip,
    /// Fire once for every whole period elapsed, keeping the remainder
    CatchUp,
}

/// Timer registry configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    /// Overshoot handling for repeating timers
    pub overrun: OverrunPolicy,
}

impl TimerConfig {
    /// Parse a config from TOML text
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load config from file, falling back to defaults if it is missing
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();

        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config = Self::from_toml_str(&content)?;
            tracing::debug!("Loaded timer config from {:?}", path);
            Ok(config)
        } else {
            tracing::debug!("No timer config at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save config to file.
    ///
    /// Creates parent directories if they don't exist.
    pub fn save(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        tracing::debug!("Saved timer config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_carry() {
        let config = TimerConfig::default();
        assert_eq!(config.overrun, OverrunPolicy::Carry);
    }

    #[test]
    fn test_parse_policy() {
        let config = TimerConfig::from_toml_str("overrun = \"catch_up\"").unwrap();
        assert_eq!(config.overrun, OverrunPolicy::CatchUp);

        let config = TimerConfig::from_toml_str("overrun = \"skip\"").unwrap();
        assert_eq!(config.overrun, OverrunPolicy::Skip);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = TimerConfig::from_toml_str("").unwrap();
        assert_eq!(config, TimerConfig::default());
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let err = TimerConfig::from_toml_str("overrun = \"rewind\"").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_serialize() {
        let config = TimerConfig {
            overrun: OverrunPolicy::Skip,
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("overrun = \"skip\""));
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("gametimer-config-{}", std::process::id()));
        let path = dir.join("timers.toml");
        let config = TimerConfig {
            overrun: OverrunPolicy::CatchUp,
        };

        config.save(&path).unwrap();
        let loaded = TimerConfig::load(&path).unwrap();
        assert_eq!(loaded, config);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("gametimer-config-does-not-exist.toml");
        let loaded = TimerConfig::load(&path).unwrap();
        assert_eq!(loaded, TimerConfig::default());
    }
}
