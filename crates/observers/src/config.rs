//! Service configuration: feature defaults, timing constants, attentive mode.

use crate::preferences::Preferences;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config is not valid JSON for [`ActionsConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),

    /// A preference key the core does not know.
    #[error("unknown preference key: {0}")]
    UnknownPreference(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Which attentive display algorithm to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttentiveMode {
    /// Stow listener only while locked, honored for a fixed window after arming.
    Simple,
    /// Gesture and stow listeners for the whole session, merged into one lock decision.
    #[default]
    StateMerge,
}

/// Timing constants, all in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    /// Swipes earlier than this after ringing starts are ignored.
    pub silence_delay_ms: u64,
    /// Stow events are honored this long after the simple attentive display arms.
    pub stow_window_ms: u64,
    /// Dim hold taken when the state-merge attentive display unlocks.
    pub dim_hold_ms: u64,
    /// Minimum spacing between two doze pulses.
    pub doze_pulse_interval_ms: u64,
    /// Haptic feedback length for the flashlight gesture.
    pub flashlight_vibrate_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            silence_delay_ms: 500,
            stow_window_ms: 5000,
            dim_hold_ms: 3000,
            doze_pulse_interval_ms: 1500,
            flashlight_vibrate_ms: 250,
        }
    }
}

impl Timings {
    pub fn silence_delay(&self) -> Duration {
        Duration::from_millis(self.silence_delay_ms)
    }

    pub fn stow_window(&self) -> Duration {
        Duration::from_millis(self.stow_window_ms)
    }

    pub fn dim_hold(&self) -> Duration {
        Duration::from_millis(self.dim_hold_ms)
    }

    pub fn doze_pulse_interval(&self) -> Duration {
        Duration::from_millis(self.doze_pulse_interval_ms)
    }

    pub fn flashlight_vibrate(&self) -> Duration {
        Duration::from_millis(self.flashlight_vibrate_ms)
    }
}

/// Top-level configuration for the device actions service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionsConfig {
    pub preferences: Preferences,
    pub timings: Timings,
    pub attentive_mode: AttentiveMode,
}

impl ActionsConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        tracing::info!(?path, mode = ?config.attentive_mode, "loaded actions config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.timings.stow_window_ms == 0 {
            return Err(ConfigError::Invalid(
                "stow_window_ms must be greater than zero".to_string(),
            ));
        }
        if self.timings.dim_hold_ms == 0 {
            return Err(ConfigError::Invalid(
                "dim_hold_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
