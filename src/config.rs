//! Configuration for the timing simulator.
//!
//! Every tuning knob of the simulator lives here with a serde default,
//! so a config file only needs to name the values it overrides.
//!
//! # Configuration File Structure
//!
//! ```yaml
//! default_delay_ms: 500
//! delay_scale: 0.1
//! min_delay_ms: 100
//! max_delay_ms: 2000
//! data_offset_ms: 50
//! other_offset_ms: 100
//! oscillation_budget: 10000
//! log_level: info
//! ```
//!
//! Loading from YAML or JSON files is host-side convenience only; the
//! simulation core itself never touches the filesystem.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::types::SimTime;

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown file format: {0}")]
    UnknownFormat(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Simulator tuning parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimConfig {
    /// Wire delay used when the delay table resolves nothing
    #[serde(default = "default_delay_ms")]
    pub default_delay_ms: SimTime,

    /// Factor applied to raw `max_delay` values before clamping
    #[serde(default = "default_delay_scale")]
    pub delay_scale: f64,

    /// Lower clamp bound for resolved wire delays
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: SimTime,

    /// Upper clamp bound for resolved wire delays
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: SimTime,

    /// Extra arrival latency for data-class signals, so data always
    /// arrives strictly after a coincident clock edge
    #[serde(default = "default_data_offset_ms")]
    pub data_offset_ms: SimTime,

    /// Extra arrival latency for signals that are neither clock nor data
    #[serde(default = "default_other_offset_ms")]
    pub other_offset_ms: SimTime,

    /// Maximum events processed per drain before the cycle is abandoned
    #[serde(default = "default_oscillation_budget")]
    pub oscillation_budget: u64,

    /// Logging level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_delay_ms() -> SimTime {
    500
}

fn default_delay_scale() -> f64 {
    0.1
}

fn default_min_delay_ms() -> SimTime {
    100
}

fn default_max_delay_ms() -> SimTime {
    2000
}

fn default_data_offset_ms() -> SimTime {
    50
}

fn default_other_offset_ms() -> SimTime {
    100
}

fn default_oscillation_budget() -> u64 {
    10_000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            default_delay_ms: default_delay_ms(),
            delay_scale: default_delay_scale(),
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            data_offset_ms: default_data_offset_ms(),
            other_offset_ms: default_other_offset_ms(),
            oscillation_budget: default_oscillation_budget(),
            log_level: default_log_level(),
        }
    }
}

impl SimConfig {
    /// Loads configuration from a file, detecting the format from the
    /// extension (`.yaml`/`.yml` or `.json`).
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "yaml" | "yml" => Self::from_yaml_file(path),
            "json" => Self::from_json_file(path),
            other => Err(ConfigError::UnknownFormat(other.to_string())),
        }
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Loads configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration from a JSON string.
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.min_delay_ms > self.max_delay_ms {
            return Err(ConfigError::Validation(format!(
                "min_delay_ms ({}) exceeds max_delay_ms ({})",
                self.min_delay_ms, self.max_delay_ms
            )));
        }
        if self.delay_scale <= 0.0 || !self.delay_scale.is_finite() {
            return Err(ConfigError::Validation(format!(
                "delay_scale must be a positive finite number, got {}",
                self.delay_scale
            )));
        }
        if self.oscillation_budget == 0 {
            return Err(ConfigError::Validation(
                "oscillation_budget must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
