//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/hourline/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/hourline/` (~/.config/hourline/)
//! - Data: `$XDG_DATA_HOME/hourline/` (~/.local/share/hourline/)
//! - State/Logs: `$XDG_STATE_HOME/hourline/` (~/.local/state/hourline/)

use crate::error::{Error, Result};
use crate::scoring::DEFAULT_HOUR_WEIGHTS;
use serde::Deserialize;
use std::path::PathBuf;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Scoring configuration
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Scoring configuration
#[derive(Debug, Deserialize, Default)]
pub struct ScoringConfig {
    /// Per-hour weight overrides for weighted achievement. Hours not listed
    /// keep the built-in default weight.
    ///
    /// ```toml
    /// [[scoring.hour_weights]]
    /// hour = 9
    /// weight = 1.5
    /// ```
    #[serde(default)]
    pub hour_weights: Vec<HourWeight>,
}

/// One hour-of-day weight override
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct HourWeight {
    /// Hour of day, 0-23
    pub hour: u8,
    /// Weight applied to ratings in this hour
    pub weight: f32,
}

impl ScoringConfig {
    /// The full 24-entry weight table with overrides applied
    pub fn effective_hour_weights(&self) -> [f32; 24] {
        let mut weights = DEFAULT_HOUR_WEIGHTS;
        for override_ in &self.hour_weights {
            if let Some(slot) = weights.get_mut(override_.hour as usize) {
                *slot = override_.weight;
            }
        }
        weights
    }

    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        for override_ in &self.hour_weights {
            if override_.hour > 23 {
                return Err(Error::Config(format!(
                    "scoring.hour_weights hour {} is out of range (0-23)",
                    override_.hour
                )));
            }
            if override_.weight <= 0.0 {
                return Err(Error::Config(format!(
                    "scoring.hour_weights weight for hour {} must be positive, got {}",
                    override_.hour, override_.weight
                )));
            }
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.scoring.validate()?;

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/hourline/config.toml` (~/.config/hourline/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("hourline").join("config.toml")
    }

    /// Returns the data directory path (for SQLite database)
    ///
    /// `$XDG_DATA_HOME/hourline/` (~/.local/share/hourline/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("hourline")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/hourline/` (~/.local/state/hourline/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("hourline")
    }

    /// Returns the database file path
    ///
    /// `$XDG_DATA_HOME/hourline/data.db` (~/.local/share/hourline/data.db)
    pub fn database_path() -> PathBuf {
        Self::data_dir().join("data.db")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/hourline/hourline.log` (~/.local/state/hourline/hourline.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("hourline.log")
    }
}
