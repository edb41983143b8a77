//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every section and key is optional; missing values fall back to defaults.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{MonitorError, Result};
use crate::telemetry::history::DEFAULT_HISTORY_CAPACITY;

/// Baud rates accepted for the debug link
pub const SUPPORTED_BAUD_RATES: [u32; 5] = [9600, 19200, 38400, 57600, 115200];

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub serial: SerialConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Serial port configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    #[serde(default = "default_serial_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// Tried in order when `port` cannot be opened
    #[serde(default)]
    pub fallback_ports: Vec<String>,
}

/// Frame log configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    #[serde(default = "default_log_enabled")]
    pub enabled: bool,

    #[serde(default = "default_log_dir")]
    pub dir: String,

    #[serde(default = "default_rotation_secs")]
    pub rotation_secs: u64,

    #[serde(default = "default_max_files_to_keep")]
    pub max_files_to_keep: usize,

    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Rolling history configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HistoryConfig {
    #[serde(default = "default_history_capacity")]
    pub capacity: usize,
}

/// Dashboard configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    #[serde(default = "default_dashboard_enabled")]
    pub enabled: bool,

    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
}

/// Diagnostic logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_level")]
    pub level: String,

    #[serde(default = "default_log_dir")]
    pub dir: String,
}

// Default value functions
fn default_serial_port() -> String { "/dev/ttyUSB0".to_string() }
fn default_baud_rate() -> u32 { 38400 }

fn default_log_enabled() -> bool { true }
fn default_log_dir() -> String { "./log".to_string() }
fn default_rotation_secs() -> u64 { 3600 }
fn default_max_files_to_keep() -> usize { 48 }
fn default_log_format() -> String { "csv".to_string() }

fn default_history_capacity() -> usize { DEFAULT_HISTORY_CAPACITY }

fn default_dashboard_enabled() -> bool { true }
fn default_refresh_interval_ms() -> u64 { 100 }

fn default_logging_level() -> String { "info".to_string() }

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: default_serial_port(),
            baud_rate: default_baud_rate(),
            fallback_ports: Vec::new(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: default_log_enabled(),
            dir: default_log_dir(),
            rotation_secs: default_rotation_secs(),
            max_files_to_keep: default_max_files_to_keep(),
            format: default_log_format(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { capacity: default_history_capacity() }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: default_dashboard_enabled(),
            refresh_interval_ms: default_refresh_interval_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_logging_level(),
            dir: default_log_dir(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use power_monitor::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Serial devices to try, configured port first
    #[must_use]
    pub fn serial_candidates(&self) -> Vec<&str> {
        std::iter::once(self.serial.port.as_str())
            .chain(self.serial.fallback_ports.iter().map(String::as_str))
            .collect()
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.serial.port.is_empty() {
            return Err(MonitorError::Config(
                toml::de::Error::custom("serial port cannot be empty")
            ));
        }

        if !SUPPORTED_BAUD_RATES.contains(&self.serial.baud_rate) {
            return Err(MonitorError::Config(
                toml::de::Error::custom("baud_rate must be one of: 9600, 19200, 38400, 57600, 115200")
            ));
        }

        if self.log.enabled && self.log.dir.is_empty() {
            return Err(MonitorError::Config(
                toml::de::Error::custom("log dir cannot be empty when enabled")
            ));
        }

        if self.log.rotation_secs == 0 || self.log.rotation_secs > 86400 {
            return Err(MonitorError::Config(
                toml::de::Error::custom("rotation_secs must be between 1 and 86400")
            ));
        }

        if self.log.max_files_to_keep == 0 {
            return Err(MonitorError::Config(
                toml::de::Error::custom("max_files_to_keep must be greater than 0")
            ));
        }

        if self.log.format != "csv" && self.log.format != "jsonl" {
            return Err(MonitorError::Config(
                toml::de::Error::custom("log format must be 'csv' or 'jsonl'")
            ));
        }

        if self.history.capacity == 0 || self.history.capacity > 10000 {
            return Err(MonitorError::Config(
                toml::de::Error::custom("history capacity must be between 1 and 10000")
            ));
        }

        if self.dashboard.refresh_interval_ms < 10 || self.dashboard.refresh_interval_ms > 10000 {
            return Err(MonitorError::Config(
                toml::de::Error::custom("refresh_interval_ms must be between 10 and 10000")
            ));
        }

        if self.logging.level.parse::<tracing::Level>().is_err() {
            return Err(MonitorError::Config(
                toml::de::Error::custom("logging level must be one of: trace, debug, info, warn, error")
            ));
        }

        if self.logging.dir.is_empty() {
            return Err(MonitorError::Config(
                toml::de::Error::custom("logging dir cannot be empty")
            ));
        }

        Ok(())
    }
}
