//! # Error Types
//!
//! Custom error types for Power Monitor using `thiserror`.

use thiserror::Error;

/// Main error type for Power Monitor
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Telemetry line could not be decoded into a frame
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    /// Serial transport errors
    #[error("Serial error: {0}")]
    Serial(String),

    /// None of the candidate serial devices could be opened
    #[error("No serial device could be opened (tried: {0})")]
    SerialPortNotFound(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV frame log errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSONL frame log errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Power Monitor
pub type Result<T> = std::result::Result<T, MonitorError>;
