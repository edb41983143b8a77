//! # Telemetry Module
//!
//! Keeps accepted frames for charting and writes them to disk.
//!
//! This module handles:
//! - Fixed-capacity frame history, newest first
//! - Chart series extraction (oldest first)
//! - CSV or JSONL frame logs with time-based rotation
//! - Retaining only the newest N log files

pub mod history;
pub mod logger;
