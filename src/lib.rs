//! # Power Monitor Library
//!
//! Ground-side monitor for a small satellite's power subsystem debug link.
//!
//! Decodes the comma-separated telemetry frames sent over serial, converts
//! raw ADC samples to engineering units, keeps a short history for charts,
//! logs accepted frames and sends operator debug commands back to the board.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod protocol;
pub mod serial;
pub mod session;
pub mod telemetry;
