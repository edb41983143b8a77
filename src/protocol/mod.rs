//! # Debug Link Protocol Module
//!
//! Implementation of the power subsystem's ASCII debug link.
//!
//! This module handles:
//! - ADC sample to physical unit conversion
//! - Telemetry line decoding (26 comma-separated fields)
//! - Derived power budget (supply, consumption, balance)
//! - Operator command encoding

pub mod units;
pub mod frame;
pub mod decoder;
pub mod command;
