//! # Unit Conversion
//!
//! Converts raw ADC sample codes from the power subsystem into physical units.
//!
//! Every quantity on the debug link reduces to one of three shapes:
//!
//! - **Voltage**: `sample × VAD_MAX / DIV_NUM × gain`
//! - **Supply power**: sensed current through a gain stage and shunt, times a
//!   scaled bus voltage
//! - **Consumption power**: sensed current through a current-sense amplifier
//!   whose gain is set by an external resistor
//!
//! Channels only carry their constants (see [`super::frame`]); the arithmetic
//! lives here, once.
//!
//! No clamping is applied. Out-of-range samples produce out-of-range physics.

/// ADC full-scale reference voltage in volts
pub const VAD_MAX: f64 = 5.25;

/// ADC code span (8-bit converter)
pub const DIV_NUM: f64 = 256.0;

/// MCP temperature sensor output at 0 °C, in volts
pub const MCP_VREF: f64 = 0.5;

/// MCP temperature sensor slope in V/°C
pub const MCP_TEMP_COEF: f64 = 0.01;

/// Fixed gain of the current-sense amplifier before the external resistor term
const SENSE_AMP_GAIN: f64 = 20.0;

/// Resistor value the sense amplifier's external resistor is referenced to
const SENSE_AMP_RREF: f64 = 100.0;

/// Scale a raw sample to the voltage seen at the ADC pin.
#[inline]
fn adc_volts(sample: f64) -> f64 {
    sample * VAD_MAX / DIV_NUM
}

/// Convert a sample to volts, applying a per-channel divider gain.
///
/// # Arguments
///
/// * `sample` - Raw ADC code
/// * `gain_factor` - Divider compensation (2.0 for the battery, 1.0 otherwise)
///
/// # Examples
///
/// ```
/// use power_monitor::protocol::units::to_voltage;
///
/// assert_eq!(to_voltage(128.0, 1.0), 2.625);
/// assert_eq!(to_voltage(128.0, 2.0), 5.25);
/// ```
#[must_use]
pub fn to_voltage(sample: f64, gain_factor: f64) -> f64 {
    adc_volts(sample) * gain_factor
}

/// Convert an MCP970x temperature sensor sample to degrees Celsius.
///
/// # Examples
///
/// ```
/// use power_monitor::protocol::units::to_temperature;
///
/// // 0 V at the pin reads -50 °C
/// assert!((to_temperature(0.0) + 50.0).abs() < 1e-9);
/// ```
#[must_use]
pub fn to_temperature(sample: f64) -> f64 {
    (adc_volts(sample) - MCP_VREF) / MCP_TEMP_COEF
}

/// Convert a supply channel's current and voltage samples to watts.
///
/// `((I_adc − vref) / (gain × rshunt)) × voltage_multiplier × V_adc`
///
/// # Arguments
///
/// * `current_sample` - Raw current-sense code
/// * `voltage_sample` - Raw bus voltage code
/// * `vref` - Current-sense zero offset in volts
/// * `gain` - Current-sense amplifier gain
/// * `rshunt` - Shunt resistance in ohms
/// * `voltage_multiplier` - Bus voltage divider compensation
#[must_use]
pub fn to_supply_watts(
    current_sample: f64,
    voltage_sample: f64,
    vref: f64,
    gain: f64,
    rshunt: f64,
    voltage_multiplier: f64,
) -> f64 {
    let amps = (adc_volts(current_sample) - vref) / (gain * rshunt);
    amps * voltage_sample * voltage_multiplier * VAD_MAX / DIV_NUM
}

/// Current through a high-side sense amplifier whose gain is
/// `20 × rext / (rext − 100)`.
#[inline]
fn sensed_amps(current_sample: f64, rshunt: f64, rext: f64) -> f64 {
    adc_volts(current_sample) / (SENSE_AMP_GAIN * rshunt * rext / (rext - SENSE_AMP_RREF))
}

/// Convert a load channel's current sample to watts drawn from the
/// `VAD_MAX` rail.
///
/// # Arguments
///
/// * `current_sample` - Raw current-sense code
/// * `rshunt` - Shunt resistance in ohms
/// * `rext` - Sense amplifier gain-setting resistor in ohms
#[must_use]
pub fn to_consumption_watts(current_sample: f64, rshunt: f64, rext: f64) -> f64 {
    sensed_amps(current_sample, rshunt, rext) * VAD_MAX
}

/// Convert a transmitter's current sample to watts, using the transmitter's
/// own supply rail (`2 × V_adc`) instead of the fixed rail.
#[must_use]
pub fn to_transmit_consumption_watts(
    current_sample: f64,
    voltage_sample: f64,
    rshunt: f64,
    rext: f64,
) -> f64 {
    sensed_amps(current_sample, rshunt, rext) * (2.0 * voltage_sample * VAD_MAX / DIV_NUM)
}
