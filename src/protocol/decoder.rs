//! # Telemetry Line Decoder
//!
//! Parses one comma-separated debug-link line into a [`Frame`].

use super::frame::{Frame, SAMPLE_COUNT};
use crate::error::{MonitorError, Result};

/// Fields per telemetry line: timestamp plus 25 samples
pub const FRAME_FIELD_COUNT: usize = SAMPLE_COUNT + 1;

/// Field separator on the debug link
pub const FIELD_SEPARATOR: char = ',';

/// Prefix the device sends after it resets
pub const RESET_PREFIX: &str = "start";

/// All-zero line used to seed the history buffer
pub const SEED_LINE: &str =
    "16/1/1/1:1:1,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0";

/// Check whether a line is the device's reset announcement.
///
/// Reset lines are not telemetry and must be handled before [`parse_frame`].
///
/// # Examples
///
/// ```
/// use power_monitor::protocol::decoder::is_reset_signal;
///
/// assert!(is_reset_signal("start"));
/// assert!(is_reset_signal("started v1.2"));
/// assert!(!is_reset_signal(" start"));
/// ```
#[must_use]
pub fn is_reset_signal(line: &str) -> bool {
    line.starts_with(RESET_PREFIX)
}

/// Decode a telemetry line
///
/// # Arguments
///
/// * `line` - One line from the debug link, without the line terminator
///
/// # Returns
///
/// * `Result<Frame>` - Decoded frame
///
/// # Errors
///
/// Returns [`MonitorError::MalformedFrame`] if:
/// - The line does not have exactly 26 comma-separated fields
/// - Any of fields 1-25 is not a number
///
/// Values are not checked for physical plausibility.
pub fn parse_frame(line: &str) -> Result<Frame> {
    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();

    if fields.len() != FRAME_FIELD_COUNT {
        return Err(MonitorError::MalformedFrame(format!(
            "expected {} fields, got {}",
            FRAME_FIELD_COUNT,
            fields.len()
        )));
    }

    let mut samples = [0.0f64; SAMPLE_COUNT];
    for (index, (slot, raw)) in samples.iter_mut().zip(&fields[1..]).enumerate() {
        *slot = raw.trim().parse::<f64>().map_err(|_| {
            MonitorError::MalformedFrame(format!(
                "field {} is not a number: {:?}",
                index + 1,
                raw
            ))
        })?;
    }

    Ok(Frame::from_samples(fields[0], &samples))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::frame::{AntennaState, CommsPath};
    use crate::protocol::units::{DIV_NUM, VAD_MAX};

    const GOLDEN_LINE: &str =
        "16/1/1/1:12:0,255,255,79,69,33,34,33,176,118,7,110,0,1,0,27,3,36,37,36,37,128,32,21,0,7";

    fn assert_malformed(line: &str) {
        match parse_frame(line) {
            Err(MonitorError::MalformedFrame(_)) => {}
            other => panic!("Expected MalformedFrame for {:?}, got: {:?}", line, other),
        }
    }

    #[test]
    fn test_field_count_constant() {
        assert_eq!(FRAME_FIELD_COUNT, 26);
    }

    #[test]
    fn test_golden_line_fields() {
        let frame = parse_frame(GOLDEN_LINE).unwrap();
        assert_eq!(frame.timestamp, "16/1/1/1:12:0");
        assert_eq!(frame.comms_path(), CommsPath::A);
        assert_eq!(frame.antenna_state(), AntennaState::Open);
        assert_eq!(frame.battery.v, 79.0);
        assert_eq!(frame.battery.c, 69.0);
        assert_eq!(frame.solar.v, 176.0);
        assert_eq!(frame.solar.c, 118.0);
        assert_eq!(frame.power_draw.c, 7.0);
        assert_eq!(frame.main_draw.c, 110.0);
        assert_eq!(frame.comm_draw.c, 1.0);
        assert_eq!(frame.panel.px, 27.0);
        assert_eq!(frame.panel.nz, 37.0);
        assert_eq!(frame.comm_a.v, 128.0);
        assert_eq!(frame.comm_b.v, 21.0);
        assert_eq!(frame.comm_b.tx_c, 0.0);
        assert_eq!(frame.comm_b.rx_c, 7.0);
    }

    #[test]
    fn test_golden_line_power_balance() {
        let frame = parse_frame(GOLDEN_LINE).unwrap();
        let k = VAD_MAX / DIV_NUM;
        let sense = |c: f64, rshunt: f64, rext: f64| {
            (c * VAD_MAX / DIV_NUM) / (rshunt * 20.0 * rext / (rext - 100.0))
        };

        let battery = ((69.0 * k - 1.47) / (100.0 * 0.022)) * 2.0 * 79.0 * k;
        let solar = ((118.0 * k - 0.0) / (100.0 * 0.062)) * 176.0 * k;
        let consumption = sense(7.0, 0.15, 125.0) * VAD_MAX
            + sense(110.0, 0.56, 180.0) * VAD_MAX
            + sense(1.0, 0.56, 180.0) * VAD_MAX
            + sense(32.0, 0.1, 180.0) * 2.0 * 128.0 * k
            + sense(0.0, 0.1, 180.0) * 2.0 * 21.0 * k
            + sense(7.0, 0.1, 180.0) * VAD_MAX;
        let expected = battery + solar - consumption;

        assert!((frame.power_balance() - expected).abs() < 1e-9);
        assert!((frame.power_balance() - (-0.129766016761578)).abs() < 1e-9);
        assert!((frame.total_supply() - 1.327826756675922).abs() < 1e-9);
        assert!((frame.total_consumption() - 1.4575927734375).abs() < 1e-9);
    }

    #[test]
    fn test_golden_line_exact_values() {
        let frame = parse_frame(GOLDEN_LINE).unwrap();
        assert_eq!(frame.total_supply(), 1.3278267566759219);
        assert_eq!(frame.total_consumption(), 1.4575927734374998);
        assert_eq!(frame.power_balance(), -0.12976601676157795);
    }

    #[test]
    fn test_parse_is_deterministic() {
        let a = parse_frame(GOLDEN_LINE).unwrap();
        let b = parse_frame(GOLDEN_LINE).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.power_balance(), b.power_balance());
    }

    #[test]
    fn test_seed_line_derives_finite_values() {
        let frame = parse_frame(SEED_LINE).unwrap();
        assert_eq!(frame.comms_path(), CommsPath::B);
        assert_eq!(frame.antenna_state(), AntennaState::Closed);
        assert!(frame.total_supply().is_finite());
        assert!(frame.total_consumption().is_finite());
        assert!(frame.power_balance().is_finite());
        assert_eq!(frame.total_consumption(), 0.0);
        // Battery current offset is nonzero but the bus voltage is 0 V
        assert_eq!(frame.total_supply(), 0.0);
    }

    #[test]
    fn test_too_few_fields() {
        assert_malformed("16/1/1/1:12:0,255,255,79");
        assert_malformed("");
        assert_malformed("16/1/1/1:12:0");
    }

    #[test]
    fn test_too_many_fields() {
        assert_malformed(&format!("{},1", GOLDEN_LINE));
        assert_malformed(&format!("{},", GOLDEN_LINE));
    }

    #[test]
    fn test_every_field_count_except_26_rejected() {
        for count in 1..40 {
            if count == FRAME_FIELD_COUNT {
                continue;
            }
            let mut fields = vec!["ts".to_string()];
            fields.extend((1..count).map(|i| i.to_string()));
            assert_malformed(&fields.join(","));
        }
    }

    #[test]
    fn test_non_numeric_field() {
        let line = GOLDEN_LINE.replacen(",79,", ",x9,", 1);
        assert_malformed(&line);
    }

    #[test]
    fn test_non_numeric_in_last_field() {
        let line = format!("{}z", GOLDEN_LINE);
        assert_malformed(&line);
    }

    #[test]
    fn test_empty_numeric_field() {
        let line = GOLDEN_LINE.replacen(",79,", ",,", 1);
        assert_malformed(&line);
    }

    #[test]
    fn test_error_names_offending_field() {
        let line = GOLDEN_LINE.replacen(",79,", ",bad,", 1);
        match parse_frame(&line) {
            Err(MonitorError::MalformedFrame(msg)) => {
                assert!(msg.contains("field 3"), "unexpected message: {}", msg);
            }
            other => panic!("Expected MalformedFrame, got: {:?}", other),
        }
    }

    #[test]
    fn test_timestamp_never_parsed() {
        let line = GOLDEN_LINE.replacen("16/1/1/1:12:0", "not a number", 1);
        let frame = parse_frame(&line).unwrap();
        assert_eq!(frame.timestamp, "not a number");
    }

    #[test]
    fn test_whitespace_and_decimals_accepted() {
        let line = GOLDEN_LINE.replacen(",79,", ", 79.5 ,", 1);
        let frame = parse_frame(&line).unwrap();
        assert_eq!(frame.battery.v, 79.5);
    }

    #[test]
    fn test_implausible_values_accepted() {
        let line = GOLDEN_LINE.replacen(",79,", ",-4000,", 1);
        let frame = parse_frame(&line).unwrap();
        assert_eq!(frame.battery.v, -4000.0);
    }

    #[test]
    fn test_reset_signal_detection() {
        assert!(is_reset_signal("start"));
        assert!(is_reset_signal("start,1,2"));
        assert!(!is_reset_signal("Start"));
        assert!(!is_reset_signal("star"));
        assert!(!is_reset_signal(GOLDEN_LINE));
    }
}
