//! # Dashboard View
//!
//! Label/value lines shown next to the charts, built from the newest frame
//! and the session's link status.

use std::time::Duration;

use crate::protocol::command::Command;
use crate::protocol::frame::Frame;

/// Width the labels are padded to on the readings panel
const LABEL_WIDTH: usize = 30;

/// Session state shown alongside the frame readings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkStatus {
    pub elapsed_since_reset: Duration,
    pub log_count: u64,
    pub rejected: u64,
    pub armed: Option<Command>,
    pub last_sent: Option<Command>,
}

/// One dashboard row
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardLine {
    pub label: &'static str,
    pub value: String,
}

impl DashboardLine {
    fn new(label: &'static str, value: String) -> Self {
        Self { label, value }
    }

    fn watts(label: &'static str, value: f64) -> Self {
        Self::new(label, format!("{:.4}", value))
    }

    fn volts(label: &'static str, value: f64) -> Self {
        Self::new(label, format!("{:.3}", value))
    }

    fn celsius(label: &'static str, value: f64) -> Self {
        Self::new(label, format!("{:.2}", value))
    }
}

impl std::fmt::Display for DashboardLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:<width$} = {}", self.label, self.value, width = LABEL_WIDTH)
    }
}

/// Everything the text panel shows for one refresh
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub lines: Vec<DashboardLine>,
}

impl DashboardView {
    /// Build the view from the newest frame (if any) and link status.
    #[must_use]
    pub fn build(frame: Option<&Frame>, status: &LinkStatus) -> Self {
        let mut lines = Vec::with_capacity(32);

        if let Some(frame) = frame {
            lines.push(DashboardLine::new("frame timestamp", frame.timestamp().to_string()));
            lines.push(DashboardLine::new("comsys", frame.comms_path().to_string()));
            lines.push(DashboardLine::new("antenna", frame.antenna_state().to_string()));

            lines.push(DashboardLine::watts("pv supply[W]", frame.solar().supply()));
            lines.push(DashboardLine::watts("battery supply[W]", frame.battery().supply()));
            lines.push(DashboardLine::watts("total supply[W]", frame.total_supply()));

            lines.push(DashboardLine::watts("power consumption[W]", frame.power_draw().consumption()));
            lines.push(DashboardLine::watts("main consumption[W]", frame.main_draw().consumption()));
            lines.push(DashboardLine::watts("comm consumption[W]", frame.comm_draw().consumption()));
            lines.push(DashboardLine::watts("comA consumption[W]", frame.comm_a().consumption()));
            lines.push(DashboardLine::watts("comB consumption_tx[W]", frame.comm_b().consumption_tx()));
            lines.push(DashboardLine::watts("comB consumption_rx[W]", frame.comm_b().consumption_rx()));
            lines.push(DashboardLine::watts("total consumption[W]", frame.total_consumption()));
            lines.push(DashboardLine::watts("power balance[W]", frame.power_balance()));

            lines.push(DashboardLine::volts("battery voltage[V]", frame.battery().voltage()));
            lines.push(DashboardLine::volts("pv voltage[V]", frame.solar().voltage()));
            lines.push(DashboardLine::celsius("battery t1 temperature[C]", frame.battery().temp_t1()));
            lines.push(DashboardLine::celsius("battery t2 temperature[C]", frame.battery().temp_t2()));
            lines.push(DashboardLine::celsius("battery t_avg temperature[C]", frame.battery().temp_t_avg()));

            lines.push(DashboardLine::celsius("panel px temperature[C]", frame.panel().temp_px()));
            lines.push(DashboardLine::celsius("panel nx temperature[C]", frame.panel().temp_nx()));
            lines.push(DashboardLine::celsius("panel py temperature[C]", frame.panel().temp_py()));
            lines.push(DashboardLine::celsius("panel ny temperature[C]", frame.panel().temp_ny()));
            lines.push(DashboardLine::celsius("panel pz temperature[C]", frame.panel().temp_pz()));
            lines.push(DashboardLine::celsius("panel nz temperature[C]", frame.panel().temp_nz()));
        }

        lines.push(DashboardLine::new(
            "elapsed from last reset[sec]",
            format!("{:.1}", status.elapsed_since_reset.as_secs_f64()),
        ));
        lines.push(DashboardLine::new("log count", status.log_count.to_string()));
        lines.push(DashboardLine::new("rejected lines", status.rejected.to_string()));
        lines.push(DashboardLine::new("armed command", describe(status.armed)));
        lines.push(DashboardLine::new("last sent command", describe(status.last_sent)));

        Self { lines }
    }

    /// Value of the first line with `label`
    #[must_use]
    pub fn value(&self, label: &str) -> Option<&str> {
        self.lines
            .iter()
            .find(|line| line.label == label)
            .map(|line| line.value.as_str())
    }
}

fn describe(command: Option<Command>) -> String {
    match command {
        Some(command) => format!("{} ({})", command.letter(), command.wire()),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::decoder::parse_frame;

    const GOLDEN_LINE: &str =
        "16/1/1/1:12:0,255,255,79,69,33,34,33,176,118,7,110,0,1,0,27,3,36,37,36,37,128,32,21,0,7";

    #[test]
    fn test_frame_values() {
        let frame = parse_frame(GOLDEN_LINE).unwrap();
        let view = DashboardView::build(Some(&frame), &LinkStatus::default());

        assert_eq!(view.value("comsys"), Some("A"));
        assert_eq!(view.value("antenna"), Some("open"));
        assert_eq!(view.value("power balance[W]"), Some("-0.1298"));
        assert_eq!(view.value("battery voltage[V]"), Some("3.240"));
        assert_eq!(view.value("battery t1 temperature[C]"), Some("17.68"));
        assert_eq!(view.value("frame timestamp"), Some("16/1/1/1:12:0"));
    }

    #[test]
    fn test_status_values() {
        let status = LinkStatus {
            elapsed_since_reset: Duration::from_millis(12_340),
            log_count: 7,
            rejected: 2,
            armed: Some(Command::B),
            last_sent: None,
        };
        let view = DashboardView::build(None, &status);

        assert_eq!(view.value("elapsed from last reset[sec]"), Some("12.3"));
        assert_eq!(view.value("log count"), Some("7"));
        assert_eq!(view.value("rejected lines"), Some("2"));
        assert_eq!(view.value("armed command"), Some("b (dbgmaicd2)"));
        assert_eq!(view.value("last sent command"), Some("-"));
    }

    #[test]
    fn test_no_frame_shows_status_only() {
        let view = DashboardView::build(None, &LinkStatus::default());
        assert_eq!(view.lines.len(), 5);
        assert_eq!(view.value("power balance[W]"), None);
    }

    #[test]
    fn test_every_panel_face_listed() {
        let frame = parse_frame(GOLDEN_LINE).unwrap();
        let view = DashboardView::build(Some(&frame), &LinkStatus::default());
        for face in ["px", "nx", "py", "ny", "pz", "nz"] {
            let label = format!("panel {} temperature[C]", face);
            assert!(view.value(&label).is_some(), "missing {}", label);
        }
    }

    #[test]
    fn test_text_line_format() {
        let line = DashboardLine::new("log count", "3".to_string());
        assert_eq!(line.to_string(), format!("{:<30} = 3", "log count"));
    }
}
