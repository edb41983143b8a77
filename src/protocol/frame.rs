//! # Telemetry Frame
//!
//! Decoded representation of one line from the power subsystem debug link.
//!
//! A [`Frame`] stores the raw samples exactly as received. Physical values are
//! computed on demand through [`super::units`], so every derived quantity always
//! reflects the current field values.
//!
//! ## Field Layout
//!
//! | Index | Member | Index | Member |
//! |-------|--------|-------|--------|
//! | 0 | timestamp | 13 | comm.c |
//! | 1 | comms path select | 14 | comm.sel |
//! | 2 | antenna state | 15 | panel.px |
//! | 3 | battery.v | 16 | panel.nx |
//! | 4 | battery.c | 17 | panel.py |
//! | 5 | battery.t1 | 18 | panel.ny |
//! | 6 | battery.t2 | 19 | panel.pz |
//! | 7 | battery.t_avg | 20 | panel.nz |
//! | 8 | solar.v | 21 | comm_a.v |
//! | 9 | solar.c | 22 | comm_a.c |
//! | 10 | power.c | 23 | comm_b.v |
//! | 11 | main.c | 24 | comm_b.tx_c |
//! | 12 | main.sel | 25 | comm_b.rx_c |

use serde::Serialize;

use super::units::{
    to_consumption_watts, to_supply_watts, to_temperature, to_transmit_consumption_watts,
    to_voltage,
};

/// Sample value the device uses to flag the "on" side of a binary status.
pub const STATUS_FLAG_SET: f64 = 255.0;

/// Number of numeric samples following the timestamp.
pub const SAMPLE_COUNT: usize = 25;

/// Active communication path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsPath {
    /// Path A (flag sample == 255)
    A,
    /// Path B (any other sample)
    B,
}

impl CommsPath {
    /// Decode the comms path select sample.
    #[must_use]
    pub fn from_sample(sample: f64) -> Self {
        if sample == STATUS_FLAG_SET {
            CommsPath::A
        } else {
            CommsPath::B
        }
    }
}

impl std::fmt::Display for CommsPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommsPath::A => write!(f, "A"),
            CommsPath::B => write!(f, "B"),
        }
    }
}

/// Deployment state of antenna A
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AntennaState {
    /// Deployed (flag sample == 255)
    Open,
    /// Stowed (any other sample)
    Closed,
}

impl AntennaState {
    /// Decode the antenna state sample.
    #[must_use]
    pub fn from_sample(sample: f64) -> Self {
        if sample == STATUS_FLAG_SET {
            AntennaState::Open
        } else {
            AntennaState::Closed
        }
    }
}

impl std::fmt::Display for AntennaState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AntennaState::Open => write!(f, "open"),
            AntennaState::Closed => write!(f, "closed"),
        }
    }
}

/// Battery pack readings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Battery {
    pub(crate) v: f64,
    pub(crate) c: f64,
    pub(crate) t1: f64,
    pub(crate) t2: f64,
    pub(crate) t_avg: f64,
}

impl Battery {
    /// Current-sense zero offset in volts
    pub const VREF: f64 = 1.47;
    pub const GAIN: f64 = 100.0;
    pub const RSHUNT: f64 = 0.022;
    /// Pack voltage is sensed through a 1:2 divider
    pub const VOLTAGE_GAIN: f64 = 2.0;

    /// Power delivered by the pack in watts (negative while charging)
    #[must_use]
    pub fn supply(&self) -> f64 {
        to_supply_watts(self.c, self.v, Self::VREF, Self::GAIN, Self::RSHUNT, Self::VOLTAGE_GAIN)
    }

    /// Pack voltage in volts
    #[must_use]
    pub fn voltage(&self) -> f64 {
        to_voltage(self.v, Self::VOLTAGE_GAIN)
    }

    #[must_use]
    pub fn temp_t1(&self) -> f64 {
        to_temperature(self.t1)
    }

    #[must_use]
    pub fn temp_t2(&self) -> f64 {
        to_temperature(self.t2)
    }

    #[must_use]
    pub fn temp_t_avg(&self) -> f64 {
        to_temperature(self.t_avg)
    }
}

/// Solar array readings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solar {
    pub(crate) v: f64,
    pub(crate) c: f64,
}

impl Solar {
    pub const VREF: f64 = 0.0;
    pub const GAIN: f64 = 100.0;
    pub const RSHUNT: f64 = 0.062;
    pub const VOLTAGE_GAIN: f64 = 1.0;

    /// Power delivered by the array in watts
    #[must_use]
    pub fn supply(&self) -> f64 {
        to_supply_watts(self.c, self.v, Self::VREF, Self::GAIN, Self::RSHUNT, Self::VOLTAGE_GAIN)
    }

    /// Array voltage in volts
    #[must_use]
    pub fn voltage(&self) -> f64 {
        to_voltage(self.v, Self::VOLTAGE_GAIN)
    }
}

/// Power-control MCU draw
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerDraw {
    pub(crate) c: f64,
}

impl PowerDraw {
    pub const RSHUNT: f64 = 0.15;
    /// 20 × 125 / (125 − 100) gives the channel's fixed ×100 sense gain
    pub const REXT: f64 = 125.0;

    #[must_use]
    pub fn consumption(&self) -> f64 {
        to_consumption_watts(self.c, Self::RSHUNT, Self::REXT)
    }
}

/// Draw of a switched subsystem (main MCU or comm MCU)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubsystemDraw {
    pub(crate) c: f64,
    /// Power switch select line
    pub(crate) sel: f64,
}

impl SubsystemDraw {
    pub const RSHUNT: f64 = 0.56;
    pub const REXT: f64 = 180.0;

    #[must_use]
    pub fn consumption(&self) -> f64 {
        to_consumption_watts(self.c, Self::RSHUNT, Self::REXT)
    }
}

/// Body panel temperature sensors
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub(crate) px: f64,
    pub(crate) nx: f64,
    pub(crate) py: f64,
    pub(crate) ny: f64,
    pub(crate) pz: f64,
    pub(crate) nz: f64,
}

impl Panel {
    #[must_use]
    pub fn temp_px(&self) -> f64 {
        to_temperature(self.px)
    }

    #[must_use]
    pub fn temp_nx(&self) -> f64 {
        to_temperature(self.nx)
    }

    #[must_use]
    pub fn temp_py(&self) -> f64 {
        to_temperature(self.py)
    }

    #[must_use]
    pub fn temp_ny(&self) -> f64 {
        to_temperature(self.ny)
    }

    #[must_use]
    pub fn temp_pz(&self) -> f64 {
        to_temperature(self.pz)
    }

    #[must_use]
    pub fn temp_nz(&self) -> f64 {
        to_temperature(self.nz)
    }
}

/// Communication path A transceiver
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommPathA {
    pub(crate) v: f64,
    pub(crate) c: f64,
}

impl CommPathA {
    pub const RSHUNT: f64 = 0.1;
    pub const REXT: f64 = 180.0;

    #[must_use]
    pub fn consumption(&self) -> f64 {
        to_transmit_consumption_watts(self.c, self.v, Self::RSHUNT, Self::REXT)
    }
}

/// Communication path B transmitter and receiver
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommPathB {
    pub(crate) v: f64,
    pub(crate) tx_c: f64,
    pub(crate) rx_c: f64,
}

impl CommPathB {
    pub const RSHUNT: f64 = 0.1;
    pub const REXT: f64 = 180.0;

    #[must_use]
    pub fn consumption_tx(&self) -> f64 {
        to_transmit_consumption_watts(self.tx_c, self.v, Self::RSHUNT, Self::REXT)
    }

    #[must_use]
    pub fn consumption_rx(&self) -> f64 {
        to_consumption_watts(self.rx_c, Self::RSHUNT, Self::REXT)
    }
}

/// One decoded telemetry observation
///
/// Built only by [`super::decoder::parse_frame`] from a complete 26-field line.
///
/// # Examples
///
/// ```
/// use power_monitor::protocol::decoder::parse_frame;
/// use power_monitor::protocol::frame::CommsPath;
///
/// let frame = parse_frame(
///     "16/1/1/1:12:0,255,255,79,69,33,34,33,176,118,7,110,0,1,0,27,3,36,37,36,37,128,32,21,0,7",
/// )?;
/// assert_eq!(frame.comms_path(), CommsPath::A);
/// assert_eq!(frame.power_balance(), frame.total_supply() - frame.total_consumption());
/// # Ok::<(), power_monitor::error::MonitorError>(())
/// ```
///
/// Samples are read-only once decoded:
///
/// ```compile_fail
/// use power_monitor::protocol::decoder::{parse_frame, SEED_LINE};
///
/// let mut frame = parse_frame(SEED_LINE)?;
/// frame.battery.c = 200.0;
/// # Ok::<(), power_monitor::error::MonitorError>(())
/// ```
///
/// and a frame cannot be assembled without a line:
///
/// ```compile_fail
/// use power_monitor::protocol::frame::Solar;
///
/// let solar = Solar { v: 176.0, c: 118.0 };
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    /// Source-supplied label, never reparsed
    pub(crate) timestamp: String,
    /// Raw comms path select sample
    pub(crate) comms_select: f64,
    /// Raw antenna state sample
    pub(crate) antenna_select: f64,
    pub(crate) battery: Battery,
    pub(crate) solar: Solar,
    pub(crate) power_draw: PowerDraw,
    pub(crate) main_draw: SubsystemDraw,
    pub(crate) comm_draw: SubsystemDraw,
    pub(crate) panel: Panel,
    pub(crate) comm_a: CommPathA,
    pub(crate) comm_b: CommPathB,
}

impl Frame {
    /// Build a frame from a timestamp and the 25 samples in wire order.
    pub(crate) fn from_samples(timestamp: &str, s: &[f64; SAMPLE_COUNT]) -> Self {
        Self {
            timestamp: timestamp.to_string(),
            comms_select: s[0],
            antenna_select: s[1],
            battery: Battery { v: s[2], c: s[3], t1: s[4], t2: s[5], t_avg: s[6] },
            solar: Solar { v: s[7], c: s[8] },
            power_draw: PowerDraw { c: s[9] },
            main_draw: SubsystemDraw { c: s[10], sel: s[11] },
            comm_draw: SubsystemDraw { c: s[12], sel: s[13] },
            panel: Panel {
                px: s[14],
                nx: s[15],
                py: s[16],
                ny: s[17],
                pz: s[18],
                nz: s[19],
            },
            comm_a: CommPathA { v: s[20], c: s[21] },
            comm_b: CommPathB { v: s[22], tx_c: s[23], rx_c: s[24] },
        }
    }

    /// Source-supplied label from the first field
    #[must_use]
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    #[must_use]
    pub fn battery(&self) -> &Battery {
        &self.battery
    }

    #[must_use]
    pub fn solar(&self) -> &Solar {
        &self.solar
    }

    #[must_use]
    pub fn power_draw(&self) -> &PowerDraw {
        &self.power_draw
    }

    #[must_use]
    pub fn main_draw(&self) -> &SubsystemDraw {
        &self.main_draw
    }

    #[must_use]
    pub fn comm_draw(&self) -> &SubsystemDraw {
        &self.comm_draw
    }

    #[must_use]
    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    #[must_use]
    pub fn comm_a(&self) -> &CommPathA {
        &self.comm_a
    }

    #[must_use]
    pub fn comm_b(&self) -> &CommPathB {
        &self.comm_b
    }

    /// Active communication path
    #[must_use]
    pub fn comms_path(&self) -> CommsPath {
        CommsPath::from_sample(self.comms_select)
    }

    /// Antenna A deployment state
    #[must_use]
    pub fn antenna_state(&self) -> AntennaState {
        AntennaState::from_sample(self.antenna_select)
    }

    /// Solar plus battery supply in watts
    #[must_use]
    pub fn total_supply(&self) -> f64 {
        self.solar.supply() + self.battery.supply()
    }

    /// Sum of every subsystem's draw in watts
    #[must_use]
    pub fn total_consumption(&self) -> f64 {
        self.power_draw.consumption()
            + self.main_draw.consumption()
            + self.comm_draw.consumption()
            + self.comm_a.consumption()
            + self.comm_b.consumption_tx()
            + self.comm_b.consumption_rx()
    }

    /// Supply minus consumption in watts
    #[must_use]
    pub fn power_balance(&self) -> f64 {
        self.total_supply() - self.total_consumption()
    }

    /// The 25 samples in wire order, as written to the frame log.
    #[must_use]
    pub fn samples(&self) -> [f64; SAMPLE_COUNT] {
        [
            self.comms_select,
            self.antenna_select,
            self.battery.v,
            self.battery.c,
            self.battery.t1,
            self.battery.t2,
            self.battery.t_avg,
            self.solar.v,
            self.solar.c,
            self.power_draw.c,
            self.main_draw.c,
            self.main_draw.sel,
            self.comm_draw.c,
            self.comm_draw.sel,
            self.panel.px,
            self.panel.nx,
            self.panel.py,
            self.panel.ny,
            self.panel.pz,
            self.panel.nz,
            self.comm_a.v,
            self.comm_a.c,
            self.comm_b.v,
            self.comm_b.tx_c,
            self.comm_b.rx_c,
        ]
    }
}
