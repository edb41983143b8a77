//! # Rolling Frame History
//!
//! Fixed-capacity window of the most recent frames, feeding the live charts.
//!
//! The buffer is pre-filled with copies of a seed frame so it is always full:
//! every series has exactly `capacity` points from the first render onward.
//!
//! Storage is newest-first; [`HistoryBuffer::series`] always returns
//! oldest-first so charts read left to right in time.

use std::collections::VecDeque;

use crate::error::Result;
use crate::protocol::decoder::{parse_frame, SEED_LINE};
use crate::protocol::frame::Frame;

/// Default number of frames kept for charting
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Quantities plotted by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartQuantity {
    SolarSupply,
    BatteryVoltage,
    BatteryTempT1,
    BatteryTempT2,
    BatteryTempAvg,
    PanelTempPy,
    PanelTempNy,
    PanelTempPz,
    PanelTempNz,
}

impl ChartQuantity {
    /// Every charted quantity, in display order
    pub const ALL: [ChartQuantity; 9] = [
        ChartQuantity::SolarSupply,
        ChartQuantity::BatteryVoltage,
        ChartQuantity::BatteryTempT1,
        ChartQuantity::BatteryTempT2,
        ChartQuantity::BatteryTempAvg,
        ChartQuantity::PanelTempPy,
        ChartQuantity::PanelTempNy,
        ChartQuantity::PanelTempPz,
        ChartQuantity::PanelTempNz,
    ];

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            ChartQuantity::SolarSupply => "PV Supply",
            ChartQuantity::BatteryVoltage => "Battery Voltage",
            ChartQuantity::BatteryTempT1 => "Battery Temperature(t1)",
            ChartQuantity::BatteryTempT2 => "Battery Temperature(t2)",
            ChartQuantity::BatteryTempAvg => "Battery Temperature(t_avg)",
            ChartQuantity::PanelTempPy => "Panel Temperature(py)",
            ChartQuantity::PanelTempNy => "Panel Temperature(ny)",
            ChartQuantity::PanelTempPz => "Panel Temperature(pz)",
            ChartQuantity::PanelTempNz => "Panel Temperature(nz)",
        }
    }

    #[must_use]
    pub fn y_label(self) -> &'static str {
        match self {
            ChartQuantity::SolarSupply => "Power[W]",
            ChartQuantity::BatteryVoltage => "Voltage[V]",
            _ => "Temperature[°C]",
        }
    }

    /// Fixed display range, independent of the data
    #[must_use]
    pub fn range(self) -> (f64, f64) {
        match self {
            ChartQuantity::SolarSupply | ChartQuantity::BatteryVoltage => (0.0, 5.0),
            ChartQuantity::BatteryTempT1
            | ChartQuantity::BatteryTempT2
            | ChartQuantity::BatteryTempAvg => (-10.0, 100.0),
            ChartQuantity::PanelTempPy
            | ChartQuantity::PanelTempNy
            | ChartQuantity::PanelTempPz
            | ChartQuantity::PanelTempNz => (-50.0, 100.0),
        }
    }

    /// Physical value of this quantity for one frame
    #[must_use]
    pub fn extract(self, frame: &Frame) -> f64 {
        match self {
            ChartQuantity::SolarSupply => frame.solar().supply(),
            ChartQuantity::BatteryVoltage => frame.battery().voltage(),
            ChartQuantity::BatteryTempT1 => frame.battery().temp_t1(),
            ChartQuantity::BatteryTempT2 => frame.battery().temp_t2(),
            ChartQuantity::BatteryTempAvg => frame.battery().temp_t_avg(),
            ChartQuantity::PanelTempPy => frame.panel().temp_py(),
            ChartQuantity::PanelTempNy => frame.panel().temp_ny(),
            ChartQuantity::PanelTempPz => frame.panel().temp_pz(),
            ChartQuantity::PanelTempNz => frame.panel().temp_nz(),
        }
    }
}

/// Owned snapshot of one charted quantity, oldest point first
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub quantity: ChartQuantity,
    pub values: Vec<f64>,
}

impl ChartSeries {
    #[must_use]
    pub fn title(&self) -> &'static str {
        self.quantity.title()
    }

    #[must_use]
    pub fn range(&self) -> (f64, f64) {
        self.quantity.range()
    }

    /// `(index, value)` pairs for plotting
    #[must_use]
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.values
            .iter()
            .enumerate()
            .map(|(i, &v)| (i as f64, v))
            .collect()
    }
}

/// Fixed-capacity rolling window of frames
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    /// Newest frame at the front
    frames: VecDeque<Frame>,
    capacity: usize,
}

impl HistoryBuffer {
    /// Create a buffer holding `capacity` copies of `seed`.
    #[must_use]
    pub fn new(capacity: usize, seed: Frame) -> Self {
        let mut frames = VecDeque::with_capacity(capacity + 1);
        frames.extend(std::iter::repeat(seed).take(capacity));
        Self { frames, capacity }
    }

    /// Create a buffer seeded with the all-zero frame.
    ///
    /// # Errors
    ///
    /// Returns error if the seed line fails to decode.
    pub fn seeded(capacity: usize) -> Result<Self> {
        Ok(Self::new(capacity, parse_frame(SEED_LINE)?))
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Insert a frame as the newest entry, evicting the oldest at capacity.
    pub fn append(&mut self, frame: Frame) {
        self.frames.push_front(frame);
        while self.frames.len() > self.capacity {
            self.frames.pop_back();
        }
    }

    /// Most recently appended frame (or a seed copy)
    #[must_use]
    pub fn latest(&self) -> Option<&Frame> {
        self.frames.front()
    }

    /// Map every frame through `extractor`, oldest first.
    ///
    /// The result always has `capacity` elements.
    #[must_use]
    pub fn series<F>(&self, extractor: F) -> Vec<f64>
    where
        F: Fn(&Frame) -> f64,
    {
        self.frames.iter().rev().map(extractor).collect()
    }

    /// Owned snapshot of one chart quantity.
    #[must_use]
    pub fn chart_series(&self, quantity: ChartQuantity) -> ChartSeries {
        ChartSeries {
            quantity,
            values: self.series(|frame| quantity.extract(frame)),
        }
    }

    /// Snapshots of every chart quantity, in display order.
    #[must_use]
    pub fn all_chart_series(&self) -> Vec<ChartSeries> {
        ChartQuantity::ALL
            .iter()
            .map(|&quantity| self.chart_series(quantity))
            .collect()
    }
}
