//! # Monitor Session
//!
//! Ties the debug link to the history buffer, the frame log and the
//! dashboard. Each received line is either a reset marker, an accepted
//! frame or a rejected line; accepted frames are logged and appended to
//! history, rejected ones leave every piece of state untouched.

use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::dashboard::view::{DashboardView, LinkStatus};
use crate::dashboard::{DashboardTerminal, Input};
use crate::error::{MonitorError, Result};
use crate::protocol::command::{Command, CommandEncoder, Key};
use crate::protocol::decoder::{is_reset_signal, parse_frame};
use crate::serial::MonitorSerial;
use crate::telemetry::history::HistoryBuffer;
use crate::telemetry::logger::FrameLogger;

/// Accepted frames between status log messages in headless mode
pub const LOG_INTERVAL_FRAMES: u64 = 100;

/// What a single received line turned out to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    Reset,
    Accepted,
    Rejected,
}

/// Counters for one monitoring session
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    pub accepted: u64,
    pub rejected: u64,
    pub resets: u64,
}

pub struct Session {
    history: HistoryBuffer,
    logger: Option<FrameLogger>,
    encoder: CommandEncoder,
    stats: SessionStats,
    last_reset: Instant,
    last_sent: Option<Command>,
}

impl Session {
    pub fn new(history: HistoryBuffer, logger: Option<FrameLogger>) -> Self {
        Self {
            history,
            logger,
            encoder: CommandEncoder::new(),
            stats: SessionStats::default(),
            last_reset: Instant::now(),
            last_sent: None,
        }
    }

    /// Seed the history and open the frame log as configured
    pub fn from_config(config: &Config) -> Result<Self> {
        let history = HistoryBuffer::seeded(config.history.capacity)?;
        let logger = if config.log.enabled {
            Some(FrameLogger::create(&config.log, Local::now())?)
        } else {
            info!("Frame logging disabled");
            None
        };
        Ok(Self::new(history, logger))
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn encoder(&self) -> &CommandEncoder {
        &self.encoder
    }

    /// Time since the device last announced a reset (or since start)
    pub fn elapsed_since_reset(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_reset)
    }

    /// Classify and apply one line from the device.
    ///
    /// A reset marker only restarts the elapsed-time clock. A malformed line
    /// is counted and otherwise dropped.
    ///
    /// # Errors
    ///
    /// Returns error only if an accepted frame cannot be written to the log.
    pub fn handle_line(&mut self, line: &str, now: DateTime<Local>) -> Result<LineOutcome> {
        if is_reset_signal(line) {
            self.last_reset = Instant::now();
            self.stats.resets += 1;
            info!("Device reset detected");
            return Ok(LineOutcome::Reset);
        }

        let frame = match parse_frame(line) {
            Ok(frame) => frame,
            Err(MonitorError::MalformedFrame(reason)) => {
                self.stats.rejected += 1;
                debug!("Rejected line ({}): {:?}", reason, line);
                return Ok(LineOutcome::Rejected);
            }
            Err(e) => return Err(e),
        };

        if let Some(logger) = self.logger.as_mut() {
            logger.record(&frame, now)?;
        }
        debug!("Frame {} balance {:.4} W", frame.timestamp(), frame.power_balance());
        self.history.append(frame);
        self.stats.accepted += 1;
        Ok(LineOutcome::Accepted)
    }

    /// Feed one key (or `None` when nothing was pressed) to the encoder
    pub fn handle_key(&mut self, key: Option<Key>) -> Option<Command> {
        self.encoder.handle_key(key)
    }

    /// Feed a key to the encoder and transmit the command it completes.
    ///
    /// # Errors
    ///
    /// Returns error if the command cannot be written to the device.
    pub async fn send_key(&mut self, key: Key, serial: &mut MonitorSerial) -> Result<Option<Command>> {
        let Some(command) = self.handle_key(Some(key)) else {
            return Ok(None);
        };

        serial.send_command(command.wire().as_bytes()).await?;
        info!("Sent command {} ({})", command.letter(), command.wire());
        self.last_sent = Some(command);
        Ok(Some(command))
    }

    /// Current dashboard readings
    pub fn view(&self, now: Instant) -> DashboardView {
        let status = LinkStatus {
            elapsed_since_reset: self.elapsed_since_reset(now),
            log_count: self.stats.accepted,
            rejected: self.stats.rejected,
            armed: self.encoder.armed(),
            last_sent: self.last_sent,
        };
        DashboardView::build(self.history.latest(), &status)
    }

    /// Process the link until the device closes it, the operator quits or
    /// Ctrl+C is received.
    ///
    /// With a dashboard, keys are polled and the screen redrawn every
    /// `refresh`. Without one, a status line is logged every
    /// [`LOG_INTERVAL_FRAMES`] accepted frames.
    ///
    /// # Errors
    ///
    /// Returns error on serial, log file or terminal failures.
    pub async fn run(
        mut self,
        mut serial: MonitorSerial,
        mut ui: Option<DashboardTerminal>,
        refresh: Duration,
    ) -> Result<SessionStats> {
        let mut refresh_interval = interval(refresh);
        refresh_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("Monitoring {}", serial.device_path());
        if ui.is_none() {
            info!("Press Ctrl+C to exit");
        }

        loop {
            tokio::select! {
                line = serial.next_line() => {
                    let Some(line) = line? else {
                        warn!("Device closed the link");
                        break;
                    };

                    let outcome = self.handle_line(&line, Local::now())?;
                    if ui.is_none()
                        && outcome == LineOutcome::Accepted
                        && self.stats.accepted % LOG_INTERVAL_FRAMES == 0
                    {
                        if let Some(frame) = self.history.latest() {
                            info!(
                                "Received {} frames ({} rejected), balance {:.4} W, battery {:.3} V",
                                self.stats.accepted,
                                self.stats.rejected,
                                frame.power_balance(),
                                frame.battery().voltage()
                            );
                        }
                    }
                }

                _ = refresh_interval.tick(), if ui.is_some() => {
                    let Some(terminal) = ui.as_mut() else { continue };

                    let mut quit = false;
                    for input in terminal.poll_inputs()? {
                        match input {
                            Input::Quit => quit = true,
                            Input::Key(key) => {
                                self.send_key(key, &mut serial).await?;
                            }
                        }
                    }
                    if quit {
                        info!("Operator quit");
                        break;
                    }

                    let series = self.history.all_chart_series();
                    terminal.draw(&self.view(Instant::now()), &series)?;
                }

                _ = tokio::signal::ctrl_c() => {
                    info!("Received Ctrl+C, shutting down...");
                    break;
                }
            }
        }

        info!(
            "Session ended: {} frames, {} rejected, {} resets",
            self.stats.accepted, self.stats.rejected, self.stats.resets
        );
        Ok(self.stats)
    }
}
