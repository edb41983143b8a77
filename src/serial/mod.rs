//! # Serial Communication Module
//!
//! Handles the debug link to the power subsystem.
//!
//! This module handles:
//! - Opening the serial port (8N1, configurable baud)
//! - Reading newline-terminated telemetry lines on a background task
//! - Writing operator commands
//!
//! Lines are delivered through a channel, so waiting for the next line can be
//! raced against the dashboard tick without losing partially read data.

pub mod port_trait;

use std::io;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info, warn};

use crate::error::{MonitorError, Result};
use port_trait::{SerialPortIO, TokioSerialPort};

/// Lines buffered between the reader task and the session loop
const LINE_CHANNEL_CAPACITY: usize = 64;

/// Initial capacity for one line (a full frame is under 100 bytes)
const LINE_BUFFER_CAPACITY: usize = 128;

/// Longer lines are dropped up to the next newline (e.g. wrong baud rate)
const MAX_LINE_BYTES: u64 = 4096;

/// Debug link handler
///
/// Owns the write half of the port and the receiving end of the line reader.
pub struct MonitorSerial {
    writer: Box<dyn SerialPortIO>,
    lines: mpsc::Receiver<io::Result<String>>,
    reader: JoinHandle<()>,
    device_path: String,
}

impl std::fmt::Debug for MonitorSerial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorSerial")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl Drop for MonitorSerial {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

impl MonitorSerial {
    /// Open the debug link on a specific device
    ///
    /// # Errors
    ///
    /// Returns error if the device cannot be opened
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use power_monitor::serial::MonitorSerial;
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let mut serial = MonitorSerial::open("/dev/ttyUSB0", 38400)?;
    ///     while let Some(line) = serial.next_line().await? {
    ///         println!("{}", line);
    ///     }
    ///     Ok(())
    /// }
    /// ```
    pub fn open(path: &str, baud_rate: u32) -> Result<Self> {
        Self::open_with_paths(&[path], baud_rate)
    }

    /// Open the debug link on the first device that can be opened
    ///
    /// # Arguments
    ///
    /// * `paths` - Device paths to try, in order
    /// * `baud_rate` - Link speed
    ///
    /// # Returns
    ///
    /// * `Result<MonitorSerial>` - Connected serial port or error
    pub fn open_with_paths(paths: &[&str], baud_rate: u32) -> Result<Self> {
        for path in paths {
            debug!("Trying to open serial port: {}", path);

            match Self::open_port(path, baud_rate) {
                Ok(port) => {
                    info!("Opened debug link at {} ({} baud)", path, baud_rate);
                    let (read_half, write_half) = tokio::io::split(port);
                    return Ok(Self::from_parts(
                        read_half,
                        Box::new(TokioSerialPort::new(write_half)),
                        path,
                    ));
                }
                Err(e) => {
                    warn!("Failed to open {}: {}", path, e);
                    continue;
                }
            }
        }

        Err(MonitorError::SerialPortNotFound(paths.join(", ")))
    }

    /// Open a specific serial port with 8N1 settings
    fn open_port(path: &str, baud_rate: u32) -> Result<tokio_serial::SerialStream> {
        let port = tokio_serial::new(path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| MonitorError::Serial(format!("Failed to open {}: {}", path, e)))?;

        Ok(port)
    }

    /// Build a link from any byte source and command sink.
    ///
    /// Spawns the line reader task, so this must run inside a tokio runtime.
    pub fn from_parts<R>(reader: R, writer: Box<dyn SerialPortIO>, device_path: &str) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, lines) = mpsc::channel(LINE_CHANNEL_CAPACITY);
        let reader = spawn_line_reader(reader, tx);
        Self {
            writer,
            lines,
            reader,
            device_path: device_path.to_string(),
        }
    }

    /// Wait for the next line from the device
    ///
    /// Cancel-safe: a line is never lost if the future is dropped.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(line))` - Line without its terminator
    /// * `Ok(None)` - The device closed the stream
    ///
    /// # Errors
    ///
    /// Returns error if reading from the device failed
    pub async fn next_line(&mut self) -> Result<Option<String>> {
        match self.lines.recv().await {
            Some(Ok(line)) => Ok(Some(line)),
            Some(Err(e)) => Err(MonitorError::Serial(format!(
                "Failed to read from {}: {}",
                self.device_path, e
            ))),
            None => Ok(None),
        }
    }

    /// Send an operator command string to the device
    ///
    /// # Errors
    ///
    /// Returns error if the write or flush fails
    pub async fn send_command(&mut self, command: &[u8]) -> Result<()> {
        self.writer.write_all(command).await
            .map_err(|e| MonitorError::Serial(format!("Failed to write command: {}", e)))?;

        self.writer.flush().await
            .map_err(|e| MonitorError::Serial(format!("Failed to flush serial port: {}", e)))?;

        debug!("Sent command ({} bytes)", command.len());
        Ok(())
    }

    /// Get the device path of the opened serial port
    pub fn device_path(&self) -> &str {
        &self.device_path
    }
}

/// Read newline-terminated lines and forward them until EOF, error, or the
/// receiver goes away.
///
/// Trailing `\r`/`\n` are stripped, blank lines are skipped, and invalid
/// UTF-8 is replaced rather than rejected. A line longer than
/// [`MAX_LINE_BYTES`] is discarded through its terminating newline.
fn spawn_line_reader<R>(reader: R, tx: mpsc::Sender<io::Result<String>>) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::with_capacity(LINE_BUFFER_CAPACITY);

        let mut discarding = false;

        loop {
            buf.clear();
            match (&mut reader).take(MAX_LINE_BYTES).read_until(b'\n', &mut buf).await {
                Ok(0) => {
                    debug!("Serial stream closed");
                    break;
                }
                Ok(_) => {
                    let terminated = buf.last() == Some(&b'\n');
                    if discarding {
                        discarding = !terminated;
                        continue;
                    }
                    if !terminated && buf.len() as u64 >= MAX_LINE_BYTES {
                        warn!("Dropping line longer than {} bytes", MAX_LINE_BYTES);
                        discarding = true;
                        continue;
                    }

                    let line = String::from_utf8_lossy(&buf)
                        .trim_end_matches(['\r', '\n'])
                        .to_string();
                    if line.is_empty() {
                        continue;
                    }
                    if tx.send(Ok(line)).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = tx.send(Err(e)).await;
                    break;
                }
            }
        }
    })
}
