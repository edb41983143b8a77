//! # Frame Logger
//!
//! Persists every accepted frame to a rotating log file.
//!
//! Files are named `telemetry_<YYYY-MM-DD_HH-MM-SS>.<ext>` after the moment
//! they were opened, so lexical order is chronological. A file is rotated
//! once it is older than the configured rotation period, and only the newest
//! `max_files_to_keep` telemetry files are retained.
//!
//! ## Record Formats
//!
//! - **csv**: `[Mon Oct 19 12:00:00 2026],<timestamp>,<25 samples>`
//! - **jsonl**: `{"received_at":"...","frame":{...}}`

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Local, TimeDelta};
use serde::de::Error;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::LogConfig;
use crate::error::{MonitorError, Result};
use crate::protocol::frame::Frame;

/// File name prefix for telemetry logs
const FILE_PREFIX: &str = "telemetry_";

/// Timestamp layout used in file names
const FILE_TIME_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// ctime-style receive time written in each record
const RECORD_TIME_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// On-disk record format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Csv,
    Jsonl,
}

impl LogFormat {
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            LogFormat::Csv => "csv",
            LogFormat::Jsonl => "jsonl",
        }
    }
}

impl FromStr for LogFormat {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "csv" => Ok(LogFormat::Csv),
            "jsonl" => Ok(LogFormat::Jsonl),
            other => Err(MonitorError::Config(toml::de::Error::custom(format!(
                "unknown log format '{}' (expected 'csv' or 'jsonl')",
                other
            )))),
        }
    }
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    received_at: String,
    frame: &'a Frame,
}

enum LogSink {
    Csv(csv::Writer<File>),
    Jsonl(BufWriter<File>),
}

/// Rotating frame log writer
pub struct FrameLogger {
    dir: PathBuf,
    format: LogFormat,
    rotation: TimeDelta,
    max_files: usize,
    sink: LogSink,
    path: PathBuf,
    opened_at: DateTime<Local>,
}

impl std::fmt::Debug for FrameLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameLogger")
            .field("path", &self.path)
            .field("format", &self.format)
            .field("opened_at", &self.opened_at)
            .finish_non_exhaustive()
    }
}

impl FrameLogger {
    /// Create the log directory if needed and open the first log file.
    ///
    /// # Errors
    ///
    /// Returns error if the format is unknown or the file cannot be created.
    pub fn create(config: &LogConfig, now: DateTime<Local>) -> Result<Self> {
        let format: LogFormat = config.format.parse()?;
        let dir = PathBuf::from(&config.dir);
        fs::create_dir_all(&dir)?;

        let rotation = TimeDelta::try_seconds(config.rotation_secs as i64).ok_or_else(|| {
            MonitorError::Config(toml::de::Error::custom("rotation_secs out of range"))
        })?;

        let (sink, path) = open_sink(&dir, format, now)?;
        info!("Logging frames to {}", path.display());

        let logger = Self {
            dir,
            format,
            rotation,
            max_files: config.max_files_to_keep,
            sink,
            path,
            opened_at: now,
        };
        logger.prune()?;
        Ok(logger)
    }

    /// Path of the file currently being written
    #[must_use]
    pub fn current_path(&self) -> &Path {
        &self.path
    }

    /// Append one frame, then rotate if the current file has expired.
    ///
    /// # Arguments
    ///
    /// * `frame` - Accepted frame
    /// * `now` - Receive time, written as the record's first column
    ///
    /// # Errors
    ///
    /// Returns error if the record cannot be written or the next file opened.
    pub fn record(&mut self, frame: &Frame, now: DateTime<Local>) -> Result<()> {
        let received_at = now.format(RECORD_TIME_FORMAT).to_string();

        match &mut self.sink {
            LogSink::Csv(writer) => {
                let mut row = Vec::with_capacity(2 + frame.samples().len());
                row.push(format!("[{}]", received_at));
                row.push(frame.timestamp().to_string());
                row.extend(frame.samples().iter().map(|v| v.to_string()));
                writer.write_record(&row)?;
                writer.flush()?;
            }
            LogSink::Jsonl(writer) => {
                serde_json::to_writer(&mut *writer, &JsonRecord { received_at, frame })?;
                writer.write_all(b"\n")?;
                writer.flush()?;
            }
        }

        if now - self.opened_at > self.rotation {
            self.rotate(now)?;
        }
        Ok(())
    }

    fn rotate(&mut self, now: DateTime<Local>) -> Result<()> {
        let (sink, path) = open_sink(&self.dir, self.format, now)?;
        info!("Rotated frame log {} -> {}", self.path.display(), path.display());
        self.sink = sink;
        self.path = path;
        self.opened_at = now;
        self.prune()
    }

    /// Delete the oldest telemetry files beyond `max_files`.
    fn prune(&self) -> Result<()> {
        let suffix = format!(".{}", self.format.extension());
        let mut files: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.file_name()
                    .map(|name| {
                        let name = name.to_string_lossy();
                        name.starts_with(FILE_PREFIX) && name.ends_with(&suffix)
                    })
                    .unwrap_or(false)
            })
            .collect();

        if files.len() <= self.max_files {
            return Ok(());
        }

        files.sort();
        let excess = files.len() - self.max_files;
        for old in files.into_iter().filter(|p| *p != self.path).take(excess) {
            match fs::remove_file(&old) {
                Ok(()) => debug!("Removed old frame log {}", old.display()),
                Err(e) => warn!("Failed to remove old frame log {}: {}", old.display(), e),
            }
        }
        Ok(())
    }
}

fn open_sink(dir: &Path, format: LogFormat, now: DateTime<Local>) -> Result<(LogSink, PathBuf)> {
    let name = format!(
        "{}{}.{}",
        FILE_PREFIX,
        now.format(FILE_TIME_FORMAT),
        format.extension()
    );
    let path = dir.join(name);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let sink = match format {
        LogFormat::Csv => LogSink::Csv(
            csv::WriterBuilder::new()
                .has_headers(false)
                .terminator(csv::Terminator::Any(b'\n'))
                .from_writer(file),
        ),
        LogFormat::Jsonl => LogSink::Jsonl(BufWriter::new(file)),
    };
    Ok((sink, path))
}
