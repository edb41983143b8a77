//! # Power Monitor
//!
//! Watch a satellite power board's debug link from the ground station.
//!
//! Reads telemetry frames from the serial port, shows them on a terminal
//! dashboard (or logs a periodic summary in headless mode), writes every
//! accepted frame to a rotating log and sends debug commands on request.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::time::Duration;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use power_monitor::config::{Config, LoggingConfig};
use power_monitor::dashboard::DashboardTerminal;
use power_monitor::serial::MonitorSerial;
use power_monitor::session::Session;

/// File name prefix for the application's own diagnostics
const DIAGNOSTIC_LOG_PREFIX: &str = "power-monitor.log";

/// Command line options; anything given here overrides the config file
#[derive(Debug, Parser)]
#[command(version, about = "Power subsystem debug link monitor")]
struct Cli {
    /// Serial device (tried before the configured fallbacks)
    serial_port: Option<String>,

    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Baud rate
    #[arg(short, long)]
    baud: Option<u32>,

    /// Log a periodic summary instead of drawing the dashboard
    #[arg(long)]
    headless: bool,
}

/// Load the config file (or defaults) and apply command line overrides
fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(port) = &cli.serial_port {
        config.serial.port = port.clone();
    }
    if let Some(baud) = cli.baud {
        config.serial.baud_rate = baud;
    }
    if cli.headless {
        config.dashboard.enabled = false;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Set up tracing.
///
/// The dashboard owns the terminal, so while it is shown diagnostics go to
/// a daily file under `logging.dir` instead of stdout. `RUST_LOG` wins over
/// the configured level.
fn init_tracing(logging: &LoggingConfig, to_file: bool) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    if !to_file {
        tracing_subscriber::fmt().with_env_filter(filter).init();
        return Ok(None);
    }

    std::fs::create_dir_all(&logging.dir)
        .with_context(|| format!("Failed to create log directory {}", logging.dir))?;
    let appender = tracing_appender::rolling::daily(&logging.dir, DIAGNOSTIC_LOG_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(Some(guard))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    let _guard = init_tracing(&config.logging, config.dashboard.enabled)?;

    info!("Power Monitor v{} starting...", env!("CARGO_PKG_VERSION"));

    let candidates = config.serial_candidates();
    let serial = MonitorSerial::open_with_paths(&candidates, config.serial.baud_rate)?;
    info!("Debug link opened at: {}", serial.device_path());

    let session = Session::from_config(&config)?;

    let ui = if config.dashboard.enabled {
        Some(DashboardTerminal::enter().context("Failed to set up the terminal")?)
    } else {
        None
    };

    let refresh = Duration::from_millis(config.dashboard.refresh_interval_ms);
    let stats = session.run(serial, ui, refresh).await?;
    info!("Total frames logged: {}", stats.accepted);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults_without_arguments() {
        let cli = Cli::try_parse_from(["power-monitor"]).unwrap();
        let config = resolve_config(&cli).unwrap();

        assert_eq!(config.serial.port, "/dev/ttyUSB0");
        assert_eq!(config.serial.baud_rate, 38400);
        assert!(config.dashboard.enabled);
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::try_parse_from([
            "power-monitor",
            "--baud",
            "115200",
            "--headless",
            "/dev/ttyACM3",
        ])
        .unwrap();
        let config = resolve_config(&cli).unwrap();

        assert_eq!(config.serial.port, "/dev/ttyACM3");
        assert_eq!(config.serial.baud_rate, 115200);
        assert!(!config.dashboard.enabled);
    }

    #[test]
    fn test_unsupported_baud_rejected() {
        let cli = Cli::try_parse_from(["power-monitor", "-b", "12345"]).unwrap();
        assert!(resolve_config(&cli).is_err());
    }

    #[test]
    fn test_cli_overrides_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[serial]\nport = \"/dev/ttyS1\"\nbaud_rate = 9600").unwrap();

        let path = file.path().to_string_lossy().into_owned();
        let cli = Cli::try_parse_from(["power-monitor", "--config", &path, "-b", "57600"]).unwrap();
        let config = resolve_config(&cli).unwrap();

        assert_eq!(config.serial.port, "/dev/ttyS1");
        assert_eq!(config.serial.baud_rate, 57600);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let cli = Cli::try_parse_from(["power-monitor", "-c", "/nonexistent/monitor.toml"]).unwrap();
        assert!(resolve_config(&cli).is_err());
    }
}
