//! Trait abstraction for the serial write path to enable testing

use async_trait::async_trait;
use std::io;
use tokio::io::WriteHalf;

/// Trait for serial port write operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SerialPortIO: Send {
    /// Write all data to the port
    async fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Flush the output buffer
    async fn flush(&mut self) -> io::Result<()>;
}

/// Write half of a tokio_serial::SerialStream that implements SerialPortIO
pub struct TokioSerialPort {
    port: WriteHalf<tokio_serial::SerialStream>,
}

impl TokioSerialPort {
    pub fn new(port: WriteHalf<tokio_serial::SerialStream>) -> Self {
        Self { port }
    }
}

#[async_trait]
impl SerialPortIO for TokioSerialPort {
    async fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        use tokio::io::AsyncWriteExt;
        self.port.write_all(data).await
    }

    async fn flush(&mut self) -> io::Result<()> {
        use tokio::io::AsyncWriteExt;
        self.port.flush().await
    }
}
