//! Trait abstraction for serial line operations to enable testing

use async_trait::async_trait;
use std::io;

use crate::error::Result;

/// Trait for serial port I/O operations
#[async_trait]
pub trait SerialPortIO: Send {
    /// Write all data to the port
    async fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Flush the output buffer
    async fn flush(&mut self) -> io::Result<()>;
}

/// Trait for reading, changing and restoring line attributes
pub trait LineControl {
    /// Saved line attributes
    type Snapshot: Send;

    /// Read the current line attributes
    fn capture(&mut self) -> Result<Self::Snapshot>;

    /// Apply the settings the card needs, derived from the original ones
    fn configure(&mut self, original: &Self::Snapshot) -> Result<()>;

    /// Put back previously captured attributes
    fn restore(&mut self, snapshot: &Self::Snapshot) -> Result<()>;
}
