//! # Serial Communication Module
//!
//! Handles the serial control line of the PCIMAX card.
//!
//! This module handles:
//! - Opening the device non-blocking, without becoming its controlling terminal
//! - Saving the original line attributes
//! - Configuring 9600 baud 8N1 raw mode with RTS and DTR asserted
//! - Restoring the original attributes exactly once when the session ends

pub mod port_trait;

use nix::sys::termios::{
    self, BaudRate, ControlFlags, FlushArg, InputFlags, LocalFlags, OutputFlags, SetArg,
    SpecialCharacterIndices, Termios,
};
use std::fs::OpenOptions;
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use tracing::{debug, info, warn};

use crate::error::{PcimaxError, Result};
use crate::pcimax::protocol::BAUD_RATE;
use port_trait::{LineControl, SerialPortIO};

nix::ioctl_write_ptr_bad!(tiocmbis, libc::TIOCMBIS, libc::c_int);

/// Serial port backed by a tty device and termios
pub struct TermiosPort {
    /// Device handle
    file: tokio::fs::File,
    /// Device path (e.g., /dev/ttyUSB0)
    device_path: String,
}

impl std::fmt::Debug for TermiosPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TermiosPort")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl TermiosPort {
    /// Open a tty device read/write
    ///
    /// # Arguments
    ///
    /// * `path` - Device path (e.g., "/dev/ttyUSB0")
    ///
    /// # Errors
    ///
    /// Returns `DeviceOpen` if the path does not exist or cannot be opened
    pub fn open(path: &str) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY | libc::O_NONBLOCK)
            .open(path)
            .map_err(|source| PcimaxError::DeviceOpen {
                path: path.to_string(),
                source,
            })?;

        debug!("Opened serial device {}", path);
        Ok(Self {
            file: tokio::fs::File::from_std(file),
            device_path: path.to_string(),
        })
    }

    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    /// Flush pending input, then apply `settings` immediately
    fn apply(&self, settings: &Termios) -> Result<()> {
        termios::tcflush(&self.file, FlushArg::TCIFLUSH).map_err(|e| {
            PcimaxError::Configuration(format!("tcflush on {} failed: {}", self.device_path, e))
        })?;

        termios::tcsetattr(&self.file, SetArg::TCSANOW, settings).map_err(|e| {
            PcimaxError::Configuration(format!("tcsetattr on {} failed: {}", self.device_path, e))
        })
    }

    fn assert_modem_lines(&self) -> Result<()> {
        let bits: libc::c_int = libc::TIOCM_RTS | libc::TIOCM_DTR;

        // SAFETY: the fd is owned by `self.file` and `bits` outlives the call
        unsafe { tiocmbis(self.file.as_raw_fd(), &bits) }.map_err(|e| {
            PcimaxError::Configuration(format!(
                "asserting RTS/DTR on {} failed: {}",
                self.device_path, e
            ))
        })?;
        Ok(())
    }
}

/// Line attributes the card expects, derived from the original ones
pub fn peripheral_settings(original: &Termios) -> Result<Termios> {
    let mut settings = original.clone();

    settings.input_flags = InputFlags::IGNPAR;
    settings.output_flags = OutputFlags::empty();
    settings.local_flags = LocalFlags::empty();
    settings.control_flags = ControlFlags::CS8 | ControlFlags::CLOCAL | ControlFlags::CREAD;
    settings.control_chars[SpecialCharacterIndices::VMIN as usize] = 1;
    settings.control_chars[SpecialCharacterIndices::VTIME as usize] = 0;

    termios::cfsetspeed(&mut settings, BaudRate::B9600)
        .map_err(|e| PcimaxError::Configuration(format!("cfsetspeed failed: {}", e)))?;

    Ok(settings)
}

#[async_trait::async_trait]
impl SerialPortIO for TermiosPort {
    async fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        use tokio::io::AsyncWriteExt;
        self.file.write_all(data).await
    }

    async fn flush(&mut self) -> io::Result<()> {
        use tokio::io::AsyncWriteExt;
        self.file.flush().await
    }
}

impl LineControl for TermiosPort {
    type Snapshot = Termios;

    fn capture(&mut self) -> Result<Termios> {
        termios::tcgetattr(&self.file).map_err(|e| {
            PcimaxError::Configuration(format!("tcgetattr on {} failed: {}", self.device_path, e))
        })
    }

    fn configure(&mut self, original: &Termios) -> Result<()> {
        let settings = peripheral_settings(original)?;
        self.apply(&settings)?;
        self.assert_modem_lines()
    }

    fn restore(&mut self, snapshot: &Termios) -> Result<()> {
        self.apply(snapshot)
    }
}

/// An open, configured serial line
///
/// Owns the port and the snapshot of its original attributes. The snapshot
/// is restored by [`SerialSession::close`], or on drop if the session ends
/// any other way, and never twice.
pub struct SerialSession<P: LineControl> {
    port: P,
    original: Option<P::Snapshot>,
}

impl<P: LineControl> std::fmt::Debug for SerialSession<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialSession")
            .field("restored", &self.original.is_none())
            .finish_non_exhaustive()
    }
}

impl SerialSession<TermiosPort> {
    /// Open `path` and configure it for the card
    ///
    /// # Errors
    ///
    /// * `DeviceOpen` - the device cannot be opened
    /// * `Configuration` - the line attributes cannot be read or applied
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use pcimax_ctl::serial::SerialSession;
    ///
    /// let session = SerialSession::open("/dev/ttyUSB0")?;
    /// session.close()?;
    /// # Ok::<(), pcimax_ctl::error::PcimaxError>(())
    /// ```
    pub fn open(path: &str) -> Result<Self> {
        let session = Self::start(TermiosPort::open(path)?)?;
        info!("Serial line {} configured ({} 8N1, RTS/DTR on)", path, BAUD_RATE);
        Ok(session)
    }
}

impl<P: SerialPortIO + LineControl> SerialSession<P> {
    /// Capture the port's attributes and configure it for the card
    ///
    /// If configuring fails the captured attributes are put back before the
    /// error is returned.
    pub fn start(mut port: P) -> Result<Self> {
        let original = port.capture()?;

        if let Err(e) = port.configure(&original) {
            if let Err(restore_err) = port.restore(&original) {
                warn!("Failed to restore serial line settings: {}", restore_err);
            }
            return Err(e);
        }

        Ok(Self {
            port,
            original: Some(original),
        })
    }

    /// The configured port, for writing frames
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Restore the original attributes and close the line
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the attributes cannot be restored
    pub fn close(mut self) -> Result<()> {
        self.restore_original()
    }
}

impl<P: LineControl> SerialSession<P> {
    fn restore_original(&mut self) -> Result<()> {
        match self.original.take() {
            Some(snapshot) => {
                self.port.restore(&snapshot)?;
                debug!("Original serial line settings restored");
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl<P: LineControl> Drop for SerialSession<P> {
    fn drop(&mut self) {
        if let Err(e) = self.restore_original() {
            warn!("Failed to restore serial line settings: {}", e);
        }
    }
}
