//! # Transmitter
//!
//! Single entry point that pushes a [`ConfigurationRecord`] to the card:
//! plan, open, configure, send, restore.

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::pcimax::frame::FrameWriter;
use crate::pcimax::protocol::Command;
use crate::pcimax::sequencer;
use crate::record::ConfigurationRecord;
use crate::serial::port_trait::{LineControl, SerialPortIO};
use crate::serial::SerialSession;

/// Apply `record` to the card at `device_path`
///
/// The record is validated before the device is opened. Once the line is
/// configured, its original attributes are restored before this returns,
/// whether sending succeeded or not.
///
/// Success means every frame was handed to the OS serial driver; the card
/// sends no acknowledgement.
///
/// # Errors
///
/// * `Validation` - a field is outside the protocol domain
/// * `DeviceOpen` - the device cannot be opened
/// * `Configuration` - the line attributes cannot be applied or restored
/// * `Transmission` - a frame could not be written
///
/// # Examples
///
/// ```no_run
/// use pcimax_ctl::record::ConfigurationRecord;
/// use pcimax_ctl::transmitter::apply;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> anyhow::Result<()> {
///     let mut record = ConfigurationRecord::default();
///     record.set_frequency(102_000)?.set_power(80)?;
///     record.set_stereo(true);
///
///     apply(&record, "/dev/ttyUSB0").await?;
///     Ok(())
/// }
/// ```
pub async fn apply(record: &ConfigurationRecord, device_path: &str) -> Result<()> {
    let commands = sequencer::plan(record)?;
    if commands.is_empty() {
        info!("Nothing to apply");
        return Ok(());
    }

    let session = SerialSession::open(device_path)?;
    send(session, &commands).await
}

/// Apply `record` over an already opened port
///
/// Same sequence as [`apply`], for any port implementation.
pub async fn apply_to_line<P>(record: &ConfigurationRecord, port: P) -> Result<()>
where
    P: SerialPortIO + LineControl,
{
    let commands = sequencer::plan(record)?;
    if commands.is_empty() {
        info!("Nothing to apply");
        return Ok(());
    }

    let session = SerialSession::start(port)?;
    send(session, &commands).await
}

async fn send<P>(mut session: SerialSession<P>, commands: &[Command]) -> Result<()>
where
    P: SerialPortIO + LineControl,
{
    info!("Sending {} commands", commands.len());

    let mut writer = FrameWriter::new(session.port_mut());
    let sent = writer.write_all(commands).await;
    let frames = writer.frames_sent();

    match sent {
        Ok(()) => {
            session.close()?;
            info!("Applied {} commands", frames);
            Ok(())
        }
        Err(e) => {
            debug!("Restoring serial line after failure at frame {}", frames + 1);
            // The send error wins over a restore error
            if let Err(restore_err) = session.close() {
                warn!("Failed to restore serial line settings: {}", restore_err);
            }
            Err(e)
        }
    }
}
