//! # PCIMAX Frame Writer
//!
//! Renders commands onto the wire and paces them.
//!
//! Frame layout:
//! ```text
//! 0x00 <command name> 0x01 <payload> 0x02
//! ```
//!
//! The firmware drops or corrupts a frame that follows the previous one too
//! closely, so every frame is followed by a fixed settle delay.

use bytes::{BufMut, Bytes, BytesMut};
use std::time::Duration;
use tracing::debug;

use super::protocol::*;
use crate::error::{PcimaxError, Result};
use crate::serial::port_trait::SerialPortIO;

/// Encode a command into a complete frame
///
/// # Examples
///
/// ```
/// use pcimax_ctl::pcimax::frame::encode_frame;
/// use pcimax_ctl::pcimax::protocol::Command;
///
/// let command = Command::new("FF", vec![10u8, 20]).unwrap();
/// let frame = encode_frame(&command);
/// assert_eq!(&frame[..], &[0x00, b'F', b'F', 0x01, 10, 20, 0x02]);
/// ```
pub fn encode_frame(command: &Command) -> Bytes {
    let name = command.name().as_bytes();
    let payload = command.payload();

    let mut frame = BytesMut::with_capacity(name.len() + payload.len() + 3);
    frame.put_u8(FRAME_START);
    frame.put_slice(name);
    frame.put_u8(FRAME_END_NAME);
    frame.put_slice(payload);
    frame.put_u8(FRAME_FINISH);
    frame.freeze()
}

/// Sole writer of frames to a serial channel
pub struct FrameWriter<'a, P: SerialPortIO + ?Sized> {
    port: &'a mut P,
    settle_delay: Duration,
    frames_sent: usize,
}

impl<'a, P: SerialPortIO + ?Sized> FrameWriter<'a, P> {
    /// Create a writer using the protocol settle delay
    pub fn new(port: &'a mut P) -> Self {
        Self {
            port,
            settle_delay: SETTLE_DELAY,
            frames_sent: 0,
        }
    }

    /// Number of frames completely written so far
    pub fn frames_sent(&self) -> usize {
        self.frames_sent
    }

    /// Write one command and wait for the card to settle
    ///
    /// # Errors
    ///
    /// Returns `Transmission` if the channel fails or accepts only part of
    /// the frame
    pub async fn write(&mut self, command: &Command) -> Result<()> {
        let frame = encode_frame(command);

        self.port.write_all(&frame).await.map_err(|e| {
            PcimaxError::Transmission(format!("Failed to write {} frame: {}", command.name(), e))
        })?;

        self.port.flush().await.map_err(|e| {
            PcimaxError::Transmission(format!("Failed to flush {} frame: {}", command.name(), e))
        })?;

        self.frames_sent += 1;
        debug!(
            "Sent {} ({} payload bytes)",
            command.name(),
            command.payload().len()
        );

        tokio::time::sleep(self.settle_delay).await;
        Ok(())
    }

    /// Write commands in order, stopping at the first failure
    pub async fn write_all(&mut self, commands: &[Command]) -> Result<()> {
        for command in commands {
            if let Err(e) = self.write(command).await {
                debug!(
                    "Aborting after {} of {} frames",
                    self.frames_sent,
                    commands.len()
                );
                return Err(e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serial::port_trait::mocks::MockSerialPort;
    use tokio::time::Instant;

    fn command(name: &str, payload: &[u8]) -> Command {
        Command::new(name, payload.to_vec()).unwrap()
    }

    #[test]
    fn test_encode_frame_layout() {
        let frame = encode_frame(&command("FF", &[10, 20]));
        assert_eq!(frame.len(), 7);
        assert_eq!(&frame[..], &[0x00, b'F', b'F', 0x01, 10, 20, 0x02]);
    }

    #[test]
    fn test_encode_frame_empty_payload() {
        let frame = encode_frame(&command("FW", &[]));
        assert_eq!(&frame[..], &[0x00, b'F', b'W', 0x01, 0x02]);
    }

    #[test]
    fn test_encode_frame_four_char_name() {
        let frame = encode_frame(&command("PS00", b"RADIO1  "));
        assert_eq!(frame.len(), 4 + 8 + 3);
        assert_eq!(&frame[1..5], b"PS00");
        assert_eq!(frame[5], FRAME_END_NAME);
        assert_eq!(frame[frame.len() - 1], FRAME_FINISH);
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_sends_one_frame_and_settles() {
        let mut port = MockSerialPort::new();
        let start = Instant::now();

        let mut writer = FrameWriter::new(&mut port);
        writer.write(&command("FS", b"1")).await.unwrap();
        assert_eq!(writer.frames_sent(), 1);

        assert!(start.elapsed() >= SETTLE_DELAY);
        assert_eq!(
            port.get_written_data(),
            vec![vec![0x00, b'F', b'S', 0x01, b'1', 0x02]]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_all_paces_every_frame() {
        let mut port = MockSerialPort::new();
        let commands = vec![
            command("FS", b"1"),
            command("FF", &[52, 163]),
            command("FW", b"0"),
        ];
        let start = Instant::now();

        FrameWriter::new(&mut port).write_all(&commands).await.unwrap();

        assert!(start.elapsed() >= SETTLE_DELAY * 3);
        assert_eq!(port.get_written_data().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_error_is_transmission_error() {
        let mut port = MockSerialPort::new();
        port.set_write_error(std::io::ErrorKind::BrokenPipe);

        let result = FrameWriter::new(&mut port).write(&command("FS", b"1")).await;
        assert!(matches!(result, Err(PcimaxError::Transmission(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_error_is_transmission_error() {
        let mut port = MockSerialPort::new();
        port.set_flush_error(std::io::ErrorKind::TimedOut);

        let result = FrameWriter::new(&mut port).write(&command("FS", b"1")).await;
        assert!(matches!(result, Err(PcimaxError::Transmission(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_all_stops_at_first_failure() {
        let mut port = MockSerialPort::new();
        port.fail_after_writes(2);
        let commands = vec![
            command("FS", b"1"),
            command("FF", &[52, 163]),
            command("FO", &[21]),
            command("FW", b"0"),
        ];

        let mut writer = FrameWriter::new(&mut port);
        let result = writer.write_all(&commands).await;
        assert!(matches!(result, Err(PcimaxError::Transmission(_))));
        assert_eq!(writer.frames_sent(), 2);

        assert_eq!(port.get_written_data().len(), 2);
    }
}
