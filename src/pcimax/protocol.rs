//! # PCIMAX Protocol Constants and Types
//!
//! Core protocol definitions for the PCIMAX serial command channel.

use bytes::Bytes;
use std::time::Duration;

use crate::error::{PcimaxError, Result};

/// Start of a new command
pub const FRAME_START: u8 = 0x00;

/// End of the command name, start of the payload
pub const FRAME_END_NAME: u8 = 0x01;

/// End of the payload
pub const FRAME_FINISH: u8 = 0x02;

/// Offset added to numeric payload bytes so they never collide with
/// the framing control codes 0x00..=0x02
pub const RESERVED_BYTE_OFFSET: u8 = 4;

/// Idle time the firmware needs after every frame (200ms, as used by the
/// vendor's own tool)
pub const SETTLE_DELAY: Duration = Duration::from_millis(200);

/// Serial line speed expected by the card
pub const BAUD_RATE: u32 = 9600;

/// Command name length limits
pub const COMMAND_NAME_MIN_LEN: usize = 2;
pub const COMMAND_NAME_MAX_LEN: usize = 4;

/// Maximum payload size of a single command
pub const MAX_PAYLOAD_SIZE: usize = 64;

/// FM frequency range in kHz
pub const FREQUENCY_MIN_KHZ: u32 = 87_500;
pub const FREQUENCY_MAX_KHZ: u32 = 108_000;

/// Lowest frequency an alternative-frequency code can express (code 1)
pub const ALT_FREQUENCY_MIN_KHZ: u32 = 87_600;

/// Maximum number of alternative frequencies the card holds
pub const MAX_ALT_FREQUENCIES: usize = 7;

/// Device magic added to the alternative-frequency count byte
pub const ALT_FREQUENCY_COUNT_BASE: u8 = 224;

/// Station name width (PS)
pub const STATION_NAME_LEN: usize = 8;

/// Radio text width (RT)
pub const RADIO_TEXT_LEN: usize = 64;

/// Highest extended country code index accepted
pub const MAX_EXTENDED_COUNTRY_CODE: u8 = 4;

/// Highest RDS program type
pub const MAX_PROGRAM_TYPE: u8 = 31;

/// Number of dynamic PS rotation slots on the card
pub const DYNAMIC_PS_SLOTS: usize = 40;

/// A single named command with its payload
///
/// Commands are built by the sequencer and consumed immediately by the
/// frame writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    name: String,
    payload: Bytes,
}

impl Command {
    /// Create a command, checking name and payload limits
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the name is not 2-4 printable ASCII
    /// characters or the payload exceeds 64 bytes
    pub fn new(name: impl Into<String>, payload: impl Into<Bytes>) -> Result<Self> {
        let name = name.into();
        let payload = payload.into();

        if name.len() < COMMAND_NAME_MIN_LEN
            || name.len() > COMMAND_NAME_MAX_LEN
            || !name.bytes().all(|b| b.is_ascii_graphic())
        {
            return Err(PcimaxError::Validation(format!(
                "invalid command name {:?}",
                name
            )));
        }

        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(PcimaxError::Validation(format!(
                "payload of {} is {} bytes (max {})",
                name,
                payload.len(),
                MAX_PAYLOAD_SIZE
            )));
        }

        Ok(Self { name, payload })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}
