//! # Field Codec
//!
//! Encodes individual configuration values into the byte representations
//! the PCIMAX firmware expects.
//!
//! The encodings differ per field. Frequency, power and country code carry
//! the reserved-byte offset (+4); the alternative-frequency code does not,
//! and program identification travels as decimal text.

use super::protocol::*;
use crate::error::{PcimaxError, Result};

/// Encode a transmit frequency into its two payload bytes
///
/// The frequency is expressed in 5 kHz steps and split into base-128 digits,
/// each lifted by the reserved-byte offset.
///
/// # Arguments
///
/// * `khz` - Frequency in kHz (87500-108000)
///
/// # Returns
///
/// * `Result<[u8; 2]>` - `[low, high]`
///
/// # Examples
///
/// ```
/// use pcimax_ctl::pcimax::codec::encode_frequency;
///
/// // 102.0 MHz -> 20400 fifths -> 159 * 128 + 48
/// assert_eq!(encode_frequency(102_000).unwrap(), [52, 163]);
/// ```
pub fn encode_frequency(khz: u32) -> Result<[u8; 2]> {
    if !(FREQUENCY_MIN_KHZ..=FREQUENCY_MAX_KHZ).contains(&khz) {
        return Err(PcimaxError::Validation(format!(
            "frequency {} kHz outside {}-{} kHz",
            khz, FREQUENCY_MIN_KHZ, FREQUENCY_MAX_KHZ
        )));
    }

    let fifth = khz / 5;
    let high = (fifth / 128) as u8 + RESERVED_BYTE_OFFSET;
    let low = (fifth % 128) as u8 + RESERVED_BYTE_OFFSET;
    Ok([low, high])
}

/// Encode output power (percent) into the card's 0x04..=0x19 range
///
/// # Errors
///
/// Returns `Validation` for values above 100
pub fn encode_power(percent: u8) -> Result<u8> {
    if percent > 100 {
        return Err(PcimaxError::Validation(format!(
            "power {}% outside 0-100%",
            percent
        )));
    }

    let steps = (f32::from(percent) / 100.0 * 21.0).round() as u8;
    Ok(steps + RESERVED_BYTE_OFFSET)
}

/// Encode an alternative frequency as a 100 kHz step above 87.5 MHz
///
/// 87.6 MHz is code 1, 108.0 MHz is code 205. No reserved-byte offset.
pub fn encode_alternative_frequency(khz: u32) -> Result<u8> {
    if !(ALT_FREQUENCY_MIN_KHZ..=FREQUENCY_MAX_KHZ).contains(&khz) {
        return Err(PcimaxError::Validation(format!(
            "alternative frequency {} kHz outside {}-{} kHz",
            khz, ALT_FREQUENCY_MIN_KHZ, FREQUENCY_MAX_KHZ
        )));
    }

    Ok(((khz - FREQUENCY_MIN_KHZ) / 100) as u8)
}

/// Encode the count byte sent ahead of the alternative-frequency slots
pub fn encode_alternative_frequency_count(count: usize) -> Result<u8> {
    if count > MAX_ALT_FREQUENCIES {
        return Err(PcimaxError::Validation(format!(
            "{} alternative frequencies given (max {})",
            count, MAX_ALT_FREQUENCIES
        )));
    }

    Ok(count as u8 + ALT_FREQUENCY_COUNT_BASE + RESERVED_BYTE_OFFSET)
}

/// Encode an extended country code index (0-4)
///
/// The card numbers codes from 1, then the reserved-byte offset applies.
pub fn encode_extended_country_code(code: u8) -> Result<u8> {
    if code > MAX_EXTENDED_COUNTRY_CODE {
        return Err(PcimaxError::Validation(format!(
            "extended country code {} outside 0-{}",
            code, MAX_EXTENDED_COUNTRY_CODE
        )));
    }

    Ok(code + 1 + RESERVED_BYTE_OFFSET)
}

/// Parse an extended country code written as `2`, `e2` or `E2`
pub fn parse_extended_country_code(text: &str) -> Result<u8> {
    let trimmed = text.trim();
    let digits = trimmed
        .strip_prefix('e')
        .or_else(|| trimmed.strip_prefix('E'))
        .unwrap_or(trimmed);

    let code: u8 = digits.parse().map_err(|_| {
        PcimaxError::Validation(format!("invalid extended country code {:?}", text))
    })?;

    encode_extended_country_code(code)?;
    Ok(code)
}

/// Split a program identification into `(high, low)` bytes
pub fn split_program_identification(pi: u16) -> (u8, u8) {
    let high = ((pi >> 8) & 0xFF) as u8;
    let low = (pi & 0xFF) as u8;
    (high, low)
}

/// Render a byte as exactly three zero-padded decimal digits
pub fn decimal_digits(value: u8) -> [u8; 3] {
    [
        b'0' + value / 100,
        b'0' + (value / 10) % 10,
        b'0' + value % 10,
    ]
}

/// Program identification as `(high, low)` three-digit decimal strings
///
/// # Examples
///
/// ```
/// use pcimax_ctl::pcimax::codec::program_identification_digits;
///
/// let (high, low) = program_identification_digits(0xABCD);
/// assert_eq!(&high, b"171");
/// assert_eq!(&low, b"205");
/// ```
pub fn program_identification_digits(pi: u16) -> ([u8; 3], [u8; 3]) {
    let (high, low) = split_program_identification(pi);
    (decimal_digits(high), decimal_digits(low))
}

/// Boolean as the single wire character `'1'` or `'0'`
pub fn encode_flag(value: bool) -> u8 {
    if value {
        b'1'
    } else {
        b'0'
    }
}

/// Space-pad text to exactly `width` bytes
///
/// # Errors
///
/// Returns `Validation` if the text is longer than `width` or contains
/// anything besides printable ASCII
pub fn pad_text(text: &str, width: usize) -> Result<Vec<u8>> {
    let mut bytes = text_bytes(text, width)?;
    bytes.resize(width, b' ');
    Ok(bytes)
}

/// Text as wire bytes, unpadded
///
/// # Errors
///
/// Same rules as [`pad_text`]
pub fn text_bytes(text: &str, max_len: usize) -> Result<Vec<u8>> {
    if let Some(c) = text.chars().find(|c| !(' '..='~').contains(c)) {
        return Err(PcimaxError::Validation(format!(
            "character {:?} in {:?} is not printable ASCII",
            c, text
        )));
    }

    if text.len() > max_len {
        return Err(PcimaxError::Validation(format!(
            "{:?} is {} characters (max {})",
            text,
            text.len(),
            max_len
        )));
    }

    Ok(text.as_bytes().to_vec())
}

/// Render a numeric program type (0-31) as its two-character code
pub fn program_type_code(pty: u8) -> Result<[u8; 2]> {
    if pty > MAX_PROGRAM_TYPE {
        return Err(PcimaxError::Validation(format!(
            "program type {} outside 0-{}",
            pty, MAX_PROGRAM_TYPE
        )));
    }

    Ok([b'0' + pty / 10, b'0' + pty % 10])
}
