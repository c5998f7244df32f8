//! # Command Sequencer
//!
//! Turns a [`ConfigurationRecord`] into the ordered command list the card
//! firmware expects. The firmware is stateful and order-sensitive, so the
//! order produced here is part of the protocol.
//!
//! All field validation happens while planning, before any byte is sent.

use bytes::Bytes;
use tracing::warn;

use super::codec;
use super::protocol::*;
use crate::error::Result;
use crate::record::{ConfigurationRecord, FmSettings, RdsSettings};

/// Payload used to clear an alternative-frequency slot
const EMPTY_SLOT: &[u8] = b"0";

/// Payload that disables a dynamic PS slot
const DISABLED_PS_SLOT: &[u8] = b"NULL";

fn command(name: impl Into<String>, payload: impl Into<Bytes>) -> Result<Command> {
    Command::new(name, payload)
}

fn flag_command(name: &str, value: bool) -> Result<Command> {
    command(name, vec![codec::encode_flag(value)])
}

/// Plan both groups: FM first, then RDS
///
/// # Examples
///
/// ```
/// use pcimax_ctl::pcimax::sequencer::plan;
/// use pcimax_ctl::record::ConfigurationRecord;
///
/// let mut record = ConfigurationRecord::default();
/// record.set_stereo(true);
///
/// let names: Vec<_> = plan(&record)?.iter().map(|c| c.name().to_string()).collect();
/// assert_eq!(names, ["FS", "FW"]);
/// # Ok::<(), pcimax_ctl::error::PcimaxError>(())
/// ```
pub fn plan(record: &ConfigurationRecord) -> Result<Vec<Command>> {
    let mut commands = Vec::new();
    if record.has_fm() {
        commands.extend(plan_fm(&record.fm)?);
    }
    if record.has_rds() {
        commands.extend(plan_rds(&record.rds)?);
    }
    Ok(commands)
}

/// Plan the FM transmitter group
///
/// Ends with `FW`, which commits the settings; without it they are lost on
/// power cycle.
pub fn plan_fm(fm: &FmSettings) -> Result<Vec<Command>> {
    let mut commands = Vec::with_capacity(4);

    if let Some(stereo) = fm.stereo {
        commands.push(flag_command("FS", stereo)?);
    }
    if let Some(khz) = fm.frequency {
        commands.push(command("FF", codec::encode_frequency(khz)?.to_vec())?);
    }
    if let Some(percent) = fm.power {
        commands.push(command("FO", vec![codec::encode_power(percent)?])?);
    }
    commands.push(command("FW", Bytes::from_static(b"0"))?);

    Ok(commands)
}

/// Plan the RDS encoder group
pub fn plan_rds(rds: &RdsSettings) -> Result<Vec<Command>> {
    let mut commands = Vec::new();

    commands.push(command("PWR", Bytes::from_static(b"1"))?);

    if let Some(pi) = rds.program_identification {
        let (high, low) = codec::program_identification_digits(pi);
        commands.push(command("CCAC", low.to_vec())?);
        commands.push(command("PREF", high.to_vec())?);
    }

    if let Some(pty) = &rds.program_type {
        commands.push(command("PTY", pty.to_bytes()?.to_vec())?);
    }

    if let Some(tp) = rds.traffic_program {
        commands.push(flag_command("TP", tp)?);
    }
    if let Some(ta) = rds.traffic_announcement {
        commands.push(flag_command("TA", ta)?);
    }
    if let Some(ms) = rds.music_speech {
        commands.push(flag_command("MS", ms)?);
    }

    if let Some(di) = rds.decoder_information {
        commands.push(flag_command("Did0", di.stereo)?);
        commands.push(flag_command("Did1", di.artificial_head)?);
        commands.push(flag_command("Did2", di.compressed)?);
        commands.push(flag_command("Did3", di.dynamic_pty)?);
    }

    let afs = rds.alternative_frequencies.as_deref().unwrap_or(&[]);
    commands.extend(alternative_frequency_commands(afs)?);

    if let Some(code) = rds.extended_country_code {
        commands.push(command(
            "ECC",
            vec![codec::encode_extended_country_code(code)?],
        )?);
    }

    if let Some(text) = &rds.radio_text {
        commands.extend(radio_text_commands(text)?);
    }

    if let Some(name) = &rds.station_name {
        commands.extend(station_name_commands(name)?);
    }

    Ok(commands)
}

/// `AF0` count followed by all seven slots
///
/// Sent even for an empty list so stale entries on the card are cleared.
pub fn alternative_frequency_commands(khz: &[u32]) -> Result<Vec<Command>> {
    let mut commands = Vec::with_capacity(MAX_ALT_FREQUENCIES + 1);
    commands.push(command(
        "AF0",
        vec![codec::encode_alternative_frequency_count(khz.len())?],
    )?);

    for slot in 0..MAX_ALT_FREQUENCIES {
        let name = format!("AF{}", slot + 1);
        match khz.get(slot) {
            Some(&freq) => {
                let code = codec::encode_alternative_frequency(freq)?;
                if code <= FRAME_FINISH {
                    warn!(
                        "Alternative frequency {} kHz encodes to framing byte {:#04x}",
                        freq, code
                    );
                }
                commands.push(command(name, vec![code])?);
            }
            None => commands.push(command(name, Bytes::from_static(EMPTY_SLOT))?),
        }
    }

    Ok(commands)
}

/// Blank the full radio text buffer, then send the new text
///
/// The card overwrites rather than truncates, so a shorter text would
/// otherwise keep the tail of the previous one.
pub fn radio_text_commands(text: &str) -> Result<Vec<Command>> {
    Ok(vec![
        command("RT", vec![b' '; RADIO_TEXT_LEN])?,
        command("RT", codec::text_bytes(text, RADIO_TEXT_LEN)?)?,
    ])
}

/// Static station name plus disabling of every dynamic PS slot
///
/// Unused rotation slots would otherwise interleave stale text with the
/// static name.
pub fn station_name_commands(name: &str) -> Result<Vec<Command>> {
    let mut commands = Vec::with_capacity(2 + 2 * DYNAMIC_PS_SLOTS - 1);

    commands.push(command("PS00", vec![b' '; STATION_NAME_LEN])?);
    commands.push(command("PS00", codec::pad_text(name, STATION_NAME_LEN)?)?);

    for slot in 1..DYNAMIC_PS_SLOTS {
        commands.push(command(
            format!("PS{:02}", slot),
            Bytes::from_static(DISABLED_PS_SLOT),
        )?);
    }

    commands.push(command("PD00", Bytes::from_static(b"1"))?);
    for slot in 1..DYNAMIC_PS_SLOTS {
        commands.push(command(format!("PD{:02}", slot), Bytes::from_static(b"0"))?);
    }

    Ok(commands)
}
