//! # Configuration Record
//!
//! The set of values to push to the card. Every field is optional; only
//! fields that are `Some` are ever transmitted.
//!
//! ```
//! use pcimax_ctl::record::ConfigurationRecord;
//!
//! let mut record = ConfigurationRecord::default();
//! record.set_frequency(102_000)?.set_power(80)?.set_station_name("RADIO1")?;
//!
//! assert!(record.has_fm());
//! assert!(record.has_rds());
//! # Ok::<(), pcimax_ctl::error::PcimaxError>(())
//! ```

use crate::error::{PcimaxError, Result};
use crate::pcimax::codec;
use crate::pcimax::protocol::*;

/// FM transmitter settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FmSettings {
    /// Carrier frequency in kHz (87500-108000)
    pub frequency: Option<u32>,
    /// Output power in percent (0-100)
    pub power: Option<u8>,
    /// Stereo (true) or mono (false)
    pub stereo: Option<bool>,
}

impl FmSettings {
    pub fn is_empty(&self) -> bool {
        self.frequency.is_none() && self.power.is_none() && self.stereo.is_none()
    }
}

/// RDS decoder information flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderInformation {
    pub stereo: bool,
    pub artificial_head: bool,
    pub compressed: bool,
    pub dynamic_pty: bool,
}

/// RDS program type, as sent in the two-character `PTY` payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgramType {
    /// Numeric type 0-31, rendered as two decimal digits
    Number(u8),
    /// Raw two-character code
    Code(String),
}

impl ProgramType {
    /// Wire representation (exactly two bytes)
    pub fn to_bytes(&self) -> Result<[u8; 2]> {
        match self {
            ProgramType::Number(pty) => codec::program_type_code(*pty),
            ProgramType::Code(code) => {
                let bytes = codec::text_bytes(code, 2)?;
                match bytes.as_slice() {
                    [a, b] => Ok([*a, *b]),
                    _ => Err(PcimaxError::Validation(format!(
                        "program type code {:?} must be two characters",
                        code
                    ))),
                }
            }
        }
    }
}

/// RDS encoder settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RdsSettings {
    /// Program identification
    pub program_identification: Option<u16>,
    pub program_type: Option<ProgramType>,
    /// Program service name, up to 8 characters
    pub station_name: Option<String>,
    /// Radio text, up to 64 characters
    pub radio_text: Option<String>,
    /// Extended country code index (0-4)
    pub extended_country_code: Option<u8>,
    /// Alternative frequencies in kHz, at most 7
    pub alternative_frequencies: Option<Vec<u32>>,
    pub traffic_program: Option<bool>,
    pub traffic_announcement: Option<bool>,
    /// Music (true) or speech (false)
    pub music_speech: Option<bool>,
    pub decoder_information: Option<DecoderInformation>,
}

impl RdsSettings {
    pub fn is_empty(&self) -> bool {
        *self == RdsSettings::default()
    }
}

/// Fully resolved configuration to apply
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigurationRecord {
    pub fm: FmSettings,
    pub rds: RdsSettings,
}

impl ConfigurationRecord {
    /// True if no field at all is set
    pub fn is_empty(&self) -> bool {
        !self.has_fm() && !self.has_rds()
    }

    /// True if any FM field is set
    pub fn has_fm(&self) -> bool {
        !self.fm.is_empty()
    }

    /// True if any RDS field is set
    pub fn has_rds(&self) -> bool {
        !self.rds.is_empty()
    }

    pub fn set_frequency(&mut self, khz: u32) -> Result<&mut Self> {
        codec::encode_frequency(khz)?;
        self.fm.frequency = Some(khz);
        Ok(self)
    }

    pub fn set_power(&mut self, percent: u8) -> Result<&mut Self> {
        codec::encode_power(percent)?;
        self.fm.power = Some(percent);
        Ok(self)
    }

    pub fn set_stereo(&mut self, stereo: bool) -> &mut Self {
        self.fm.stereo = Some(stereo);
        self
    }

    pub fn set_program_identification(&mut self, pi: u16) -> &mut Self {
        self.rds.program_identification = Some(pi);
        self
    }

    pub fn set_program_type(&mut self, pty: ProgramType) -> Result<&mut Self> {
        pty.to_bytes()?;
        self.rds.program_type = Some(pty);
        Ok(self)
    }

    pub fn set_station_name(&mut self, name: &str) -> Result<&mut Self> {
        codec::text_bytes(name, STATION_NAME_LEN)?;
        self.rds.station_name = Some(name.to_string());
        Ok(self)
    }

    pub fn set_radio_text(&mut self, text: &str) -> Result<&mut Self> {
        codec::text_bytes(text, RADIO_TEXT_LEN)?;
        self.rds.radio_text = Some(text.to_string());
        Ok(self)
    }

    pub fn set_extended_country_code(&mut self, code: u8) -> Result<&mut Self> {
        codec::encode_extended_country_code(code)?;
        self.rds.extended_country_code = Some(code);
        Ok(self)
    }

    pub fn set_alternative_frequencies(&mut self, khz: &[u32]) -> Result<&mut Self> {
        codec::encode_alternative_frequency_count(khz.len())?;
        for &freq in khz {
            codec::encode_alternative_frequency(freq)?;
        }
        self.rds.alternative_frequencies = Some(khz.to_vec());
        Ok(self)
    }

    pub fn set_traffic_program(&mut self, tp: bool) -> &mut Self {
        self.rds.traffic_program = Some(tp);
        self
    }

    pub fn set_traffic_announcement(&mut self, ta: bool) -> &mut Self {
        self.rds.traffic_announcement = Some(ta);
        self
    }

    pub fn set_music_speech(&mut self, music: bool) -> &mut Self {
        self.rds.music_speech = Some(music);
        self
    }

    pub fn set_decoder_information(&mut self, di: DecoderInformation) -> &mut Self {
        self.rds.decoder_information = Some(di);
        self
    }

    /// Check every set field against the protocol domain
    ///
    /// Needed for records assembled by writing the public fields directly.
    ///
    /// # Errors
    ///
    /// Returns `Validation` naming the first offending field
    pub fn validate(&self) -> Result<()> {
        if let Some(khz) = self.fm.frequency {
            codec::encode_frequency(khz)?;
        }
        if let Some(percent) = self.fm.power {
            codec::encode_power(percent)?;
        }
        if let Some(pty) = &self.rds.program_type {
            pty.to_bytes()?;
        }
        if let Some(name) = &self.rds.station_name {
            codec::text_bytes(name, STATION_NAME_LEN)?;
        }
        if let Some(text) = &self.rds.radio_text {
            codec::text_bytes(text, RADIO_TEXT_LEN)?;
        }
        if let Some(code) = self.rds.extended_country_code {
            codec::encode_extended_country_code(code)?;
        }
        if let Some(list) = &self.rds.alternative_frequencies {
            codec::encode_alternative_frequency_count(list.len())?;
            for &khz in list {
                codec::encode_alternative_frequency(khz)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_record_is_empty() {
        let record = ConfigurationRecord::default();
        assert!(record.is_empty());
        assert!(!record.has_fm());
        assert!(!record.has_rds());
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_groups_follow_set_fields() {
        let mut record = ConfigurationRecord::default();
        record.set_stereo(false);
        assert!(record.has_fm());
        assert!(!record.has_rds());

        let mut record = ConfigurationRecord::default();
        record.set_traffic_program(false);
        assert!(!record.has_fm());
        assert!(record.has_rds());
    }

    #[test]
    fn test_empty_alternative_frequency_list_counts_as_rds() {
        let mut record = ConfigurationRecord::default();
        record.set_alternative_frequencies(&[]).unwrap();
        assert!(record.has_rds());
    }

    #[test]
    fn test_setters_reject_out_of_range() {
        let mut record = ConfigurationRecord::default();
        assert!(record.set_frequency(80_000).is_err());
        assert!(record.set_power(101).is_err());
        assert!(record.set_extended_country_code(5).is_err());
        assert!(record.set_station_name("TOO LONG NAME").is_err());
        assert!(record.set_radio_text(&"x".repeat(65)).is_err());
        assert!(record
            .set_alternative_frequencies(&[88_000; 8])
            .is_err());
        assert!(record.set_alternative_frequencies(&[87_500]).is_err());
        assert!(record.set_program_type(ProgramType::Number(32)).is_err());
        assert!(record
            .set_program_type(ProgramType::Code("ABC".into()))
            .is_err());

        // Rejected values leave the record untouched
        assert!(record.is_empty());
    }

    #[test]
    fn test_validate_catches_direct_field_writes() {
        let mut record = ConfigurationRecord::default();
        record.fm.power = Some(150);
        assert!(matches!(record.validate(), Err(PcimaxError::Validation(_))));

        let mut record = ConfigurationRecord::default();
        record.rds.station_name = Some("ÄÖÜ".into());
        assert!(record.validate().is_err());

        let mut record = ConfigurationRecord::default();
        record.rds.alternative_frequencies = Some(vec![90_000; 9]);
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_program_type_bytes() {
        assert_eq!(ProgramType::Number(5).to_bytes().unwrap(), *b"05");
        assert_eq!(ProgramType::Code("10".into()).to_bytes().unwrap(), *b"10");
        assert!(ProgramType::Code("1".into()).to_bytes().is_err());
    }
}
