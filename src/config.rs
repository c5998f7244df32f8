//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Only the `[serial]` section is required. The `[fm]` and `[rds]` sections
//! and every key inside them are optional; keys left out are not sent to the
//! card.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{PcimaxError, Result};
use crate::pcimax::codec;
use crate::record::{ConfigurationRecord, DecoderInformation, ProgramType};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub serial: SerialConfig,

    #[serde(default)]
    pub fm: FmConfig,

    #[serde(default)]
    pub rds: RdsConfig,
}

/// Serial port configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    #[serde(default = "default_device")]
    pub device: String,
}

/// FM transmitter settings
#[derive(Debug, Deserialize, Clone, Default)]
pub struct FmConfig {
    /// Frequency in kHz
    pub frequency: Option<u32>,
    /// Output power in percent
    pub power: Option<u8>,
    pub stereo: Option<bool>,
}

/// Program type as written in the file: `10` or `"10"`
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum PtyConfig {
    Number(u8),
    Code(String),
}

/// Extended country code as written in the file: `2`, `"2"` or `"E2"`
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum EccConfig {
    Number(u8),
    Text(String),
}

/// Decoder information flags
#[derive(Debug, Deserialize, Clone, Copy, Default)]
pub struct DiConfig {
    #[serde(default)]
    pub stereo: bool,
    #[serde(default)]
    pub artificial_head: bool,
    #[serde(default)]
    pub compressed: bool,
    #[serde(default)]
    pub dynamic_pty: bool,
}

/// RDS encoder settings
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RdsConfig {
    /// Program identification
    pub pi: Option<u16>,
    pub pty: Option<PtyConfig>,
    /// Station name
    pub ps: Option<String>,
    /// Radio text
    pub rt: Option<String>,
    pub ecc: Option<EccConfig>,
    /// Alternative frequencies in kHz
    pub af: Option<Vec<u32>>,
    pub tp: Option<bool>,
    pub ta: Option<bool>,
    pub ms: Option<bool>,
    pub di: Option<DiConfig>,
}

// Default value functions
fn default_device() -> String { "/dev/ttyUSB0".to_string() }

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use pcimax_ctl::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// let record = config.to_record()?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns `Config` for an empty device path and `Validation` for any
    /// value outside the protocol domain
    fn validate(&self) -> Result<()> {
        if self.serial.device.trim().is_empty() {
            return Err(PcimaxError::Config(toml::de::Error::custom(
                "serial device cannot be empty",
            )));
        }

        self.to_record().map(|_| ())
    }

    /// Build the record to apply from the `[fm]` and `[rds]` sections
    pub fn to_record(&self) -> Result<ConfigurationRecord> {
        let mut record = ConfigurationRecord::default();

        if let Some(khz) = self.fm.frequency {
            record.set_frequency(khz)?;
        }
        if let Some(percent) = self.fm.power {
            record.set_power(percent)?;
        }
        if let Some(stereo) = self.fm.stereo {
            record.set_stereo(stereo);
        }

        let rds = &self.rds;
        if let Some(pi) = rds.pi {
            record.set_program_identification(pi);
        }
        if let Some(pty) = &rds.pty {
            record.set_program_type(match pty {
                PtyConfig::Number(n) => ProgramType::Number(*n),
                PtyConfig::Code(code) => ProgramType::Code(code.clone()),
            })?;
        }
        if let Some(name) = &rds.ps {
            record.set_station_name(name)?;
        }
        if let Some(text) = &rds.rt {
            record.set_radio_text(text)?;
        }
        if let Some(ecc) = &rds.ecc {
            let code = match ecc {
                EccConfig::Number(n) => *n,
                EccConfig::Text(text) => codec::parse_extended_country_code(text)?,
            };
            record.set_extended_country_code(code)?;
        }
        if let Some(af) = &rds.af {
            record.set_alternative_frequencies(af)?;
        }
        if let Some(tp) = rds.tp {
            record.set_traffic_program(tp);
        }
        if let Some(ta) = rds.ta {
            record.set_traffic_announcement(ta);
        }
        if let Some(ms) = rds.ms {
            record.set_music_speech(ms);
        }
        if let Some(di) = rds.di {
            record.set_decoder_information(DecoderInformation {
                stereo: di.stereo,
                artificial_head: di.artificial_head,
                compressed: di.compressed,
                dynamic_pty: di.dynamic_pty,
            });
        }

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config() {
        let config = Config::parse("[serial]\n").unwrap();
        assert_eq!(config.serial.device, "/dev/ttyUSB0");
        assert!(config.to_record().unwrap().is_empty());
    }

    #[test]
    fn test_missing_serial_section() {
        assert!(matches!(
            Config::parse("[fm]\nfrequency = 102000\n"),
            Err(PcimaxError::Config(_))
        ));
    }

    #[test]
    fn test_empty_device() {
        let result = Config::parse("[serial]\ndevice = \"\"\n");
        assert!(matches!(result, Err(PcimaxError::Config(_))));
    }

    #[test]
    fn test_full_config_to_record() {
        let toml_content = r#"
[serial]
device = "/dev/ttyS1"

[fm]
frequency = 102000
power = 80
stereo = true

[rds]
pi = 0xABCD
pty = 10
ps = "RADIO1"
rt = "Hello"
ecc = "E2"
af = [87600, 99500]
tp = true
ta = false
ms = true
di = { stereo = true, compressed = true }
"#;

        let config = Config::parse(toml_content).unwrap();
        assert_eq!(config.serial.device, "/dev/ttyS1");

        let record = config.to_record().unwrap();
        assert_eq!(record.fm.frequency, Some(102_000));
        assert_eq!(record.fm.power, Some(80));
        assert_eq!(record.fm.stereo, Some(true));
        assert_eq!(record.rds.program_identification, Some(0xABCD));
        assert_eq!(record.rds.program_type, Some(ProgramType::Number(10)));
        assert_eq!(record.rds.station_name.as_deref(), Some("RADIO1"));
        assert_eq!(record.rds.radio_text.as_deref(), Some("Hello"));
        assert_eq!(record.rds.extended_country_code, Some(2));
        assert_eq!(record.rds.alternative_frequencies, Some(vec![87_600, 99_500]));
        assert_eq!(record.rds.traffic_announcement, Some(false));
        assert_eq!(
            record.rds.decoder_information,
            Some(DecoderInformation {
                stereo: true,
                artificial_head: false,
                compressed: true,
                dynamic_pty: false,
            })
        );
    }

    #[test]
    fn test_ecc_forms() {
        for ecc in ["ecc = 3", "ecc = \"3\"", "ecc = \"e3\"", "ecc = \"E3\""] {
            let config = Config::parse(&format!("[serial]\n[rds]\n{}\n", ecc)).unwrap();
            assert_eq!(config.to_record().unwrap().rds.extended_country_code, Some(3));
        }
    }

    #[test]
    fn test_pty_code_string() {
        let config = Config::parse("[serial]\n[rds]\npty = \"07\"\n").unwrap();
        assert_eq!(
            config.rds.pty,
            Some(PtyConfig::Code("07".to_string()))
        );
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        for line in [
            "[fm]\nfrequency = 120000",
            "[fm]\npower = 101",
            "[rds]\nps = \"NINE CHRS\"",
            "[rds]\necc = \"E7\"",
            "[rds]\naf = [88000, 88100, 88200, 88300, 88400, 88500, 88600, 88700]",
            "[rds]\npty = 40",
        ] {
            let result = Config::parse(&format!("[serial]\n{}\n", line));
            assert!(
                matches!(result, Err(PcimaxError::Validation(_))),
                "{} should be rejected",
                line
            );
        }
    }

    #[test]
    fn test_pi_above_u16_is_a_parse_error() {
        let result = Config::parse("[serial]\n[rds]\npi = 70000\n");
        assert!(matches!(result, Err(PcimaxError::Config(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let toml_content = r#"
[serial]
device = "/dev/ttyUSB1"

[fm]
frequency = 99500
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.serial.device, "/dev/ttyUSB1");
        assert!(config.to_record().unwrap().has_fm());
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/pcimax.toml");
        assert!(matches!(result, Err(PcimaxError::Io(_))));
    }
}
