//! # Error Types
//!
//! Custom error types for pcimax-ctl using `thiserror`.

use thiserror::Error;

/// Main error type for pcimax-ctl
#[derive(Debug, Error)]
pub enum PcimaxError {
    /// The serial device path is missing or cannot be opened
    #[error("Unable to open device {path}: {source}")]
    DeviceOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Applying or restoring serial line attributes failed
    #[error("Serial line configuration error: {0}")]
    Configuration(String),

    /// A field value is outside the protocol domain
    #[error("Validation error: {0}")]
    Validation(String),

    /// A frame could not be written completely to the serial line
    #[error("Transmission error: {0}")]
    Transmission(String),

    /// Configuration file errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for pcimax-ctl
pub type Result<T> = std::result::Result<T, PcimaxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display() {
        let err = PcimaxError::Validation("power 120 out of range".into());
        assert_eq!(err.to_string(), "Validation error: power 120 out of range");
    }

    #[test]
    fn test_device_open_display_names_path() {
        let err = PcimaxError::DeviceOpen {
            path: "/dev/ttyUSB9".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(err.to_string().starts_with("Unable to open device /dev/ttyUSB9"));
    }
}
