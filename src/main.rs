//! # pcimax-ctl
//!
//! Push FM transmitter and RDS settings to a PCIMAX card.
//!
//! Usage:
//! ```text
//! pcimax-ctl [CONFIG]
//! ```
//!
//! `CONFIG` defaults to `config/default.toml`. Only the keys present in the
//! file are sent to the card.

use anyhow::{Context, Result};
use tracing::{info, warn};

use pcimax_ctl::config::Config;
use pcimax_ctl::transmitter;

/// Configuration file used when no path is given
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Main entry point for pcimax-ctl
///
/// # Control Flow
///
/// 1. Set up logging with tracing subscriber
/// 2. Load and validate the configuration file
/// 3. Apply it to the card: every command is followed by a 200ms pause,
///    so a full RDS update takes around 20 seconds
///
/// # Errors
///
/// Returns error if:
/// - The configuration cannot be read or holds out-of-range values
/// - The serial device cannot be opened or configured
/// - A command cannot be written
/// - Ctrl+C arrives before every command was sent (the serial line is
///   still restored)
///
/// Expected output:
/// ```text
/// INFO pcimax_ctl: pcimax-ctl v0.1.0 starting...
/// INFO pcimax_ctl::serial: Serial line /dev/ttyUSB0 configured (9600 8N1, RTS/DTR on)
/// INFO pcimax_ctl::transmitter: Sending 107 commands
/// INFO pcimax_ctl::transmitter: Applied 107 commands
/// ```
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("pcimax-ctl v{} starting...", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;
    let record = config.to_record()?;

    // Dropping the apply future on Ctrl+C ends the serial session, which
    // puts the original line settings back
    tokio::select! {
        result = transmitter::apply(&record, &config.serial.device) => {
            result.with_context(|| {
                format!("Failed to configure card on {}", config.serial.device)
            })?;
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, card may hold a partial update");
            anyhow::bail!("Interrupted before all commands were sent");
        }
    }

    info!("Done");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_path() {
        assert_eq!(DEFAULT_CONFIG_PATH, "config/default.toml");
    }

    #[test]
    fn test_shipped_config_is_valid() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/default.toml");
        let config = Config::load(path).unwrap();
        let record = config.to_record().unwrap();
        assert!(record.has_fm());
        assert!(record.has_rds());
    }
}
