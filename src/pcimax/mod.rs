//! # PCIMAX Protocol Module
//!
//! Implementation of the PCIMAX card's serial command protocol.
//!
//! This module handles:
//! - Field encodings (frequency, power, PI, AF, ECC, text)
//! - Command framing and inter-frame pacing
//! - Firmware-mandated command ordering for FM and RDS settings

pub mod protocol;
pub mod codec;
pub mod frame;
pub mod sequencer;
