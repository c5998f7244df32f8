//! # pcimax-ctl Library
//!
//! Configure PCIMAX FM transmitter / RDS encoder cards over their serial
//! control line.
//!
//! This library provides the command encoding, framing and sequencing for
//! the card's byte protocol, plus a serial session that restores the line
//! settings it found.

pub mod config;
pub mod error;
pub mod pcimax;
pub mod record;
pub mod serial;
pub mod transmitter;
