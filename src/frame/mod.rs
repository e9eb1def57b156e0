//! # Uplink Frame Module
//!
//! Fixed-layout binary payload carried by the LoRa uplink.
//!
//! This module handles:
//! - Sample and position data types
//! - Fixed-point encoding of a reading into a 32-byte frame
//! - Decoding a frame back into engineering units (ground side and tests)

pub mod protocol;
pub mod encoder;
pub mod decoder;
