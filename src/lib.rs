//! # LoRa Node Library
//!
//! Periodic environmental and GPS telemetry over a LoRa uplink.
//!
//! This library provides the capture-to-frame pipeline: collaborator traits
//! for the sensor, positioning receiver and radio, the fixed-layout frame
//! encoder, and the cadence scheduler that ties them together.

pub mod config;
pub mod error;
pub mod frame;
pub mod radio;
pub mod scheduler;
pub mod sequence;
pub mod source;
pub mod telemetry;
