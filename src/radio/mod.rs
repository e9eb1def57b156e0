//! # Radio Module
//!
//! Uplink transports that take an encoded frame and a sequence number and
//! put them on the air.
//!
//! This module handles:
//! - The [`RadioTransport`] seam consumed by the scheduler
//! - Serial LoRa modem bridge ([`serial::SerialRadio`])
//! - Dry-run transport that only logs ([`LogRadio`])
//!
//! Link-layer framing, encryption and duty-cycle management belong to the
//! modem; transports here deliver the application payload only.

pub mod crc;
pub mod port_trait;
pub mod serial;

use async_trait::async_trait;
use tracing::info;

use crate::error::Result;
use crate::frame::protocol::hex_string;

/// Over-the-air uplink
#[async_trait]
pub trait RadioTransport: Send {
    /// Submit one payload tagged with its sequence number
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::NodeError::TransportFault`] if the payload
    /// could not be handed to the radio.
    async fn submit(&mut self, payload: &[u8], sequence: u32) -> Result<()>;
}

/// Transport that logs frames instead of sending them
#[derive(Debug, Default)]
pub struct LogRadio {
    submitted: u64,
}

impl LogRadio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames accepted so far
    pub fn submitted(&self) -> u64 {
        self.submitted
    }
}

#[async_trait]
impl RadioTransport for LogRadio {
    async fn submit(&mut self, payload: &[u8], sequence: u32) -> Result<()> {
        info!("[dry run] seq={} len={} payload={}", sequence, payload.len(), hex_string(payload));
        self.submitted += 1;
        Ok(())
    }
}
