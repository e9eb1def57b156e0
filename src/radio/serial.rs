//! # Serial LoRa Modem Bridge
//!
//! Hands uplink payloads to a LoRa modem attached over UART/USB. The modem
//! owns the LoRaWAN session (keys, MIC, channel plan); the host sends one
//! envelope per uplink:
//!
//! ```text
//! 0x7E | len | seq (u32 BE) | payload | crc8
//! ```
//!
//! `len` counts the sequence and payload bytes; the CRC covers `len` through
//! the end of the payload.

use std::time::Duration;

use bytes::{BufMut, BytesMut};
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info, warn};

use super::crc::crc8_dvb_s2;
use super::port_trait::{ModemPort, TokioModemPort};
use super::RadioTransport;
use crate::error::{NodeError, Result};

/// Envelope start byte
pub const ENVELOPE_SYNC: u8 = 0x7E;

/// Largest payload the modem bridge buffers in one envelope
pub const ENVELOPE_MAX_PAYLOAD: usize = 60;

/// Sync + length + sequence + CRC
const ENVELOPE_OVERHEAD: usize = 1 + 1 + 4 + 1;

/// Build the host-to-modem envelope for one uplink
///
/// # Errors
///
/// Returns [`NodeError::TransportFault`] if the payload is empty or longer
/// than `max_payload`.
pub fn build_envelope(payload: &[u8], sequence: u32, max_payload: usize) -> Result<BytesMut> {
    let max_payload = max_payload.min(ENVELOPE_MAX_PAYLOAD);

    if payload.is_empty() {
        return Err(NodeError::TransportFault("Empty payload".to_string()));
    }

    if payload.len() > max_payload {
        return Err(NodeError::TransportFault(format!(
            "Payload size {} exceeds modem limit {}",
            payload.len(),
            max_payload
        )));
    }

    let mut envelope = BytesMut::with_capacity(ENVELOPE_OVERHEAD + payload.len());
    envelope.put_u8(ENVELOPE_SYNC);
    envelope.put_u8((4 + payload.len()) as u8);
    envelope.put_u32(sequence);
    envelope.put_slice(payload);

    let crc = crc8_dvb_s2(&envelope[1..]);
    envelope.put_u8(crc);

    Ok(envelope)
}

/// Serial LoRa modem transport
pub struct SerialRadio<P: ModemPort = TokioModemPort> {
    port: P,
    device_path: String,
    max_payload: usize,
    write_timeout: Duration,
}

impl<P: ModemPort> std::fmt::Debug for SerialRadio<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialRadio")
            .field("device_path", &self.device_path)
            .field("max_payload", &self.max_payload)
            .finish_non_exhaustive()
    }
}

impl SerialRadio<TokioModemPort> {
    /// Open the modem, trying each device path in order
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::SerialPortNotFound`] if none of the paths opens.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use lora_node::radio::serial::SerialRadio;
    /// use std::time::Duration;
    ///
    /// # async fn run() -> lora_node::error::Result<()> {
    /// let radio = SerialRadio::open(&["/dev/ttyUSB0"], 57_600, 51, Duration::from_millis(500))?;
    /// println!("Modem at {}", radio.device_path());
    /// # Ok(())
    /// # }
    /// ```
    pub fn open(
        paths: &[&str],
        baud_rate: u32,
        max_payload: usize,
        write_timeout: Duration,
    ) -> Result<Self> {
        for path in paths {
            debug!("Trying to open modem port: {}", path);

            match Self::open_port(path, baud_rate) {
                Ok(port) => {
                    info!("Opened LoRa modem at {} ({} baud)", path, baud_rate);
                    return Ok(Self::with_port(
                        TokioModemPort::new(port),
                        path,
                        max_payload,
                        write_timeout,
                    ));
                }
                Err(e) => {
                    warn!("Failed to open {}: {}", path, e);
                }
            }
        }

        Err(NodeError::SerialPortNotFound(paths.join(", ")))
    }

    fn open_port(path: &str, baud_rate: u32) -> Result<tokio_serial::SerialStream> {
        tokio_serial::new(path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| NodeError::Serial(format!("Failed to open {}: {}", path, e)))
    }
}

impl<P: ModemPort> SerialRadio<P> {
    /// Wrap an already-open modem port
    ///
    /// # Arguments
    ///
    /// * `port` - Open link to the modem bridge
    /// * `device_path` - Device name, used in logs only
    /// * `max_payload` - Largest payload to accept (capped at [`ENVELOPE_MAX_PAYLOAD`])
    /// * `write_timeout` - How long one envelope may take to reach the modem
    ///
    /// # Returns
    ///
    /// * `SerialRadio<P>` - Transport ready for [`RadioTransport::submit`]
    pub fn with_port(port: P, device_path: &str, max_payload: usize, write_timeout: Duration) -> Self {
        Self {
            port,
            device_path: device_path.to_string(),
            max_payload,
            write_timeout,
        }
    }

    /// Device the modem was opened on
    pub fn device_path(&self) -> &str {
        &self.device_path
    }
}

#[async_trait::async_trait]
impl<P: ModemPort> RadioTransport for SerialRadio<P> {
    async fn submit(&mut self, payload: &[u8], sequence: u32) -> Result<()> {
        let envelope = build_envelope(payload, sequence, self.max_payload)?;

        match tokio::time::timeout(self.write_timeout, self.port.send_envelope(&envelope)).await {
            Ok(result) => result
                .map_err(|e| NodeError::TransportFault(format!("Failed to send envelope: {}", e)))?,
            Err(_) => {
                return Err(NodeError::TransportFault(format!(
                    "Modem write timed out after {:?}",
                    self.write_timeout
                )))
            }
        }

        debug!("Sent envelope seq={} ({} bytes) to {}", sequence, envelope.len(), self.device_path);
        Ok(())
    }
}
