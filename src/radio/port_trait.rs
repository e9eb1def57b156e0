//! Modem link abstraction so envelopes can be checked without hardware
//!
//! The modem bridge acts on an envelope only once its CRC byte arrives, so a
//! port must push the whole envelope out before reporting success. A partial
//! write leaves the bridge waiting for the rest; it resynchronises on the
//! next `0x7E`.

use async_trait::async_trait;
use std::io;

/// Link to the LoRa modem bridge
#[async_trait]
pub trait ModemPort: Send {
    /// Write one complete envelope and drain it to the wire
    ///
    /// # Arguments
    ///
    /// * `envelope` - Sync byte through CRC, as built by
    ///   [`build_envelope`](super::serial::build_envelope)
    ///
    /// # Returns
    ///
    /// * `io::Result<()>` - Ok once the UART has accepted every byte
    async fn send_envelope(&mut self, envelope: &[u8]) -> io::Result<()>;
}

/// [`ModemPort`] over a `tokio_serial::SerialStream` (8N1, no flow control)
///
/// USB CDC modems buffer in the host driver, so the flush is what actually
/// hands the envelope to the bridge.
pub struct TokioModemPort {
    port: tokio_serial::SerialStream,
}

impl TokioModemPort {
    pub fn new(port: tokio_serial::SerialStream) -> Self {
        Self { port }
    }
}

#[async_trait]
impl ModemPort for TokioModemPort {
    async fn send_envelope(&mut self, envelope: &[u8]) -> io::Result<()> {
        use tokio::io::AsyncWriteExt;

        self.port.write_all(envelope).await?;
        self.port.flush().await
    }
}
