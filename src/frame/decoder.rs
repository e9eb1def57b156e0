//! # Uplink Frame Decoder
//!
//! Turns a received payload back into engineering units. Used by ground-side
//! tooling and by the encoder's quantization checks.

use super::protocol::*;
use crate::error::{NodeError, Result};

/// Decoded contents of an uplink frame
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFrame {
    /// Reading, quantized to the frame resolution
    pub sample: TelemetrySample,

    /// Calendar fields, `None` when the node had no fix (all zero)
    pub timestamp: Option<UtcTimestamp>,

    /// `(latitude, longitude)` for [`FrameLayout::WithPosition`] frames with a fix
    pub position: Option<(f64, f64)>,
}

/// Decode a complete uplink frame
///
/// # Arguments
///
/// * `frame` - Raw payload as received from the network server
/// * `layout` - Layout the node was configured with when it encoded the frame
///
/// # Returns
///
/// * `Result<DecodedFrame>` - Sample in engineering units, with the timestamp
///   or position the layout carries
///
/// # Errors
///
/// Returns [`NodeError::Decode`] if the payload is not exactly
/// [`FRAME_SIZE`] bytes or the format tag is unknown.
pub fn decode_frame(frame: &[u8], layout: FrameLayout) -> Result<DecodedFrame> {
    if frame.len() != FRAME_SIZE {
        return Err(NodeError::Decode(format!(
            "Expected {} bytes, got {}",
            FRAME_SIZE,
            frame.len()
        )));
    }

    if frame[OFFSET_TAG] != FRAME_FORMAT_TAG {
        return Err(NodeError::Decode(format!(
            "Unknown format tag: 0x{:02X}",
            frame[OFFSET_TAG]
        )));
    }

    let read_i16 = |offset: usize| i16::from_be_bytes([frame[offset], frame[offset + 1]]) as f64;
    let read_i32 = |offset: usize| {
        i32::from_be_bytes([frame[offset], frame[offset + 1], frame[offset + 2], frame[offset + 3]]) as f64
    };

    let sample = TelemetrySample {
        temperature: read_i16(OFFSET_TEMPERATURE) / TEMPERATURE_SCALE,
        humidity: read_i16(OFFSET_HUMIDITY) / HUMIDITY_SCALE,
        pressure: read_i16(OFFSET_PRESSURE) / PRESSURE_SCALE,
        altitude: read_i16(OFFSET_ALTITUDE) / ALTITUDE_SCALE,
    };

    let calendar = &frame[OFFSET_YEAR..=OFFSET_SECOND];
    let timestamp = if calendar.iter().all(|&b| b == 0) {
        None
    } else {
        Some(UtcTimestamp {
            year: frame[OFFSET_YEAR] as u16,
            month: frame[OFFSET_MONTH],
            day: frame[OFFSET_DAY],
            hour: frame[OFFSET_HOUR],
            minute: frame[OFFSET_MINUTE],
            second: frame[OFFSET_SECOND],
        })
    };

    let position = match (layout, timestamp) {
        (FrameLayout::WithPosition, Some(_)) => Some((
            read_i32(OFFSET_LATITUDE) / COORDINATE_SCALE,
            read_i32(OFFSET_LONGITUDE) / COORDINATE_SCALE,
        )),
        _ => None,
    };

    Ok(DecodedFrame { sample, timestamp, position })
}
