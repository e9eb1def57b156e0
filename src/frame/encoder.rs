//! # Uplink Frame Encoder
//!
//! Packs one environmental reading and an optional fix into an [`UplinkFrame`].

use super::protocol::*;
use crate::error::{NodeError, Result};

/// Encode a reading into a complete uplink frame
///
/// Physical quantities are scaled and truncated toward zero, then written as
/// big-endian `i16`. A scaled value outside the `i16` range keeps its low
/// 16 bits. Calendar fields are masked to their low byte and left at zero
/// when `fix` is `None`.
///
/// # Arguments
///
/// * `sample` - Environmental reading, all fields finite
/// * `fix` - Current satellite fix, if any
/// * `layout` - Whether latitude/longitude are emitted
///
/// # Errors
///
/// Returns [`NodeError::Encoding`] if an emitted value is NaN or infinite.
///
/// # Examples
///
/// ```
/// use lora_node::frame::encoder::encode_frame;
/// use lora_node::frame::protocol::{FrameLayout, TelemetrySample};
///
/// let sample = TelemetrySample { temperature: 21.5, humidity: 45.2, pressure: 1013.2, altitude: 123.45 };
/// let frame = encode_frame(&sample, None, FrameLayout::Calendar).unwrap();
/// assert_eq!(&frame.as_bytes()[..3], &[0x01, 0x08, 0x66]);
/// ```
pub fn encode_frame(
    sample: &TelemetrySample,
    fix: Option<&PositionFix>,
    layout: FrameLayout,
) -> Result<UplinkFrame> {
    let mut bytes = [0u8; FRAME_SIZE];
    bytes[OFFSET_TAG] = FRAME_FORMAT_TAG;

    let fields = [
        ("temperature", sample.temperature, TEMPERATURE_SCALE, OFFSET_TEMPERATURE),
        ("humidity", sample.humidity, HUMIDITY_SCALE, OFFSET_HUMIDITY),
        ("pressure", sample.pressure, PRESSURE_SCALE, OFFSET_PRESSURE),
        ("altitude", sample.altitude, ALTITUDE_SCALE, OFFSET_ALTITUDE),
    ];
    for (name, value, scale, offset) in fields {
        let raw = scale_to_i16(name, value, scale)?;
        bytes[offset..offset + 2].copy_from_slice(&raw.to_be_bytes());
    }

    if let Some(fix) = fix {
        let ts = &fix.timestamp;
        bytes[OFFSET_YEAR] = (ts.year & 0xFF) as u8;
        bytes[OFFSET_MONTH] = ts.month;
        bytes[OFFSET_DAY] = ts.day;
        bytes[OFFSET_HOUR] = ts.hour;
        bytes[OFFSET_MINUTE] = ts.minute;
        bytes[OFFSET_SECOND] = ts.second;

        if layout == FrameLayout::WithPosition {
            let latitude = scale_to_i32("latitude", fix.latitude, COORDINATE_SCALE)?;
            let longitude = scale_to_i32("longitude", fix.longitude, COORDINATE_SCALE)?;
            bytes[OFFSET_LATITUDE..OFFSET_LATITUDE + 4].copy_from_slice(&latitude.to_be_bytes());
            bytes[OFFSET_LONGITUDE..OFFSET_LONGITUDE + 4].copy_from_slice(&longitude.to_be_bytes());
        }
    }

    Ok(UplinkFrame::from_bytes(bytes))
}

/// Scale a value and keep the low 16 bits of its truncated integer part
fn scale_to_i16(name: &str, value: f64, scale: f64) -> Result<i16> {
    Ok(scale_truncated(name, value, scale)? as i16)
}

fn scale_to_i32(name: &str, value: f64, scale: f64) -> Result<i32> {
    Ok(scale_truncated(name, value, scale)? as i32)
}

fn scale_truncated(name: &str, value: f64, scale: f64) -> Result<i64> {
    if !value.is_finite() {
        return Err(NodeError::Encoding(format!("{} is not finite: {}", name, value)));
    }

    Ok((value * scale).trunc() as i64)
}
