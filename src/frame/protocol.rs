//! # Uplink Frame Constants and Types
//!
//! Wire layout (32 bytes, big-endian multi-byte fields):
//!
//! | Offset | Field | Encoding |
//! |--------|-------|----------|
//! | 0 | format tag | `0x01` |
//! | 1-2 | temperature | i16, 0.01 °C |
//! | 3-4 | humidity | i16, 0.01 %RH |
//! | 5-6 | pressure | i16, 0.1 hPa |
//! | 7-8 | altitude | i16, 0.01 m |
//! | 9-14 | year (low byte), month, day, hour, minute, second | u8 each |
//! | 15-18 | latitude ([`FrameLayout::WithPosition`] only) | i32, 0.0001° |
//! | 19-22 | longitude ([`FrameLayout::WithPosition`] only) | i32, 0.0001° |
//! | 23-31 | reserved | zero |

use serde::{Deserialize, Serialize};

/// Total frame size in bytes
pub const FRAME_SIZE: usize = 32;

/// Format tag carried in byte 0
pub const FRAME_FORMAT_TAG: u8 = 0x01;

/// Field offsets
pub const OFFSET_TAG: usize = 0;
pub const OFFSET_TEMPERATURE: usize = 1;
pub const OFFSET_HUMIDITY: usize = 3;
pub const OFFSET_PRESSURE: usize = 5;
pub const OFFSET_ALTITUDE: usize = 7;
pub const OFFSET_YEAR: usize = 9;
pub const OFFSET_MONTH: usize = 10;
pub const OFFSET_DAY: usize = 11;
pub const OFFSET_HOUR: usize = 12;
pub const OFFSET_MINUTE: usize = 13;
pub const OFFSET_SECOND: usize = 14;
pub const OFFSET_LATITUDE: usize = 15;
pub const OFFSET_LONGITUDE: usize = 19;

/// Fixed-point scale factors (raw = value × scale, truncated toward zero)
pub const TEMPERATURE_SCALE: f64 = 100.0;
pub const HUMIDITY_SCALE: f64 = 100.0;
pub const PRESSURE_SCALE: f64 = 10.0;
pub const ALTITUDE_SCALE: f64 = 100.0;
pub const COORDINATE_SCALE: f64 = 10_000.0;

/// One environmental reading in engineering units
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TelemetrySample {
    /// Temperature in °C
    pub temperature: f64,

    /// Relative humidity in %
    pub humidity: f64,

    /// Barometric pressure in hPa
    pub pressure: f64,

    /// Altitude in meters
    pub altitude: f64,
}

/// UTC time of a positioning fix, as reported by the receiver
///
/// Field ranges are receiver-defined. Some receivers report a two-digit
/// year, others a four-digit one; only the low byte reaches the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct UtcTimestamp {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

/// A complete satellite fix
///
/// Absence of a fix is `Option::None`; there is no partially valid fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionFix {
    /// Latitude in decimal degrees
    pub latitude: f64,

    /// Longitude in decimal degrees
    pub longitude: f64,

    /// UTC time of the fix
    pub timestamp: UtcTimestamp,
}

/// Which optional fields are emitted into the frame
///
/// The deployed node samples latitude/longitude but only transmits the
/// calendar fields. `WithPosition` also places the scaled coordinates in the
/// otherwise reserved bytes 15-22.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameLayout {
    #[default]
    Calendar,
    WithPosition,
}

/// Encoded uplink payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UplinkFrame {
    bytes: [u8; FRAME_SIZE],
}

impl UplinkFrame {
    pub(crate) fn from_bytes(bytes: [u8; FRAME_SIZE]) -> Self {
        Self { bytes }
    }

    /// Frame contents
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lowercase hex rendering, used by logs and the journal
    pub fn to_hex(&self) -> String {
        hex_string(&self.bytes)
    }
}

/// Lowercase hex, two digits per byte, no separators
pub fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

impl AsRef<[u8]> for UplinkFrame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}
