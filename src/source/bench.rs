//! Bench sources for running the node on a desk without sensor or receiver
//! attached. Readings are deterministic so frames can be checked by eye.

use chrono::{Datelike, Timelike, Utc};
use tracing::debug;

use super::{PositionSource, TelemetrySource};
use crate::error::{NodeError, Result};
use crate::frame::protocol::{PositionFix, TelemetrySample, UtcTimestamp};

/// Standard sea-level pressure in hPa
pub const STANDARD_SEA_LEVEL_HPA: f64 = 1013.25;

/// Barometric altitude in meters for `pressure` against a sea-level reference
///
/// Same approximation the BME280 driver uses:
/// `44330 × (1 − (p / p0)^0.1903)`.
pub fn altitude_from_pressure(pressure_hpa: f64, sea_level_hpa: f64) -> f64 {
    44330.0 * (1.0 - (pressure_hpa / sea_level_hpa).powf(0.1903))
}

/// Simulated environmental sensor
///
/// Produces a slow diurnal-looking swing around fixed base values.
#[derive(Debug, Clone)]
pub struct BenchEnvironment {
    sea_level_hpa: f64,
    reads: u64,
    fault_every: Option<u64>,
}

impl BenchEnvironment {
    pub fn new(sea_level_hpa: f64) -> Self {
        Self {
            sea_level_hpa,
            reads: 0,
            fault_every: None,
        }
    }

    /// Report a sensor fault on every `n`th read
    pub fn with_fault_every(mut self, n: u64) -> Self {
        self.fault_every = Some(n.max(1));
        self
    }
}

impl TelemetrySource for BenchEnvironment {
    fn read(&mut self) -> Result<TelemetrySample> {
        self.reads += 1;

        if let Some(n) = self.fault_every {
            if self.reads % n == 0 {
                return Err(NodeError::SensorFault(format!(
                    "bench sensor did not acknowledge read #{}",
                    self.reads
                )));
            }
        }

        let phase = (self.reads as f64 / 24.0) * std::f64::consts::TAU;
        let pressure = 1005.0 + 3.0 * phase.cos();

        Ok(TelemetrySample {
            temperature: 18.0 + 4.0 * phase.sin(),
            humidity: 55.0 - 10.0 * phase.sin(),
            pressure,
            altitude: altitude_from_pressure(pressure, self.sea_level_hpa),
        })
    }
}

/// Simulated positioning receiver
///
/// Every poll consumes one "sentence"; lock is acquired after a fixed number
/// of polls and the fix is stamped with the host's UTC clock.
#[derive(Debug, Clone)]
pub struct BenchGps {
    latitude: f64,
    longitude: f64,
    polls_until_lock: u64,
    polls: u64,
    fix: Option<PositionFix>,
}

impl BenchGps {
    pub fn new(latitude: f64, longitude: f64, polls_until_lock: u64) -> Self {
        Self {
            latitude,
            longitude,
            polls_until_lock,
            polls: 0,
            fix: None,
        }
    }
}

impl PositionSource for BenchGps {
    fn poll(&mut self) -> Result<bool> {
        self.polls += 1;

        if self.polls < self.polls_until_lock {
            return Ok(true);
        }

        if self.fix.is_none() {
            debug!("Bench GPS acquired lock after {} polls", self.polls);
        }

        let now = Utc::now();
        self.fix = Some(PositionFix {
            latitude: self.latitude,
            longitude: self.longitude,
            timestamp: UtcTimestamp {
                year: now.year() as u16,
                month: now.month() as u8,
                day: now.day() as u8,
                hour: now.hour() as u8,
                minute: now.minute() as u8,
                second: now.second() as u8,
            },
        });

        Ok(true)
    }

    fn current_fix(&self) -> Option<PositionFix> {
        self.fix
    }
}
