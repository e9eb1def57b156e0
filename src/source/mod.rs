//! # Source Module
//!
//! Collaborator interfaces for the environmental sensor and the positioning
//! receiver.
//!
//! This module handles:
//! - The [`TelemetrySource`] and [`PositionSource`] seams consumed by the scheduler
//! - Bench implementations for running the node without hardware
//!
//! Bus-level acquisition and NMEA parsing live behind these traits and are
//! provided by the board integration.

pub mod bench;

use crate::error::Result;
use crate::frame::protocol::{PositionFix, TelemetrySample};

/// Environmental sensor returning readings in engineering units
#[cfg_attr(test, mockall::automock)]
pub trait TelemetrySource {
    /// Take one reading
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::NodeError::SensorFault`] if the sensor is
    /// unreachable or reports garbage.
    fn read(&mut self) -> Result<TelemetrySample>;
}

/// Satellite-positioning receiver
///
/// Receivers emit sentences faster than the uplink cadence, so [`poll`] is
/// called on every scheduler tick. It must run at least twice per receiver
/// update interval or sentences get dropped.
///
/// [`poll`]: PositionSource::poll
#[cfg_attr(test, mockall::automock)]
pub trait PositionSource {
    /// Consume pending receiver output
    ///
    /// Returns `true` when a new sentence was parsed.
    fn poll(&mut self) -> Result<bool>;

    /// Latest complete fix, or `None` without satellite lock
    fn current_fix(&self) -> Option<PositionFix>;
}
