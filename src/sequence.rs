//! # Sequence Counter
//!
//! Per-frame uplink sequence number. The radio network uses it for replay
//! and ordering protection, so it must never go backwards while the process
//! runs.

/// Monotonic frame counter owned by the uplink scheduler
///
/// Starts at the value carried over from the radio session and advances by
/// exactly one per attempted transmission. Wraps at `u32::MAX`; the transport
/// decides how many of those bits reach the air.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceCounter {
    value: u32,
}

impl SequenceCounter {
    /// Create a counter starting at `start`
    pub fn new(start: u32) -> Self {
        Self { value: start }
    }

    /// Sequence number to attach to the next submission
    pub fn current(&self) -> u32 {
        self.value
    }

    /// Move to the next sequence number
    pub fn advance(&mut self) {
        self.value = self.value.wrapping_add(1);
    }
}

impl Default for SequenceCounter {
    fn default() -> Self {
        Self::new(0)
    }
}
