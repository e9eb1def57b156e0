//! # Telemetry Module
//!
//! Local record of every uplink cycle, kept next to the node's logs.
//!
//! This module handles:
//! - Formatting cycle outcomes as JSONL (JSON Lines)
//! - Writing to rotating journal files
//! - Managing file rotation (max N records per file)
//! - Retaining only the last M files

pub mod journal;

pub use journal::{FrameJournal, JournalOutcome, JournalRecord};
