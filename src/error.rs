//! # Error Types
//!
//! Custom error types for the LoRa node using `thiserror`.
//!
//! Only [`NodeError::Config`] and [`NodeError::Io`] are fatal, and only at
//! startup. Everything raised inside the uplink loop is reported and the
//! loop carries on with the next cycle.

use thiserror::Error;

/// Main error type for the LoRa node
#[derive(Debug, Error)]
pub enum NodeError {
    /// Environmental sensor unavailable or returned invalid data
    #[error("Sensor fault: {0}")]
    SensorFault(String),

    /// Sample could not be represented in an uplink frame
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Radio submission failed or timed out
    #[error("Transport fault: {0}")]
    TransportFault(String),

    /// Positioning receiver could not be polled
    #[error("Position source error: {0}")]
    Position(String),

    /// Received bytes are not a valid uplink frame
    #[error("Frame decode error: {0}")]
    Decode(String),

    /// Serial port errors
    #[error("Serial error: {0}")]
    Serial(String),

    /// None of the candidate serial devices could be opened
    #[error("No radio device found (tried: {0})")]
    SerialPortNotFound(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Journal serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for the LoRa node
pub type Result<T> = std::result::Result<T, NodeError>;
