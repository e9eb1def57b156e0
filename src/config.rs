//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{NodeError, Result};
use crate::frame::protocol::FrameLayout;
use crate::scheduler::CounterPolicy;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub uplink: UplinkConfig,
    #[serde(default)]
    pub gps: GpsConfig,
    #[serde(default)]
    pub sensor: SensorConfig,
    #[serde(default)]
    pub radio: RadioConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Uplink cadence and frame configuration
#[derive(Debug, Deserialize, Clone)]
pub struct UplinkConfig {
    #[serde(default = "default_interval_s")]
    pub interval_s: u64,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default)]
    pub initial_sequence: u32,

    #[serde(default)]
    pub counter_policy: CounterPolicy,

    #[serde(default)]
    pub frame_layout: FrameLayout,
}

/// Positioning receiver configuration
#[derive(Debug, Deserialize, Clone)]
pub struct GpsConfig {
    #[serde(default = "default_gps_update_interval_ms")]
    pub update_interval_ms: u64,
}

/// Environmental sensor configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SensorConfig {
    #[serde(default = "default_sea_level_pressure_hpa")]
    pub sea_level_pressure_hpa: f64,
}

/// LoRa modem configuration
#[derive(Debug, Deserialize, Clone)]
pub struct RadioConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_radio_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    #[serde(default = "default_max_payload")]
    pub max_payload: usize,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Frame journal and log file configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    #[serde(default = "default_telemetry_enabled")]
    pub enabled: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_max_records_per_file")]
    pub max_records_per_file: usize,

    #[serde(default = "default_max_files_to_keep")]
    pub max_files_to_keep: usize,
}

// Default value functions
fn default_interval_s() -> u64 { 30 }
fn default_poll_interval_ms() -> u64 { 100 }

fn default_gps_update_interval_ms() -> u64 { 1000 }

fn default_sea_level_pressure_hpa() -> f64 { 1013.25 }

fn default_radio_port() -> String { "/dev/ttyUSB0".to_string() }
fn default_baud_rate() -> u32 { 57600 }
fn default_max_payload() -> usize { 51 }
fn default_timeout_ms() -> u64 { 1000 }

fn default_telemetry_enabled() -> bool { true }
fn default_log_dir() -> String { "./logs".to_string() }
fn default_max_records_per_file() -> usize { 10000 }
fn default_max_files_to_keep() -> usize { 10 }

impl Default for UplinkConfig {
    fn default() -> Self {
        Self {
            interval_s: default_interval_s(),
            poll_interval_ms: default_poll_interval_ms(),
            initial_sequence: 0,
            counter_policy: CounterPolicy::default(),
            frame_layout: FrameLayout::default(),
        }
    }
}

impl Default for GpsConfig {
    fn default() -> Self {
        Self { update_interval_ms: default_gps_update_interval_ms() }
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self { sea_level_pressure_hpa: default_sea_level_pressure_hpa() }
    }
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: default_radio_port(),
            baud_rate: default_baud_rate(),
            max_payload: default_max_payload(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: default_telemetry_enabled(),
            log_dir: default_log_dir(),
            max_records_per_file: default_max_records_per_file(),
            max_files_to_keep: default_max_files_to_keep(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            uplink: UplinkConfig::default(),
            gps: GpsConfig::default(),
            sensor: SensorConfig::default(),
            radio: RadioConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

fn invalid(msg: impl std::fmt::Display) -> NodeError {
    NodeError::Config(toml::de::Error::custom(msg))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use lora_node::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.uplink.interval_s == 0 || self.uplink.interval_s > 86_400 {
            return Err(invalid("interval_s must be between 1 and 86400"));
        }

        if self.uplink.poll_interval_ms == 0 {
            return Err(invalid("poll_interval_ms must be greater than 0"));
        }

        if self.gps.update_interval_ms == 0 || self.gps.update_interval_ms > 60_000 {
            return Err(invalid("gps update_interval_ms must be between 1 and 60000"));
        }

        // Receiver output is dropped unless polled at least twice per update
        if self.uplink.poll_interval_ms * 2 > self.gps.update_interval_ms {
            return Err(invalid(format!(
                "poll_interval_ms ({}) must be at most half of gps update_interval_ms ({})",
                self.uplink.poll_interval_ms, self.gps.update_interval_ms
            )));
        }

        if self.uplink.poll_interval_ms >= self.uplink.interval_s * 1000 {
            return Err(invalid("poll_interval_ms must be shorter than interval_s"));
        }

        let slp = self.sensor.sea_level_pressure_hpa;
        if !slp.is_finite() || !(800.0..=1100.0).contains(&slp) {
            return Err(invalid("sea_level_pressure_hpa must be between 800 and 1100"));
        }

        if self.radio.enabled && self.radio.port.is_empty() {
            return Err(invalid("radio port cannot be empty when enabled"));
        }

        if ![9600, 19200, 38400, 57600, 115200].contains(&self.radio.baud_rate) {
            return Err(invalid("baud_rate must be one of: 9600, 19200, 38400, 57600, 115200"));
        }

        if self.radio.max_payload == 0 || self.radio.max_payload > 60 {
            return Err(invalid("max_payload must be between 1 and 60"));
        }

        if self.radio.timeout_ms == 0 || self.radio.timeout_ms > 10_000 {
            return Err(invalid("radio timeout_ms must be between 1 and 10000"));
        }

        if self.telemetry.enabled && self.telemetry.log_dir.is_empty() {
            return Err(invalid("telemetry log_dir cannot be empty when enabled"));
        }

        if self.telemetry.max_records_per_file == 0 {
            return Err(invalid("max_records_per_file must be greater than 0"));
        }

        if self.telemetry.max_files_to_keep == 0 {
            return Err(invalid("max_files_to_keep must be greater than 0"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_empty_document_matches_default() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.uplink.interval_s, 30);
        assert_eq!(config.uplink.poll_interval_ms, 100);
        assert_eq!(config.uplink.initial_sequence, 0);
        assert_eq!(config.uplink.counter_policy, CounterPolicy::AdvanceAlways);
        assert_eq!(config.uplink.frame_layout, FrameLayout::Calendar);
        assert_eq!(config.gps.update_interval_ms, 1000);
        assert!(!config.radio.enabled);
        assert!(config.telemetry.enabled);
    }

    #[test]
    fn test_load_config_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let toml_content = r#"
[uplink]
interval_s = 60
initial_sequence = 120
counter_policy = "advance_on_success"
frame_layout = "with_position"

[radio]
enabled = true
port = "/dev/ttyACM1"
baud_rate = 115200

[telemetry]
enabled = false
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.uplink.interval_s, 60);
        assert_eq!(config.uplink.initial_sequence, 120);
        assert_eq!(config.uplink.counter_policy, CounterPolicy::AdvanceOnSuccess);
        assert_eq!(config.uplink.frame_layout, FrameLayout::WithPosition);
        assert_eq!(config.radio.port, "/dev/ttyACM1");
        assert_eq!(config.radio.baud_rate, 115200);
        assert!(!config.telemetry.enabled);
    }

    #[test]
    fn test_unknown_counter_policy_rejected() {
        let result = Config::from_toml("[uplink]\ncounter_policy = \"sometimes\"\n");
        assert!(matches!(result, Err(NodeError::Config(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = Config::load("/nonexistent/lora-node.toml");
        assert!(matches!(result, Err(NodeError::Io(_))));
    }

    #[test]
    fn test_interval_zero() {
        let mut config = Config::default();
        config.uplink.interval_s = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_interval_too_high() {
        let mut config = Config::default();
        config.uplink.interval_s = 86_401;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_poll_interval_zero() {
        let mut config = Config::default();
        config.uplink.poll_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_poll_interval_must_be_twice_gps_rate() {
        let mut config = Config::default();
        config.gps.update_interval_ms = 1000;

        config.uplink.poll_interval_ms = 500;
        assert!(config.validate().is_ok());

        config.uplink.poll_interval_ms = 501;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_poll_interval_longer_than_cadence() {
        let mut config = Config::default();
        config.uplink.interval_s = 1;
        config.gps.update_interval_ms = 4000;
        config.uplink.poll_interval_ms = 1000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_gps_update_interval_zero() {
        let mut config = Config::default();
        config.gps.update_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sea_level_pressure_out_of_range() {
        let mut config = Config::default();
        config.sensor.sea_level_pressure_hpa = 500.0;
        assert!(config.validate().is_err());

        config.sensor.sea_level_pressure_hpa = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_radio_port_when_enabled() {
        let mut config = Config::default();
        config.radio.enabled = true;
        config.radio.port = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_radio_port_when_disabled() {
        let mut config = Config::default();
        config.radio.enabled = false;
        config.radio.port = String::new();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_baud_rate() {
        let mut config = Config::default();
        config.radio.baud_rate = 420_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_valid_baud_rates() {
        for &baud in &[9600, 19200, 38400, 57600, 115200] {
            let mut config = Config::default();
            config.radio.baud_rate = baud;
            assert!(config.validate().is_ok(), "Baud rate {} should be valid", baud);
        }
    }

    #[test]
    fn test_max_payload_bounds() {
        let mut config = Config::default();
        config.radio.max_payload = 0;
        assert!(config.validate().is_err());

        config.radio.max_payload = 61;
        assert!(config.validate().is_err());

        config.radio.max_payload = 32;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_radio_timeout_zero() {
        let mut config = Config::default();
        config.radio.timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_log_dir_when_enabled() {
        let mut config = Config::default();
        config.telemetry.enabled = true;
        config.telemetry.log_dir = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_max_records_per_file_zero() {
        let mut config = Config::default();
        config.telemetry.max_records_per_file = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_max_files_to_keep_zero() {
        let mut config = Config::default();
        config.telemetry.max_files_to_keep = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_functions() {
        assert_eq!(default_interval_s(), 30);
        assert_eq!(default_poll_interval_ms(), 100);
        assert_eq!(default_gps_update_interval_ms(), 1000);
        assert_eq!(default_sea_level_pressure_hpa(), 1013.25);
        assert_eq!(default_radio_port(), "/dev/ttyUSB0");
        assert_eq!(default_baud_rate(), 57600);
        assert_eq!(default_max_payload(), 51);
        assert_eq!(default_timeout_ms(), 1000);
        assert!(default_telemetry_enabled());
        assert_eq!(default_log_dir(), "./logs");
        assert_eq!(default_max_records_per_file(), 10000);
        assert_eq!(default_max_files_to_keep(), 10);
    }
}
