//! # LoRa Node
//!
//! Samples the environmental sensor and GPS receiver, packs each reading into
//! a 32-byte frame and uplinks it through the LoRa modem.
//!
//! ```bash
//! lora-node config/default.toml
//! ```
//!
//! Expected output:
//! ```text
//! INFO lora_node: LoRa Node v0.1.0 starting...
//! INFO lora_node::scheduler: Uplink loop running: cadence 30s, poll every 100ms, next sequence 0
//! INFO lora_node::scheduler: Temperature: 21.5 C, Humidity: 45.2 %, Pressure: 1013.2 hPa, Altitude: 123.45 m
//! INFO lora_node::scheduler: Waiting for fix...
//! INFO lora_node::scheduler: Packet sent (seq 0, 32 bytes)
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use lora_node::config::Config;
use lora_node::radio::serial::SerialRadio;
use lora_node::radio::{LogRadio, RadioTransport};
use lora_node::scheduler::{SchedulerSettings, SchedulerStats, UplinkScheduler};
use lora_node::source::bench::{BenchEnvironment, BenchGps};
use lora_node::telemetry::FrameJournal;

/// Config file used when no path is given
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Bench receiver position (decimal degrees)
const BENCH_LATITUDE: f64 = 52.3702;
const BENCH_LONGITUDE: f64 = 4.8952;

/// Polls before the bench receiver reports a fix
const BENCH_POLLS_UNTIL_LOCK: u64 = 50;

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = if Path::new(&config_path).exists() {
        Config::load(&config_path).with_context(|| format!("loading {}", config_path))?
    } else {
        Config::default()
    };

    let _log_guard = init_logging(&config)?;

    info!("LoRa Node v{} starting...", env!("CARGO_PKG_VERSION"));
    info!("Configuration: {}", config_path);

    let sensor = BenchEnvironment::new(config.sensor.sea_level_pressure_hpa);
    let gps = BenchGps::new(BENCH_LATITUDE, BENCH_LONGITUDE, BENCH_POLLS_UNTIL_LOCK);

    let stats = if config.radio.enabled {
        let radio = SerialRadio::open(
            &[config.radio.port.as_str()],
            config.radio.baud_rate,
            config.radio.max_payload,
            Duration::from_millis(config.radio.timeout_ms),
        )?;
        run(&config, sensor, gps, radio).await?
    } else {
        warn!("Radio disabled, frames are logged only");
        run(&config, sensor, gps, LogRadio::new()).await?
    };

    info!(
        "Stopped: {} sent, {} failed, {} sensor faults, {} encoding errors",
        stats.submitted, stats.submit_failures, stats.sensor_faults, stats.encoding_errors
    );

    Ok(())
}

async fn run<R: RadioTransport>(
    config: &Config,
    sensor: BenchEnvironment,
    gps: BenchGps,
    radio: R,
) -> Result<SchedulerStats> {
    let settings = SchedulerSettings::from_config(&config.uplink);
    let mut scheduler = UplinkScheduler::new(sensor, gps, radio, settings, Instant::now());

    if config.telemetry.enabled {
        let journal = FrameJournal::open(
            Path::new(&config.telemetry.log_dir).join("frames"),
            config.telemetry.max_records_per_file,
            config.telemetry.max_files_to_keep,
        )?;
        scheduler = scheduler.with_journal(journal);
    }

    info!("Press Ctrl+C to exit");

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Ctrl+C handler unavailable: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let poll_interval = Duration::from_millis(config.uplink.poll_interval_ms);
    Ok(scheduler.run(poll_interval, shutdown).await)
}

/// Stdout logging, plus a daily rolling file when telemetry is enabled
///
/// The returned guard flushes the file writer on drop.
fn init_logging(config: &Config) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let (file_layer, guard) = if config.telemetry.enabled {
        std::fs::create_dir_all(&config.telemetry.log_dir)?;
        let appender = tracing_appender::rolling::daily(&config.telemetry.log_dir, "lora-node.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    Ok(guard)
}
