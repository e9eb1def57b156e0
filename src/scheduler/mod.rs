//! # Uplink Scheduler
//!
//! Drives the node: polls the positioning receiver on every tick and, once
//! per cadence, samples the sensor, encodes a frame and submits it.
//!
//! ## States
//!
//! ```text
//! Idle ──cadence elapsed──▶ Sampling ──▶ Encoding ──▶ Submitting ──▶ Idle
//!   ▲                          │             │
//!   └──── sensor fault ────────┘             │
//!   └──── encoding error ────────────────────┘
//! ```
//!
//! No fault ends the loop. The sequence counter and the last-cycle instant
//! live in the scheduler and are only touched from [`UplinkScheduler::tick`].

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::UplinkConfig;
use crate::frame::encoder::encode_frame;
use crate::frame::protocol::{FrameLayout, PositionFix, TelemetrySample};
use crate::radio::RadioTransport;
use crate::sequence::SequenceCounter;
use crate::source::{PositionSource, TelemetrySource};
use crate::telemetry::{FrameJournal, JournalOutcome, JournalRecord};

/// Whether a failed submission still consumes its sequence number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterPolicy {
    /// Advance after every attempt, sent or not
    #[default]
    AdvanceAlways,
    /// Advance only after the transport accepted the frame
    AdvanceOnSuccess,
}

/// Scheduler state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Sampling,
    Encoding,
    Submitting,
}

/// Result of one scheduler tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Cadence has not elapsed; only the receiver was polled
    NotDue,
    /// Frame accepted by the transport
    Submitted { sequence: u32 },
    /// Transport rejected the frame
    SubmitFailed { sequence: u32, advanced: bool },
    /// Sensor read failed, cycle skipped
    SensorFault,
    /// Sample could not be encoded, cycle skipped
    EncodingError,
}

/// Running totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub ticks: u64,
    pub submitted: u64,
    pub submit_failures: u64,
    pub sensor_faults: u64,
    pub encoding_errors: u64,
    pub position_errors: u64,
}

/// Scheduler parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerSettings {
    pub cadence: Duration,
    pub layout: FrameLayout,
    pub counter_policy: CounterPolicy,
    pub initial_sequence: u32,
}

impl SchedulerSettings {
    pub fn from_config(config: &UplinkConfig) -> Self {
        Self {
            cadence: Duration::from_secs(config.interval_s),
            layout: config.frame_layout,
            counter_policy: config.counter_policy,
            initial_sequence: config.initial_sequence,
        }
    }
}

/// Cadence-driven sample/encode/submit loop
pub struct UplinkScheduler<S, P, R> {
    sensor: S,
    position: P,
    radio: R,
    settings: SchedulerSettings,
    counter: SequenceCounter,
    last_cycle: Instant,
    state: SchedulerState,
    stats: SchedulerStats,
    journal: Option<FrameJournal>,
}

impl<S, P, R> UplinkScheduler<S, P, R>
where
    S: TelemetrySource,
    P: PositionSource,
    R: RadioTransport,
{
    /// Create a scheduler whose first cycle is due one cadence after `started_at`
    pub fn new(sensor: S, position: P, radio: R, settings: SchedulerSettings, started_at: Instant) -> Self {
        Self {
            sensor,
            position,
            radio,
            settings,
            counter: SequenceCounter::new(settings.initial_sequence),
            last_cycle: started_at,
            state: SchedulerState::Idle,
            stats: SchedulerStats::default(),
            journal: None,
        }
    }

    /// Record every cycle outcome in `journal`
    pub fn with_journal(mut self, journal: FrameJournal) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Sequence number the next frame will carry
    pub fn sequence(&self) -> u32 {
        self.counter.current()
    }

    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    pub fn radio(&self) -> &R {
        &self.radio
    }

    /// Run until `shutdown` completes, ticking every `poll_interval`
    ///
    /// `poll_interval` must be at most half the receiver's update interval.
    pub async fn run<F>(&mut self, poll_interval: Duration, shutdown: F) -> SchedulerStats
    where
        F: Future<Output = ()>,
    {
        let mut ticker = interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(
            "Uplink loop running: cadence {:?}, poll every {:?}, next sequence {}",
            self.settings.cadence,
            poll_interval,
            self.counter.current()
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick(Instant::now()).await;
                }

                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping uplink loop");
                    break;
                }
            }
        }

        self.stats
    }

    /// One loop iteration at time `now`
    pub async fn tick(&mut self, now: Instant) -> CycleOutcome {
        self.stats.ticks += 1;

        if let Err(e) = self.position.poll() {
            self.stats.position_errors += 1;
            warn!("Position poll failed: {}", e);
        }

        if now.duration_since(self.last_cycle) < self.settings.cadence {
            return CycleOutcome::NotDue;
        }
        self.last_cycle = now;

        let outcome = self.run_cycle().await;
        self.transition(SchedulerState::Idle);
        outcome
    }

    async fn run_cycle(&mut self) -> CycleOutcome {
        self.transition(SchedulerState::Sampling);

        let sample = match self.sensor.read() {
            Ok(sample) => sample,
            Err(e) => {
                self.stats.sensor_faults += 1;
                warn!("Skipping cycle: {}", e);

                let mut record = JournalRecord::now(self.counter.current(), JournalOutcome::SensorFault);
                record.error = Some(e.to_string());
                self.journal(record);
                return CycleOutcome::SensorFault;
            }
        };
        let fix = self.position.current_fix();
        log_reading(&sample, fix.as_ref());

        self.transition(SchedulerState::Encoding);

        let frame = match encode_frame(&sample, fix.as_ref(), self.settings.layout) {
            Ok(frame) => frame,
            Err(e) => {
                self.stats.encoding_errors += 1;
                warn!("Skipping cycle: {}", e);

                let mut record = JournalRecord::now(self.counter.current(), JournalOutcome::EncodingError);
                record.sample = Some(sample);
                record.fix = fix;
                record.error = Some(e.to_string());
                self.journal(record);
                return CycleOutcome::EncodingError;
            }
        };

        self.transition(SchedulerState::Submitting);

        let sequence = self.counter.current();
        let mut record;
        let outcome = match self.radio.submit(frame.as_bytes(), sequence).await {
            Ok(()) => {
                self.counter.advance();
                self.stats.submitted += 1;
                info!("Packet sent (seq {}, {} bytes)", sequence, frame.as_bytes().len());

                record = JournalRecord::now(sequence, JournalOutcome::Submitted);
                CycleOutcome::Submitted { sequence }
            }
            Err(e) => {
                let advanced = self.settings.counter_policy == CounterPolicy::AdvanceAlways;
                if advanced {
                    self.counter.advance();
                }
                self.stats.submit_failures += 1;
                warn!("Submission of seq {} failed ({}), counter advanced: {}", sequence, e, advanced);

                record = JournalRecord::now(sequence, JournalOutcome::SubmitFailed);
                record.error = Some(e.to_string());
                CycleOutcome::SubmitFailed { sequence, advanced }
            }
        };

        record.frame = Some(frame.to_hex());
        record.sample = Some(sample);
        record.fix = fix;
        self.journal(record);

        outcome
    }

    fn transition(&mut self, next: SchedulerState) {
        if self.state != next {
            debug!("Scheduler {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }

    fn journal(&mut self, record: JournalRecord) {
        if let Some(journal) = self.journal.as_mut() {
            if let Err(e) = journal.append(&record) {
                warn!("Frame journal write failed: {}", e);
            }
        }
    }
}

fn log_reading(sample: &TelemetrySample, fix: Option<&PositionFix>) {
    info!(
        "Temperature: {:.1} C, Humidity: {:.1} %, Pressure: {:.1} hPa, Altitude: {:.2} m",
        sample.temperature, sample.humidity, sample.pressure, sample.altitude
    );

    match fix {
        Some(fix) => {
            let ts = &fix.timestamp;
            info!(
                "Fix {}/{}/{} {:02}:{:02}:{:02} at {}, {}",
                ts.month, ts.day, ts.year, ts.hour, ts.minute, ts.second, fix.latitude, fix.longitude
            );
        }
        None => info!("Waiting for fix..."),
    }
}
