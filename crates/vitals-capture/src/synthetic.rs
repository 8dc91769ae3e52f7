//! Synthetic metrics source — a deterministic stand-in for a live capture
//! device when the real extraction backend is unavailable.

use std::f64::consts::TAU;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};
use vitals_core::{EdgeMetrics, MetricsBuffer, RateObservation, RateSeries, TracePoint};

use crate::error::CaptureError;
use crate::source::{EdgeMetricsCallback, MetricsCallback, MetricsSource, StopHandle};

/// How many rate observations a series retains.
const SERIES_CAPACITY: usize = 32;

/// How many trace points an edge-metrics frame retains.
const TRACE_CAPACITY: usize = 64;

/// Tuning for the synthetic generator.
#[derive(Clone, Debug)]
pub struct SyntheticConfig {
    /// RNG seed, derived from the device index so each "device" is a
    /// distinct but repeatable subject.
    pub seed: u64,
    /// Cadence of aggregated metrics buffers.
    pub vitals_interval: Duration,
    /// Cadence of edge-metrics frames.
    pub trace_interval: Duration,
    /// Stop after this many edge frames (tests only; `None` runs until
    /// stopped).
    pub frame_limit: Option<u64>,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            vitals_interval: Duration::from_secs(1),
            trace_interval: Duration::from_millis(33),
            frame_limit: None,
        }
    }
}

impl SyntheticConfig {
    /// Config for a given device index.
    pub fn for_device(device_index: u32) -> Self {
        Self {
            seed: u64::from(device_index),
            ..Self::default()
        }
    }
}

/// Generates plausible resting vitals: pulse wandering around 72 bpm,
/// breathing around 14 breaths/min, and a sinusoidal breathing waveform.
pub struct SyntheticSource {
    config: SyntheticConfig,
    on_metrics: Option<MetricsCallback>,
    on_edge_metrics: Option<EdgeMetricsCallback>,
    initialized: bool,
    running: AtomicBool,
    stop: StopHandle,
}

impl SyntheticSource {
    /// New source with the given tuning.
    pub fn new(config: SyntheticConfig) -> Self {
        Self {
            config,
            on_metrics: None,
            on_edge_metrics: None,
            initialized: false,
            running: AtomicBool::new(false),
            stop: StopHandle::new(),
        }
    }

    fn check_registration(&self, callback: &'static str) -> Result<(), CaptureError> {
        if self.initialized {
            return Err(CaptureError::rejected(
                callback,
                "registration after initialize",
            ));
        }
        Ok(())
    }
}

impl MetricsSource for SyntheticSource {
    fn set_on_metrics(&mut self, callback: MetricsCallback) -> Result<(), CaptureError> {
        self.check_registration("metrics")?;
        if self.on_metrics.is_some() {
            return Err(CaptureError::rejected("metrics", "already registered"));
        }
        self.on_metrics = Some(callback);
        Ok(())
    }

    fn set_on_edge_metrics(&mut self, callback: EdgeMetricsCallback) -> Result<(), CaptureError> {
        self.check_registration("edge metrics")?;
        if self.on_edge_metrics.is_some() {
            return Err(CaptureError::rejected("edge metrics", "already registered"));
        }
        self.on_edge_metrics = Some(callback);
        Ok(())
    }

    fn initialize(&mut self, credential: &str) -> Result<(), CaptureError> {
        if credential.trim().is_empty() {
            return Err(CaptureError::MissingCredential);
        }
        self.initialized = true;
        info!(seed = self.config.seed, "synthetic source initialized");
        Ok(())
    }

    #[allow(clippy::cast_possible_truncation)]
    fn run(&mut self) -> Result<(), CaptureError> {
        if !self.initialized {
            return Err(CaptureError::NotInitialized);
        }
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(CaptureError::AlreadyRunning);
        }

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let started = Instant::now();
        let mut pulse_obs: Vec<RateObservation> = Vec::new();
        let mut breathing_obs: Vec<RateObservation> = Vec::new();
        let mut trace: Vec<TracePoint> = Vec::new();
        let mut next_vitals = self.config.vitals_interval;
        let mut frames: u64 = 0;

        while !self.stop.is_stopped() {
            std::thread::sleep(self.config.trace_interval);
            let elapsed = started.elapsed();
            let timestamp_micros = elapsed.as_micros() as i64;
            let t = elapsed.as_secs_f64();

            // Breathing waveform at the current breathing rate.
            let breathing_bpm = 14.0 + 1.5 * (t / 30.0).sin();
            let value = (TAU * breathing_bpm / 60.0 * t).sin();
            trace.push(TracePoint { time: t, value });
            if trace.len() > TRACE_CAPACITY {
                let _ = trace.remove(0);
            }
            if let Some(cb) = &self.on_edge_metrics {
                let metrics = EdgeMetrics {
                    breathing_upper_trace: trace.clone(),
                };
                cb(&metrics, timestamp_micros);
            }

            if elapsed >= next_vitals {
                next_vitals += self.config.vitals_interval;

                let pulse = 72.0 + rng.random_range(-4.0..4.0);
                let breathing = breathing_bpm + rng.random_range(-0.5..0.5);
                pulse_obs.push(RateObservation {
                    value: pulse,
                    confidence: rng.random_range(0.85..0.99),
                });
                breathing_obs.push(RateObservation {
                    value: breathing,
                    confidence: rng.random_range(0.75..0.95),
                });
                if pulse_obs.len() > SERIES_CAPACITY {
                    let _ = pulse_obs.remove(0);
                }
                if breathing_obs.len() > SERIES_CAPACITY {
                    let _ = breathing_obs.remove(0);
                }

                if let Some(cb) = &self.on_metrics {
                    let buffer = MetricsBuffer {
                        pulse: RateSeries::new(pulse, pulse_obs.clone()),
                        breathing: RateSeries::new(breathing, breathing_obs.clone()),
                    };
                    cb(&buffer, timestamp_micros);
                }
            }

            frames += 1;
            if self.config.frame_limit.is_some_and(|limit| frames >= limit) {
                break;
            }
        }

        self.running.store(false, Ordering::SeqCst);
        debug!(frames, "synthetic source run loop exited");
        Ok(())
    }

    fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }
}
