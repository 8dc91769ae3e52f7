//! Metrics-buffer types mirroring what the upstream metrics producer hands to
//! its callbacks, plus the extraction helpers that turn a buffer into one
//! wire sample.

use serde::{Deserialize, Serialize};

use crate::wire::VitalsSample;

/// One rate observation with its confidence, appended to a series over time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateObservation {
    /// Rate value in beats or breaths per minute.
    pub value: f64,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
}

/// An append-only ordered sequence of rate observations plus the producer's
/// scalar strict estimate for the same quantity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateSeries {
    /// The producer's scalar strict estimate, maintained independently of
    /// the observation sequence.
    pub strict_estimate: f64,
    /// Ordered observations, oldest first.
    pub observations: Vec<RateObservation>,
}

impl RateSeries {
    /// Series with observations and a strict estimate.
    pub fn new(strict_estimate: f64, observations: Vec<RateObservation>) -> Self {
        Self {
            strict_estimate,
            observations,
        }
    }

    /// The most recent observation, if any.
    pub fn latest(&self) -> Option<RateObservation> {
        self.observations.last().copied()
    }

    /// Rate for the next wire sample: the last observation's value, or the
    /// strict estimate when the sequence is empty.
    #[allow(clippy::cast_possible_truncation)]
    pub fn latest_bpm(&self) -> i32 {
        self.latest()
            .map_or(self.strict_estimate, |obs| obs.value)
            .round() as i32
    }

    /// Confidence for the next wire sample: the last observation's
    /// confidence, or 0.0 when the sequence is empty.
    pub fn latest_confidence(&self) -> f64 {
        self.latest().map_or(0.0, |obs| obs.confidence)
    }
}

/// Aggregated metrics handed to the periodic callback: one pulse series and
/// one breathing series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsBuffer {
    /// Pulse rate series (bpm).
    pub pulse: RateSeries,
    /// Breathing rate series (breaths/min).
    pub breathing: RateSeries,
}

impl MetricsBuffer {
    /// Build the wire sample for this buffer at the given producer timestamp.
    pub fn to_sample(&self, timestamp_micros: i64) -> VitalsSample {
        VitalsSample {
            timestamp_micros,
            pulse_bpm: self.pulse.latest_bpm(),
            pulse_confidence: self.pulse.latest_confidence(),
            breathing_bpm: self.breathing.latest_bpm(),
            breathing_confidence: self.breathing.latest_confidence(),
        }
    }
}

/// One point of a waveform trace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TracePoint {
    /// Producer-relative time in seconds.
    pub time: f64,
    /// Waveform amplitude.
    pub value: f64,
}

/// Instantaneous metrics handed to the high-frequency callback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeMetrics {
    /// Breathing upper-envelope trace, ordered oldest first.
    pub breathing_upper_trace: Vec<TracePoint>,
}

impl EdgeMetrics {
    /// The latest trace amplitude, or `None` when the trace is empty.
    pub fn latest_trace_value(&self) -> Option<f64> {
        self.breathing_upper_trace.last().map(|p| p.value)
    }
}
