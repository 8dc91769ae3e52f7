//! The JSON wire protocol between the broadcast server and stream clients.
//!
//! One JSON object per transport message, discriminated by a `type` field:
//!
//! ```json
//! {"type":"vitals","timestamp":1700000000000000,"pulse":72,"pulseConfidence":0.9,"breathing":14,"breathingConfidence":0.8}
//! {"type":"breathing_trace","value":0.42}
//! ```
//!
//! Unknown or malformed payloads fail decode; callers drop them without
//! tearing down the connection.

use serde::{Deserialize, Serialize};

use crate::error::WireError;

/// One pulse/breathing snapshot, emitted once per metrics-buffer callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalsSample {
    /// Producer clock, microsecond resolution, monotonically non-decreasing.
    #[serde(rename = "timestamp")]
    pub timestamp_micros: i64,
    /// Pulse rate in beats per minute.
    #[serde(rename = "pulse")]
    pub pulse_bpm: i32,
    /// Confidence of the pulse estimate, in `[0, 1]`. May legitimately be 0
    /// when the pulse-rate sub-buffer was empty.
    pub pulse_confidence: f64,
    /// Breathing rate in breaths per minute.
    #[serde(rename = "breathing")]
    pub breathing_bpm: i32,
    /// Confidence of the breathing estimate, in `[0, 1]`.
    pub breathing_confidence: f64,
}

/// One instantaneous point of the breathing waveform, emitted at high
/// frequency for visualization. Carries no timestamp; a newer sample
/// supersedes any prior unconsumed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreathingTraceSample {
    /// Waveform amplitude, typically in `[-1, 1]`.
    pub value: f64,
}

/// Every message that crosses the wire, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamMessage {
    /// Periodic pulse/breathing snapshot.
    Vitals(VitalsSample),
    /// High-frequency breathing waveform point.
    BreathingTrace(BreathingTraceSample),
}

impl StreamMessage {
    /// Serialize to the wire's JSON text form.
    pub fn to_json(&self) -> Result<String, WireError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a wire payload.
    pub fn from_json(text: &str) -> Result<Self, WireError> {
        Ok(serde_json::from_str(text)?)
    }
}
