//! Recorded-input metrics source.
//!
//! Replays a JSONL recording in place of a live device. Each line is one
//! frame, tagged by `kind`:
//!
//! ```json
//! {"kind":"metrics","timestamp_micros":0,"pulse":{"strict_estimate":72.0,"observations":[{"value":72.3,"confidence":0.9}]},"breathing":{"strict_estimate":14.0,"observations":[]}}
//! {"kind":"edge","timestamp_micros":33000,"breathing_upper_trace":[{"time":0.033,"value":0.2}]}
//! ```
//!
//! Frames are delivered in file order, paced by the recorded timestamp
//! deltas (capped so a gap in the recording cannot stall replay for long).

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use vitals_core::{EdgeMetrics, MetricsBuffer, RateSeries, TracePoint};

use crate::error::CaptureError;
use crate::source::{EdgeMetricsCallback, MetricsCallback, MetricsSource, StopHandle};

/// Longest pause honored between two recorded frames.
const MAX_FRAME_GAP: Duration = Duration::from_secs(1);

/// One line of a recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordedFrame {
    /// An aggregated metrics buffer.
    Metrics {
        /// Producer timestamp in microseconds.
        timestamp_micros: i64,
        /// Pulse rate series.
        pulse: RateSeries,
        /// Breathing rate series.
        breathing: RateSeries,
    },
    /// An instantaneous edge-metrics frame.
    Edge {
        /// Input timestamp in microseconds.
        timestamp_micros: i64,
        /// Breathing upper-envelope trace.
        breathing_upper_trace: Vec<TracePoint>,
    },
}

impl RecordedFrame {
    fn timestamp_micros(&self) -> i64 {
        match self {
            Self::Metrics {
                timestamp_micros, ..
            }
            | Self::Edge {
                timestamp_micros, ..
            } => *timestamp_micros,
        }
    }
}

/// Replays a JSONL recording through the metrics callbacks.
pub struct ReplaySource {
    path: PathBuf,
    frames: Vec<RecordedFrame>,
    on_metrics: Option<MetricsCallback>,
    on_edge_metrics: Option<EdgeMetricsCallback>,
    initialized: bool,
    running: AtomicBool,
    stop: StopHandle,
}

impl ReplaySource {
    /// Source backed by the recording at `path`. The file is read during
    /// `initialize`.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            frames: Vec::new(),
            on_metrics: None,
            on_edge_metrics: None,
            initialized: false,
            running: AtomicBool::new(false),
            stop: StopHandle::new(),
        }
    }

    /// Number of frames loaded by `initialize`.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
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

    fn load_frames(&mut self) -> Result<(), CaptureError> {
        let file = File::open(&self.path).map_err(|source| CaptureError::Recording {
            path: self.path.clone(),
            source,
        })?;
        let reader = BufReader::new(file);
        let mut frames = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(|source| CaptureError::Recording {
                path: self.path.clone(),
                source,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let frame: RecordedFrame =
                serde_json::from_str(&line).map_err(|source| CaptureError::MalformedFrame {
                    line: index + 1,
                    source,
                })?;
            frames.push(frame);
        }
        self.frames = frames;
        Ok(())
    }
}

impl MetricsSource for ReplaySource {
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
        self.load_frames()?;
        if self.frames.is_empty() {
            warn!(path = %self.path.display(), "recording contains no frames");
        }
        self.initialized = true;
        info!(
            path = %self.path.display(),
            frames = self.frames.len(),
            "replay source initialized"
        );
        Ok(())
    }

    fn run(&mut self) -> Result<(), CaptureError> {
        if !self.initialized {
            return Err(CaptureError::NotInitialized);
        }
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(CaptureError::AlreadyRunning);
        }

        let mut previous_timestamp: Option<i64> = None;
        for frame in &self.frames {
            if self.stop.is_stopped() {
                break;
            }
            let timestamp = frame.timestamp_micros();
            if let Some(prev) = previous_timestamp {
                let delta = timestamp.saturating_sub(prev).max(0);
                #[allow(clippy::cast_sign_loss)]
                let pause = Duration::from_micros(delta as u64).min(MAX_FRAME_GAP);
                std::thread::sleep(pause);
            }
            previous_timestamp = Some(timestamp);

            match frame {
                RecordedFrame::Metrics {
                    timestamp_micros,
                    pulse,
                    breathing,
                } => {
                    if let Some(cb) = &self.on_metrics {
                        let buffer = MetricsBuffer {
                            pulse: pulse.clone(),
                            breathing: breathing.clone(),
                        };
                        cb(&buffer, *timestamp_micros);
                    }
                }
                RecordedFrame::Edge {
                    timestamp_micros,
                    breathing_upper_trace,
                } => {
                    if let Some(cb) = &self.on_edge_metrics {
                        let metrics = EdgeMetrics {
                            breathing_upper_trace: breathing_upper_trace.clone(),
                        };
                        cb(&metrics, *timestamp_micros);
                    }
                }
            }
        }

        self.running.store(false, Ordering::SeqCst);
        debug!("replay finished");
        Ok(())
    }

    fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }
}
