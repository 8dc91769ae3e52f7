//! Bridges the metrics producer's callbacks into wire messages and fan-out.

use std::sync::Arc;

use tracing::{debug, trace};
use vitals_core::{BreathingTraceSample, EdgeMetrics, MetricsBuffer, StreamMessage};

use crate::websocket::broadcast::SessionRegistry;

/// Turns producer callbacks into broadcasts.
///
/// Both entry points are synchronous and are invoked on the producer's own
/// processing thread. Nothing in here may block for unbounded time or let a
/// failure escape back into the producer's run loop; anything that goes
/// wrong downstream is logged inside the registry and swallowed.
pub struct MetricsPublisher {
    registry: Arc<SessionRegistry>,
}

impl MetricsPublisher {
    /// Publisher broadcasting through `registry`.
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self { registry }
    }

    /// Handle one aggregated metrics buffer.
    ///
    /// Extracts the most recent pulse and breathing observations (falling
    /// back to the scalar estimate with zero confidence when a sequence is
    /// empty), builds one vitals sample, and broadcasts it.
    pub fn on_metrics(&self, buffer: &MetricsBuffer, timestamp_micros: i64) {
        let sample = buffer.to_sample(timestamp_micros);
        debug!(
            pulse = sample.pulse_bpm,
            breathing = sample.breathing_bpm,
            "publishing vitals sample"
        );
        let _ = self.registry.broadcast(&StreamMessage::Vitals(sample));
    }

    /// Handle one instantaneous edge-metrics frame.
    ///
    /// Broadcasts the latest breathing upper-envelope point; no-op when the
    /// trace is empty.
    pub fn on_edge_metrics(&self, metrics: &EdgeMetrics, _input_timestamp_micros: i64) {
        let Some(value) = metrics.latest_trace_value() else {
            return;
        };
        trace!(value, "publishing breathing trace sample");
        let _ = self
            .registry
            .broadcast(&StreamMessage::BreathingTrace(BreathingTraceSample {
                value,
            }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;
    use vitals_core::{RateObservation, RateSeries, TracePoint};

    use crate::websocket::connection::ClientSession;

    fn setup() -> (MetricsPublisher, mpsc::Receiver<Arc<String>>) {
        let registry = Arc::new(SessionRegistry::new());
        let (tx, rx) = mpsc::channel(8);
        registry.register(Arc::new(ClientSession::new("s1".into(), tx)));
        (MetricsPublisher::new(registry), rx)
    }

    fn obs(value: f64, confidence: f64) -> RateObservation {
        RateObservation { value, confidence }
    }

    #[tokio::test]
    async fn metrics_buffer_becomes_vitals_message() {
        let (publisher, mut rx) = setup();
        let buffer = MetricsBuffer {
            pulse: RateSeries::new(70.0, vec![obs(68.0, 0.9), obs(102.0, 0.95)]),
            breathing: RateSeries::new(15.0, vec![obs(14.0, 0.8), obs(22.0, 0.85)]),
        };

        publisher.on_metrics(&buffer, 987);

        let msg = rx.recv().await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&msg).unwrap();
        assert_eq!(parsed["type"], "vitals");
        assert_eq!(parsed["timestamp"], 987);
        assert_eq!(parsed["pulse"], 102);
        assert_eq!(parsed["pulseConfidence"], 0.95);
        assert_eq!(parsed["breathing"], 22);
        assert_eq!(parsed["breathingConfidence"], 0.85);
    }

    #[tokio::test]
    async fn empty_pulse_sequence_publishes_estimate_with_zero_confidence() {
        let (publisher, mut rx) = setup();
        let buffer = MetricsBuffer {
            pulse: RateSeries::new(64.0, vec![]),
            breathing: RateSeries::new(0.0, vec![obs(12.0, 0.7)]),
        };

        publisher.on_metrics(&buffer, 1);

        let msg = rx.recv().await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&msg).unwrap();
        assert_eq!(parsed["pulse"], 64);
        assert_eq!(parsed["pulseConfidence"], 0.0);
    }

    #[tokio::test]
    async fn edge_metrics_becomes_trace_message() {
        let (publisher, mut rx) = setup();
        let metrics = EdgeMetrics {
            breathing_upper_trace: vec![
                TracePoint { time: 0.0, value: 0.1 },
                TracePoint { time: 0.03, value: 0.6 },
            ],
        };

        publisher.on_edge_metrics(&metrics, 0);

        let msg = rx.recv().await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&msg).unwrap();
        assert_eq!(parsed["type"], "breathing_trace");
        assert_eq!(parsed["value"], 0.6);
    }

    #[tokio::test]
    async fn empty_trace_is_noop() {
        let (publisher, mut rx) = setup();
        publisher.on_edge_metrics(&EdgeMetrics::default(), 0);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn publish_with_no_sessions_is_benign() {
        let publisher = MetricsPublisher::new(Arc::new(SessionRegistry::new()));
        publisher.on_metrics(&MetricsBuffer::default(), 0);
        publisher.on_edge_metrics(&EdgeMetrics::default(), 0);
    }
}
