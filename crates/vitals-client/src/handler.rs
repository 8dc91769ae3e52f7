//! Consumer-facing callback interface.

use vitals_core::VitalsSample;

/// Callbacks a downstream consumer registers on the stream client.
///
/// All methods have empty default bodies so consumers implement only what
/// they use. Callbacks are invoked from the client's driver task; that task
/// is the only synchronization point consumers may assume, and no
/// particular thread is guaranteed.
pub trait VitalsHandler: Send + Sync {
    /// A decoded vitals sample arrived.
    fn on_vitals(&self, _sample: &VitalsSample) {}

    /// Distress, re-evaluated on every vitals sample.
    fn on_distress(&self, _distressed: bool) {}

    /// A breathing waveform point arrived.
    fn on_breathing_trace(&self, _value: f64) {}

    /// The transport opened.
    fn on_connected(&self) {}

    /// The transport closed. Fired exactly once per close.
    fn on_disconnected(&self) {}
}

/// Handler that ignores everything; useful as a placeholder.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpHandler;

impl VitalsHandler for NoOpHandler {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_handler_accepts_all_callbacks() {
        let handler = NoOpHandler;
        handler.on_vitals(&VitalsSample {
            timestamp_micros: 0,
            pulse_bpm: 70,
            pulse_confidence: 0.9,
            breathing_bpm: 14,
            breathing_confidence: 0.8,
        });
        handler.on_distress(false);
        handler.on_breathing_trace(0.5);
        handler.on_connected();
        handler.on_disconnected();
    }
}
