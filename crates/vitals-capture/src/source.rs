//! The `MetricsSource` trait: the seam between this pipeline and whatever
//! actually produces physiological estimates.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use vitals_core::{EdgeMetrics, MetricsBuffer};

use crate::error::CaptureError;

/// Callback invoked with an aggregated metrics buffer and a producer
/// timestamp (microseconds).
pub type MetricsCallback = Arc<dyn Fn(&MetricsBuffer, i64) + Send + Sync>;

/// Callback invoked at high frequency with instantaneous metrics and the
/// input timestamp (microseconds).
pub type EdgeMetricsCallback = Arc<dyn Fn(&EdgeMetrics, i64) + Send + Sync>;

/// Cancellation handle for a running source.
///
/// Cloneable so the host can stop the source from another thread while
/// `run()` blocks. Stopping is idempotent.
#[derive(Clone, Debug, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    /// Fresh, not-yet-stopped handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the run loop to exit.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Relaxed);
    }

    /// Whether a stop has been requested.
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }
}

/// An opaque producer of periodic vitals estimates and a high-frequency
/// breathing trace.
///
/// Lifecycle: register both callbacks, `initialize` with the access
/// credential, then `run` on a dedicated thread until the `StopHandle` is
/// stopped or the input is exhausted. Callback registration after
/// `initialize` is rejected; a rejected registration is fatal to the host's
/// startup sequence.
pub trait MetricsSource: Send {
    /// Subscribe to aggregated metrics buffers. Returns an error if the
    /// source rejects the registration.
    fn set_on_metrics(&mut self, callback: MetricsCallback) -> Result<(), CaptureError>;

    /// Subscribe to instantaneous edge metrics. Returns an error if the
    /// source rejects the registration.
    fn set_on_edge_metrics(&mut self, callback: EdgeMetricsCallback) -> Result<(), CaptureError>;

    /// Prepare the source. The credential is opaque to this pipeline and
    /// only passed through to the producer.
    fn initialize(&mut self, credential: &str) -> Result<(), CaptureError>;

    /// Blocking run loop. Invokes the registered callbacks on the calling
    /// thread until stopped.
    fn run(&mut self) -> Result<(), CaptureError>;

    /// Handle for stopping `run` from another thread.
    fn stop_handle(&self) -> StopHandle;
}
