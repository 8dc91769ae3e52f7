//! # vitals-capture
//!
//! The metrics-producer boundary. The physiological extraction itself is an
//! opaque upstream concern; this crate defines the `MetricsSource` trait the
//! host process programs against, plus two concrete sources:
//!
//! - `SyntheticSource`: seeded generator standing in for a live device
//! - `ReplaySource`: replays a JSONL recording of metrics frames
//!
//! Both callbacks registered on a source are invoked synchronously on the
//! source's own run thread; consumers must be safe to call from there.

#![deny(unsafe_code)]

pub mod error;
pub mod replay;
pub mod source;
pub mod synthetic;

pub use error::CaptureError;
pub use replay::{RecordedFrame, ReplaySource};
pub use source::{EdgeMetricsCallback, MetricsCallback, MetricsSource, StopHandle};
pub use synthetic::{SyntheticConfig, SyntheticSource};
