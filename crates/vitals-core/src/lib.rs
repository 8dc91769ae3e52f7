//! # vitals-core
//!
//! Shared vocabulary for the vitals streaming pipeline.
//!
//! This crate provides the types the server, client, and capture crates agree on:
//!
//! - **Wire protocol**: `StreamMessage` enum covering `vitals` and `breathing_trace`
//!   JSON messages
//! - **Metrics types**: `MetricsBuffer` / `EdgeMetrics` as produced by the upstream
//!   metrics source, with extraction helpers for the latest observations
//! - **Distress classification**: `is_distressed` threshold rule
//! - **Errors**: `WireError` for decode failures

#![deny(unsafe_code)]

pub mod distress;
pub mod error;
pub mod metrics;
pub mod wire;

pub use distress::is_distressed;
pub use error::WireError;
pub use metrics::{EdgeMetrics, MetricsBuffer, RateObservation, RateSeries, TracePoint};
pub use wire::{BreathingTraceSample, StreamMessage, VitalsSample};
