//! # vitals-client
//!
//! Resilient consumer side of the vitals stream.
//!
//! `VitalsStreamClient` keeps one best-effort persistent connection to the
//! broadcast server, decodes incoming wire messages, evaluates distress on
//! every vitals sample, and automatically reconnects after any disconnect
//! at a fixed configurable interval. Consumers observe the stream through
//! the `VitalsHandler` callback trait.

#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod error;
pub mod handler;

pub use client::{ConnectionState, VitalsStreamClient};
pub use config::ClientConfig;
pub use error::ClientError;
pub use handler::{NoOpHandler, VitalsHandler};
