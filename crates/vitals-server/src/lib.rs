//! # vitals-server
//!
//! Axum HTTP + `WebSocket` broadcast server for the vitals pipeline.
//!
//! - `WebSocket` endpoint: accepts any number of consumers, registers each as
//!   a session, fans out every emitted sample best-effort
//! - `MetricsPublisher`: bridges the producer's synchronous callbacks into
//!   wire messages and broadcast
//! - Session registry: the single mutex-guarded piece of shared state
//! - Graceful shutdown via `tokio::signal` + `CancellationToken`

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod health;
pub mod publisher;
pub mod server;
pub mod shutdown;
pub mod websocket;

pub use config::ServerConfig;
pub use error::ServerError;
pub use publisher::MetricsPublisher;
pub use server::VitalsServer;
