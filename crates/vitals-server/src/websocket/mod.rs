//! WebSocket session management and sample fan-out.

pub mod broadcast;
pub mod connection;
pub mod session;
