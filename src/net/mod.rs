//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     listener.rs (bind configured host:port, fatal on failure)
//!
//! Upgraded connections (after 101 Switching Protocols):
//!     connection.rs (id, Handshaking → Streaming → Closed, live count)
//!     → relay.rs (raw bytes both ways until close + grace)
//! ```
//!
//! # Design Decisions
//! - Plain HTTP connections are owned by hyper; only relays are tracked here
//! - Each relay is tracked for graceful shutdown

pub mod connection;
pub mod listener;
pub mod relay;
