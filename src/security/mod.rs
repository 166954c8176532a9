//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → cors.rs (answer preflight, tag allowed origins)
//!     → limits.rs (check request body size)
//!     → headers.rs (strip hop-by-hop, allow-list, add X-Forwarded-*)
//!     → Pass to upstream
//! ```
//!
//! # Design Decisions
//! - Forwarding is explicit: only end-to-end headers cross the gateway
//! - Fail closed: oversize bodies are rejected, never truncated

pub mod cors;
pub mod headers;
pub mod limits;

pub use headers::HeaderPolicy;
