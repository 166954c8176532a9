//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream:
//!     → timeouts.rs (connect timeout on the connector, deadline on response headers)
//!     → On unreachable upstream: retries.rs (single bounded retry with backoff.rs jitter)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every upstream call has a deadline
//! - Retries are opt-in, idempotent-only, and never more than one
//! - No circuit breaking: a failure is surfaced to the client immediately

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use retries::RetryPolicy;
pub use timeouts::UpstreamTimeouts;
