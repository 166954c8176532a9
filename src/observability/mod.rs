//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP layer and relays emit:
//!     → logging.rs (tracing events, request_id and route as fields)
//!     → metrics.rs (request counts and latency, upstream errors, relay gauges)
//!
//! Sinks:
//!     → stdout (pretty or JSON lines)
//!     → Prometheus scrape endpoint (when enabled)
//! ```
//!
//! # Design Decisions
//! - `RUST_LOG` overrides the configured level
//! - Metric labels are route names, never raw paths

pub mod logging;
pub mod metrics;
