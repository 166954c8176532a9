//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! startup.rs:   metrics exporter → bind listener → serve
//! signals.rs:   SIGINT | SIGTERM → shutdown.rs trigger
//! shutdown.rs:  broadcast → server stops accepting → in-flight finish
//!               → upgraded relays drain (bounded) → exit 0
//! ```
//!
//! # Design Decisions
//! - Bind failure is fatal and exits non-zero
//! - Relay drain is bounded by the close grace period

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
