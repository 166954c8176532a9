//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → router.rs (route lookup)
//!     → matcher.rs (evaluate prefix conditions)
//!     → Return: matched Route (upstream or static) or NoMatch
//!
//! Route Compilation (at startup):
//!     RouteConfig[]
//!     → Resolve upstream base URLs
//!     → Sort by prefix length (longest first, catch-all last)
//!     → Freeze as immutable Router
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always matches same route

pub mod matcher;
pub mod router;

pub use router::{Route, RouteTarget, Router, Upstream};
