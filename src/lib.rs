//! Minimal HTTP gateway for the garden voting application.
//!
//! Answers health checks and the root greeting locally, forwards `/api` to
//! the API service, relays `/socket.io` upgrades to the results service and
//! serves static assets for everything else.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod resilience;
pub mod routing;
pub mod security;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
