//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, dispatch)
//!     → request.rs (request ID, peer address)
//!     → [routing layer picks the target]
//!     → forward.rs (plain exchange) | upgrade.rs (handshake + byte relay)
//!       | assets.rs (greeting, static files, SPA fallback)
//!     → response.rs (strip hop-by-hop, stream body)
//!     → Send to client
//! ```

pub mod assets;
pub mod forward;
pub mod health;
pub mod request;
pub mod response;
pub mod server;
pub mod upgrade;

pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
