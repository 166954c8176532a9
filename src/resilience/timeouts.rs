//! Timeout enforcement.
//!
//! # Responsibilities
//! - Bound the wait for upstream response headers
//! - Carry the connect timeout into the connector
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - An expired deadline is reported exactly like a refused connection (502)

use std::future::Future;
use std::time::Duration;

use crate::config::schema::TimeoutConfig;
use crate::error::GatewayError;

/// Deadlines applied to every upstream call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpstreamTimeouts {
    pub connect: Duration,
    pub response: Duration,
}

impl From<&TimeoutConfig> for UpstreamTimeouts {
    fn from(config: &TimeoutConfig) -> Self {
        Self {
            connect: Duration::from_millis(config.connect_ms),
            response: Duration::from_millis(config.response_ms),
        }
    }
}

/// Run `fut` with a deadline; expiry becomes `UpstreamUnreachable`.
pub async fn with_deadline<F, T>(limit: Duration, fut: F) -> Result<T, GatewayError>
where
    F: Future<Output = Result<T, GatewayError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(GatewayError::UpstreamUnreachable {
            details: format!("upstream did not respond within {:?}", limit),
        }),
    }
}
