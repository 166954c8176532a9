//! Request-path error taxonomy.
//!
//! Every failure on the forwarding path ends here and is rendered as a JSON
//! body `{ "error": ..., "details": ... }`. Nothing on this path is allowed to
//! propagate past the handler.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Errors surfaced by the forwarding router.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Connection refused, DNS failure, or timeout.
    #[error("Failed to connect to API")]
    UpstreamUnreachable { details: String },

    /// Upstream answered with something that is not valid HTTP.
    #[error("Invalid response from upstream")]
    UpstreamProtocolError { details: String },

    /// The inbound connection went away. Never rendered to the client.
    #[error("Client aborted request")]
    ClientAborted,

    /// No route matches the path.
    #[error("Not Found")]
    NotFound { path: String },

    /// Request body exceeded the configured limit.
    #[error("Payload Too Large")]
    PayloadTooLarge { limit: usize },
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub details: String,
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::UpstreamUnreachable { .. } | GatewayError::UpstreamProtocolError { .. } => {
                StatusCode::BAD_GATEWAY
            }
            // 499 is the de-facto "client closed request" code; only used for metrics.
            GatewayError::ClientAborted => {
                StatusCode::from_u16(499).unwrap_or(StatusCode::BAD_REQUEST)
            }
            GatewayError::NotFound { .. } => StatusCode::NOT_FOUND,
            GatewayError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::UpstreamUnreachable { .. } => "unreachable",
            GatewayError::UpstreamProtocolError { .. } => "protocol",
            GatewayError::ClientAborted => "client_aborted",
            GatewayError::NotFound { .. } => "not_found",
            GatewayError::PayloadTooLarge { .. } => "payload_too_large",
        }
    }

    /// Diagnostic string rendered in the `details` field.
    pub fn details(&self) -> String {
        match self {
            GatewayError::UpstreamUnreachable { details }
            | GatewayError::UpstreamProtocolError { details } => details.clone(),
            GatewayError::ClientAborted => String::new(),
            GatewayError::NotFound { path } => path.clone(),
            GatewayError::PayloadTooLarge { limit } => {
                format!("request body exceeds {} bytes", limit)
            }
        }
    }
}

/// Render an error with its whole source chain, outermost first.
pub fn describe(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut current = err.source();
    while let Some(cause) = current {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        current = cause.source();
    }
    out
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
            details: self.details(),
        };
        (self.status(), Json(body)).into_response()
    }
}
