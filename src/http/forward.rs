//! Plain HTTP forwarding.
//!
//! # Responsibilities
//! - Build the outbound request (target URI, filtered headers, request ID)
//! - Stream the client body upstream and the upstream body back
//! - Apply the response deadline and the optional single retry
//! - Classify client failures into the gateway error taxonomy
//!
//! # Design Decisions
//! - Bodies are never buffered; only empty-bodied requests are retried
//! - Each exchange carries a phase guard. Dropping it mid-flight means the
//!   client went away, which is logged and counted but never answered

use axum::body::{Body, HttpBody};
use axum::http::{HeaderMap, Request};
use axum::response::Response;
use hyper::body::Incoming;
use hyper_util::client::legacy::Error as ClientError;

use crate::error::{describe, GatewayError};
use crate::http::request::{client_addr, request_id, X_REQUEST_ID};
use crate::http::response::relay_response;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::resilience::timeouts::with_deadline;
use crate::routing::Upstream;
use crate::security::limits::is_length_limit_error;

/// Where a forwarded exchange currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Received,
    Forwarding,
    Completed,
    Failed,
}

/// Tracks one exchange; reports a client abort when dropped while forwarding.
#[derive(Debug)]
pub struct Exchange<'a> {
    request_id: &'a str,
    route: &'a str,
    phase: Phase,
}

impl<'a> Exchange<'a> {
    pub fn new(request_id: &'a str, route: &'a str) -> Self {
        Self {
            request_id,
            route,
            phase: Phase::Received,
        }
    }

    pub fn advance(&mut self, next: Phase) {
        self.phase = next;
    }
}

impl Drop for Exchange<'_> {
    fn drop(&mut self) {
        if self.phase == Phase::Forwarding {
            let err = GatewayError::ClientAborted;
            tracing::debug!(
                request_id = %self.request_id,
                route = %self.route,
                "Client aborted; upstream request cancelled"
            );
            metrics::record_upstream_error(self.route, err.kind());
        }
    }
}

/// Map a client error onto the gateway taxonomy.
pub(crate) fn classify(err: &ClientError, max_body_size: usize) -> GatewayError {
    if is_length_limit_error(err) {
        GatewayError::PayloadTooLarge { limit: max_body_size }
    } else if err.is_connect() {
        GatewayError::UpstreamUnreachable { details: describe(err) }
    } else {
        GatewayError::UpstreamProtocolError { details: describe(err) }
    }
}

/// Outbound headers: policy-filtered inbound headers plus the request ID.
pub(crate) fn outbound_headers(state: &AppState, request: &Request<Body>) -> HeaderMap {
    let mut headers = state
        .headers
        .outbound_request_headers(request.headers(), client_addr(request));
    if let Some(id) = request.headers().get(X_REQUEST_ID) {
        headers.insert(X_REQUEST_ID, id.clone());
    }
    headers
}

/// Send one request to the upstream, bounded by the response deadline.
pub(crate) async fn send(
    state: &AppState,
    request: Request<Body>,
) -> Result<Response<Incoming>, GatewayError> {
    let max_body_size = state.max_body_size;
    with_deadline(state.timeouts.response, async {
        state
            .client
            .request(request)
            .await
            .map_err(|err| classify(&err, max_body_size))
    })
    .await
}

/// Forward a request to `upstream` and relay the response.
pub async fn forward(
    state: &AppState,
    route: &str,
    upstream: &Upstream,
    request: Request<Body>,
) -> Result<Response, GatewayError> {
    let request_id = request_id(request.headers()).to_string();
    let mut exchange = Exchange::new(&request_id, route);

    let uri = upstream
        .uri_for(request.uri())
        .map_err(|err| GatewayError::UpstreamUnreachable {
            details: format!("invalid upstream URI: {}", err),
        })?;
    let headers = outbound_headers(state, &request);
    let (parts, body) = request.into_parts();
    let attempts = state.retry.attempts_for(&parts.method, body.is_end_stream());

    exchange.advance(Phase::Forwarding);
    tracing::debug!(
        request_id = %request_id,
        route = %route,
        uri = %uri,
        "Forwarding request"
    );

    let mut body = Some(body);
    let mut attempt = 0;
    let result = loop {
        attempt += 1;

        let mut outbound = Request::new(body.take().unwrap_or_else(Body::empty));
        *outbound.method_mut() = parts.method.clone();
        *outbound.uri_mut() = uri.clone();
        *outbound.headers_mut() = headers.clone();

        match send(state, outbound).await {
            Ok(response) => break Ok(relay_response(&state.headers, response)),
            Err(err @ GatewayError::UpstreamUnreachable { .. }) if attempt < attempts => {
                let delay = state.retry.delay(attempt);
                tracing::info!(
                    request_id = %request_id,
                    attempt,
                    delay = ?delay,
                    details = %err.details(),
                    "Retrying after unreachable upstream"
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => break Err(err),
        }
    };

    exchange.advance(if result.is_ok() {
        Phase::Completed
    } else {
        Phase::Failed
    });
    result
}
