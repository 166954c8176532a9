//! Response handling and transformation.
//!
//! # Responsibilities
//! - Turn an upstream response into a client response
//! - Strip hop-by-hop headers, keep everything else verbatim
//! - Stream the upstream body without buffering

use axum::body::Body;
use axum::response::Response;
use hyper::body::Incoming;

use crate::security::HeaderPolicy;

/// Relay status, end-to-end headers, and the streamed body.
pub fn relay_response(policy: &HeaderPolicy, upstream: Response<Incoming>) -> Response {
    let (mut parts, body) = upstream.into_parts();
    parts.headers = policy.inbound_response_headers(&parts.headers);
    Response::from_parts(parts, Body::new(body))
}
