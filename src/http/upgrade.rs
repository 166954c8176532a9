//! Protocol upgrade handling.
//!
//! # Responsibilities
//! - Replay the client's upgrade handshake against the upstream
//! - Answer the client with the upstream's `101` handshake headers
//! - Splice both upgraded connections through the byte relay
//!
//! # Design Decisions
//! - The relay never inspects frames; the upgraded protocol is opaque
//! - A declined upgrade is relayed like any other response
//! - Each relay holds a tracker guard so shutdown can wait for it

use axum::body::Body;
use axum::http::{header, HeaderValue, Request, StatusCode};
use axum::response::Response;
use hyper_util::rt::TokioIo;

use crate::error::GatewayError;
use crate::http::forward::{outbound_headers, send};
use crate::http::request::request_id;
use crate::http::response::relay_response;
use crate::http::server::AppState;
use crate::net::connection::RelayState;
use crate::net::relay::relay;
use crate::observability::metrics;
use crate::routing::Upstream;

/// Complete an upgrade handshake with `upstream` and spawn the relay.
pub async fn proxy_upgrade(
    state: &AppState,
    route: &str,
    upstream: &Upstream,
    mut request: Request<Body>,
) -> Result<Response, GatewayError> {
    let request_id = request_id(request.headers()).to_string();
    let uri = upstream
        .uri_for(request.uri())
        .map_err(|err| GatewayError::UpstreamUnreachable {
            details: format!("invalid upstream URI: {}", err),
        })?;

    let mut headers = outbound_headers(state, &request);
    headers.insert(header::CONNECTION, HeaderValue::from_static("upgrade"));
    if let Some(protocol) = request.headers().get(header::UPGRADE) {
        headers.insert(header::UPGRADE, protocol.clone());
    }

    let client_upgrade = hyper::upgrade::on(&mut request);

    let mut handshake = Request::new(Body::empty());
    *handshake.method_mut() = request.method().clone();
    *handshake.uri_mut() = uri;
    *handshake.headers_mut() = headers;

    let mut guard = state.relays.track();
    tracing::debug!(
        request_id = %request_id,
        route = %route,
        relay = %guard.id(),
        "Sending upgrade handshake upstream"
    );

    let mut response = send(state, handshake).await?;
    if response.status() != StatusCode::SWITCHING_PROTOCOLS {
        tracing::debug!(
            request_id = %request_id,
            status = %response.status(),
            "Upstream declined upgrade"
        );
        return Ok(relay_response(&state.headers, response));
    }

    let upstream_upgrade = hyper::upgrade::on(&mut response);
    let mut switching = Response::new(Body::empty());
    *switching.status_mut() = StatusCode::SWITCHING_PROTOCOLS;
    *switching.headers_mut() = response.headers().clone();

    let grace = state.relay_grace;
    let route = route.to_string();
    tokio::spawn(async move {
        let (client_io, upstream_io) = match tokio::try_join!(client_upgrade, upstream_upgrade) {
            Ok(pair) => pair,
            Err(err) => {
                tracing::warn!(
                    request_id = %request_id,
                    relay = %guard.id(),
                    error = %err,
                    "Upgrade did not complete"
                );
                metrics::record_upstream_error(&route, "upgrade");
                return;
            }
        };

        guard.advance(RelayState::Streaming);
        metrics::upgraded_connection_opened();
        tracing::debug!(relay = %guard.id(), route = %route, "Relay streaming");

        let stats = relay(TokioIo::new(client_io), TokioIo::new(upstream_io), grace).await;

        metrics::upgraded_connection_closed();
        metrics::record_relayed_bytes("upstream", stats.client_to_upstream);
        metrics::record_relayed_bytes("client", stats.upstream_to_client);
        tracing::debug!(
            relay = %guard.id(),
            to_upstream = stats.client_to_upstream,
            to_client = stats.upstream_to_client,
            "Relay closed"
        );
    });

    Ok(switching)
}
