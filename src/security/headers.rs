//! Header manipulation for forwarded requests and relayed responses.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers (static list plus `Connection` tokens)
//! - Apply the optional request header allow-list
//! - Add X-Forwarded-For, X-Forwarded-Proto, X-Forwarded-Host
//!
//! # Design Decisions
//! - Host is never forwarded; the client sets it from the upstream URI
//! - Existing X-Forwarded-For is extended, not trusted as the client address

use std::collections::HashSet;
use std::net::SocketAddr;

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

use crate::config::schema::HeadersConfig;

/// Headers meaningful for a single transport hop only.
pub const HOP_BY_HOP: [HeaderName; 9] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::TRANSFER_ENCODING,
    header::UPGRADE,
    HeaderName::from_static("proxy-connection"),
    header::TE,
    header::TRAILER,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
];

pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
pub const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");
pub const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

pub fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(name)
}

/// Header names listed in `Connection`, which are hop-by-hop as well.
fn connection_tokens(headers: &HeaderMap) -> HashSet<HeaderName> {
    headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|token| HeaderName::from_bytes(token.trim().as_bytes()).ok())
        .collect()
}

/// Copy of `headers` without hop-by-hop headers.
pub fn strip_hop_by_hop(headers: &HeaderMap) -> HeaderMap {
    let extra = connection_tokens(headers);
    let mut out = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if is_hop_by_hop(name) || extra.contains(name) {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
    out
}

/// True when the request asks to switch protocols.
pub fn is_upgrade_request(headers: &HeaderMap) -> bool {
    let connection_upgrade = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(|token| token.trim().eq_ignore_ascii_case("upgrade"));
    connection_upgrade && headers.contains_key(header::UPGRADE)
}

/// Request header policy compiled from configuration.
#[derive(Debug, Clone, Default)]
pub struct HeaderPolicy {
    allow: Option<HashSet<HeaderName>>,
    forwarded: bool,
}

impl HeaderPolicy {
    pub fn from_config(config: &HeadersConfig) -> Self {
        let allow = config.allow.as_ref().map(|names| {
            names
                .iter()
                .filter_map(|name| match HeaderName::from_bytes(name.trim().as_bytes()) {
                    Ok(name) => Some(name),
                    Err(_) => {
                        tracing::warn!(header = %name, "Ignoring invalid header name in allow-list");
                        None
                    }
                })
                .collect()
        });
        Self {
            allow,
            forwarded: config.forwarded,
        }
    }

    /// Headers to send upstream for an inbound request.
    pub fn outbound_request_headers(
        &self,
        inbound: &HeaderMap,
        client_addr: Option<SocketAddr>,
    ) -> HeaderMap {
        let mut out = strip_hop_by_hop(inbound);
        out.remove(header::HOST);

        if let Some(allow) = &self.allow {
            let names: Vec<HeaderName> = out.keys().cloned().collect();
            for name in names {
                if !allow.contains(&name) {
                    out.remove(&name);
                }
            }
        }

        if self.forwarded {
            if let Some(addr) = client_addr {
                let ip = addr.ip().to_string();
                let chain = match inbound.get(&X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
                    Some(existing) => format!("{}, {}", existing, ip),
                    None => ip,
                };
                if let Ok(value) = HeaderValue::from_str(&chain) {
                    out.insert(X_FORWARDED_FOR, value);
                }
            }
            if let Some(host) = inbound.get(header::HOST) {
                out.insert(X_FORWARDED_HOST, host.clone());
            }
            out.insert(X_FORWARDED_PROTO, HeaderValue::from_static("http"));
        }

        out
    }

    /// Headers to relay back to the client from an upstream response.
    pub fn inbound_response_headers(&self, upstream: &HeaderMap) -> HeaderMap {
        strip_hop_by_hop(upstream)
    }
}
