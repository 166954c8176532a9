//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define gateway metrics (requests, latency, upstream errors, relays)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status, route
//! - `gateway_request_duration_seconds` (histogram): latency by route
//! - `gateway_upstream_errors_total` (counter): failures by route, kind
//! - `gateway_upgraded_connections` (gauge): relays currently streaming
//! - `gateway_relayed_bytes_total` (counter): relay bytes by direction
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Labels stay low-cardinality (route names, never paths)

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "route" => route.to_string()
    )
    .increment(1);
    histogram!("gateway_request_duration_seconds", "route" => route.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_upstream_error(route: &str, kind: &'static str) {
    counter!("gateway_upstream_errors_total", "route" => route.to_string(), "kind" => kind)
        .increment(1);
}

pub fn upgraded_connection_opened() {
    gauge!("gateway_upgraded_connections").increment(1.0);
}

pub fn upgraded_connection_closed() {
    gauge!("gateway_upgraded_connections").decrement(1.0);
}

pub fn record_relayed_bytes(direction: &'static str, bytes: u64) {
    counter!("gateway_relayed_bytes_total", "direction" => direction).increment(bytes);
}
