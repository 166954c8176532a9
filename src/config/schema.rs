//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Prefix value that marks the catch-all route.
pub const CATCH_ALL: &str = "*";

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (host, port).
    pub listener: ListenerConfig,

    /// Named upstream services referenced by the default route table.
    pub upstreams: UpstreamsConfig,

    /// Explicit route rules. When empty, [`GatewayConfig::effective_routes`]
    /// derives the default table from `upstreams`.
    pub routes: Vec<RouteConfig>,

    /// Static asset serving.
    pub assets: AssetsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Retry configuration.
    pub retries: RetryConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Request header forwarding policy.
    pub headers: HeadersConfig,

    /// Cross-origin settings.
    pub cors: CorsConfig,

    /// Upgraded connection relay settings.
    pub relay: RelayConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl GatewayConfig {
    /// The route table the gateway actually serves.
    ///
    /// Explicit `routes` win; otherwise `/api` goes to the api upstream,
    /// `/socket.io` to the results upstream (upgradable) and everything
    /// else falls through to static assets.
    pub fn effective_routes(&self) -> Vec<RouteConfig> {
        if !self.routes.is_empty() {
            return self.routes.clone();
        }

        vec![
            RouteConfig {
                name: "api".to_string(),
                path_prefix: "/api".to_string(),
                upstream: Some(self.upstreams.api_base_url.clone()),
                upgrade: false,
            },
            RouteConfig {
                name: "results".to_string(),
                path_prefix: "/socket.io".to_string(),
                upstream: Some(self.upstreams.results_base_url.clone()),
                upgrade: true,
            },
            RouteConfig {
                name: "static".to_string(),
                path_prefix: CATCH_ALL.to_string(),
                upstream: None,
                upgrade: false,
            },
        ]
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: String,

    /// TCP port to listen on.
    pub port: u16,
}

impl ListenerConfig {
    /// `host:port` string suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Base URLs of the backend services.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamsConfig {
    /// Vote API service.
    pub api_base_url: String,

    /// Results service (socket.io).
    pub results_base_url: String,
}

impl Default for UpstreamsConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://garden-api:8080".to_string(),
            results_base_url: "http://result:8080".to_string(),
        }
    }
}

/// A single route rule.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RouteConfig {
    /// Route identifier for logging/metrics.
    pub name: String,

    /// Path prefix to match, or `*` for the catch-all.
    pub path_prefix: String,

    /// Upstream base URL (e.g., "http://garden-api:8080").
    /// Only the catch-all may omit it, in which case it serves static assets.
    #[serde(default)]
    pub upstream: Option<String>,

    /// Relay upgrade requests (WebSocket) as raw byte streams.
    #[serde(default)]
    pub upgrade: bool,
}

/// How `/` and unmatched catch-all paths are answered.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AssetsMode {
    /// `/` answers a plain-text greeting; static files are served as-is.
    #[default]
    Greeting,
    /// `/` and unknown paths answer `index.html`.
    Spa,
}

impl std::str::FromStr for AssetsMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "greeting" => Ok(AssetsMode::Greeting),
            "spa" => Ok(AssetsMode::Spa),
            other => Err(format!("unknown assets mode '{}'", other)),
        }
    }
}

/// Static asset configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Filesystem path of the built assets.
    pub root: String,

    /// Serving mode.
    pub mode: AssetsMode,

    /// Body returned by `GET /` in greeting mode.
    pub greeting: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            root: "public".to_string(),
            mode: AssetsMode::Greeting,
            greeting: "Garden Web Application is running".to_string(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in milliseconds.
    pub connect_ms: u64,

    /// Time to wait for upstream response headers in milliseconds.
    pub response_ms: u64,

    /// Overall inbound request timeout in seconds.
    pub request_secs: u64,

    /// Idle pooled upstream connection timeout in seconds.
    pub pool_idle_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_ms: 2_000,
            response_ms: 30_000,
            request_secs: 60,
            pool_idle_secs: 90,
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Enable the single bounded retry.
    pub enabled: bool,

    /// Total attempts including the first one (1 or 2).
    pub max_attempts: u32,

    /// Base delay for backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_attempts: 2,
            base_delay_ms: 100,
            max_delay_ms: 1_000,
        }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Request header forwarding policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HeadersConfig {
    /// When set, only these request headers (case-insensitive) are forwarded.
    /// Hop-by-hop headers are always dropped.
    pub allow: Option<Vec<String>>,

    /// Add X-Forwarded-For / -Host / -Proto to forwarded requests.
    pub forwarded: bool,
}

impl Default for HeadersConfig {
    fn default() -> Self {
        Self {
            allow: None,
            forwarded: true,
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Enable the CORS layer.
    pub enabled: bool,

    /// Allowed origins; empty means any origin.
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: Vec::new(),
        }
    }
}

/// Upgraded connection relay configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelayConfig {
    /// How long the other direction may keep flowing after one side closes.
    pub close_grace_ms: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            close_grace_ms: 5_000,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error), used when RUST_LOG is unset.
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
