//! HTTP server setup and dispatch.
//!
//! # Responsibilities
//! - Create the Axum router with the fixed endpoints and the forwarding fallback
//! - Wire up middleware (request ID, tracing, timeout, CORS, body limit)
//! - Build the shared upstream client
//! - Dispatch requests to the matched route's target
//! - Serve until shutdown, then wait for upgraded relays to drain
//!
//! # Design Decisions
//! - `/health` and `/` are answered locally and never forwarded
//! - Every other path goes through the route table; no match is a JSON 404
//! - Upstream failures are converted to responses here and never propagate

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::{any, get},
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::{util::option_layer, ServiceBuilder};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::http::assets::Assets;
use crate::http::health::health;
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::http::{forward, upgrade};
use crate::net::connection::RelayTracker;
use crate::observability::metrics;
use crate::resilience::{RetryPolicy, UpstreamTimeouts};
use crate::routing::{RouteTarget, Router as RouteTable};
use crate::security::cors::cors_layer;
use crate::security::headers::is_upgrade_request;
use crate::security::limits::body_limit_layer;
use crate::security::HeaderPolicy;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub client: Client<HttpConnector, Body>,
    pub headers: Arc<HeaderPolicy>,
    pub retry: RetryPolicy,
    pub timeouts: UpstreamTimeouts,
    pub assets: Arc<Assets>,
    pub relays: RelayTracker,
    pub relay_grace: Duration,
    pub max_body_size: usize,
}

impl AppState {
    pub fn from_config(config: &GatewayConfig) -> Self {
        let timeouts = UpstreamTimeouts::from(&config.timeouts);

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(timeouts.connect));
        connector.set_nodelay(true);

        let client = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(Duration::from_secs(config.timeouts.pool_idle_secs))
            .build(connector);

        Self {
            routes: Arc::new(RouteTable::from_config(&config.effective_routes())),
            client,
            headers: Arc::new(HeaderPolicy::from_config(&config.headers)),
            retry: RetryPolicy::from_config(&config.retries),
            timeouts,
            assets: Arc::new(Assets::from_config(&config.assets)),
            relays: RelayTracker::new(),
            relay_grace: Duration::from_millis(config.relay.close_grace_ms),
            max_body_size: config.limits.max_body_size,
        }
    }
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    relays: RelayTracker,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Self {
        let state = AppState::from_config(&config);
        let relays = state.relays.clone();
        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            relays,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/health", get(health))
            .route("/", get(root_handler).fallback(proxy_handler))
            .route("/{*path}", any(proxy_handler))
            .with_state(state)
            .layer(body_limit_layer(config.limits.max_body_size))
            .layer(option_layer(cors_layer(&config.cors)))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(TraceLayer::new_for_http())
                    .layer(propagate_request_id_layer()),
            )
    }

    /// The fully layered router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` fires, then drain upgraded relays.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let grace = Duration::from_millis(self.config.relay.close_grace_ms);
        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, no longer accepting connections");
            })
            .await?;

        let open = self.relays.live();
        if open > 0 {
            tracing::info!(relays = open, "Waiting for upgraded connections to close");
            if !self.relays.wait_for_drain(grace).await {
                tracing::warn!(
                    relays = self.relays.live(),
                    "Dropping upgraded connections still open after grace period"
                );
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// `GET /`: greeting or SPA entry point.
async fn root_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let response = state.assets.root(request).await;
    metrics::record_request(method.as_str(), response.status().as_u16(), "root", start);
    response
}

/// Everything except the fixed endpoints.
/// Looks up the route and forwards, relays, or serves assets.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = request_id(request.headers()).to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "Routing request"
    );

    let routes = Arc::clone(&state.routes);
    let Some(route) = routes.match_path(&path) else {
        tracing::warn!(request_id = %request_id, path = %path, "No route matched");
        metrics::record_request(method.as_str(), 404, "none", start);
        return GatewayError::NotFound { path }.into_response();
    };

    let response = match &route.target {
        RouteTarget::Static => state.assets.serve(request).await,
        RouteTarget::Upstream { upstream, upgrade: upgradable } => {
            let result = if *upgradable && is_upgrade_request(request.headers()) {
                upgrade::proxy_upgrade(&state, &route.name, upstream, request).await
            } else {
                forward::forward(&state, &route.name, upstream, request).await
            };

            result.unwrap_or_else(|err| {
                tracing::error!(
                    request_id = %request_id,
                    route = %route.name,
                    upstream = %upstream.origin(),
                    error = %err,
                    details = %err.details(),
                    "Forwarding failed"
                );
                metrics::record_upstream_error(&route.name, err.kind());
                err.into_response()
            })
        }
    };

    metrics::record_request(method.as_str(), response.status().as_u16(), &route.name, start);
    response
}
