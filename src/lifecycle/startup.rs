//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order (metrics, listener, server)
//! - Wire OS signals to graceful shutdown
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: a listener that cannot bind is fatal
//! - An unusable metrics address is logged, not fatal
//! - Listeners start last (traffic only when ready)

use crate::config::GatewayConfig;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::net::listener::{self, ListenerError};
use crate::observability::metrics;

/// Fatal startup or serve failure.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Start the gateway and serve until a shutdown signal arrives.
pub async fn run(config: GatewayConfig) -> Result<(), StartupError> {
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        api_upstream = %config.upstreams.api_base_url,
        results_upstream = %config.upstreams.results_base_url,
        static_root = %config.assets.root,
        request_timeout_secs = config.timeouts.request_secs,
        max_body_size = config.limits.max_body_size,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(err) = metrics::init_metrics(addr) {
                    tracing::error!(error = %err, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = listener::bind(&config.listener).await?;

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    HttpServer::new(config).run(listener, shutdown.subscribe()).await?;
    Ok(())
}
