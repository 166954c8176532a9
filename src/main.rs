//! Web gateway binary.
//!
//! ```text
//!                        ┌───────────────────────────────────────────┐
//!                        │                 GATEWAY                   │
//!     Client Request     │  ┌──────────┐   ┌─────────┐   ┌─────────┐ │
//!     ───────────────────┼─▶│ listener │──▶│  http   │──▶│ routing │ │
//!                        │  └──────────┘   │ server  │   └────┬────┘ │
//!                        │                 └─────────┘        │      │
//!                        │        ┌──────────────┬────────────┤      │
//!                        │        ▼              ▼            ▼      │
//!                        │  ┌──────────┐  ┌───────────┐ ┌─────────┐  │
//!                        │  │ forward  │  │  upgrade  │ │ assets  │  │
//!                        │  │ (/api)   │  │ + relay   │ │ (SPA)   │  │
//!                        │  └────┬─────┘  └─────┬─────┘ └─────────┘  │
//!                        └───────┼──────────────┼────────────────────┘
//!                                ▼              ▼
//!                           API service   Results service
//! ```
//!
//! Configuration comes from an optional TOML file, then environment
//! variables, then command-line flags.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use web_gateway::config::validation::validate_config;
use web_gateway::config::{resolve_config, ConfigError, GatewayConfig};
use web_gateway::lifecycle::startup;
use web_gateway::observability::logging;

#[derive(Parser)]
#[command(name = "web-gateway")]
#[command(about = "HTTP gateway for the garden web application", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen port (overrides LISTEN_PORT).
    #[arg(short, long)]
    port: Option<u16>,

    /// Static asset directory (overrides STATIC_ROOT).
    #[arg(long)]
    static_root: Option<String>,
}

impl Cli {
    fn apply(&self, config: &mut GatewayConfig) {
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(root) = &self.static_root {
            config.assets.root = root.clone();
        }
    }
}

/// File, then environment, then flags; validated once at the end.
fn load<F>(cli: &Cli, lookup: F) -> Result<GatewayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = resolve_config(cli.config.as_deref(), lookup)?;
    cli.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load(&cli, |var| std::env::var(var).ok()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("web-gateway: {}", err);
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = logging::init(&config.observability) {
        eprintln!("web-gateway: failed to initialize logging: {}", err);
        return ExitCode::FAILURE;
    }

    tracing::info!("web-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    match startup::run(config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "Gateway failed");
            ExitCode::FAILURE
        }
    }
}
