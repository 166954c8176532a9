//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate upstream URLs and route prefixes
//! - Validate value ranges (timeouts > 0, ports valid)
//! - Detect conflicting routes (duplicates, multiple catch-alls)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use url::Url;

use crate::config::schema::{GatewayConfig, CATCH_ALL};
use crate::routing::matcher::normalize_prefix;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.port must be non-zero")]
    ZeroPort,

    #[error("route '{route}': path_prefix '{prefix}' must start with '/' or be '*'")]
    InvalidPrefix { route: String, prefix: String },

    #[error("route '{route}': duplicate path_prefix '{prefix}'")]
    DuplicatePrefix { route: String, prefix: String },

    #[error("more than one catch-all route ('*') configured")]
    MultipleCatchAll,

    #[error("route '{route}': an upstream is required")]
    MissingUpstream { route: String },

    #[error("route '{route}': upstream '{url}' is not an absolute http URL")]
    InvalidUpstream { route: String, url: String },

    #[error("{field} must be greater than zero")]
    ZeroValue { field: &'static str },

    #[error("retries.max_attempts must be 1 or 2, got {0}")]
    RetryAttempts(u32),
}

/// Check an upstream base URL, returning it parsed when valid.
/// Upstreams are plain HTTP; the outbound connector does not speak TLS.
pub fn parse_upstream(url: &str) -> Option<Url> {
    let parsed = Url::parse(url).ok()?;
    match parsed.scheme() {
        "http" if parsed.host_str().is_some() => Some(parsed),
        _ => None,
    }
}

/// Validate the whole configuration, collecting every error.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }

    let mut seen = HashSet::new();
    let mut catch_alls = 0;

    for route in config.effective_routes() {
        let is_catch_all = route.path_prefix == CATCH_ALL;

        if is_catch_all {
            catch_alls += 1;
        } else if !route.path_prefix.starts_with('/') {
            errors.push(ValidationError::InvalidPrefix {
                route: route.name.clone(),
                prefix: route.path_prefix.clone(),
            });
        }

        if !seen.insert(normalize_prefix(&route.path_prefix).to_string()) && !is_catch_all {
            errors.push(ValidationError::DuplicatePrefix {
                route: route.name.clone(),
                prefix: route.path_prefix.clone(),
            });
        }

        match &route.upstream {
            Some(url) => {
                if parse_upstream(url).is_none() {
                    errors.push(ValidationError::InvalidUpstream {
                        route: route.name.clone(),
                        url: url.clone(),
                    });
                }
            }
            None if !is_catch_all || route.upgrade => {
                errors.push(ValidationError::MissingUpstream { route: route.name.clone() });
            }
            None => {}
        }
    }

    if catch_alls > 1 {
        errors.push(ValidationError::MultipleCatchAll);
    }

    if config.timeouts.connect_ms == 0 {
        errors.push(ValidationError::ZeroValue { field: "timeouts.connect_ms" });
    }
    if config.timeouts.response_ms == 0 {
        errors.push(ValidationError::ZeroValue { field: "timeouts.response_ms" });
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroValue { field: "timeouts.request_secs" });
    }
    if config.limits.max_body_size == 0 {
        errors.push(ValidationError::ZeroValue { field: "limits.max_body_size" });
    }
    if !(1..=2).contains(&config.retries.max_attempts) {
        errors.push(ValidationError::RetryAttempts(config.retries.max_attempts));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
