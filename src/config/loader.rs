//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::schema::{AssetsMode, GatewayConfig};
use crate::config::validation::ValidationError;

/// Environment variables recognized as overrides.
pub const ENV_LISTEN_PORT: &str = "LISTEN_PORT";
pub const ENV_API_UPSTREAM: &str = "API_UPSTREAM_BASE_URL";
pub const ENV_RESULTS_UPSTREAM: &str = "RESULTS_UPSTREAM_BASE_URL";
pub const ENV_STATIC_ROOT: &str = "STATIC_ROOT";
pub const ENV_STATIC_MODE: &str = "STATIC_MODE";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value '{value}' for {var}")]
    Env { var: &'static str, value: String },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse configuration from a TOML file (no overrides, no validation).
pub fn read_config_file(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Apply environment overrides using the given lookup (`std::env::var` in production).
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(ENV_LISTEN_PORT) {
        config.listener.port = value.trim().parse().map_err(|_| ConfigError::Env {
            var: ENV_LISTEN_PORT,
            value: value.clone(),
        })?;
    }
    if let Some(value) = lookup(ENV_API_UPSTREAM) {
        config.upstreams.api_base_url = value;
    }
    if let Some(value) = lookup(ENV_RESULTS_UPSTREAM) {
        config.upstreams.results_base_url = value;
    }
    if let Some(value) = lookup(ENV_STATIC_ROOT) {
        config.assets.root = value;
    }
    if let Some(value) = lookup(ENV_STATIC_MODE) {
        config.assets.mode = value.parse::<AssetsMode>().map_err(|_| ConfigError::Env {
            var: ENV_STATIC_MODE,
            value: value.clone(),
        })?;
    }
    Ok(())
}

/// Optional TOML file, then environment overrides. Not validated, so later
/// layers (command-line flags) can still fix values before `validate_config`.
pub fn resolve_config<F>(path: Option<&Path>, lookup: F) -> Result<GatewayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => read_config_file(path)?,
        None => GatewayConfig::default(),
    };
    apply_env_overrides(&mut config, lookup)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validation::validate_config;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn env_overrides_replace_file_values() {
        let mut config = GatewayConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                (ENV_LISTEN_PORT, "3000"),
                (ENV_API_UPSTREAM, "http://127.0.0.1:5000"),
                (ENV_RESULTS_UPSTREAM, "http://127.0.0.1:5001"),
                (ENV_STATIC_ROOT, "/srv/www"),
                (ENV_STATIC_MODE, "spa"),
            ]),
        )
        .unwrap();

        assert_eq!(config.listener.port, 3000);
        assert_eq!(config.upstreams.api_base_url, "http://127.0.0.1:5000");
        assert_eq!(config.upstreams.results_base_url, "http://127.0.0.1:5001");
        assert_eq!(config.assets.root, "/srv/www");
        assert_eq!(config.assets.mode, AssetsMode::Spa);
    }

    #[test]
    fn bad_port_is_reported() {
        let mut config = GatewayConfig::default();
        let err = apply_env_overrides(&mut config, env(&[(ENV_LISTEN_PORT, "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: ENV_LISTEN_PORT, .. }));
    }

    #[test]
    fn reads_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [upstreams]
            api_base_url = "http://localhost:7000"

            [[routes]]
            name = "api"
            path_prefix = "/api"
            upstream = "http://localhost:7000"
            "#
        )
        .unwrap();

        let config = read_config_file(file.path()).unwrap();
        assert_eq!(config.upstreams.api_base_url, "http://localhost:7000");
        assert_eq!(config.routes.len(), 1);
        assert!(!config.routes[0].upgrade);
    }

    #[test]
    fn resolve_leaves_validation_to_the_caller() {
        let mut config = resolve_config(None, env(&[(ENV_LISTEN_PORT, "0")])).unwrap();
        assert_eq!(config.listener.port, 0);
        assert!(validate_config(&config).is_err());

        config.listener.port = 8080;
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn validation_errors_are_joined() {
        let err = ConfigError::Validation(vec![
            ValidationError::ZeroPort,
            ValidationError::MultipleCatchAll,
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: listener.port must be non-zero, more than one catch-all route ('*') configured"
        );
    }
}
