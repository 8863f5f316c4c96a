//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GateConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

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

/// Environment variables read on top of the file.
pub const ENV_WEBHOOK_SECRET: &str = "WEBHOOK_SECRET";
pub const ENV_ALLOWED_ORIGINS: &str = "ALLOWED_ORIGINS";
pub const ENV_ADMIN_API_KEY: &str = "ADMIN_API_KEY";
pub const ENV_BIND_ADDRESS: &str = "BIND_ADDRESS";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";

/// Load configuration from an optional TOML file, apply environment
/// overrides, then validate.
pub fn load_config(path: Option<&Path>) -> Result<GateConfig, ConfigError> {
    let config = read_config(path)?;
    check_config(&config)?;
    Ok(config)
}

/// File plus environment overrides, without validation.
pub fn read_config(path: Option<&Path>) -> Result<GateConfig, ConfigError> {
    let mut config = match path {
        Some(path) => parse_config(&fs::read_to_string(path)?)?,
        None => GateConfig::default(),
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Validate `config`. Warnings are logged; only errors fail.
pub fn check_config(config: &GateConfig) -> Result<(), ConfigError> {
    let report = validate_config(config);
    for warning in &report.warnings {
        tracing::warn!(field = %warning.field, "{}", warning.message);
    }
    if report.valid {
        Ok(())
    } else {
        Err(ConfigError::Validation(report.errors))
    }
}

/// Parse a TOML document into a config without validating it.
pub fn parse_config(content: &str) -> Result<GateConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Overlay values from the environment. `lookup` abstracts `std::env::var`.
pub fn apply_env_overrides<F>(config: &mut GateConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(secret) = non_empty(ENV_WEBHOOK_SECRET) {
        config.webhook.secret = Some(secret);
    }
    if let Some(key) = non_empty(ENV_ADMIN_API_KEY) {
        config.admin.api_key = Some(key);
    }
    if let Some(origins) = non_empty(ENV_ALLOWED_ORIGINS) {
        config.cors.allowed_origins = origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();
    }
    if let Some(addr) = non_empty(ENV_BIND_ADDRESS) {
        config.listener.bind_address = addr;
    }
    if let Some(level) = non_empty(ENV_LOG_LEVEL) {
        config.observability.log_level = level;
    }
}
