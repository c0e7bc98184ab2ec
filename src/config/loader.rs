//! Configuration loading from disk and the environment.

use std::path::Path;
use std::fs;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, apply environment
/// overrides, then validate.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => parse_config(&fs::read_to_string(path)?)?,
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Parse a TOML document without validating it.
pub fn parse_config(content: &str) -> Result<GatewayConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Overlay deployment variables on top of file settings.
///
/// Empty variables are ignored, except `ACCESS_TOKEN` which is stored as-is
/// and treated as "no static token" later on.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

    if let Some(v) = non_empty("WORKFLOW_ID") {
        config.workflow.workflow_id = v;
    }
    if let Some(v) = lookup("ACCESS_TOKEN") {
        config.workflow.access_token = Some(v);
    }
    if let Some(v) = non_empty("WORKFLOW_API_URL") {
        config.workflow.api_url = v;
    }
    if let Some(v) = non_empty("TOKEN_SERVICE_URL") {
        config.token_service.url = v;
    }
    if let Some(v) = non_empty("STATIC_ASSETS_ORIGIN") {
        config.static_assets.origin = Some(v);
    }
    if let Some(v) = non_empty("BIND_ADDRESS") {
        config.listener.bind_address = v;
    }
}
