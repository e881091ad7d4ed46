//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::HarnessConfig;
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

/// Kettle JSON-RPC endpoint.
pub const KETTLE_RPC_ENV: &str = "KETTLE_RPC";
/// Funded kettle account key.
pub const KETTLE_PRIVKEY_ENV: &str = "KETTLE_PRIVKEY";
/// L1 JSON-RPC endpoint.
pub const L1_RPC_ENV: &str = "L1_RPC";
/// Funded L1 account key.
pub const L1_PRIVKEY_ENV: &str = "L1_PRIVKEY";
/// Set to `true` or `1` to connect to the L1.
pub const L1_ENABLED_ENV: &str = "L1_ENABLED";

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<HarnessConfig, ConfigError> {
    let config: HarnessConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<HarnessConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Load the file if one is given, otherwise start from defaults, then apply
/// environment overrides and validate the result.
pub fn load_or_default(path: Option<&Path>) -> Result<HarnessConfig, ConfigError> {
    let mut config = match path {
        Some(path) => toml::from_str(&fs::read_to_string(path)?)?,
        None => HarnessConfig::default(),
    };
    apply_env_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply `KETTLE_*` / `L1_*` environment variables on top of `config`.
pub fn apply_env_overrides(config: &mut HarnessConfig) {
    apply_overrides(config, |key| std::env::var(key).ok());
}

/// Apply overrides from an arbitrary variable lookup.
pub fn apply_overrides<F>(config: &mut HarnessConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(KETTLE_RPC_ENV) {
        config.kettle.rpc_url = url;
    }
    if let Some(key) = lookup(KETTLE_PRIVKEY_ENV) {
        config.kettle.private_key = key;
    }
    if let Some(url) = lookup(L1_RPC_ENV) {
        config.l1.rpc_url = url;
    }
    if let Some(key) = lookup(L1_PRIVKEY_ENV) {
        config.l1.private_key = key;
    }
    if let Some(flag) = lookup(L1_ENABLED_ENV) {
        config.l1.enabled = matches!(flag.as_str(), "1" | "true" | "TRUE" | "True");
    }
}

/// Host name under which containers reach the host machine.
pub fn gateway_addr() -> &'static str {
    gateway_addr_for(std::env::var("CI").ok().as_deref())
}

fn gateway_addr_for(ci: Option<&str>) -> &'static str {
    // host.docker.internal does not resolve on CI runners
    if ci == Some("true") {
        "172.17.0.1"
    } else {
        "host.docker.internal"
    }
}
