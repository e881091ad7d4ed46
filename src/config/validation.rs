//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate endpoint URLs and private keys
//! - Validate value ranges (intervals and timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: HarnessConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::chain::identity::Identity;
use crate::config::schema::{ChainEndpointConfig, HarnessConfig};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid URL '{value}'")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{field}: invalid private key")]
    InvalidPrivateKey { field: &'static str },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("retry.transient_markers contains an empty marker")]
    EmptyMarker,
}

/// Validate a parsed configuration, collecting every error.
pub fn validate_config(config: &HarnessConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    validate_endpoint(&config.kettle, "kettle", &mut errors);
    if config.l1.enabled {
        validate_endpoint(&config.l1.endpoint(), "l1", &mut errors);
    }

    let tx = &config.transactions;
    if tx.receipt_poll_interval_ms == 0 {
        errors.push(ValidationError::Zero { field: "transactions.receipt_poll_interval_ms" });
    }
    if tx.receipt_timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "transactions.receipt_timeout_secs" });
    }
    if tx.default_gas_limit == 0 {
        errors.push(ValidationError::Zero { field: "transactions.default_gas_limit" });
    }
    if tx.transfer_gas_limit == 0 {
        errors.push(ValidationError::Zero { field: "transactions.transfer_gas_limit" });
    }

    if config.retry.interval_secs == 0 {
        errors.push(ValidationError::Zero { field: "retry.interval_secs" });
    }
    if config.retry.transient_markers.iter().any(|m| m.is_empty()) {
        errors.push(ValidationError::EmptyMarker);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_endpoint(
    endpoint: &ChainEndpointConfig,
    section: &'static str,
    errors: &mut Vec<ValidationError>,
) {
    let (url_field, key_field) = match section {
        "l1" => ("l1.rpc_url", "l1.private_key"),
        _ => ("kettle.rpc_url", "kettle.private_key"),
    };

    if endpoint.rpc_url.parse::<url::Url>().is_err() {
        errors.push(ValidationError::InvalidUrl {
            field: url_field,
            value: endpoint.rpc_url.clone(),
        });
    }
    if Identity::from_hex(&endpoint.private_key).is_err() {
        errors.push(ValidationError::InvalidPrivateKey { field: key_field });
    }
}
