//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the harness.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Funded account on a local kettle devnet (0xBE69d72ca5f88aCba033a063dF5DBe43a4148De0).
pub const DEFAULT_KETTLE_PRIVATE_KEY: &str =
    "91ab9a7e53c220e6210460b65a7a3bb2ca181412a8a7b43ff336b3df1737ce12";

/// Funded account on a local L1 devnet (0xB5fEAfbDD752ad52Afb7e1bD2E40432A485bBB7F).
pub const DEFAULT_L1_PRIVATE_KEY: &str =
    "6c45335a22461ccdb978b78ab61b238bad2fae4544fb55c14eb096c875ccfc52";

/// Root configuration for the harness.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct HarnessConfig {
    /// Confidential chain (kettle) endpoint and funded account.
    pub kettle: ChainEndpointConfig,

    /// Companion public chain.
    pub l1: L1Config,

    /// Transaction lifecycle settings shared by both chains.
    pub transactions: TransactionConfig,

    /// Retry policy for transient confidential request failures.
    pub retry: RetryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// A JSON-RPC endpoint plus the account that pays for deployments and funding.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainEndpointConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Hex private key of the funded account (with or without 0x).
    pub private_key: String,
}

impl Default for ChainEndpointConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            private_key: DEFAULT_KETTLE_PRIVATE_KEY.to_string(),
        }
    }
}

/// Companion public chain configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct L1Config {
    /// Connect to the L1 at startup.
    pub enabled: bool,

    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Hex private key of the funded L1 account.
    pub private_key: String,
}

impl Default for L1Config {
    fn default() -> Self {
        Self {
            enabled: false,
            rpc_url: "http://localhost:8555".to_string(),
            private_key: DEFAULT_L1_PRIVATE_KEY.to_string(),
        }
    }
}

impl L1Config {
    /// View this section as a plain endpoint.
    pub fn endpoint(&self) -> ChainEndpointConfig {
        ChainEndpointConfig {
            rpc_url: self.rpc_url.clone(),
            private_key: self.private_key.clone(),
        }
    }
}

/// Transaction lifecycle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransactionConfig {
    /// Interval between `eth_getTransactionReceipt` polls in milliseconds.
    pub receipt_poll_interval_ms: u64,

    /// Deadline applied when the caller does not pass one, in seconds.
    pub receipt_timeout_secs: u64,

    /// Gas limit for contract creation and contract calls.
    pub default_gas_limit: u64,

    /// Gas limit for plain value transfers.
    pub transfer_gas_limit: u64,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            receipt_poll_interval_ms: 500,
            receipt_timeout_secs: 60,
            default_gas_limit: 10_000_000,
            transfer_gas_limit: 21_000,
        }
    }
}

/// Marker the builder relay returns until it has seen the slot's payload attributes.
pub const PAYLOAD_ATTRIBUTES_NOT_KNOWN: &str = "payload attributes not (yet) known";

/// Retry configuration for confidential requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Fixed sleep between attempts in seconds.
    pub interval_secs: u64,

    /// Overall deadline in seconds (0 disables it).
    pub deadline_secs: u64,

    /// Error substrings that mark a failure as transient.
    pub transient_markers: Vec<String>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            interval_secs: 3,
            deadline_secs: 30,
            transient_markers: vec![PAYLOAD_ATTRIBUTES_NOT_KNOWN.to_string()],
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the pretty format.
    pub json: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
