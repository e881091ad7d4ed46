//! Harness composition root.
//!
//! Built once from a validated [`HarnessConfig`]; owns the chain clients and
//! everything a workflow needs to talk to them.

use alloy::primitives::Address;

use crate::chain::client::{ChainClient, TxSettings};
use crate::chain::identity::Identity;
use crate::chain::types::{ChainRole, HarnessError, HarnessResult};
use crate::confidential::RetryPolicy;
use crate::config::HarnessConfig;

/// Connected clients for one kettle and, optionally, its L1.
#[derive(Clone)]
pub struct Harness {
    config: HarnessConfig,
    kettle: ChainClient,
    l1: Option<ChainClient>,
    retry_policy: RetryPolicy,
}

impl Harness {
    /// Connect to the kettle, and to the L1 when it is enabled.
    pub async fn connect(config: HarnessConfig) -> HarnessResult<Self> {
        let settings = TxSettings::from(&config.transactions);

        let kettle =
            ChainClient::connect(ChainRole::Confidential, &config.kettle, settings.clone()).await?;

        let l1 = if config.l1.enabled {
            Some(ChainClient::connect(ChainRole::Public, &config.l1.endpoint(), settings).await?)
        } else {
            None
        };

        let retry_policy = RetryPolicy::from(&config.retry);

        tracing::info!(
            kettle_chain_id = kettle.chain_id(),
            l1_enabled = l1.is_some(),
            "Harness ready"
        );

        Ok(Self { config, kettle, l1, retry_policy })
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Client for the confidential chain.
    pub fn kettle(&self) -> &ChainClient {
        &self.kettle
    }

    /// Execution address discovered from the kettle at connect time.
    pub fn kettle_address(&self) -> Address {
        // connect() fails for the confidential role without an address
        self.kettle.kettle_address().unwrap_or_default()
    }

    /// Client for the public chain, if the harness was configured with one.
    pub fn l1(&self) -> HarnessResult<&ChainClient> {
        self.l1
            .as_ref()
            .ok_or_else(|| HarnessError::Unsupported("L1 is not enabled".to_string()))
    }

    pub fn client(&self, role: ChainRole) -> HarnessResult<&ChainClient> {
        match role {
            ChainRole::Confidential => Ok(&self.kettle),
            ChainRole::Public => self.l1(),
        }
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// A fresh random identity.
    pub fn new_identity(&self) -> Identity {
        Identity::generate()
    }
}

impl std::fmt::Debug for Harness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // config holds private keys
        f.debug_struct("Harness")
            .field("kettle", &self.kettle)
            .field("l1", &self.l1)
            .field("retry_policy", &self.retry_policy)
            .finish()
    }
}
