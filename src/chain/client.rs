//! JSON-RPC client for one chain.
//!
//! # Responsibilities
//! - Connect to the JSON-RPC endpoint and discover chain parameters
//! - Sign and broadcast legacy and confidential transactions
//! - Poll for receipts under a deadline
//! - Deploy bytecode and fund accounts from the endpoint's funded identity

use std::sync::Arc;
use std::time::Duration;

use alloy::json_abi::JsonAbi;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{Provider, RootProvider};
use tokio::time::{interval, timeout, MissedTickBehavior};

use crate::chain::envelope::sign_confidential_request;
use crate::chain::identity::Identity;
use crate::chain::transaction::{sign_legacy, PendingTransaction, SignedTransaction, TxSpec};
use crate::chain::types::{ChainRole, HarnessError, HarnessResult, Receipt, RpcFailure};
use crate::config::{ChainEndpointConfig, TransactionConfig};
use crate::contract::artifact::ContractArtifact;
use crate::contract::handle::{ContractHandle, DeployedContract};
use crate::observability::metrics;

/// Polling and gas defaults for one client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxSettings {
    pub poll_interval: Duration,
    pub receipt_timeout: Duration,
    pub default_gas_limit: u64,
    pub transfer_gas_limit: u64,
}

impl From<&TransactionConfig> for TxSettings {
    fn from(config: &TransactionConfig) -> Self {
        Self {
            poll_interval: Duration::from_millis(config.receipt_poll_interval_ms),
            receipt_timeout: Duration::from_secs(config.receipt_timeout_secs),
            default_gas_limit: config.default_gas_limit,
            transfer_gas_limit: config.transfer_gas_limit,
        }
    }
}

impl Default for TxSettings {
    fn default() -> Self {
        Self::from(&TransactionConfig::default())
    }
}

/// One JSON-RPC connection to the kettle or the L1.
///
/// Cloning is cheap; clones share the underlying HTTP transport.
#[derive(Clone)]
pub struct ChainClient {
    provider: RootProvider,
    role: ChainRole,
    rpc_url: Arc<str>,
    chain_id: u64,
    kettle_address: Option<Address>,
    funder: Identity,
    settings: TxSettings,
}

impl ChainClient {
    /// Connect to an endpoint.
    ///
    /// Reads the chain id, and for the confidential role the kettle address,
    /// exactly once.
    pub async fn connect(
        role: ChainRole,
        endpoint: &ChainEndpointConfig,
        settings: TxSettings,
    ) -> HarnessResult<Self> {
        let funder = Identity::from_hex(&endpoint.private_key)?;
        let url: url::Url = endpoint.rpc_url.parse().map_err(|e| {
            HarnessError::Rpc(RpcFailure::transport(format!(
                "Invalid RPC URL '{}': {}",
                endpoint.rpc_url, e
            )))
        })?;
        let provider = RootProvider::new_http(url);

        let chain_id = provider.get_chain_id().await?;

        let kettle_address = match role {
            ChainRole::Confidential => {
                let addresses: Vec<Address> =
                    provider.raw_request("eth_kettleAddress".into(), ()).await?;
                let first = addresses.first().copied().ok_or_else(|| {
                    HarnessError::Rpc(RpcFailure::transport(
                        "eth_kettleAddress returned no addresses",
                    ))
                })?;
                Some(first)
            }
            ChainRole::Public => None,
        };

        tracing::info!(
            chain = %role,
            rpc_url = %endpoint.rpc_url,
            chain_id = chain_id,
            kettle_address = ?kettle_address,
            funder = %funder.address(),
            "Chain client connected"
        );

        Ok(Self {
            provider,
            role,
            rpc_url: endpoint.rpc_url.as_str().into(),
            chain_id,
            kettle_address,
            funder,
            settings,
        })
    }

    pub fn role(&self) -> ChainRole {
        self.role
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// The kettle's execution address; `None` on the public chain.
    pub fn kettle_address(&self) -> Option<Address> {
        self.kettle_address
    }

    /// Identity that pays for deployments and funding.
    pub fn funder(&self) -> &Identity {
        &self.funder
    }

    pub fn settings(&self) -> &TxSettings {
        &self.settings
    }

    /// Get the underlying provider.
    pub fn provider(&self) -> &RootProvider {
        &self.provider
    }

    /// Get the balance of an address at the latest block.
    pub async fn balance(&self, address: Address) -> HarnessResult<U256> {
        Ok(self.provider.get_balance(address).await?)
    }

    async fn resolve_nonce_and_fee(
        &self,
        from: Address,
        spec: &TxSpec,
    ) -> HarnessResult<(u64, u128)> {
        let nonce = match spec.nonce {
            Some(nonce) => nonce,
            None => self.provider.get_transaction_count(from).await?,
        };
        let gas_price = match spec.gas_price {
            Some(price) => price,
            None => self.provider.get_gas_price().await?,
        };
        Ok((nonce, gas_price))
    }

    /// Sign `spec` with `identity` as a legacy transaction.
    pub async fn sign_transaction(
        &self,
        identity: &Identity,
        spec: &TxSpec,
    ) -> HarnessResult<SignedTransaction> {
        let (nonce, gas_price) = self.resolve_nonce_and_fee(identity.address(), spec).await?;
        sign_legacy(identity, spec, nonce, gas_price, self.chain_id)
    }

    /// Sign `spec` as a confidential compute request carrying `confidential_inputs`.
    pub async fn sign_confidential_request(
        &self,
        identity: &Identity,
        spec: &TxSpec,
        confidential_inputs: &[u8],
    ) -> HarnessResult<SignedTransaction> {
        let kettle_address = self.kettle_address.ok_or_else(|| {
            HarnessError::Unsupported(format!(
                "confidential requests need a kettle endpoint, {} is {}",
                self.rpc_url, self.role
            ))
        })?;
        let (nonce, gas_price) = self.resolve_nonce_and_fee(identity.address(), spec).await?;
        sign_confidential_request(
            identity,
            spec,
            nonce,
            gas_price,
            self.chain_id,
            kettle_address,
            confidential_inputs,
        )
    }

    /// Broadcast a signed transaction.
    ///
    /// Admission failures keep the node's message and revert data.
    pub async fn submit(&self, signed: &SignedTransaction) -> HarnessResult<PendingTransaction> {
        let hash: TxHash = self
            .provider
            .raw_request("eth_sendRawTransaction".into(), (signed.raw.clone(),))
            .await
            .map_err(|e| {
                let failure = RpcFailure::from(e);
                tracing::debug!(chain = %self.role, error = %failure, "Transaction rejected");
                HarnessError::Rpc(failure)
            })?;

        metrics::record_submitted(self.role.as_str());
        tracing::info!(
            chain = %self.role,
            tx_hash = %hash,
            from = %signed.from,
            "Transaction submitted"
        );
        Ok(PendingTransaction { hash })
    }

    /// Poll until the transaction is mined, regardless of its status.
    ///
    /// Uses the configured receipt timeout when `deadline` is `None`.
    pub async fn wait_for_receipt(
        &self,
        pending: &PendingTransaction,
        deadline: Option<Duration>,
    ) -> HarnessResult<Receipt> {
        let deadline = deadline.unwrap_or(self.settings.receipt_timeout);

        let result = timeout(deadline, async {
            let mut ticker = interval(self.settings.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                let receipt: Option<Receipt> = self
                    .provider
                    .raw_request("eth_getTransactionReceipt".into(), (pending.hash,))
                    .await?;

                match receipt {
                    Some(receipt) => return Ok::<_, HarnessError>(receipt),
                    None => tracing::debug!(tx_hash = %pending.hash, "Transaction pending"),
                }
            }
        })
        .await;

        let receipt = result.map_err(|_| HarnessError::Timeout(deadline))??;
        metrics::record_receipt(self.role.as_str(), receipt.success);
        Ok(receipt)
    }

    /// Poll until mined and require success status.
    pub async fn await_receipt(
        &self,
        pending: &PendingTransaction,
        deadline: Option<Duration>,
    ) -> HarnessResult<Receipt> {
        let receipt = self.wait_for_receipt(pending, deadline).await?;
        if !receipt.success {
            return Err(HarnessError::TransactionReverted(receipt.tx_hash));
        }
        Ok(receipt)
    }

    /// Deploy `bytecode` followed by already-encoded constructor arguments.
    pub async fn deploy(
        &self,
        bytecode: &[u8],
        constructor_args: &[u8],
        abi: JsonAbi,
    ) -> HarnessResult<DeployedContract> {
        let mut init_code = Vec::with_capacity(bytecode.len() + constructor_args.len());
        init_code.extend_from_slice(bytecode);
        init_code.extend_from_slice(constructor_args);

        let spec = TxSpec::create(Bytes::from(init_code), self.settings.default_gas_limit);
        let signed = self.sign_transaction(&self.funder, &spec).await?;
        let pending = self.submit(&signed).await?;
        let receipt = self.wait_for_receipt(&pending, None).await?;

        let address = match (receipt.success, receipt.contract_address) {
            (true, Some(address)) => address,
            _ => return Err(HarnessError::DeploymentFailed(receipt.tx_hash)),
        };

        tracing::info!(chain = %self.role, address = %address, "Deployed contract");
        Ok(DeployedContract::new(address, abi))
    }

    /// Deploy an artifact with typed constructor arguments and bind the result
    /// to the funded identity.
    pub async fn deploy_artifact(
        &self,
        artifact: &ContractArtifact,
        constructor_args: &[alloy::dyn_abi::DynSolValue],
    ) -> HarnessResult<ContractHandle> {
        let encoded = artifact.encode_constructor_args(constructor_args)?;
        let deployed = self.deploy(&artifact.bytecode, &encoded, artifact.abi.clone()).await?;
        Ok(ContractHandle::new(deployed, self.clone(), self.funder.clone()))
    }

    /// Transfer `amount` from the funded identity and require the target's
    /// balance to equal `amount` exactly afterwards.
    pub async fn fund_account(&self, to: Address, amount: U256) -> HarnessResult<()> {
        let funder_balance = self.balance(self.funder.address()).await?;
        tracing::info!(
            chain = %self.role,
            to = %to,
            amount = %amount,
            funder = %self.funder.address(),
            funder_balance = %funder_balance,
            "Funding account"
        );

        let spec = TxSpec::transfer(to, amount, self.settings.transfer_gas_limit);
        let signed = self.sign_transaction(&self.funder, &spec).await?;
        let pending = self.submit(&signed).await?;
        self.await_receipt(&pending, None).await?;

        let actual = self.balance(to).await?;
        if actual != amount {
            return Err(HarnessError::FundingMismatch { address: to, expected: amount, actual });
        }
        Ok(())
    }
}

impl std::fmt::Debug for ChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainClient")
            .field("role", &self.role)
            .field("rpc_url", &self.rpc_url)
            .field("chain_id", &self.chain_id)
            .field("kettle_address", &self.kettle_address)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_config() {
        let settings = TxSettings::from(&TransactionConfig {
            receipt_poll_interval_ms: 250,
            receipt_timeout_secs: 12,
            default_gas_limit: 1_000,
            transfer_gas_limit: 21_000,
        });
        assert_eq!(settings.poll_interval, Duration::from_millis(250));
        assert_eq!(settings.receipt_timeout, Duration::from_secs(12));
    }

    #[tokio::test]
    async fn test_connect_unreachable_endpoint() {
        let endpoint = ChainEndpointConfig {
            rpc_url: "http://127.0.0.1:1".to_string(),
            ..Default::default()
        };
        let result =
            ChainClient::connect(ChainRole::Public, &endpoint, TxSettings::default()).await;
        assert!(matches!(result, Err(HarnessError::Rpc(RpcFailure { code: None, .. }))));
    }

    #[tokio::test]
    async fn test_connect_rejects_invalid_url() {
        let endpoint = ChainEndpointConfig {
            rpc_url: "not a url".to_string(),
            ..Default::default()
        };
        let err = ChainClient::connect(ChainRole::Public, &endpoint, TxSettings::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid RPC URL"));
    }
}
