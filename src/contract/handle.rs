//! Deployed contract bound to a client and a signer.

use std::sync::Arc;

use alloy::dyn_abi::DynSolValue;
use alloy::json_abi::JsonAbi;
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes};
use alloy::providers::Provider;
use alloy::rpc::types::TransactionRequest;

use crate::chain::client::ChainClient;
use crate::chain::identity::Identity;
use crate::chain::transaction::{PendingTransaction, TxSpec};
use crate::chain::types::{ChainRole, HarnessError, HarnessResult, Receipt, RpcFailure};
use crate::confidential::ConfidentialRequestSubmitter;
use crate::contract::abi::{self, DecodedValues};

/// Address and ABI of a deployed contract. Never changes once created.
#[derive(Debug, Clone, PartialEq)]
pub struct DeployedContract {
    address: Address,
    abi: JsonAbi,
}

impl DeployedContract {
    pub fn new(address: Address, abi: JsonAbi) -> Self {
        Self { address, abi }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }
}

/// A view of a deployed contract that signs with one identity.
///
/// Views created with [`ContractHandle::with_signer`] share the same
/// `DeployedContract`.
#[derive(Debug, Clone)]
pub struct ContractHandle {
    contract: Arc<DeployedContract>,
    client: ChainClient,
    signer: Identity,
}

impl ContractHandle {
    pub fn new(contract: DeployedContract, client: ChainClient, signer: Identity) -> Self {
        Self { contract: Arc::new(contract), client, signer }
    }

    /// Bind to a contract deployed elsewhere.
    pub fn at(address: Address, abi: JsonAbi, client: ChainClient, signer: Identity) -> Self {
        Self::new(DeployedContract::new(address, abi), client, signer)
    }

    pub fn address(&self) -> Address {
        self.contract.address
    }

    pub fn abi(&self) -> &JsonAbi {
        &self.contract.abi
    }

    pub fn deployed(&self) -> &Arc<DeployedContract> {
        &self.contract
    }

    pub fn signer(&self) -> &Identity {
        &self.signer
    }

    pub fn client(&self) -> &ChainClient {
        &self.client
    }

    /// Same contract, different signer. `self` is left untouched.
    pub fn with_signer(&self, identity: Identity) -> Self {
        Self {
            contract: Arc::clone(&self.contract),
            client: self.client.clone(),
            signer: identity,
        }
    }

    /// Submitter with structured error decoding for this handle.
    pub fn confidential(&self) -> ConfidentialRequestSubmitter {
        ConfidentialRequestSubmitter::new(self.clone())
    }

    /// Execute a read-only call against the latest state.
    pub async fn call(&self, method: &str, args: &[DynSolValue]) -> HarnessResult<DecodedValues> {
        let function = abi::resolve_function(self.abi(), method, args.len())?;
        let input = abi::encode_call(function, args)?;

        let request = TransactionRequest::default()
            .with_from(self.signer.address())
            .with_to(self.address())
            .with_input(input);

        let output = self.client.provider().call(request).await.map_err(|e| {
            let failure = RpcFailure::from(e);
            if !failure.is_revert() {
                return HarnessError::Rpc(failure);
            }
            HarnessError::CallReverted(match &failure.data {
                Some(data) => format!("{}: {}", failure.message, data),
                None => failure.message,
            })
        })?;

        abi::decode_output(function, &output)
    }

    /// Encode `values` against `method`'s output schema, the layout contracts
    /// use to read their confidential inputs back.
    pub fn encode_confidential_inputs(
        &self,
        method: &str,
        values: &[DynSolValue],
    ) -> HarnessResult<Bytes> {
        let function = abi::resolve_function(self.abi(), method, 0)?;
        abi::encode_output(function, values)
    }

    /// Sign and broadcast a method call without waiting for inclusion.
    ///
    /// On the kettle every contract transaction is a confidential request
    /// carrying `confidential_inputs` verbatim. The public chain only accepts
    /// an empty payload.
    pub async fn submit_transaction(
        &self,
        method: &str,
        args: &[DynSolValue],
        confidential_inputs: &[u8],
    ) -> HarnessResult<PendingTransaction> {
        let function = abi::resolve_function(self.abi(), method, args.len())?;
        let input = abi::encode_call(function, args)?;
        let spec = TxSpec::call(self.address(), input, self.client.settings().default_gas_limit);

        let signed = match self.client.role() {
            ChainRole::Confidential => {
                self.client
                    .sign_confidential_request(&self.signer, &spec, confidential_inputs)
                    .await?
            }
            ChainRole::Public if confidential_inputs.is_empty() => {
                self.client.sign_transaction(&self.signer, &spec).await?
            }
            ChainRole::Public => {
                return Err(HarnessError::Unsupported(format!(
                    "{} carries {} confidential bytes but {} is a public chain",
                    method,
                    confidential_inputs.len(),
                    self.client.role()
                )))
            }
        };

        self.client.submit(&signed).await
    }

    /// Submit a method call and wait for a successful receipt.
    pub async fn send_transaction(
        &self,
        method: &str,
        args: &[DynSolValue],
        confidential_inputs: &[u8],
    ) -> HarnessResult<Receipt> {
        let pending = self.submit_transaction(method, args, confidential_inputs).await?;
        self.client.await_receipt(&pending, None).await
    }
}
