//! Chain-level types and error definitions.

use std::fmt;
use std::time::Duration;

use alloy::primitives::{Address, Bytes, TxHash, B256, U256, U64};
use alloy::transports::TransportError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::confidential::DecodedError;

/// Which side of the deployment an endpoint talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainRole {
    /// The kettle: accepts confidential compute requests.
    Confidential,
    /// The companion plain chain (L1).
    Public,
}

impl ChainRole {
    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainRole::Confidential => "kettle",
            ChainRole::Public => "l1",
        }
    }
}

impl fmt::Display for ChainRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON-RPC error code geth uses for reverted execution.
pub const EXECUTION_REVERTED_CODE: i64 = 3;

/// A JSON-RPC failure with whatever the node told us about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcFailure {
    /// JSON-RPC error code, absent for transport failures.
    pub code: Option<i64>,
    /// The node's error message, or the transport error text.
    pub message: String,
    /// Revert data from the error's `data` field, when it was hex bytes.
    pub data: Option<Bytes>,
}

impl RpcFailure {
    /// Failure that never reached the node.
    pub fn transport(message: impl Into<String>) -> Self {
        Self { code: None, message: message.into(), data: None }
    }

    /// Whether the node reported an execution revert rather than a node-side
    /// or transport failure.
    pub fn is_revert(&self) -> bool {
        self.code.is_some()
            && (self.code == Some(EXECUTION_REVERTED_CODE)
                || self.data.is_some()
                || self.message.starts_with("execution reverted"))
    }
}

impl fmt::Display for RpcFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} (code {})", self.message, code),
            None => f.write_str(&self.message),
        }
    }
}

impl From<TransportError> for RpcFailure {
    fn from(err: TransportError) -> Self {
        match err.as_error_resp() {
            Some(payload) => Self {
                code: Some(payload.code),
                message: payload.message.to_string(),
                data: payload
                    .data
                    .as_ref()
                    .and_then(|raw| serde_json::from_str::<Bytes>(raw.get()).ok()),
            },
            None => Self::transport(err.to_string()),
        }
    }
}

/// Errors that can occur while driving either chain.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Endpoint unreachable, or the node rejected the request.
    #[error("RPC error: {0}")]
    Rpc(RpcFailure),

    /// The deployment transaction was mined with failure status.
    #[error("Deployment failed in transaction {0}")]
    DeploymentFailed(TxHash),

    /// A transaction was mined with failure status.
    #[error("Transaction reverted: {0}")]
    TransactionReverted(TxHash),

    /// A read-only call reverted.
    #[error("Call reverted: {0}")]
    CallReverted(String),

    /// Arguments did not match the ABI, or the method is unknown.
    #[error("ABI encoding error: {0}")]
    AbiEncoding(String),

    /// Returned bytes or log data did not match the ABI.
    #[error("ABI decoding error: {0}")]
    AbiDecoding(String),

    /// The contract artifact document could not be parsed.
    #[error("Invalid contract artifact: {0}")]
    InvalidArtifact(String),

    /// No log in the receipt matched the event.
    #[error("Event {0} not found in receipt logs")]
    EventNotFound(String),

    /// A deadline elapsed.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// Balance after funding was not exactly the transferred amount.
    #[error("Funding mismatch for {address}: expected balance {expected}, got {actual}")]
    FundingMismatch { address: Address, expected: U256, actual: U256 },

    /// Invalid private key format.
    #[error("Identity error: {0}")]
    Identity(String),

    /// A raw transaction envelope could not be decoded.
    #[error("Invalid transaction envelope: {0}")]
    InvalidEnvelope(String),

    /// Operation not available on this endpoint or harness.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// A confidential request failed; the message is the decoded reason.
    #[error("Confidential request failed: {0}")]
    ConfidentialRequest(DecodedError),
}

impl From<TransportError> for HarnessError {
    fn from(err: TransportError) -> Self {
        HarnessError::Rpc(err.into())
    }
}

/// Result type for harness operations.
pub type HarnessResult<T> = Result<T, HarnessError>;

/// One emitted log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Emitting contract.
    #[serde(default)]
    pub address: Address,
    /// Topics in order; the first is the event selector for non-anonymous events.
    pub topics: Vec<B256>,
    /// Non-indexed event data.
    pub data: Bytes,
}

/// The execution outcome of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RpcReceipt")]
pub struct Receipt {
    pub tx_hash: TxHash,
    pub success: bool,
    /// Logs in emission order.
    pub logs: Vec<LogEntry>,
    pub contract_address: Option<Address>,
    pub block_number: Option<u64>,
}

/// The subset of `eth_getTransactionReceipt` we read. Parsed loosely so that
/// receipts for kettle-specific transaction types still deserialize.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    transaction_hash: TxHash,
    #[serde(default)]
    status: Option<U64>,
    #[serde(default)]
    logs: Vec<LogEntry>,
    #[serde(default)]
    contract_address: Option<Address>,
    #[serde(default)]
    block_number: Option<U64>,
}

impl From<RpcReceipt> for Receipt {
    fn from(raw: RpcReceipt) -> Self {
        Self {
            tx_hash: raw.transaction_hash,
            success: raw.status == Some(U64::from(1)),
            logs: raw.logs,
            contract_address: raw.contract_address,
            block_number: raw.block_number.map(|n| n.to::<u64>()),
        }
    }
}
