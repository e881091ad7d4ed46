//! Decoding failed confidential requests.
//!
//! A kettle-side revert reaches us as text: the ABI-encoded custom error is
//! hex-encoded into the RPC error message (and, on newer nodes, into the
//! error's `data` field). This module peels those layers back off.

use std::fmt;

use alloy::primitives::{hex, Address, Bytes, TxHash};
use alloy::sol;
use alloy::sol_types::SolError;

use crate::chain::types::{HarnessError, RpcFailure};
use crate::confidential::compat;

sol! {
    /// Raised by the kettle when a precompile reverts on behalf of `addr`.
    #[derive(Debug, PartialEq, Eq)]
    error PeekerReverted(address addr, bytes err);
}

/// Prefix the kettle puts in front of hex revert data.
pub const EXECUTION_REVERTED_PREFIX: &str = "execution reverted: 0x";

/// What a failed confidential request turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodedErrorKind {
    /// `PeekerReverted(address, bytes)` custom error.
    PeekerReverted,
    /// Message rebuilt from an ASCII-decimal byte array suffix.
    InnerRevertText,
    /// Nothing recognizable; payload is the raw message.
    Unknown,
    /// Accepted, but mined with failure status; payload is the tx hash.
    TransactionFailed,
}

impl DecodedErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecodedErrorKind::PeekerReverted => "peeker_reverted",
            DecodedErrorKind::InnerRevertText => "inner_revert_text",
            DecodedErrorKind::Unknown => "unknown",
            DecodedErrorKind::TransactionFailed => "transaction_failed",
        }
    }
}

/// A classified confidential request failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedError {
    pub kind: DecodedErrorKind,
    /// Address the peeker call was made for (`PeekerReverted` only).
    pub origin: Option<Address>,
    pub payload: Bytes,
}

impl DecodedError {
    pub fn peeker_reverted(origin: Address, inner: Bytes) -> Self {
        Self { kind: DecodedErrorKind::PeekerReverted, origin: Some(origin), payload: inner }
    }

    pub fn inner_revert_text(message: String) -> Self {
        Self {
            kind: DecodedErrorKind::InnerRevertText,
            origin: None,
            payload: message.into_bytes().into(),
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self {
            kind: DecodedErrorKind::Unknown,
            origin: None,
            payload: message.into().into_bytes().into(),
        }
    }

    pub fn transaction_failed(tx_hash: TxHash) -> Self {
        Self {
            kind: DecodedErrorKind::TransactionFailed,
            origin: None,
            payload: Bytes::copy_from_slice(tx_hash.as_slice()),
        }
    }

    /// Payload as text, with invalid UTF-8 replaced.
    pub fn payload_text(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }

    /// Human-readable reason; also what transient markers are matched against.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DecodedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DecodedErrorKind::PeekerReverted => write!(
                f,
                "peeker {:#x} reverted: {}",
                self.origin.unwrap_or_default(),
                self.payload_text()
            ),
            DecodedErrorKind::InnerRevertText | DecodedErrorKind::Unknown => {
                f.write_str(&self.payload_text())
            }
            DecodedErrorKind::TransactionFailed => {
                write!(f, "receipt status: failed ({})", self.payload)
            }
        }
    }
}

impl std::error::Error for DecodedError {}

/// Decode revert bytes as `PeekerReverted`, if the selector matches.
pub fn decode_peeker_reverted(revert: &[u8]) -> Option<DecodedError> {
    if revert.len() < 4 || revert[..4] != PeekerReverted::SELECTOR {
        return None;
    }
    let decoded = PeekerReverted::abi_decode(revert).ok()?;
    Some(DecodedError::peeker_reverted(decoded.addr, decoded.err))
}

/// Classify a raw error message.
pub fn decode_error_message(message: &str) -> DecodedError {
    if let Some(encoded) = message.strip_prefix(EXECUTION_REVERTED_PREFIX) {
        if let Some(decoded) = hex::decode(encoded)
            .ok()
            .and_then(|revert| decode_peeker_reverted(&revert))
        {
            return decoded;
        }
    }

    if let Some(combined) = compat::reconstruct_inner_revert(message) {
        return DecodedError::inner_revert_text(combined);
    }

    DecodedError::unknown(message)
}

/// Classify an RPC failure, preferring structured revert data when present.
pub fn decode_rpc_failure(failure: &RpcFailure) -> DecodedError {
    failure
        .data
        .as_ref()
        .and_then(|data| decode_peeker_reverted(data))
        .unwrap_or_else(|| decode_error_message(&failure.message))
}

/// Classify any error raised while submitting or awaiting a request.
pub fn classify(err: HarnessError) -> DecodedError {
    match err {
        HarnessError::Rpc(failure) => decode_rpc_failure(&failure),
        HarnessError::TransactionReverted(tx_hash) => DecodedError::transaction_failed(tx_hash),
        HarnessError::ConfidentialRequest(decoded) => decoded,
        other => DecodedError::unknown(other.to_string()),
    }
}
