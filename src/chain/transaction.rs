//! Transaction building and signing.
//!
//! # Responsibilities
//! - Describe a transaction independent of nonce/fee lookup (`TxSpec`)
//! - Sign EIP-155 legacy transactions locally
//! - Carry the raw bytes and node-assigned hash through the lifecycle

use alloy::consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::primitives::{keccak256, Address, Bytes, TxHash, TxKind, U256};

use crate::chain::identity::Identity;
use crate::chain::types::HarnessResult;

/// What to send. Nonce and gas price are read from the chain when unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxSpec {
    /// Recipient; `None` creates a contract from `input`.
    pub to: Option<Address>,
    pub value: U256,
    pub gas_limit: u64,
    pub gas_price: Option<u128>,
    pub nonce: Option<u64>,
    pub input: Bytes,
}

impl TxSpec {
    /// Plain value transfer.
    pub fn transfer(to: Address, value: U256, gas_limit: u64) -> Self {
        Self { to: Some(to), value, gas_limit, ..Default::default() }
    }

    /// Contract creation from init code.
    pub fn create(init_code: Bytes, gas_limit: u64) -> Self {
        Self { to: None, gas_limit, input: init_code, ..Default::default() }
    }

    /// Contract call with encoded calldata.
    pub fn call(to: Address, input: Bytes, gas_limit: u64) -> Self {
        Self { to: Some(to), gas_limit, input, ..Default::default() }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    pub fn with_gas_price(mut self, gas_price: u128) -> Self {
        self.gas_price = Some(gas_price);
        self
    }

    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    pub(crate) fn kind(&self) -> TxKind {
        self.to.map_or(TxKind::Create, TxKind::Call)
    }
}

/// A signed transaction ready for `eth_sendRawTransaction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    /// Hash of the raw bytes as submitted. The kettle reports a different
    /// hash for confidential requests; use the pending handle's hash.
    pub hash: TxHash,
    /// EIP-2718 encoded bytes.
    pub raw: Bytes,
    /// Signer address.
    pub from: Address,
}

impl SignedTransaction {
    pub(crate) fn from_raw(raw: Vec<u8>, from: Address) -> Self {
        Self { hash: keccak256(&raw), raw: raw.into(), from }
    }
}

/// A broadcast transaction, identified by the hash the node returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTransaction {
    pub hash: TxHash,
}

/// Sign `spec` as an EIP-155 legacy transaction with resolved nonce and fee.
pub fn sign_legacy(
    identity: &Identity,
    spec: &TxSpec,
    nonce: u64,
    gas_price: u128,
    chain_id: u64,
) -> HarnessResult<SignedTransaction> {
    let tx = TxLegacy {
        chain_id: Some(chain_id),
        nonce,
        gas_price,
        gas_limit: spec.gas_limit,
        to: spec.kind(),
        value: spec.value,
        input: spec.input.clone(),
    };

    let signature = identity.sign_hash(&tx.signature_hash())?;
    let envelope = TxEnvelope::Legacy(tx.into_signed(signature));

    Ok(SignedTransaction {
        hash: *envelope.tx_hash(),
        raw: envelope.encoded_2718().into(),
        from: identity.address(),
    })
}
