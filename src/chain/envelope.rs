//! Confidential compute request envelope.
//!
//! The kettle accepts a typed transaction (`0x43`) that wraps a signed
//! compute record together with the confidential inputs:
//!
//! ```text
//! 0x43 || rlp([record, confidentialInputs])
//! record = [nonce, gasPrice, gas, to, value, data,
//!           kettleAddress, confidentialInputsHash, chainId, v, r, s]
//! ```
//!
//! The signature commits to the inputs only through their hash, so the
//! inputs themselves travel next to the record unmodified.

use alloy::primitives::{keccak256, Address, Bytes, Signature, TxKind, B256, U256};
use alloy_rlp::{Decodable, Encodable, RlpDecodable, RlpEncodable};

use crate::chain::identity::Identity;
use crate::chain::transaction::{SignedTransaction, TxSpec};
use crate::chain::types::{HarnessError, HarnessResult};

/// Type byte prefixed to the record signing payload.
pub const CONFIDENTIAL_RECORD_TX_TYPE: u8 = 0x42;
/// Type byte of the request envelope on the wire.
pub const CONFIDENTIAL_REQUEST_TX_TYPE: u8 = 0x43;

#[derive(RlpEncodable)]
struct RecordSigningPayload {
    kettle_address: Address,
    confidential_inputs_hash: B256,
    nonce: u64,
    gas_price: u128,
    gas_limit: u64,
    to: TxKind,
    value: U256,
    input: Bytes,
}

impl RecordSigningPayload {
    fn signing_hash(&self) -> B256 {
        let mut buf = vec![CONFIDENTIAL_RECORD_TX_TYPE];
        self.encode(&mut buf);
        keccak256(&buf)
    }
}

/// The signed part of a confidential compute request.
#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct ConfidentialComputeRecord {
    pub nonce: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
    pub to: TxKind,
    pub value: U256,
    pub input: Bytes,
    pub kettle_address: Address,
    pub confidential_inputs_hash: B256,
    pub chain_id: u64,
    pub v: u64,
    pub r: U256,
    pub s: U256,
}

impl ConfidentialComputeRecord {
    /// Hash the record's signature commits to.
    pub fn signing_hash(&self) -> B256 {
        RecordSigningPayload {
            kettle_address: self.kettle_address,
            confidential_inputs_hash: self.confidential_inputs_hash,
            nonce: self.nonce,
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            to: self.to,
            value: self.value,
            input: self.input.clone(),
        }
        .signing_hash()
    }

    /// Address that signed the record.
    pub fn recover_signer(&self) -> HarnessResult<Address> {
        Signature::new(self.r, self.s, self.v != 0)
            .recover_address_from_prehash(&self.signing_hash())
            .map_err(|e| HarnessError::InvalidEnvelope(format!("signature recovery: {}", e)))
    }
}

/// A record plus the confidential inputs it commits to.
#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct ConfidentialComputeRequest {
    pub record: ConfidentialComputeRecord,
    pub confidential_inputs: Bytes,
}

/// Decode a `0x43` envelope as sent to `eth_sendRawTransaction`.
///
/// Checks that the record's inputs hash matches the carried inputs.
pub fn decode_confidential_request(raw: &[u8]) -> HarnessResult<ConfidentialComputeRequest> {
    let (ty, mut body) = raw
        .split_first()
        .ok_or_else(|| HarnessError::InvalidEnvelope("empty envelope".to_string()))?;
    if *ty != CONFIDENTIAL_REQUEST_TX_TYPE {
        return Err(HarnessError::InvalidEnvelope(format!("unexpected type byte {:#04x}", ty)));
    }

    let request = ConfidentialComputeRequest::decode(&mut body)
        .map_err(|e| HarnessError::InvalidEnvelope(e.to_string()))?;
    if !body.is_empty() {
        return Err(HarnessError::InvalidEnvelope(format!("{} trailing bytes", body.len())));
    }
    if keccak256(&request.confidential_inputs) != request.record.confidential_inputs_hash {
        return Err(HarnessError::InvalidEnvelope(
            "confidential inputs do not match their hash".to_string(),
        ));
    }
    Ok(request)
}

/// Hash the signer commits to for a compute record.
pub fn record_signing_hash(
    spec: &TxSpec,
    nonce: u64,
    gas_price: u128,
    kettle_address: Address,
    confidential_inputs: &[u8],
) -> B256 {
    let payload = RecordSigningPayload {
        kettle_address,
        confidential_inputs_hash: keccak256(confidential_inputs),
        nonce,
        gas_price,
        gas_limit: spec.gas_limit,
        to: spec.kind(),
        value: spec.value,
        input: spec.input.clone(),
    };
    payload.signing_hash()
}

/// Sign `spec` as a confidential compute request addressed to `kettle_address`.
pub fn sign_confidential_request(
    identity: &Identity,
    spec: &TxSpec,
    nonce: u64,
    gas_price: u128,
    chain_id: u64,
    kettle_address: Address,
    confidential_inputs: &[u8],
) -> HarnessResult<SignedTransaction> {
    let hash = record_signing_hash(spec, nonce, gas_price, kettle_address, confidential_inputs);
    let signature = identity.sign_hash(&hash)?;

    let request = ConfidentialComputeRequest {
        record: ConfidentialComputeRecord {
            nonce,
            gas_price,
            gas_limit: spec.gas_limit,
            to: spec.kind(),
            value: spec.value,
            input: spec.input.clone(),
            kettle_address,
            confidential_inputs_hash: keccak256(confidential_inputs),
            chain_id,
            v: signature.v() as u64,
            r: signature.r(),
            s: signature.s(),
        },
        confidential_inputs: Bytes::copy_from_slice(confidential_inputs),
    };

    let mut raw = vec![CONFIDENTIAL_REQUEST_TX_TYPE];
    request.encode(&mut raw);
    Ok(SignedTransaction::from_raw(raw, identity.address()))
}
