//! Signing identities.
//!
//! # Security
//! - Keys are never logged; `Debug` prints the address only
//! - Keys are only serialized on explicit request (`to_hex`)

use std::fmt;

use alloy::primitives::{Address, B256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::{Signature, SignerSync};

use crate::chain::types::{HarnessError, HarnessResult};

/// A signing key and the address derived from it.
#[derive(Clone)]
pub struct Identity {
    signer: PrivateKeySigner,
}

impl Identity {
    /// Generate a fresh random identity.
    pub fn generate() -> Self {
        let signer = PrivateKeySigner::random();
        tracing::debug!(address = %signer.address(), "Generated identity");
        Self { signer }
    }

    /// Import an identity from a hex-encoded private key (with or without 0x prefix).
    pub fn from_hex(private_key_hex: &str) -> HarnessResult<Self> {
        let key_hex = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| HarnessError::Identity(format!("Invalid private key format: {}", e)))?;

        Ok(Self { signer })
    }

    /// Get the identity's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Hex private key without prefix, for handing keys to other tooling.
    pub fn to_hex(&self) -> String {
        alloy::primitives::hex::encode(self.signer.to_bytes())
    }

    /// Sign a 32-byte prehash.
    pub fn sign_hash(&self, hash: &B256) -> HarnessResult<Signature> {
        self.signer
            .sign_hash_sync(hash)
            .map_err(|e| HarnessError::Identity(format!("Signing failed: {}", e)))
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.address() == other.address()
    }
}

impl Eq for Identity {}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity").field("address", &self.address()).finish()
    }
}
