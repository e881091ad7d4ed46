//! Compiled contract artifacts (`{ "abi": [...], "bytecode": { "object": "0x..." } }`).

use alloy::dyn_abi::{DynSolValue, JsonAbiExt};
use alloy::json_abi::JsonAbi;
use alloy::primitives::{hex, Bytes};
use serde::Deserialize;

use crate::chain::types::{HarnessError, HarnessResult};

/// ABI plus creation bytecode.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractArtifact {
    pub abi: JsonAbi,
    pub bytecode: Bytes,
}

#[derive(Deserialize)]
struct RawArtifact {
    abi: JsonAbi,
    bytecode: RawBytecode,
}

#[derive(Deserialize)]
struct RawBytecode {
    object: String,
}

impl ContractArtifact {
    /// Parse an artifact document already read into memory.
    pub fn from_json(document: &str) -> HarnessResult<Self> {
        let raw: RawArtifact = serde_json::from_str(document)
            .map_err(|e| HarnessError::InvalidArtifact(e.to_string()))?;

        let object = raw.bytecode.object.strip_prefix("0x").ok_or_else(|| {
            HarnessError::InvalidArtifact("bytecode.object is not 0x-prefixed".to_string())
        })?;
        let bytecode = hex::decode(object)
            .map_err(|e| HarnessError::InvalidArtifact(format!("bytecode.object: {}", e)))?;

        Ok(Self { abi: raw.abi, bytecode: bytecode.into() })
    }

    /// ABI-encode constructor arguments for appending to the bytecode.
    pub fn encode_constructor_args(&self, args: &[DynSolValue]) -> HarnessResult<Vec<u8>> {
        match &self.abi.constructor {
            Some(constructor) => constructor
                .abi_encode_input(args)
                .map_err(|e| HarnessError::AbiEncoding(format!("constructor: {}", e))),
            None if args.is_empty() => Ok(Vec::new()),
            None => Err(HarnessError::AbiEncoding(format!(
                "constructor takes no arguments, got {}",
                args.len()
            ))),
        }
    }
}
