//! Schema-driven ABI encoding and decoding.
//!
//! Values are `DynSolValue`s checked against the JSON ABI, so a wrong
//! argument shape fails at encode time with `AbiEncoding` rather than
//! reaching the chain.

use alloy::dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use alloy::json_abi::{Function, JsonAbi};
use alloy::primitives::{Address, Bytes, U256};

use crate::chain::types::{HarnessError, HarnessResult};

/// Decoded values addressable by position and by name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DecodedValues {
    entries: Vec<(String, DynSolValue)>,
}

impl DecodedValues {
    /// Pair names with values. Missing names become empty strings.
    pub fn new<I, S>(names: I, values: Vec<DynSolValue>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names = names.into_iter().map(Into::into);
        let entries = values
            .into_iter()
            .map(|value| (names.next().unwrap_or_default(), value))
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value at `index`.
    pub fn get(&self, index: usize) -> Option<&DynSolValue> {
        self.entries.get(index).map(|(_, value)| value)
    }

    /// First value named `name`.
    pub fn by_name(&self, name: &str) -> Option<&DynSolValue> {
        self.entries
            .iter()
            .find(|(n, _)| !n.is_empty() && n == name)
            .map(|(_, value)| value)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &DynSolValue> {
        self.entries.iter().map(|(_, value)| value)
    }

    pub fn into_values(self) -> Vec<DynSolValue> {
        self.entries.into_iter().map(|(_, value)| value).collect()
    }

    fn field(&self, name: &str) -> HarnessResult<&DynSolValue> {
        self.by_name(name)
            .ok_or_else(|| HarnessError::AbiDecoding(format!("no field named '{}'", name)))
    }

    pub fn address(&self, name: &str) -> HarnessResult<Address> {
        match self.field(name)? {
            DynSolValue::Address(address) => Ok(*address),
            other => Err(mismatch(name, "address", other)),
        }
    }

    /// Dynamic `bytes` field.
    pub fn bytes(&self, name: &str) -> HarnessResult<Bytes> {
        match self.field(name)? {
            DynSolValue::Bytes(bytes) => Ok(Bytes::copy_from_slice(bytes)),
            other => Err(mismatch(name, "bytes", other)),
        }
    }

    /// `bytesN` field, checked against `N`.
    pub fn fixed_bytes<const N: usize>(&self, name: &str) -> HarnessResult<[u8; N]> {
        match self.field(name)? {
            DynSolValue::FixedBytes(word, size) if *size == N => {
                let mut out = [0u8; N];
                out.copy_from_slice(&word[..N]);
                Ok(out)
            }
            other => Err(mismatch(name, &format!("bytes{}", N), other)),
        }
    }

    pub fn uint(&self, name: &str) -> HarnessResult<U256> {
        match self.field(name)? {
            DynSolValue::Uint(value, _) => Ok(*value),
            other => Err(mismatch(name, "uint", other)),
        }
    }

    pub fn string(&self, name: &str) -> HarnessResult<String> {
        match self.field(name)? {
            DynSolValue::String(value) => Ok(value.clone()),
            other => Err(mismatch(name, "string", other)),
        }
    }
}

fn mismatch(name: &str, expected: &str, actual: &DynSolValue) -> HarnessError {
    let actual = actual
        .as_type()
        .map(|ty| ty.sol_type_name().into_owned())
        .unwrap_or_else(|| "unknown".to_string());
    HarnessError::AbiDecoding(format!("field '{}' is {}, not {}", name, actual, expected))
}

/// Find `name` in `abi`, preferring the overload that takes `arg_count` inputs.
pub fn resolve_function<'a>(
    abi: &'a JsonAbi,
    name: &str,
    arg_count: usize,
) -> HarnessResult<&'a Function> {
    let overloads = abi
        .function(name)
        .ok_or_else(|| HarnessError::AbiEncoding(format!("unknown method '{}'", name)))?;

    overloads
        .iter()
        .find(|f| f.inputs.len() == arg_count)
        .or_else(|| overloads.first())
        .ok_or_else(|| HarnessError::AbiEncoding(format!("unknown method '{}'", name)))
}

/// Selector plus encoded arguments.
pub fn encode_call(function: &Function, args: &[DynSolValue]) -> HarnessResult<Bytes> {
    function
        .abi_encode_input(args)
        .map(Bytes::from)
        .map_err(|e| HarnessError::AbiEncoding(format!("{}: {}", function.name, e)))
}

/// Decode returned bytes through the function's output schema.
pub fn decode_output(function: &Function, data: &[u8]) -> HarnessResult<DecodedValues> {
    let values = function
        .abi_decode_output(data)
        .map_err(|e| HarnessError::AbiDecoding(format!("{}: {}", function.name, e)))?;
    Ok(DecodedValues::new(function.outputs.iter().map(|p| p.name.clone()), values))
}

/// Encode values against the function's output schema.
pub fn encode_output(function: &Function, values: &[DynSolValue]) -> HarnessResult<Bytes> {
    function
        .abi_encode_output(values)
        .map(Bytes::from)
        .map_err(|e| HarnessError::AbiEncoding(format!("{} outputs: {}", function.name, e)))
}
