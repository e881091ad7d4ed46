//! Contract interaction subsystem.
//!
//! # Data Flow
//! ```text
//! artifact.rs (ABI + bytecode)
//!     → ChainClient::deploy → DeployedContract (address + ABI, shared)
//!     → handle.rs (bound to client + signer; with_signer re-binds)
//!     → abi.rs (typed encode / decode against the JSON ABI)
//! ```

pub mod abi;
pub mod artifact;
pub mod handle;

pub use abi::DecodedValues;
pub use artifact::ContractArtifact;
pub use handle::{ContractHandle, DeployedContract};
