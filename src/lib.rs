//! Kettle integration harness library.
//!
//! Drives a confidential-compute chain (the kettle) and an optional companion
//! L1 from Rust: identities, deployment, confidential compute requests with
//! decoded failures, and typed event decoding.

// Chain access
pub mod chain;
pub mod contract;

// Confidential requests and their results
pub mod confidential;
pub mod events;

// Cross-cutting concerns
pub mod config;
pub mod harness;
pub mod observability;

pub use chain::{ChainClient, ChainRole, HarnessError, HarnessResult, Identity, Receipt};
pub use config::HarnessConfig;
pub use confidential::{ConfidentialRequestSubmitter, DecodedError, DecodedErrorKind, RetryPolicy};
pub use contract::{ContractArtifact, ContractHandle};
pub use events::EventDecoder;
pub use harness::Harness;
