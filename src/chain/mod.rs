//! Chain access subsystem.
//!
//! # Data Flow
//! ```text
//! HarnessConfig (endpoint URL, funded key)
//!     → identity.rs (key import / generation, signing)
//!     → client.rs (RPC connection, chain id, kettle address)
//!     → transaction.rs / envelope.rs (build & sign legacy or confidential)
//!     → client.rs (broadcast, receipt polling)
//! ```
//!
//! # Security Constraints
//! - Never log private keys
//! - Every receipt wait has a deadline

pub mod client;
pub mod envelope;
pub mod identity;
pub mod transaction;
pub mod types;

pub use client::{ChainClient, TxSettings};
pub use identity::Identity;
pub use transaction::{PendingTransaction, SignedTransaction, TxSpec};
pub use types::{ChainRole, HarnessError, HarnessResult, LogEntry, Receipt, RpcFailure};
