//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, KETTLE_* / L1_* env overrides)
//!     → validation.rs (semantic checks)
//!     → HarnessConfig (validated, immutable)
//!     → consumed once by the Harness composition root
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults that match a local devnet
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{gateway_addr, load_config, load_or_default, ConfigError};
pub use schema::{
    ChainEndpointConfig, HarnessConfig, L1Config, ObservabilityConfig, RetryConfig,
    TransactionConfig,
};
