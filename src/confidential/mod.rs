//! Confidential compute requests: submission, failure decoding and retry.

pub mod compat;
pub mod decode;
pub mod retry;
pub mod submitter;

pub use decode::{DecodedError, DecodedErrorKind};
pub use retry::RetryPolicy;
pub use submitter::{ConfidentialRequestSubmitter, RetryOutcome};
