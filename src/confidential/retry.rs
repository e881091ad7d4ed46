//! Retry policy for transient confidential request failures.
//!
//! The policy is deliberately simple: fixed interval, unbounded attempts,
//! optional overall deadline. Only failures whose decoded message contains
//! one of the transient markers are retried.

use std::time::Duration;

use crate::config::RetryConfig;
use crate::confidential::decode::DecodedError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Sleep between attempts.
    pub interval: Duration,
    /// Overall bound on the retry loop; `None` retries forever.
    pub deadline: Option<Duration>,
    /// Substrings marking a failure as transient.
    pub transient_markers: Vec<String>,
}

impl RetryPolicy {
    pub fn new(interval: Duration) -> Self {
        Self { interval, deadline: None, transient_markers: Vec::new() }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.transient_markers.push(marker.into());
        self
    }

    pub fn is_transient(&self, err: &DecodedError) -> bool {
        let message = err.message();
        self.transient_markers.iter().any(|marker| message.contains(marker.as_str()))
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            interval: Duration::from_secs(config.interval_secs),
            deadline: (config.deadline_secs > 0).then(|| Duration::from_secs(config.deadline_secs)),
            transient_markers: config.transient_markers.clone(),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}
