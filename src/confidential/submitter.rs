//! Confidential request submission with structured failure handling.

use std::time::Instant;

use alloy::dyn_abi::DynSolValue;
use tokio::time::{sleep, timeout};

use crate::chain::types::{HarnessError, HarnessResult, Receipt};
use crate::confidential::decode::{classify, DecodedError};
use crate::confidential::retry::RetryPolicy;
use crate::contract::handle::ContractHandle;
use crate::observability::metrics;

/// Receipt of a request that eventually succeeded, and how many failed
/// attempts preceded it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryOutcome {
    pub receipt: Receipt,
    pub retries: u32,
}

/// Submits confidential requests through one contract handle and turns
/// every failure into a [`DecodedError`].
#[derive(Debug, Clone)]
pub struct ConfidentialRequestSubmitter {
    handle: ContractHandle,
}

impl ConfidentialRequestSubmitter {
    pub fn new(handle: ContractHandle) -> Self {
        Self { handle }
    }

    pub fn handle(&self) -> &ContractHandle {
        &self.handle
    }

    /// Submit and wait for inclusion; admission and status failures come back
    /// decoded instead of raised.
    pub async fn best_effort(
        &self,
        method: &str,
        args: &[DynSolValue],
        confidential_inputs: &[u8],
    ) -> Result<Receipt, DecodedError> {
        let result = self.attempt(method, args, confidential_inputs).await;
        if let Err(decoded) = &result {
            metrics::record_confidential_failure(decoded.kind.as_str());
            tracing::debug!(
                method = method,
                contract = %self.handle.address(),
                kind = decoded.kind.as_str(),
                reason = %decoded,
                "Confidential request failed"
            );
        }
        result
    }

    async fn attempt(
        &self,
        method: &str,
        args: &[DynSolValue],
        confidential_inputs: &[u8],
    ) -> Result<Receipt, DecodedError> {
        let pending = self
            .handle
            .submit_transaction(method, args, confidential_inputs)
            .await
            .map_err(classify)?;

        let receipt = self
            .handle
            .client()
            .wait_for_receipt(&pending, None)
            .await
            .map_err(classify)?;

        if !receipt.success {
            return Err(DecodedError::transaction_failed(receipt.tx_hash));
        }
        Ok(receipt)
    }

    /// Submit and wait for inclusion; any failure is an error carrying the
    /// decoded reason.
    pub async fn must_succeed(
        &self,
        method: &str,
        args: &[DynSolValue],
        confidential_inputs: &[u8],
    ) -> HarnessResult<Receipt> {
        self.best_effort(method, args, confidential_inputs).await.map_err(|decoded| {
            tracing::error!(
                method = method,
                contract = %self.handle.address(),
                reason = %decoded,
                "Confidential request must succeed"
            );
            HarnessError::ConfidentialRequest(decoded)
        })
    }

    /// Resubmit while the failure is transient under `policy`.
    ///
    /// Each attempt is a fresh request (fresh nonce). A non-transient failure
    /// ends the loop immediately; an elapsed deadline ends it with a timeout.
    pub async fn submit_with_retry(
        &self,
        method: &str,
        args: &[DynSolValue],
        confidential_inputs: &[u8],
        policy: &RetryPolicy,
    ) -> HarnessResult<RetryOutcome> {
        let started = Instant::now();
        let attempts = async {
            let mut retries = 0u32;
            loop {
                match self.best_effort(method, args, confidential_inputs).await {
                    Ok(receipt) => return Ok(RetryOutcome { receipt, retries }),
                    Err(decoded) if policy.is_transient(&decoded) => {
                        retries += 1;
                        metrics::record_retry();
                        tracing::warn!(
                            method = method,
                            attempt = retries,
                            reason = %decoded,
                            interval = ?policy.interval,
                            "Transient confidential request failure, retrying"
                        );
                        sleep(policy.interval).await;
                    }
                    Err(decoded) => return Err(HarnessError::ConfidentialRequest(decoded)),
                }
            }
        };

        let outcome = match policy.deadline {
            Some(deadline) => timeout(deadline, attempts)
                .await
                .map_err(|_| HarnessError::Timeout(deadline))??,
            None => attempts.await?,
        };

        tracing::info!(
            method = method,
            retries = outcome.retries,
            elapsed = ?started.elapsed(),
            tx_hash = %outcome.receipt.tx_hash,
            "Confidential request included"
        );
        Ok(outcome)
    }
}
