//! Metrics collection and exposition.
//!
//! # Metrics
//! - `harness_transactions_submitted_total` (counter): broadcasts by chain
//! - `harness_receipts_total` (counter): mined receipts by chain, status
//! - `harness_confidential_failures_total` (counter): decoded failures by kind
//! - `harness_confidential_retries_total` (counter): transient retries

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_submitted(chain: &'static str) {
    counter!("harness_transactions_submitted_total", "chain" => chain).increment(1);
}

pub fn record_receipt(chain: &'static str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!("harness_receipts_total", "chain" => chain, "status" => status).increment(1);
}

pub fn record_confidential_failure(kind: &'static str) {
    counter!("harness_confidential_failures_total", "kind" => kind).increment(1);
}

pub fn record_retry() {
    counter!("harness_confidential_retries_total").increment(1);
}
