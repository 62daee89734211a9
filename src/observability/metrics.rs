//! Metrics collection and exposition.
//!
//! # Metrics
//! - `disburser_submissions_total` (counter): attempts by outcome
//!   (accepted, failed, aborted)
//! - `disburser_duplicates_skipped_total` (counter): duplicate input rows
//! - `disburser_remaining_beneficiaries` (gauge): queue entries left
//!
//! Recording is cheap and never fails; the Prometheus exporter is only
//! installed when enabled in config.

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on the given address.
///
/// Failure to bind is logged, not fatal: a disbursement run is more
/// important than its metrics endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Count one submission outcome.
pub fn record_submission(outcome: &'static str) {
    counter!("disburser_submissions_total", "outcome" => outcome).increment(1);
}

/// Count one duplicate input row.
pub fn record_duplicate_skip() {
    counter!("disburser_duplicates_skipped_total").increment(1);
}

/// Track how many beneficiaries are still unresolved.
pub fn record_remaining(remaining: usize) {
    gauge!("disburser_remaining_beneficiaries").set(remaining as f64);
}
