//! Prometheus metrics for the ICM Bridge API
//!
//! Exposes metrics on /metrics endpoint for Prometheus scraping.

use lazy_static::lazy_static;
use prometheus::{
    register_int_counter_vec, register_int_gauge, IntCounterVec, IntGauge,
};

lazy_static! {
    // Contract reads
    pub static ref CONTRACT_CALLS: IntCounterVec = register_int_counter_vec!(
        "icm_bridge_contract_calls_total",
        "Total number of contract view calls",
        &["method", "status"]
    ).expect("constant metric name is valid");

    // Transactions
    pub static ref TRANSACTIONS_SUBMITTED: IntCounterVec = register_int_counter_vec!(
        "icm_bridge_transactions_submitted_total",
        "Total number of transactions submitted to the bridge contract",
        &["method", "status"]
    ).expect("constant metric name is valid");

    // Watcher
    pub static ref BRIDGE_EVENTS: IntCounterVec = register_int_counter_vec!(
        "icm_bridge_events_total",
        "Total number of bridge contract events observed",
        &["event"]
    ).expect("constant metric name is valid");

    pub static ref LAST_POLLED_BLOCK: IntGauge = register_int_gauge!(
        "icm_bridge_last_polled_block",
        "Last block scanned by the event watcher"
    ).expect("constant metric name is valid");

    pub static ref WATCHER_ERRORS: IntCounterVec = register_int_counter_vec!(
        "icm_bridge_watcher_errors_total",
        "Total number of event watcher poll failures",
        &["type"]
    ).expect("constant metric name is valid");

    // Health
    pub static ref UP: IntGauge = register_int_gauge!(
        "icm_bridge_up",
        "Whether the API server is up and running"
    ).expect("constant metric name is valid");
}

fn status_label(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "failure"
    }
}

/// Record a contract view call
pub fn record_contract_call(method: &str, success: bool) {
    CONTRACT_CALLS
        .with_label_values(&[method, status_label(success)])
        .inc();
}

/// Record a submitted transaction
pub fn record_transaction(method: &str, success: bool) {
    TRANSACTIONS_SUBMITTED
        .with_label_values(&[method, status_label(success)])
        .inc();
}

/// Record an observed bridge event
pub fn record_event(event: &str) {
    BRIDGE_EVENTS.with_label_values(&[event]).inc();
}

/// Record the last block the watcher scanned
pub fn record_polled_block(block_number: u64) {
    LAST_POLLED_BLOCK.set(block_number as i64);
}

/// Record a watcher failure
pub fn record_watcher_error(error_type: &str) {
    WATCHER_ERRORS.with_label_values(&[error_type]).inc();
}

/// Encode all registered metrics in the Prometheus text format
pub fn encode() -> Result<(String, Vec<u8>), prometheus::Error> {
    use prometheus::{Encoder, TextEncoder};

    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&prometheus::gather(), &mut buffer)?;
    Ok((encoder.format_type().to_string(), buffer))
}
