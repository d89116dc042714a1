//! Metrics collection.
//!
//! # Metrics
//! - `bank_transactions_total` (counter): attempts by `kind`, `outcome`
//! - `bank_errors_total` (counter): surfaced errors by `kind`
//! - `bank_confirmation_seconds` (histogram): submit-to-confirmation latency by `kind`

use std::time::Duration;

use crate::blockchain::types::TxKind;
use crate::session::ErrorKind;

pub fn record_transaction(kind: TxKind, outcome: &'static str) {
    metrics::counter!("bank_transactions_total", "kind" => kind.as_str(), "outcome" => outcome)
        .increment(1);
}

pub fn record_error(kind: ErrorKind) {
    metrics::counter!("bank_errors_total", "kind" => kind.as_str()).increment(1);
}

pub fn record_confirmation_latency(kind: TxKind, elapsed: Duration) {
    metrics::histogram!("bank_confirmation_seconds", "kind" => kind.as_str())
        .record(elapsed.as_secs_f64());
}
