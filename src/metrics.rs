// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the tunnel reconciler.
//!
//! Counters cover per-cycle outcomes and the two best-effort paths:
//! ingress rules skipped on the read path (unparseable service
//! descriptors) and notification delivery failures.
//!
//! # Example
//!
//! ```rust
//! use tundra::metrics::record_cycle_outcome;
//!
//! record_cycle_outcome("applied");
//! ```

use prometheus::{CounterVec, Encoder, Opts, Registry, TextEncoder};
use std::sync::LazyLock;

/// Namespace prefix for all tundra metrics (prometheus-safe)
const METRICS_NAMESPACE: &str = "tundra";

/// Global Prometheus metrics registry
///
/// All metrics are registered in this registry and exposed via
/// [`gather_metrics`].
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Total number of reconciliation cycles by outcome
///
/// Labels:
/// - `outcome`: `applied`, `noop`, `fetch_error`, `write_error`
pub static CYCLES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_reconcile_cycles_total"),
        "Total number of reconciliation cycles by outcome",
    );
    let counter = CounterVec::new(opts, &["outcome"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total number of ingress rules skipped on the read path
///
/// Labels:
/// - `reason`: `no_target`, `filtered`
pub static RULES_SKIPPED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_rules_skipped_total"),
        "Total number of ingress rules skipped while listing, by reason",
    );
    let counter = CounterVec::new(opts, &["reason"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total number of notification delivery failures
pub static NOTIFY_FAILURES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_notify_failures_total"),
        "Total number of change notification delivery failures",
    );
    let counter = CounterVec::new(opts, &["channel"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Record the outcome of one reconciliation cycle.
pub fn record_cycle_outcome(outcome: &str) {
    CYCLES_TOTAL.with_label_values(&[outcome]).inc();
}

/// Record an ingress rule skipped on the read path.
pub fn record_rule_skipped(reason: &str) {
    RULES_SKIPPED_TOTAL.with_label_values(&[reason]).inc();
}

/// Record a notification delivery failure.
pub fn record_notify_failure(channel: &str) {
    NOTIFY_FAILURES_TOTAL.with_label_values(&[channel]).inc();
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Errors
///
/// Returns an error if encoding the metric families fails.
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).to_string())
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod metrics_tests;
