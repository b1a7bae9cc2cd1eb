// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `metrics.rs`

use crate::metrics::{
    gather_metrics, record_cycle_outcome, record_notify_failure, record_rule_skipped,
};

#[test]
fn test_cycle_outcomes_are_counted() {
    record_cycle_outcome("applied");
    record_cycle_outcome("noop");

    let output = gather_metrics().expect("metrics encode");
    assert!(output.contains("tundra_reconcile_cycles_total"));
    assert!(output.contains("outcome=\"applied\""));
    assert!(output.contains("outcome=\"noop\""));
}

#[test]
fn test_skipped_rules_are_counted() {
    record_rule_skipped("no_target");

    let output = gather_metrics().expect("metrics encode");
    assert!(output.contains("tundra_rules_skipped_total"));
    assert!(output.contains("reason=\"no_target\""));
}

#[test]
fn test_notify_failures_are_counted() {
    record_notify_failure("C012345");

    let output = gather_metrics().expect("metrics encode");
    assert!(output.contains("tundra_notify_failures_total"));
    assert!(output.contains("channel=\"C012345\""));
}
