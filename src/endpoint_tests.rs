// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `endpoint.rs`

use crate::endpoint::{target_difference, Changes, DomainFilter, Endpoint, RecordType};

fn endpoint(name: &str, targets: &[&str]) -> Endpoint {
    Endpoint::new(
        name,
        RecordType::A,
        targets.iter().map(ToString::to_string).collect(),
    )
}

#[test]
fn test_first_target_wins() {
    let ep = endpoint("app.example.com", &["10.0.0.1", "10.0.0.2"]);
    assert_eq!(ep.first_target(), Some("10.0.0.1"));
}

#[test]
fn test_first_target_empty() {
    let ep = endpoint("app.example.com", &[]);
    assert_eq!(ep.first_target(), None);
}

#[test]
fn test_changes_empty_ignores_update_old() {
    let changes = Changes {
        update_old: vec![endpoint("a.example.com", &["10.0.0.1"])],
        ..Changes::default()
    };
    // update_old carries no mutation instructions
    assert!(changes.is_empty());
}

#[test]
fn test_changes_not_empty_with_create() {
    let changes = Changes {
        create: vec![endpoint("a.example.com", &["10.0.0.1"])],
        ..Changes::default()
    };
    assert!(!changes.is_empty());
}

#[test]
fn test_changes_not_empty_with_delete() {
    let changes = Changes {
        delete: vec![endpoint("a.example.com", &["10.0.0.1"])],
        ..Changes::default()
    };
    assert!(!changes.is_empty());
}

#[test]
fn test_target_difference_symmetric() {
    let current = vec!["1.2.3.4".to_string(), "5.6.7.8".to_string()];
    let desired = vec!["5.6.7.8".to_string(), "9.9.9.9".to_string()];

    let (added, removed) = target_difference(&current, &desired);
    assert_eq!(added, vec!["9.9.9.9".to_string()]);
    assert_eq!(removed, vec!["1.2.3.4".to_string()]);
}

#[test]
fn test_target_difference_no_change() {
    let targets = vec!["1.2.3.4".to_string()];
    let (added, removed) = target_difference(&targets, &targets);
    assert!(added.is_empty());
    assert!(removed.is_empty());
}

#[test]
fn test_changes_deserializes_with_missing_fields() {
    // The CLI reads batches from JSON files; absent sections default empty
    let changes: Changes =
        serde_json::from_str(r#"{"create": [{"dns_name": "a.example.com", "record_type": "A", "targets": ["10.0.0.1"]}]}"#)
            .expect("valid changes document");
    assert_eq!(changes.create.len(), 1);
    assert!(changes.delete.is_empty());
    assert!(!changes.is_empty());
}

#[test]
fn test_domain_filter_empty_matches_all() {
    let filter = DomainFilter::default();
    assert!(filter.matches("anything.example.org"));
}

#[test]
fn test_domain_filter_exact_and_subdomain() {
    let filter = DomainFilter::new(&["example.com".to_string()]);
    assert!(filter.matches("example.com"));
    assert!(filter.matches("app.example.com"));
    assert!(filter.matches("App.Example.COM"));
    assert!(!filter.matches("example.org"));
    // A suffix match alone is not enough, the label boundary matters
    assert!(!filter.matches("notexample.com"));
}

#[test]
fn test_domain_filter_leading_dot_normalized() {
    let filter = DomainFilter::new(&[".example.com".to_string()]);
    assert!(filter.matches("app.example.com"));
}
