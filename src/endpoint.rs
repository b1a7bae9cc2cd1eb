// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Desired-state endpoint records and per-cycle change batches.
//!
//! The controller invoking this crate computes desired vs. current records
//! and hands the reconciler a [`Changes`] batch per tick. The batch is
//! consumed once and discarded; nothing in this module performs I/O.

use serde::{Deserialize, Serialize};

/// DNS record type carried on a desired endpoint.
///
/// Tunnel ingress rules route by hostname only, so every rule decoded from
/// the remote configuration is reported as an `A` record. The other
/// variants exist for controllers that feed richer desired state in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    /// IPv4 address record
    A,
    /// IPv6 address record
    Aaaa,
    /// Canonical name record
    Cname,
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::Aaaa => write!(f, "AAAA"),
            Self::Cname => write!(f, "CNAME"),
        }
    }
}

/// A desired DNS-style endpoint record.
///
/// Immutable value produced by the calling controller. Only the first
/// target is consulted when encoding an ingress rule (first target wins);
/// additional targets are preserved for notification rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// DNS-style hostname, e.g. `app.example.com`
    pub dns_name: String,
    /// Record type of the endpoint
    pub record_type: RecordType,
    /// Ordered sequence of targets (hostname or IP tokens)
    pub targets: Vec<String>,
}

impl Endpoint {
    /// Create a new endpoint record.
    #[must_use]
    pub fn new(
        dns_name: impl Into<String>,
        record_type: RecordType,
        targets: Vec<String>,
    ) -> Self {
        Self {
            dns_name: dns_name.into(),
            record_type,
            targets,
        }
    }

    /// The first target, if any. This is the one the rule codec encodes.
    #[must_use]
    pub fn first_target(&self) -> Option<&str> {
        self.targets.first().map(String::as_str)
    }
}

/// One reconciliation cycle's worth of desired changes.
///
/// `update_old` carries the pre-update state for notification rendering
/// only; it contains no mutation instructions and is not examined when
/// deciding whether the batch is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Changes {
    /// Records to create
    pub create: Vec<Endpoint>,
    /// Desired state of records being updated
    pub update_new: Vec<Endpoint>,
    /// Previous state of records being updated (informational only)
    pub update_old: Vec<Endpoint>,
    /// Records to delete
    pub delete: Vec<Endpoint>,
}

impl Changes {
    /// True when the batch carries no mutation instructions.
    ///
    /// An empty batch short-circuits the whole cycle: no fetch, no write.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.update_new.is_empty() && self.delete.is_empty()
    }
}

/// Compute the symmetric difference of two target sets.
///
/// Returns `(added, removed)`: targets present in `desired` but not
/// `current`, and targets present in `current` but not `desired`.
/// Input order is preserved in each output.
#[must_use]
pub fn target_difference(current: &[String], desired: &[String]) -> (Vec<String>, Vec<String>) {
    let added = desired
        .iter()
        .filter(|t| !current.contains(t))
        .cloned()
        .collect();
    let removed = current
        .iter()
        .filter(|t| !desired.contains(t))
        .cloned()
        .collect();
    (added, removed)
}

/// Hostname suffix filter scoping which records this reconciler may touch.
///
/// An empty filter matches everything. A non-empty filter matches a name
/// that equals one of its domains or is a subdomain of one, compared
/// case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct DomainFilter {
    domains: Vec<String>,
}

impl DomainFilter {
    /// Create a filter from a list of domains. Leading dots and
    /// surrounding whitespace are stripped; empty entries are dropped.
    #[must_use]
    pub fn new(domains: &[String]) -> Self {
        let domains = domains
            .iter()
            .map(|d| d.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|d| !d.is_empty())
            .collect();
        Self { domains }
    }

    /// True if the given hostname is in scope for this filter.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        if self.domains.is_empty() {
            return true;
        }
        let name = name.trim_end_matches('.').to_ascii_lowercase();
        self.domains
            .iter()
            .any(|d| name == *d || name.ends_with(&format!(".{d}")))
    }
}

#[cfg(test)]
#[path = "endpoint_tests.rs"]
mod endpoint_tests;
