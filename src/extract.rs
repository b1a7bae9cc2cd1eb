// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Target extraction from free-form tunnel service descriptors.
//!
//! A tunnel ingress rule's `service` field is a URL-like descriptor such
//! as `https://10.0.0.1:443` or `tcp://localhost:22`. This module pulls
//! the bare hostname/IP token back out of that string so the rule can be
//! reported as an endpoint target.

use std::sync::LazyLock;

use regex::Regex;

use crate::errors::ExtractError;

/// Recognizes a dotted hostname (two or more alphanumeric labels) or the
/// literal token `localhost`. Compiled once at first use; the pattern is
/// fixed, so a compile failure is a programming error, not a per-call one.
static TARGET_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(([a-zA-Z0-9]+\.)+[a-zA-Z0-9]+)|localhost")
        .expect("target extraction pattern must compile")
});

/// Extract the first routable target token from a service descriptor.
///
/// Scans the descriptor left to right and returns the first dotted
/// hostname or `localhost` found, by string position. When a descriptor
/// embeds several candidates, scan order wins, not semantic priority.
///
/// # Errors
///
/// Returns [`ExtractError::NoMatch`] when the descriptor contains no such
/// token.
pub fn extract_target(service: &str) -> Result<String, ExtractError> {
    TARGET_PATTERN
        .find(service)
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ExtractError::NoMatch {
            service: service.to_string(),
        })
}

#[cfg(test)]
#[path = "extract_tests.rs"]
mod extract_tests;
