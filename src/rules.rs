// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Tunnel configuration wire types and the ingress rule codec.
//!
//! The remote configuration document is replaced wholesale on every write,
//! so these types round-trip every field the API returns: the fields this
//! crate manages (`hostname`, `path`, `service`, per-rule origin options)
//! and the document-level fields it must pass through unchanged
//! (`originRequest` defaults and `warp-routing`).
//!
//! The encode direction is deliberately lossy and opinionated: every
//! managed rule gets path `/`, scheme `https`, port `443` and the same
//! origin options. Callers cannot express alternate paths, schemes or
//! ports through this codec.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::endpoint::{Endpoint, RecordType};
use crate::errors::ExtractError;
use crate::extract::extract_target;

/// Per-rule origin options attached to managed ingress rules.
///
/// Field names follow the Cloudflare tunnel configuration JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginRequest {
    /// Attempt HTTP/2 to the origin
    #[serde(rename = "http2Origin", skip_serializing_if = "Option::is_none")]
    pub http2_origin: Option<bool>,
    /// Skip TLS verification of the origin certificate
    #[serde(rename = "noTLSVerify", skip_serializing_if = "Option::is_none")]
    pub no_tls_verify: Option<bool>,
}

/// One hostname-to-service mapping entry in the tunnel configuration.
///
/// Hostname is the merge key: unique within the rule collection. Rules
/// not managed by this crate (catch-all rules have no hostname) are
/// carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngressRule {
    /// External hostname routed by this rule; absent on catch-all rules
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    /// URL path prefix the rule applies to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// URL-like descriptor of the routed service
    pub service: String,
    /// Per-rule origin options; absent when the rule carries none
    #[serde(
        rename = "originRequest",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub origin_request: Option<OriginRequest>,
}

/// The full tunnel configuration document.
///
/// Ordered on the wire but logically keyed by hostname. `origin_request`
/// and `warp_routing` are opaque to the reconciler and must come out of a
/// cycle exactly as they went in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TunnelConfig {
    /// The ingress rule list
    #[serde(default)]
    pub ingress: Vec<IngressRule>,
    /// Document-level origin request defaults (pass-through)
    #[serde(
        rename = "originRequest",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub origin_request: Option<Value>,
    /// WARP routing flag (pass-through)
    #[serde(
        rename = "warp-routing",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub warp_routing: Option<Value>,
}

/// Encode a desired endpoint as a managed ingress rule.
///
/// Only the first target is consulted (first target wins). Endpoints with
/// no targets encode a rule with an empty service host, which the caller
/// is expected to have filtered out upstream.
#[must_use]
pub fn ingress_rule_for(endpoint: &Endpoint) -> IngressRule {
    let target = endpoint.first_target().unwrap_or_default();
    IngressRule {
        hostname: Some(endpoint.dns_name.clone()),
        path: Some("/".to_string()),
        service: format!("https://{target}:443"),
        origin_request: Some(OriginRequest {
            http2_origin: Some(true),
            no_tls_verify: Some(true),
        }),
    }
}

/// Decode an ingress rule back into an endpoint record.
///
/// Best-effort read path: rules without a hostname, or whose service
/// descriptor yields no routable target, fail with [`ExtractError`] and
/// are skipped by the caller rather than surfaced as batch errors.
pub fn endpoint_for(rule: &IngressRule) -> Result<Endpoint, ExtractError> {
    let hostname = rule.hostname.as_deref().ok_or_else(|| ExtractError::NoMatch {
        service: rule.service.clone(),
    })?;
    let target = extract_target(&rule.service)?;
    Ok(Endpoint::new(hostname, RecordType::A, vec![target]))
}

#[cfg(test)]
#[path = "rules_tests.rs"]
mod rules_tests;
