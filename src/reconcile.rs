// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciliation engine for tunnel ingress rules.
//!
//! One reconciliation cycle is one logical transaction: fetch the current
//! configuration document, merge the change batch into it, replace the
//! document wholesale. The merge is pure ([`merge_changes`]); all I/O
//! goes through the injected [`TunnelConfigStore`] capability.
//!
//! There is no internal retry and no state carried between cycles. The
//! remote document is the single source of truth and is refetched at the
//! start of every cycle. If a concurrent actor mutates the document
//! between fetch and replace, the replace overwrites that mutation
//! (last-writer-wins); callers needing stronger isolation must serialize
//! cycles per tunnel at a higher layer. Cancellation follows tokio
//! semantics: dropping the cycle future aborts whichever boundary call is
//! in flight.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::client::TunnelConfigStore;
use crate::endpoint::{Changes, DomainFilter, Endpoint};
use crate::errors::ProviderError;
use crate::metrics::{record_cycle_outcome, record_rule_skipped};
use crate::rules::{endpoint_for, ingress_rule_for, IngressRule, TunnelConfig};

/// Outcome of one apply cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The configuration document was replaced
    Applied,
    /// The batch was empty in scope; no fetch or write was performed
    NoOp,
}

/// Merge a change batch into the current configuration document.
///
/// Pure function, no I/O. The working set is keyed by hostname with
/// last-write-wins on duplicate hostnames in the source (defensive; the
/// remote invariant says they do not occur). Creates and updates collapse
/// to upserts, applied before deletes, so a create and delete of the same
/// hostname in one batch deletes. Deletes of absent hostnames are not
/// errors.
///
/// Output ordering is deterministic: hostname-keyed rules ascending by
/// hostname, then any hostname-less rules (cloudflared catch-all entries)
/// in their original relative order. Keeping catch-alls last preserves
/// their fall-through role. The document-level `originRequest` and
/// `warp-routing` fields pass through unchanged.
#[must_use]
pub fn merge_changes(current: TunnelConfig, changes: &Changes) -> TunnelConfig {
    let mut keyed: BTreeMap<String, IngressRule> = BTreeMap::new();
    let mut unkeyed: Vec<IngressRule> = Vec::new();

    for rule in current.ingress {
        match rule.hostname.clone() {
            Some(hostname) => {
                keyed.insert(hostname, rule);
            }
            None => unkeyed.push(rule),
        }
    }

    for record in changes.create.iter().chain(&changes.update_new) {
        keyed.insert(record.dns_name.clone(), ingress_rule_for(record));
    }
    for record in &changes.delete {
        keyed.remove(&record.dns_name);
    }

    let mut ingress: Vec<IngressRule> = keyed.into_values().collect();
    ingress.extend(unkeyed);

    TunnelConfig {
        ingress,
        origin_request: current.origin_request,
        warp_routing: current.warp_routing,
    }
}

/// Reconciles desired endpoint records against one tunnel's ingress rules.
///
/// Owns the account/tunnel references, the hostname scope filter and the
/// injected configuration store. One provider instance manages exactly
/// one tunnel.
pub struct TunnelDnsProvider<C: TunnelConfigStore> {
    client: C,
    account_id: String,
    tunnel_id: String,
    domain_filter: DomainFilter,
}

impl<C: TunnelConfigStore> TunnelDnsProvider<C> {
    /// Create a provider for one tunnel.
    pub fn new(
        client: C,
        account_id: impl Into<String>,
        tunnel_id: impl Into<String>,
        domain_filter: DomainFilter,
    ) -> Self {
        Self {
            client,
            account_id: account_id.into(),
            tunnel_id: tunnel_id.into(),
            domain_filter,
        }
    }

    /// List the endpoint records currently represented by the tunnel.
    ///
    /// Best-effort read path: rules whose service descriptor yields no
    /// routable target are skipped, not surfaced as errors, so one
    /// unparseable rule cannot block listing the rest. Rules outside the
    /// domain filter are skipped as well. Skips are counted in metrics.
    ///
    /// # Errors
    ///
    /// Returns a fetch failure when the current configuration cannot be
    /// retrieved.
    pub async fn records(&self) -> Result<Vec<Endpoint>, ProviderError> {
        let config = self
            .client
            .fetch_configuration(&self.account_id, &self.tunnel_id)
            .await?;

        let mut endpoints = Vec::with_capacity(config.ingress.len());
        let mut skipped = 0usize;

        for rule in &config.ingress {
            match endpoint_for(rule) {
                Ok(endpoint) => {
                    if self.domain_filter.matches(&endpoint.dns_name) {
                        endpoints.push(endpoint);
                    } else {
                        record_rule_skipped("filtered");
                        skipped += 1;
                    }
                }
                Err(e) => {
                    debug!(
                        tunnel_id = %self.tunnel_id,
                        service = %rule.service,
                        error = %e,
                        "Skipping ingress rule with no routable target"
                    );
                    record_rule_skipped("no_target");
                    skipped += 1;
                }
            }
        }

        info!(
            tunnel_id = %self.tunnel_id,
            listed = endpoints.len(),
            skipped = skipped,
            "Listed tunnel endpoints"
        );

        Ok(endpoints)
    }

    /// Apply a change batch to the tunnel configuration.
    ///
    /// An empty batch (in scope of the domain filter) short-circuits the
    /// whole cycle: no fetch, no write. Otherwise the cycle runs fetch →
    /// merge → replace. A fetch failure aborts before any mutation; a
    /// write failure leaves the remote unchanged (the replace is atomic
    /// at the document level) and is surfaced without internal retry.
    ///
    /// # Errors
    ///
    /// Returns the fetch or write failure for this cycle. The caller's
    /// next tick re-drives a fresh cycle.
    pub async fn apply_changes(&self, changes: &Changes) -> Result<ApplyOutcome, ProviderError> {
        let scoped = self.scope_changes(changes);

        if scoped.is_empty() {
            info!(
                tunnel_id = %self.tunnel_id,
                "All records are already up to date"
            );
            record_cycle_outcome("noop");
            return Ok(ApplyOutcome::NoOp);
        }

        let current = match self
            .client
            .fetch_configuration(&self.account_id, &self.tunnel_id)
            .await
        {
            Ok(config) => config,
            Err(e) => {
                record_cycle_outcome("fetch_error");
                return Err(e.into());
            }
        };

        let merged = merge_changes(current, &scoped);

        if let Err(e) = self
            .client
            .replace_configuration(&self.account_id, &self.tunnel_id, merged)
            .await
        {
            record_cycle_outcome("write_error");
            return Err(e.into());
        }

        info!(
            tunnel_id = %self.tunnel_id,
            created = scoped.create.len(),
            updated = scoped.update_new.len(),
            deleted = scoped.delete.len(),
            "Applied change batch"
        );
        record_cycle_outcome("applied");

        Ok(ApplyOutcome::Applied)
    }

    /// Drop batch entries outside the domain filter, with a warning per
    /// dropped record. `update_old` is informational and passes through.
    fn scope_changes(&self, changes: &Changes) -> Changes {
        let retain = |records: &[Endpoint], operation: &str| -> Vec<Endpoint> {
            records
                .iter()
                .filter(|r| {
                    let in_scope = self.domain_filter.matches(&r.dns_name);
                    if !in_scope {
                        warn!(
                            tunnel_id = %self.tunnel_id,
                            dns_name = %r.dns_name,
                            operation = %operation,
                            "Skipping record outside the configured domain filter"
                        );
                    }
                    in_scope
                })
                .cloned()
                .collect()
        };

        Changes {
            create: retain(&changes.create, "create"),
            update_new: retain(&changes.update_new, "update"),
            update_old: changes.update_old.clone(),
            delete: retain(&changes.delete, "delete"),
        }
    }
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod reconcile_tests;
