// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # Tundra - Cloudflare Tunnel ingress DNS reconciler
//!
//! Tundra reconciles a desired set of DNS-style endpoint records against
//! the ingress rule list of one Cloudflare Tunnel, and reports applied
//! change batches to a Slack channel.
//!
//! ## Overview
//!
//! The tunnel configuration API exposes no partial-update primitive, so
//! each reconciliation cycle fetches the whole configuration document,
//! merges the change batch into it keyed by hostname, and replaces the
//! document wholesale. Document-level settings the reconciler does not
//! manage (`originRequest` defaults, `warp-routing`) pass through
//! unchanged.
//!
//! ## Modules
//!
//! - [`endpoint`] - Desired records, change batches, domain scoping
//! - [`extract`] - Target extraction from service descriptors
//! - [`rules`] - Tunnel configuration wire types and the rule codec
//! - [`reconcile`] - The fetch-merge-replace reconciliation engine
//! - [`client`] - The two-operation remote configuration capability
//! - [`notify`] - Best-effort Slack change notifications
//! - [`config`] - Environment-driven settings for the binary
//! - [`metrics`] - Prometheus counters for cycles, skips and failures
//!
//! ## Example
//!
//! ```rust,no_run
//! use tundra::client::CloudflareClient;
//! use tundra::endpoint::DomainFilter;
//! use tundra::reconcile::TunnelDnsProvider;
//!
//! # async fn example() -> Result<(), tundra::errors::ProviderError> {
//! let client = CloudflareClient::with_default_base("api-token");
//! let provider = TunnelDnsProvider::new(
//!     client,
//!     "account-id",
//!     "tunnel-id",
//!     DomainFilter::new(&["example.com".to_string()]),
//! );
//!
//! for record in provider.records().await? {
//!     println!("{} -> {:?}", record.dns_name, record.targets);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Guarantees
//!
//! - **Idempotent** - Applying the same batch twice yields the same document
//! - **Atomic writes** - A failed replace leaves the remote unchanged
//! - **Best-effort reads** - Unparseable rules are skipped, never fatal
//! - **Decoupled notification** - Delivery failure never blocks a cycle

pub mod client;
pub mod config;
pub mod endpoint;
pub mod errors;
pub mod extract;
pub mod metrics;
pub mod notify;
pub mod reconcile;
pub mod rules;
