// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Environment-driven configuration for the reconciler binary.
//!
//! The reconciler core takes its collaborators as values; this module is
//! where the binary assembles those values from the process environment.
//! Mandatory settings missing at startup are construction-time errors,
//! not per-cycle ones.
//!
//! | Variable        | Meaning                                            |
//! |-----------------|----------------------------------------------------|
//! | `CF_API_TOKEN`  | API token; `file:<path>` reads the token from disk |
//! | `CF_ACCOUNT_ID` | Cloudflare account identifier                      |
//! | `CF_TUNNEL_ID`  | Tunnel whose ingress rules are managed             |
//! | `CF_API_URL`    | API base override (defaults to the public API)     |
//! | `DOMAIN_FILTER` | Comma-separated hostname suffixes in scope         |
//! | `SLACK_TOKEN`   | Bot token for change notifications (optional)      |
//! | `SLACK_CHANNEL` | Channel the notifications go to                    |
//! | `NOTIFY_OWNER`  | Attribution rendered on each notification          |

use anyhow::{bail, Context, Result};

use crate::client::DEFAULT_API_BASE;
use crate::endpoint::DomainFilter;

/// Notification settings; present only when Slack is configured.
#[derive(Debug, Clone)]
pub struct SlackSettings {
    /// Slack bot token
    pub token: String,
    /// Channel identifier messages are delivered to
    pub channel: String,
    /// Owner attribution rendered on each message
    pub owner: String,
}

/// Assembled configuration for one reconciler process.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Cloudflare API token
    pub api_token: String,
    /// Cloudflare API base URL
    pub api_base: String,
    /// Account owning the tunnel
    pub account_id: String,
    /// The managed tunnel
    pub tunnel_id: String,
    /// Hostname scope for this reconciler
    pub domain_filter: DomainFilter,
    /// Slack notification settings, when configured
    pub slack: Option<SlackSettings>,
}

impl Settings {
    /// Load settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error when a mandatory variable is missing or empty, or
    /// when a `file:`-indirected token cannot be read.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_token = match lookup("CF_API_TOKEN") {
            Some(t) if !t.is_empty() => t,
            _ => bail!("CF_API_TOKEN is empty"),
        };
        let api_token = if let Some(path) = raw_token.strip_prefix("file:") {
            std::fs::read_to_string(path)
                .with_context(|| format!("failed to read CF_API_TOKEN from file: {path}"))?
                .trim()
                .to_string()
        } else {
            raw_token
        };

        let account_id = match lookup("CF_ACCOUNT_ID") {
            Some(a) if !a.is_empty() => a,
            _ => bail!("CF_ACCOUNT_ID is empty"),
        };
        let tunnel_id = match lookup("CF_TUNNEL_ID") {
            Some(t) if !t.is_empty() => t,
            _ => bail!("CF_TUNNEL_ID is empty"),
        };

        let api_base = lookup("CF_API_URL")
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let domains: Vec<String> = lookup("DOMAIN_FILTER")
            .unwrap_or_default()
            .split(',')
            .map(str::to_string)
            .collect();
        let domain_filter = DomainFilter::new(&domains);

        let slack = match (lookup("SLACK_TOKEN"), lookup("SLACK_CHANNEL")) {
            (Some(token), Some(channel)) if !token.is_empty() && !channel.is_empty() => {
                Some(SlackSettings {
                    token,
                    channel,
                    owner: lookup("NOTIFY_OWNER").unwrap_or_else(|| "tundra".to_string()),
                })
            }
            _ => None,
        };

        Ok(Self {
            api_token,
            api_base,
            account_id,
            tunnel_id,
            domain_filter,
            slack,
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
