// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Best-effort change notifications to a Slack channel.
//!
//! The notifier renders one line per affected record plus a success or
//! failure banner and owner attribution, then posts the summary to one
//! fixed channel. Delivery is fire-and-forget from the reconciler's point
//! of view: a [`NotifyError`] is reported to the caller, logged, and never
//! allowed to retry or roll back the reconciliation outcome.

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::endpoint::{target_difference, Changes};
use crate::errors::NotifyError;
use crate::metrics::record_notify_failure;

/// Slack chat.postMessage endpoint
const SLACK_POST_MESSAGE_URL: &str = "https://slack.com/api/chat.postMessage";

/// Attachment color for successful cycles
const COLOR_SUCCESS: &str = "#36D399";

/// Attachment color for failed cycles
const COLOR_FAILURE: &str = "#a30200";

/// Outcome of the reconciliation cycle being reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The change batch was applied
    Success,
    /// The cycle failed; carries the rendered error
    Failure(String),
}

/// One rendered notification message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeMessage {
    /// Top-level fallback text (the banner)
    pub text: String,
    /// Attachment color (success green / failure red)
    pub color: String,
    /// Full body: banner, itemized change lines, owner attribution
    pub body: String,
}

/// Message delivery capability, substitutable by a fake in tests.
#[async_trait]
pub trait MessagePoster: Send + Sync {
    /// Deliver one message to the given channel.
    async fn post_message(&self, channel: &str, message: &ChangeMessage)
        -> Result<(), NotifyError>;
}

/// Render the itemized change lines for a batch.
///
/// Creates and deletes produce one line per target. Updates are rendered
/// as the symmetric difference of old vs. new target sets, as paired
/// `Create:`/`Delete:` lines. Unpaired update entries (old without new or
/// vice versa) cannot be diffed and are skipped.
#[must_use]
pub fn render_change_lines(changes: &Changes) -> Vec<String> {
    let mut lines = Vec::new();

    for record in &changes.create {
        for target in &record.targets {
            lines.push(format!("Create: {} -> {target}", record.dns_name));
        }
    }

    for (desired, current) in changes.update_new.iter().zip(&changes.update_old) {
        let (added, removed) = target_difference(&current.targets, &desired.targets);
        for target in added {
            lines.push(format!("Create: {} -> {target}", current.dns_name));
        }
        for target in removed {
            lines.push(format!("Delete: {} -> {target}", current.dns_name));
        }
    }

    for record in &changes.delete {
        for target in &record.targets {
            lines.push(format!("Delete: {} -> {target}", record.dns_name));
        }
    }

    lines
}

/// Renders and delivers change summaries to one Slack channel.
pub struct SlackNotifier<P: MessagePoster> {
    poster: P,
    channel: String,
    owner: String,
}

impl<P: MessagePoster> SlackNotifier<P> {
    /// Create a notifier bound to one channel and owner attribution.
    pub fn new(poster: P, channel: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            poster,
            channel: channel.into(),
            owner: owner.into(),
        }
    }

    /// Render the message for a batch and outcome.
    #[must_use]
    pub fn render(&self, outcome: &CycleOutcome, changes: &Changes) -> ChangeMessage {
        let (banner, color) = match outcome {
            CycleOutcome::Success => ("DNS Configured Successfully!", COLOR_SUCCESS),
            CycleOutcome::Failure(_) => ("DNS Configuration Failed.", COLOR_FAILURE),
        };

        let mut body = String::from(banner);
        for line in render_change_lines(changes) {
            body.push('\n');
            body.push_str(&line);
        }
        if let CycleOutcome::Failure(err) = outcome {
            body.push_str("\nError: ");
            body.push_str(err);
        }
        body.push_str("\nOwner: ");
        body.push_str(&self.owner);

        ChangeMessage {
            text: banner.to_string(),
            color: color.to_string(),
            body,
        }
    }

    /// Deliver a change summary for the given outcome.
    ///
    /// Returns success immediately for an empty batch. Delivery failures
    /// are counted in metrics and returned; the caller logs and proceeds.
    ///
    /// # Errors
    ///
    /// Returns a [`NotifyError`] when message delivery fails. Never fatal
    /// to the reconciliation cycle.
    pub async fn notify(
        &self,
        outcome: &CycleOutcome,
        changes: &Changes,
    ) -> Result<(), NotifyError> {
        if changes.is_empty() {
            debug!(channel = %self.channel, "Empty change batch, skipping notification");
            return Ok(());
        }

        let message = self.render(outcome, changes);
        let result = self.poster.post_message(&self.channel, &message).await;
        if result.is_err() {
            record_notify_failure(&self.channel);
        }
        result
    }
}

/// Response body of Slack Web API calls.
#[derive(Debug, Deserialize)]
struct SlackApiResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Production poster for the Slack Web API.
#[derive(Debug, Clone)]
pub struct SlackApiPoster {
    http: HttpClient,
    token: String,
    base_url: String,
}

impl SlackApiPoster {
    /// Create a poster against the public Slack API.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, SLACK_POST_MESSAGE_URL)
    }

    /// Create a poster against a custom endpoint (tests point this at a
    /// mock server).
    #[must_use]
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: HttpClient::new(),
            token: token.into(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl MessagePoster for SlackApiPoster {
    async fn post_message(
        &self,
        channel: &str,
        message: &ChangeMessage,
    ) -> Result<(), NotifyError> {
        let payload = serde_json::json!({
            "channel": channel,
            "text": message.text,
            "attachments": [{
                "color": message.color,
                "text": message.body,
            }],
        });

        let response = self
            .http
            .post(&self.base_url)
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Transport {
                channel: channel.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::DeliveryFailed {
                channel: channel.to_string(),
                reason: format!("HTTP {status}"),
            });
        }

        // Slack reports API-level failure under HTTP 200
        let body: SlackApiResponse =
            response.json().await.map_err(|e| NotifyError::Transport {
                channel: channel.to_string(),
                reason: format!("failed to read response: {e}"),
            })?;

        if !body.ok {
            return Err(NotifyError::DeliveryFailed {
                channel: channel.to_string(),
                reason: body.error.unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "notify_tests.rs"]
mod notify_tests;
