// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Remote tunnel configuration client.
//!
//! The reconciliation engine never talks to a concrete network client.
//! It depends on [`TunnelConfigStore`], a two-operation capability that an
//! in-memory fake can implement in tests. [`CloudflareClient`] is the
//! production implementation over the Cloudflare v4 API.
//!
//! The API exposes no partial-update primitive: the configuration
//! document is fetched and replaced as a whole, with last-writer-wins
//! semantics at the document level.

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::errors::{FetchError, WriteError};
use crate::rules::TunnelConfig;

/// Default Cloudflare v4 API base URL
pub const DEFAULT_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Two-operation capability over the remote tunnel configuration.
///
/// Both operations are idempotent from the engine's point of view:
/// fetch reads the current document, replace overwrites it wholesale.
#[async_trait]
pub trait TunnelConfigStore: Send + Sync {
    /// Fetch the current configuration document for a tunnel.
    async fn fetch_configuration(
        &self,
        account_id: &str,
        tunnel_id: &str,
    ) -> Result<TunnelConfig, FetchError>;

    /// Replace the configuration document for a tunnel wholesale.
    async fn replace_configuration(
        &self,
        account_id: &str,
        tunnel_id: &str,
        config: TunnelConfig,
    ) -> Result<(), WriteError>;
}

/// Standard Cloudflare v4 response envelope.
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
}

/// One error or informational message in a v4 envelope.
#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// `result` payload of the tunnel configurations endpoint.
#[derive(Debug, Serialize, Deserialize)]
struct ConfigurationResult {
    #[serde(default)]
    config: TunnelConfig,
}

/// Request body for replacing a tunnel configuration.
#[derive(Debug, Serialize)]
struct ConfigurationParams {
    config: TunnelConfig,
}

fn render_api_errors(errors: &[ApiMessage]) -> String {
    if errors.is_empty() {
        return "no error detail returned".to_string();
    }
    errors
        .iter()
        .map(|e| format!("[{}] {}", e.code, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Cloudflare v4 API client for tunnel configurations.
///
/// Authenticates with a bearer API token. The base URL is overridable so
/// tests can point the client at a local mock server.
#[derive(Debug, Clone)]
pub struct CloudflareClient {
    http: HttpClient,
    base_url: String,
    api_token: String,
}

impl CloudflareClient {
    /// Create a client against the given API base URL.
    #[must_use]
    pub fn new(api_token: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: HttpClient::new(),
            base_url,
            api_token: api_token.into(),
        }
    }

    /// Create a client against the public Cloudflare API.
    #[must_use]
    pub fn with_default_base(api_token: impl Into<String>) -> Self {
        Self::new(api_token, DEFAULT_API_BASE)
    }

    fn configurations_url(&self, account_id: &str, tunnel_id: &str) -> String {
        format!(
            "{}/accounts/{account_id}/cfd_tunnel/{tunnel_id}/configurations",
            self.base_url
        )
    }
}

#[async_trait]
impl TunnelConfigStore for CloudflareClient {
    async fn fetch_configuration(
        &self,
        account_id: &str,
        tunnel_id: &str,
    ) -> Result<TunnelConfig, FetchError> {
        let url = self.configurations_url(account_id, tunnel_id);

        debug!(
            tunnel_id = %tunnel_id,
            url = %url,
            "Fetching tunnel configuration"
        );

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                tunnel_id: tunnel_id.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            error!(
                tunnel_id = %tunnel_id,
                status = %status,
                error = %body,
                "Tunnel configuration fetch failed"
            );
            return Err(FetchError::ApiError {
                tunnel_id: tunnel_id.to_string(),
                status_code: status.as_u16(),
                reason: body,
            });
        }

        let envelope: ApiEnvelope<ConfigurationResult> =
            response.json().await.map_err(|e| FetchError::Decode {
                tunnel_id: tunnel_id.to_string(),
                reason: e.to_string(),
            })?;

        if !envelope.success {
            return Err(FetchError::ApiError {
                tunnel_id: tunnel_id.to_string(),
                status_code: status.as_u16(),
                reason: render_api_errors(&envelope.errors),
            });
        }

        let config = envelope
            .result
            .map(|r| r.config)
            .ok_or_else(|| FetchError::Decode {
                tunnel_id: tunnel_id.to_string(),
                reason: "envelope carried no result".to_string(),
            })?;

        info!(
            tunnel_id = %tunnel_id,
            rules = config.ingress.len(),
            "Fetched tunnel configuration"
        );

        Ok(config)
    }

    async fn replace_configuration(
        &self,
        account_id: &str,
        tunnel_id: &str,
        config: TunnelConfig,
    ) -> Result<(), WriteError> {
        let url = self.configurations_url(account_id, tunnel_id);
        let rules = config.ingress.len();

        debug!(
            tunnel_id = %tunnel_id,
            url = %url,
            rules = rules,
            "Replacing tunnel configuration"
        );

        let response = self
            .http
            .put(&url)
            .bearer_auth(&self.api_token)
            .json(&ConfigurationParams { config })
            .send()
            .await
            .map_err(|e| WriteError::Transport {
                tunnel_id: tunnel_id.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            error!(
                tunnel_id = %tunnel_id,
                status = %status,
                error = %body,
                "Tunnel configuration replace failed"
            );
            return Err(WriteError::ApiError {
                tunnel_id: tunnel_id.to_string(),
                status_code: status.as_u16(),
                reason: body,
            });
        }

        // The envelope can report failure under HTTP 200
        let envelope: ApiEnvelope<serde_json::Value> =
            response.json().await.map_err(|e| WriteError::Transport {
                tunnel_id: tunnel_id.to_string(),
                reason: format!("failed to read replace response: {e}"),
            })?;

        if !envelope.success {
            return Err(WriteError::ApiError {
                tunnel_id: tunnel_id.to_string(),
                status_code: status.as_u16(),
                reason: render_api_errors(&envelope.errors),
            });
        }

        info!(
            tunnel_id = %tunnel_id,
            rules = rules,
            "Replaced tunnel configuration"
        );

        Ok(())
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod client_tests;
