// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for tunnel configuration reconciliation.
//!
//! This module provides the error taxonomy for one reconciliation cycle:
//! - Target extraction failures (per-rule, cause the rule to be skipped)
//! - Configuration fetch failures (fatal for the cycle, abort before mutation)
//! - Configuration write failures (fatal for the cycle, remote left unchanged)
//! - Notification failures (reported to the caller, never fatal)
//!
//! These errors provide structured error handling for remote operations,
//! enabling better error reporting in logs and metrics.

use thiserror::Error;

/// Errors that can occur when extracting a routable target from a
/// free-form service descriptor.
///
/// Extraction failures are per-rule and non-fatal: the read path skips
/// the offending rule and keeps listing the rest.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// No hostname or `localhost` token found in the descriptor
    ///
    /// Returned when the service string contains neither a dotted hostname
    /// nor the literal `localhost`, e.g. `http_status:404`.
    #[error("no routable target in service descriptor '{service}'")]
    NoMatch {
        /// The service descriptor that failed to match
        service: String,
    },
}

/// Errors that can occur when fetching the current tunnel configuration.
///
/// Fetch failures abort the reconciliation cycle before any mutation is
/// attempted. There is no internal retry; the calling controller re-drives
/// a fresh cycle on its next tick.
#[derive(Error, Debug, Clone)]
pub enum FetchError {
    /// The configuration endpoint returned a non-success status
    #[error("failed to fetch tunnel configuration for tunnel '{tunnel_id}' (HTTP {status_code}): {reason}")]
    ApiError {
        /// The tunnel whose configuration was requested
        tunnel_id: String,
        /// HTTP status code returned by the API
        status_code: u16,
        /// Response body or error message
        reason: String,
    },

    /// The HTTP request could not be sent or was cancelled
    ///
    /// Covers network unreachability, connection refusal, timeouts and
    /// caller-driven cancellation, all of which surface as a failed cycle.
    #[error("tunnel configuration fetch for tunnel '{tunnel_id}' failed: {reason}")]
    Transport {
        /// The tunnel whose configuration was requested
        tunnel_id: String,
        /// Reason for the transport failure
        reason: String,
    },

    /// The configuration document could not be decoded
    #[error("failed to decode tunnel configuration for tunnel '{tunnel_id}': {reason}")]
    Decode {
        /// The tunnel whose configuration was requested
        tunnel_id: String,
        /// Explanation of the decoding failure
        reason: String,
    },
}

/// Errors that can occur when replacing the tunnel configuration.
///
/// The replace call is atomic at the document level: a write failure
/// leaves the remote configuration unchanged, never partially applied.
/// The merge decision is stale after a failure and must be recomputed by
/// the caller's next cycle.
#[derive(Error, Debug, Clone)]
pub enum WriteError {
    /// The configuration endpoint rejected the replacement document
    #[error("failed to replace tunnel configuration for tunnel '{tunnel_id}' (HTTP {status_code}): {reason}")]
    ApiError {
        /// The tunnel whose configuration was being replaced
        tunnel_id: String,
        /// HTTP status code returned by the API
        status_code: u16,
        /// Response body or error message
        reason: String,
    },

    /// The HTTP request could not be sent or was cancelled
    #[error("tunnel configuration replace for tunnel '{tunnel_id}' failed: {reason}")]
    Transport {
        /// The tunnel whose configuration was being replaced
        tunnel_id: String,
        /// Reason for the transport failure
        reason: String,
    },
}

/// Errors that can occur when delivering a change notification.
///
/// Notification failures are always non-fatal: the caller logs them and
/// proceeds. They must never cause a reconciliation to be retried or
/// rolled back.
#[derive(Error, Debug, Clone)]
pub enum NotifyError {
    /// The messaging endpoint returned an error response
    #[error("message delivery to channel '{channel}' failed: {reason}")]
    DeliveryFailed {
        /// The channel identifier the message was addressed to
        channel: String,
        /// Response body or error message
        reason: String,
    },

    /// The HTTP request to the messaging endpoint could not be sent
    #[error("message transport to channel '{channel}' failed: {reason}")]
    Transport {
        /// The channel identifier the message was addressed to
        channel: String,
        /// Reason for the transport failure
        reason: String,
    },
}

/// Composite error type for one reconciliation cycle.
///
/// This is the primary error type returned by the provider's listing and
/// apply operations. Notification errors are intentionally absent: they
/// travel on their own non-fatal path.
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    /// Failure fetching the current configuration (before any mutation)
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Failure replacing the configuration (remote left unchanged)
    #[error(transparent)]
    Write(#[from] WriteError),

    /// Generic error for operations that don't fit other categories
    #[error("tunnel provider operation failed: {0}")]
    Generic(String),
}

impl ProviderError {
    /// Returns true if this error is transient and the cycle is worth
    /// re-driving on the caller's next tick.
    ///
    /// All fetch/write failures are treated as transient except decode
    /// failures, which indicate a document the engine cannot represent.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Fetch(FetchError::Decode { .. }) => false,
            Self::Fetch(FetchError::ApiError { .. } | FetchError::Transport { .. })
            | Self::Write(_)
            | Self::Generic(_) => true,
        }
    }
}

// Conversion from anyhow::Error for assembly-point code in the binary
impl From<anyhow::Error> for ProviderError {
    fn from(err: anyhow::Error) -> Self {
        Self::Generic(err.to_string())
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
