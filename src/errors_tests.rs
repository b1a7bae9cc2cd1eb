// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `errors.rs`

use crate::errors::{ExtractError, FetchError, NotifyError, ProviderError, WriteError};

#[test]
fn test_extract_error_display_includes_service() {
    let err = ExtractError::NoMatch {
        service: "http_status:404".to_string(),
    };
    let msg = err.to_string();
    assert!(msg.contains("http_status:404"));
    assert!(msg.contains("no routable target"));
}

#[test]
fn test_fetch_error_display_includes_tunnel_and_status() {
    let err = FetchError::ApiError {
        tunnel_id: "tunnel-123".to_string(),
        status_code: 503,
        reason: "upstream unavailable".to_string(),
    };
    let msg = err.to_string();
    assert!(msg.contains("tunnel-123"));
    assert!(msg.contains("503"));
    assert!(msg.contains("upstream unavailable"));
}

#[test]
fn test_write_error_display_includes_tunnel() {
    let err = WriteError::Transport {
        tunnel_id: "tunnel-123".to_string(),
        reason: "connection reset".to_string(),
    };
    assert!(err.to_string().contains("tunnel-123"));
    assert!(err.to_string().contains("connection reset"));
}

#[test]
fn test_notify_error_display_includes_channel() {
    let err = NotifyError::DeliveryFailed {
        channel: "C012345".to_string(),
        reason: "channel_not_found".to_string(),
    };
    assert!(err.to_string().contains("C012345"));
    assert!(err.to_string().contains("channel_not_found"));
}

#[test]
fn test_provider_error_transparent_fetch() {
    let fetch = FetchError::Transport {
        tunnel_id: "t".to_string(),
        reason: "timed out".to_string(),
    };
    let provider: ProviderError = fetch.clone().into();
    // Transparent wrapping keeps the inner message intact
    assert_eq!(provider.to_string(), fetch.to_string());
}

#[test]
fn test_transient_classification() {
    let transport = ProviderError::Fetch(FetchError::Transport {
        tunnel_id: "t".to_string(),
        reason: "timed out".to_string(),
    });
    assert!(transport.is_transient());

    let write = ProviderError::Write(WriteError::ApiError {
        tunnel_id: "t".to_string(),
        status_code: 500,
        reason: "internal".to_string(),
    });
    assert!(write.is_transient());

    let decode = ProviderError::Fetch(FetchError::Decode {
        tunnel_id: "t".to_string(),
        reason: "unexpected field type".to_string(),
    });
    assert!(!decode.is_transient());
}

#[test]
fn test_provider_error_from_anyhow() {
    let err: ProviderError = anyhow::anyhow!("assembly failure").into();
    match err {
        ProviderError::Generic(msg) => assert!(msg.contains("assembly failure")),
        other => panic!("expected Generic, got {other:?}"),
    }
}
