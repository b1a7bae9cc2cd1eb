// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{debug, error, info, warn};
use tundra::{
    client::CloudflareClient,
    config::Settings,
    endpoint::Changes,
    notify::{CycleOutcome, SlackApiPoster, SlackNotifier},
    reconcile::{ApplyOutcome, TunnelDnsProvider},
};

/// Cloudflare Tunnel ingress DNS reconciler
#[derive(Parser)]
#[command(name = "tundra", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the endpoint records currently represented by the tunnel
    List,
    /// Apply a change batch read from a JSON file
    Apply {
        /// Path to the change batch document
        #[arg(long)]
        changes: std::path::PathBuf,
    },
}

fn main() -> Result<()> {
    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("tundra-reconciler")
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    // Initialize logging
    //
    // Respects RUST_LOG environment variable if set, otherwise defaults to INFO level
    // Example: RUST_LOG=debug tundra list
    //
    // Respects RUST_LOG_FORMAT environment variable for output format
    // Example: RUST_LOG_FORMAT=json tundra list
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    let cli = Cli::parse();

    info!("Starting tunnel DNS reconciler");

    let settings = Settings::from_env()?;
    debug!(
        tunnel_id = %settings.tunnel_id,
        api_base = %settings.api_base,
        "Configuration loaded"
    );

    let client = CloudflareClient::new(&settings.api_token, &settings.api_base);
    let provider = TunnelDnsProvider::new(
        client,
        &settings.account_id,
        &settings.tunnel_id,
        settings.domain_filter.clone(),
    );

    match cli.command {
        Command::List => {
            let records = provider.records().await?;
            for record in records {
                println!(
                    "{}\t{}\t{}",
                    record.dns_name,
                    record.record_type,
                    record.targets.join(",")
                );
            }
        }
        Command::Apply { changes } => {
            let raw = tokio::fs::read_to_string(&changes).await?;
            let batch: Changes = serde_json::from_str(&raw)?;

            let result = provider.apply_changes(&batch).await;

            // Notification is best-effort and never alters the outcome
            if let Some(slack) = &settings.slack {
                let notifier = SlackNotifier::new(
                    SlackApiPoster::new(&slack.token),
                    &slack.channel,
                    &slack.owner,
                );
                let outcome = match &result {
                    Ok(_) => CycleOutcome::Success,
                    Err(e) => CycleOutcome::Failure(e.to_string()),
                };
                if let Err(e) = notifier.notify(&outcome, &batch).await {
                    warn!(error = %e, "Change notification failed, proceeding");
                }
            }

            match result {
                Ok(ApplyOutcome::Applied) => info!("Change batch applied"),
                Ok(ApplyOutcome::NoOp) => info!("All records are already up to date"),
                Err(e) => {
                    error!(error = %e, transient = e.is_transient(), "Reconciliation cycle failed");
                    return Err(e.into());
                }
            }
        }
    }

    Ok(())
}
