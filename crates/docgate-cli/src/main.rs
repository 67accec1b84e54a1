// docgate-cli/src/main.rs
// ============================================================================
// Module: Docgate CLI Entry Point
// Description: Binary entry wiring configuration into the RPC gateway.
// Purpose: Load config, construct the adapter stack, and serve connections.
// Dependencies: clap, docgate-config, docgate-rpc, docgate-store, tokio
// ============================================================================

//! ## Overview
//! The binary loads configuration, builds the store client, the injected
//! choice cache, and the document adapter, then serves the WebSocket gateway
//! until it fails. All construction is explicit here so tests elsewhere can
//! assemble the same stack with stubbed pieces.

#![allow(
    clippy::print_stderr,
    reason = "The binary reports fatal startup errors on stderr."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use docgate_config::ConfigError;
use docgate_config::DocGateConfig;
use docgate_rpc::GatewayError;
use docgate_rpc::RpcGateway;
use docgate_store::ChoiceCache;
use docgate_store::ChoiceResolver;
use docgate_store::DocumentAdapter;
use docgate_store::StoreClient;
use docgate_store::StoreClientConfig;
use docgate_store::StoreError;
use thiserror::Error;

// ============================================================================
// SECTION: Arguments
// ============================================================================

/// Docgate: a WebSocket JSON-RPC gateway over a tabular document store.
#[derive(Debug, Parser)]
#[command(name = "docgate", version)]
struct Cli {
    /// Path to the configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Fatal startup or serve errors.
#[derive(Debug, Error)]
enum MainError {
    /// Configuration loading or validation failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The store client could not be constructed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The gateway could not be constructed or failed while serving.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Process entry point.
#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("docgate: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Loads configuration, assembles the stack, and serves.
async fn run() -> Result<(), MainError> {
    let cli = Cli::parse();
    let config = DocGateConfig::load(cli.config.as_deref())?;

    let client = StoreClient::new(StoreClientConfig {
        api_key: config.store.api_key.clone(),
        base_id: config.store.base_id.clone(),
        base_url: config.store.base_url.clone(),
        timeout_ms: config.store.timeout_ms,
        user_agent: format!("docgate/{}", env!("CARGO_PKG_VERSION")),
    })?;
    // The choice cache is constructed once here and injected; it is the only
    // state that outlives a single request.
    let cache = Arc::new(ChoiceCache::new());
    let adapter = DocumentAdapter::new(
        client,
        config.store.table.clone(),
        config.store.page_size,
        ChoiceResolver::new(cache),
    );

    let gateway = RpcGateway::from_config(&config, adapter)?;
    gateway.serve().await?;
    Ok(())
}
