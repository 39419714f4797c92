// api-gateway/src/main.rs

//! API gateway binary.
//!
//! This binary exposes a small HTTP API on top of the `notary` crate:
//!
//! - `GET /health`
//! - `GET /docs`, `GET /docs/openapi.yaml`
//! - `POST /certificates`
//! - `GET /certificates/verify?hash=<hex>`
//! - `POST /certificates/verify`
//!
//! It embeds a certificate store (RocksDB-backed by default), the stub
//! attestation ledger, and a Prometheus metrics exporter on `/metrics`.

mod config;
mod dto;
mod error;
mod middleware;
mod routes;
mod state;

use std::sync::Arc;

use tokio::signal;
use tokio::sync::watch;

use config::ApiConfig;
use notary::{MetricsRegistry, NotaryConfig, StorageConfig, open_store, run_prometheus_http_server};
use state::{AppState, SharedState};

#[tokio::main]
async fn main() {
    // Basic tracing setup.
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "api_gateway=info,notary=info".to_string()),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let api_cfg = ApiConfig::from_env().map_err(|e| format!("invalid gateway config: {e}"))?;
    let notary_cfg = NotaryConfig::from_env().map_err(|e| format!("invalid notary config: {e}"))?;

    // ---------------------------
    // Metrics
    // ---------------------------

    let metrics = Arc::new(
        MetricsRegistry::new()
            .map_err(|e| format!("failed to initialise metrics registry: {e}"))?,
    );

    // One Ctrl-C stops both the metrics exporter and the API server.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    if notary_cfg.metrics.enabled {
        let metrics_clone = metrics.clone();
        let addr = notary_cfg.metrics.listen_addr;
        let stop = stopped(shutdown_rx.clone());
        tokio::spawn(async move {
            if let Err(e) = run_prometheus_http_server(metrics_clone, addr, stop).await {
                tracing::error!("metrics HTTP server error: {e}");
            }
        });
    }

    // ---------------------------
    // Storage + workflows
    // ---------------------------

    let store = open_store(&notary_cfg.storage).map_err(|e| match &notary_cfg.storage {
        StorageConfig::RocksDb(rocks) => {
            format!("failed to open RocksDB store at {}: {e}", rocks.path)
        }
        StorageConfig::Memory => format!("failed to open in-memory store: {e}"),
    })?;

    let app_state: SharedState = Arc::new(AppState::new(store, metrics, &api_cfg));

    // ---------------------------
    // HTTP server
    // ---------------------------

    let app = routes::router(app_state);

    tracing::info!(
        max_upload_bytes = api_cfg.max_upload_bytes,
        "API gateway listening on http://{}",
        api_cfg.listen_addr
    );

    let listener = tokio::net::TcpListener::bind(api_cfg.listen_addr)
        .await
        .map_err(|e| format!("failed to bind {}: {e}", api_cfg.listen_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(stopped(shutdown_rx))
        .await
        .map_err(|e| format!("API server error: {e}"))?;

    Ok(())
}

/// Resolves once shutdown has been requested.
async fn stopped(mut rx: watch::Receiver<bool>) {
    let _ = rx.wait_for(|stop| *stop).await;
}

/// Waits for Ctrl-C and returns, used for graceful shutdown.
async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
