// api-gateway/src/main.rs

//! API gateway binary.
//!
//! This binary exposes a small HTTP API on top of the `artify` crate:
//!
//! - `GET /health`
//! - `POST /artworks/analyze`
//! - `POST /artworks/mint`
//! - `GET /artworks/mints`
//!
//! It embeds a `DefaultMintWorkflow` (HTTP wallet provider), the blocking
//! inference client, an in-memory mint history, and a Prometheus metrics
//! exporter on `/metrics`.

mod config;
mod routes;
mod state;

use std::sync::{Arc, Mutex};

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tokio::signal;

use artify::{
    run_prometheus_http_server, ArtifyConfig, DefaultMintWorkflow, HttpInferenceClient,
    HttpWalletProvider, MetricsRegistry, MintHistory, WalletConnector,
};
use config::ApiConfig;
use routes::{artworks, health};
use state::{AppState, SharedState};

/// Upper bound on uploaded artwork size.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[tokio::main]
async fn main() {
    // Basic tracing setup.
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "api_gateway=info,artify=info".to_string()),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let api_cfg = ApiConfig::default();
    let artify_cfg = ArtifyConfig::default().overlay_env()?;

    // ---------------------------
    // Metrics
    // ---------------------------

    let metrics = Arc::new(
        MetricsRegistry::new()
            .map_err(|e| format!("failed to initialise metrics registry: {e}"))?,
    );

    // Metrics exporter.
    if artify_cfg.metrics.enabled {
        let metrics_clone = metrics.clone();
        let addr = artify_cfg.metrics.listen_addr;
        tokio::spawn(async move {
            if let Err(e) = run_prometheus_http_server(metrics_clone, addr).await {
                eprintln!("metrics HTTP server error: {e}");
            }
        });
        tracing::info!("metrics exporter listening on http://{}/metrics", addr);
    }

    // ---------------------------
    // Inference client + mint workflow
    // ---------------------------

    let inference = HttpInferenceClient::new(
        artify_cfg.inference.base_url.clone(),
        artify_cfg.inference.timeout,
    )
    .map_err(|e| format!("failed to create inference client: {e}"))?;

    let provider = HttpWalletProvider::new(
        artify_cfg.wallet_rpc.endpoint.clone(),
        artify_cfg.wallet_rpc.timeout,
    )
    .map_err(|e| format!("failed to create wallet provider: {e}"))?;

    let workflow = DefaultMintWorkflow::new(
        WalletConnector::new(provider),
        artify_cfg.contract.clone(),
        artify_cfg.policy.clone(),
    );

    // ---------------------------
    // Shared state
    // ---------------------------

    let app_state: SharedState = Arc::new(AppState {
        workflow: Mutex::new(workflow),
        inference,
        history: Mutex::new(MintHistory::new()),
        gateway_base: artify_cfg.storage_gateway.base_url.clone(),
        metrics: metrics.clone(),
    });

    // ---------------------------
    // HTTP router
    // ---------------------------

    let app = Router::new()
        .route("/health", get(health::health))
        .route("/artworks/analyze", post(artworks::analyze))
        .route("/artworks/mint", post(artworks::mint))
        .route("/artworks/mints", get(artworks::list_mints))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(app_state);

    // ---------------------------
    // axum 0.8 server (hyper 1 / tokio 1.48 style)
    // ---------------------------

    tracing::info!("API gateway listening on http://{}", api_cfg.listen_addr);

    let listener = tokio::net::TcpListener::bind(api_cfg.listen_addr)
        .await
        .map_err(|e| format!("failed to bind {}: {e}", api_cfg.listen_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("API server error: {e}"))?;

    Ok(())
}

/// Waits for Ctrl-C and returns, used for graceful shutdown.
async fn shutdown_signal() {
    // Wait for Ctrl+C
    let _ = signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
