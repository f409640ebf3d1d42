//! Shared application state.

use std::sync::{Arc, Mutex};

use artify::{DefaultMintWorkflow, HttpInferenceClient, MetricsRegistry, MintHistory};

/// Shared state held by the API handlers.
///
/// This is wrapped in an [`Arc`] and passed to request handlers via Axum's
/// `State` extractor. The workflow and history use `std` mutexes because
/// they are only ever locked inside `spawn_blocking` closures or for short
/// synchronous reads; the mint workflow itself is blocking.
pub struct AppState {
    /// Mint workflow over the HTTP wallet provider. The lock serializes
    /// concurrent mint requests: one attempt runs at a time and later
    /// requests wait their turn, bounded by the confirmation timeout.
    pub workflow: Mutex<DefaultMintWorkflow>,
    /// Blocking client for the upload/inference backend.
    pub inference: HttpInferenceClient,
    /// In-memory record of confirmed mints for this process.
    pub history: Mutex<MintHistory>,
    /// Base URL of the content-addressed-storage gateway for artwork links.
    pub gateway_base: String,
    /// Metrics registry shared between the workflow and the API.
    pub metrics: Arc<MetricsRegistry>,
}

/// Thread-safe alias for `AppState`.
pub type SharedState = Arc<AppState>;
