//! Artify mint core library.
//!
//! This crate provides the building blocks for turning an analysed artwork
//! into a minted NFT:
//!
//! - strongly-typed domain types (`types`),
//! - the mint workflow state machine (`workflow`),
//! - wallet provider abstraction and session management (`wallet`),
//! - the upload/inference backend client (`inference`),
//! - mint-call encoding and receipt inspection (`contract`),
//! - report presentation helpers (`report`),
//! - an in-memory mint history (`history`),
//! - Prometheus-based metrics (`metrics`),
//! - and a top-level configuration (`config`).
//!
//! Higher-level binaries compose these pieces into CLIs and HTTP gateways.

pub mod config;
pub mod contract;
pub mod error;
pub mod history;
pub mod inference;
pub mod metrics;
pub mod report;
pub mod types;
pub mod wallet;
pub mod workflow;

// Re-export top-level configuration types.
pub use config::{
    ArtifyConfig, ContractConfig, InferenceConfig, MetricsConfig, MintPolicy,
    StorageGatewayConfig, WalletRpcConfig,
};

// Re-export the error taxonomy.
pub use error::{MintError, ProviderError, UploadError};

// Re-export "core" workflow types and traits.
pub use workflow::{MintWorkflow, NullObserver, ProgressObserver, ProgressTracker};

// Re-export wallet interfaces and the HTTP provider.
pub use wallet::{AccountsSubscription, HttpWalletProvider, WalletConnector, WalletProvider};

// Re-export the inference interface and the HTTP client.
pub use inference::{HttpInferenceClient, InferenceApi};

// Re-export contract helpers.
pub use contract::{MintAbi, MintRequest};

// Re-export history and report helpers.
pub use history::{MintHistory, MintRecord};
pub use report::ConfidenceLevel;

// Re-export metrics registry and workflow metrics.
pub use metrics::{run_prometheus_http_server, MetricsRegistry, WorkflowMetrics};

// Re-export domain types at the crate root for convenience.
pub use types::*;

/// Type alias for the workflow stack used by a "typical" deployment:
/// the HTTP wallet provider behind the connector.
pub type DefaultMintWorkflow = MintWorkflow<HttpWalletProvider>;
