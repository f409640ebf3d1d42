//! Top-level configuration for the mint core.
//!
//! This module aggregates configuration for:
//!
//! - the inference backend client (base URL + timeout),
//! - the wallet RPC endpoint (URL + timeout),
//! - the deployed contract (address, ABI shape, confirmation bounds),
//! - the content-addressed-storage gateway for "view artwork" links,
//! - the mint acceptance policy,
//! - the metrics exporter.
//!
//! The goal is a single `ArtifyConfig` struct that binaries can construct
//! from defaults, environment variables or config files as needed. These are
//! configuration values, not behaviour: which ABI shape is deployed and
//! whether a prediction gate applies are decided here, never hard-wired in
//! the workflow.

use std::net::SocketAddr;
use std::time::Duration;

use ethers_core::types::Address;

use crate::contract::MintAbi;
use crate::types::Prediction;

/// Configuration for the upload/inference HTTP client.
#[derive(Clone, Debug)]
pub struct InferenceConfig {
    /// Base URL of the inference backend, e.g. `"http://127.0.0.1:8000"`.
    pub base_url: String,
    /// Request timeout for the upload round trip.
    pub timeout: Duration,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Configuration for the wallet RPC endpoint.
#[derive(Clone, Debug)]
pub struct WalletRpcConfig {
    /// URL of the wallet's JSON-RPC endpoint, e.g. `"http://127.0.0.1:8545"`.
    pub endpoint: String,
    /// Per-request timeout. Confirmation waits are bounded separately by
    /// [`ContractConfig::confirmation_timeout`].
    pub timeout: Duration,
}

impl Default for WalletRpcConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8545".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Configuration for the deployed NFT contract.
#[derive(Clone, Debug)]
pub struct ContractConfig {
    /// Address of the deployed contract.
    pub address: Address,
    /// Which mint entry point the deployed contract exposes.
    pub abi: MintAbi,
    /// Upper bound on the confirmation wait before the attempt fails with
    /// a timeout instead of hanging forever.
    pub confirmation_timeout: Duration,
    /// Interval between receipt polls during the confirmation wait.
    pub poll_interval: Duration,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            address: Address::zero(),
            abi: MintAbi::MintWithReport,
            confirmation_timeout: Duration::from_secs(120),
            poll_interval: Duration::from_secs(2),
        }
    }
}

/// Configuration for "view artwork" link-outs.
#[derive(Clone, Debug)]
pub struct StorageGatewayConfig {
    /// Base URL of the content-addressed-storage gateway.
    pub base_url: String,
}

impl Default for StorageGatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "https://ipfs.io/ipfs".to_string(),
        }
    }
}

/// Acceptance policy applied by the mint workflow's entry guard.
///
/// One observed UI variant only allows minting artworks the model judged
/// authentic. That is a business rule, not a contract rule, so it is carried
/// as configuration: `None` disables the gate entirely.
#[derive(Clone, Debug, Default)]
pub struct MintPolicy {
    /// When set, only uploads whose prediction equals this value may mint.
    pub required_prediction: Option<Prediction>,
}

/// Configuration for the Prometheus metrics exporter.
#[derive(Clone, Debug)]
pub struct MetricsConfig {
    /// Whether to run a `/metrics` HTTP exporter.
    pub enabled: bool,
    /// Address to bind the metrics HTTP server to.
    pub listen_addr: SocketAddr,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        // Safe to unwrap: this is a fixed, valid address literal.
        let addr: SocketAddr = "127.0.0.1:9890"
            .parse()
            .expect("hard-coded metrics listen address should parse");
        Self {
            enabled: true,
            listen_addr: addr,
        }
    }
}

/// Top-level configuration for the mint core.
#[derive(Clone, Debug, Default)]
pub struct ArtifyConfig {
    pub inference: InferenceConfig,
    pub wallet_rpc: WalletRpcConfig,
    pub contract: ContractConfig,
    pub storage_gateway: StorageGatewayConfig,
    pub policy: MintPolicy,
    pub metrics: MetricsConfig,
}

impl ArtifyConfig {
    /// Overlays settings from the environment onto `self`.
    ///
    /// Recognised variables: `ARTIFY_INFERENCE_URL`, `ARTIFY_WALLET_RPC`,
    /// `ARTIFY_CONTRACT_ADDRESS`, `ARTIFY_IPFS_GATEWAY`. Unset variables
    /// leave the current value untouched; a malformed contract address is
    /// reported rather than silently ignored.
    pub fn overlay_env(mut self) -> Result<Self, String> {
        if let Ok(url) = std::env::var("ARTIFY_INFERENCE_URL") {
            self.inference.base_url = url;
        }
        if let Ok(url) = std::env::var("ARTIFY_WALLET_RPC") {
            self.wallet_rpc.endpoint = url;
        }
        if let Ok(addr) = std::env::var("ARTIFY_CONTRACT_ADDRESS") {
            self.contract.address = addr
                .parse()
                .map_err(|e| format!("invalid ARTIFY_CONTRACT_ADDRESS {addr:?}: {e}"))?;
        }
        if let Ok(url) = std::env::var("ARTIFY_IPFS_GATEWAY") {
            self.storage_gateway.base_url = url;
        }
        Ok(self)
    }
}
