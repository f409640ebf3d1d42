//! Blocking JSON-RPC wallet provider.
//!
//! This implementation of [`crate::wallet::WalletProvider`] talks to a
//! wallet-backed JSON-RPC endpoint — the same request interface an injected
//! browser provider exposes:
//!
//! ```json
//! POST /
//! {"jsonrpc":"2.0","id":1,"method":"eth_requestAccounts","params":[]}
//!
//! Response:
//! {"jsonrpc":"2.0","id":1,"result":["0xdead..."]}
//! ```
//!
//! The endpoint owns keys, signing, gas and nonces; this client only encodes
//! requests and translates error responses into [`ProviderError`] values.
//! Error codes follow the EIP-1193 convention (`4001` = user rejected), with
//! node-style revert / insufficient-funds messages recognised by substring.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use ethers_core::types::{Address, TransactionReceipt, TransactionRequest, H256};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ProviderError;

use super::WalletProvider;

/// EIP-1193: the user rejected the request in the wallet UI.
const CODE_USER_REJECTED: i64 = 4001;

/// Blocking HTTP wallet provider.
///
/// Thread-safe (`Send + Sync`) and shareable across workflows. Uses the
/// blocking `reqwest` client internally; async layers should wrap calls in
/// `spawn_blocking`.
pub struct HttpWalletProvider {
    endpoint: String,
    client: Client,
    next_id: AtomicU64,
}

impl HttpWalletProvider {
    /// Constructs a provider pointing at `endpoint`.
    ///
    /// `endpoint` should be the root of the wallet RPC service, e.g.
    /// `"http://127.0.0.1:8545"` (without a trailing slash).
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            endpoint: endpoint.into(),
            client,
            next_id: AtomicU64::new(1),
        })
    }

    fn endpoint_url(&self) -> String {
        // Avoid accidental trailing slashes.
        self.endpoint.trim_end_matches('/').to_string()
    }

    fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, ProviderError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let url = self.endpoint_url();
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .map_err(|e| ProviderError::Transport(format!("HTTP POST {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Transport(format!(
                "wallet RPC returned HTTP status {status}"
            )));
        }

        let body: RpcResponse = response
            .json()
            .map_err(|e| ProviderError::Protocol(format!("failed to parse JSON response: {e}")))?;

        if let Some(error) = body.error {
            return Err(classify_rpc_error(error.code, &error.message));
        }

        serde_json::from_value(body.result.unwrap_or(Value::Null))
            .map_err(|e| ProviderError::Protocol(format!("unexpected {method} result: {e}")))
    }
}

impl WalletProvider for HttpWalletProvider {
    fn is_installed(&self) -> bool {
        // A configured endpoint is the HTTP analogue of an injected
        // provider object being present; no network probe happens here.
        true
    }

    fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        self.call("eth_requestAccounts", json!([]))
    }

    fn send_transaction(&self, tx: &TransactionRequest) -> Result<H256, ProviderError> {
        self.call("eth_sendTransaction", json!([tx]))
    }

    fn transaction_receipt(
        &self,
        tx_hash: H256,
    ) -> Result<Option<TransactionReceipt>, ProviderError> {
        self.call("eth_getTransactionReceipt", json!([tx_hash]))
    }
}

/// Internal JSON-RPC request envelope.
#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

/// Internal JSON-RPC response envelope.
#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Maps a JSON-RPC error object onto the provider taxonomy.
fn classify_rpc_error(code: i64, message: &str) -> ProviderError {
    if code == CODE_USER_REJECTED {
        return ProviderError::UserRejected;
    }

    let lowered = message.to_ascii_lowercase();
    if lowered.contains("insufficient funds") {
        ProviderError::InsufficientFunds
    } else if lowered.contains("revert") {
        ProviderError::Revert(message.to_string())
    } else {
        ProviderError::Protocol(format!("RPC error {code}: {message}"))
    }
}
