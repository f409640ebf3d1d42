//! Error taxonomy for the mint core.
//!
//! Every failure from a collaborator (inference backend, wallet provider,
//! chain) is caught at the boundary of the upload client or the mint
//! workflow and converted into one of these kinds with a human-readable
//! message. Nothing is retried automatically; the user re-triggers the
//! action.

use std::fmt;

/// Errors from the upload/inference client.
#[derive(Debug)]
pub enum UploadError {
    /// Transport-level failure (connection refused, timeout, ...).
    Network(String),
    /// The backend answered with a non-2xx status.
    Server(u16),
    /// The response body is missing required fields or is not valid JSON.
    Malformed(String),
}

/// Errors reported by a wallet provider.
///
/// These mirror the failure modes of the injected-provider request
/// interface: the user can reject a prompt, the node can refuse a
/// transaction, or the transport to the provider can fail outright.
#[derive(Debug)]
pub enum ProviderError {
    /// No wallet provider is present in the environment.
    Unavailable,
    /// The user cancelled the permission or signing prompt.
    UserRejected,
    /// The account cannot cover the transaction cost.
    InsufficientFunds,
    /// The contract (or its node-side simulation) reverted.
    Revert(String),
    /// Transport-level error talking to the provider.
    Transport(String),
    /// The provider returned a malformed or unexpected response.
    Protocol(String),
}

/// High-level errors surfaced by the mint workflow.
#[derive(Debug)]
pub enum MintError {
    /// The entry guard rejected the input; carries the offending field.
    Validation(&'static str),
    /// Another mint attempt is already in flight.
    AttemptInProgress,
    /// No wallet provider is installed.
    WalletUnavailable,
    /// The user cancelled in the wallet UI.
    UserRejected,
    /// The account cannot cover the transaction cost.
    InsufficientFunds,
    /// The contract reverted; carries the revert reason when known.
    ContractRevert(String),
    /// Transport-level failure talking to the wallet or the network.
    Network(String),
    /// The confirmation wait exceeded the configured timeout.
    Timeout,
}

impl From<ProviderError> for MintError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::Unavailable => MintError::WalletUnavailable,
            ProviderError::UserRejected => MintError::UserRejected,
            ProviderError::InsufficientFunds => MintError::InsufficientFunds,
            ProviderError::Revert(reason) => MintError::ContractRevert(reason),
            ProviderError::Transport(msg) | ProviderError::Protocol(msg) => {
                MintError::Network(msg)
            }
        }
    }
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::Network(msg) => write!(f, "upload failed: {msg}"),
            UploadError::Server(status) => {
                write!(f, "inference backend returned HTTP status {status}")
            }
            UploadError::Malformed(msg) => write!(f, "malformed inference response: {msg}"),
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Unavailable => write!(f, "no wallet provider is installed"),
            ProviderError::UserRejected => write!(f, "the request was rejected in the wallet"),
            ProviderError::InsufficientFunds => {
                write!(f, "insufficient funds for this transaction")
            }
            ProviderError::Revert(reason) => write!(f, "contract reverted: {reason}"),
            ProviderError::Transport(msg) => write!(f, "wallet transport error: {msg}"),
            ProviderError::Protocol(msg) => write!(f, "unexpected wallet response: {msg}"),
        }
    }
}

impl fmt::Display for MintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MintError::Validation(field) => write!(f, "invalid mint input: {field}"),
            MintError::AttemptInProgress => {
                write!(f, "a mint attempt is already in progress")
            }
            MintError::WalletUnavailable => write!(f, "no wallet provider is installed"),
            MintError::UserRejected => write!(f, "the request was rejected in the wallet"),
            MintError::InsufficientFunds => {
                write!(f, "insufficient funds for this transaction")
            }
            MintError::ContractRevert(reason) => write!(f, "contract reverted: {reason}"),
            MintError::Network(msg) => write!(f, "network error: {msg}"),
            MintError::Timeout => write!(f, "timed out waiting for confirmation"),
        }
    }
}

impl std::error::Error for UploadError {}
impl std::error::Error for ProviderError {}
impl std::error::Error for MintError {}
