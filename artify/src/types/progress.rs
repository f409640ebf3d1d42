//! Mint attempt progress states and the terminal outcome.
//!
//! [`MintProgress`] is the discrete, ordered state of a single mint attempt.
//! It is owned exclusively by the workflow's progress tracker and mutated
//! only through its transitions; UI layers observe it read-only.

use ethers_core::types::{H256, U256};
use serde::Serialize;

/// Discrete progress of one mint attempt.
///
/// The non-terminal states form a strict sequence
/// `Idle → WalletConnecting → TxPreparing → TxSigningOrSubmitting →
/// TxConfirming → Success`; `Failed` is reachable from any non-terminal
/// state. Both `Success` and `Failed` are terminal for the attempt, after
/// which the tracker resets to `Idle`.
#[derive(Clone, Debug, PartialEq)]
pub enum MintProgress {
    /// No mint attempt is in flight.
    Idle,
    /// Waiting for the wallet to authorise an account.
    WalletConnecting,
    /// Building the mint request from the upload result.
    TxPreparing,
    /// Waiting for the wallet to sign and submit the transaction.
    TxSigningOrSubmitting,
    /// Waiting for the network to confirm the submitted transaction.
    TxConfirming,
    /// The mint confirmed successfully.
    Success,
    /// The attempt failed; carries a human-readable reason.
    Failed(String),
}

impl MintProgress {
    /// Ordinal of this state in the forward sequence, `Idle` being 0.
    ///
    /// `Failed` has no position in the forward sequence and reports the
    /// same ordinal as `Idle`.
    pub fn step_index(&self) -> u8 {
        match self {
            MintProgress::Idle | MintProgress::Failed(_) => 0,
            MintProgress::WalletConnecting => 1,
            MintProgress::TxPreparing => 2,
            MintProgress::TxSigningOrSubmitting => 3,
            MintProgress::TxConfirming => 4,
            MintProgress::Success => 5,
        }
    }

    /// User-facing label for this state, suitable for a progress bar.
    pub fn label(&self) -> &str {
        match self {
            MintProgress::Idle => "Ready to mint",
            MintProgress::WalletConnecting => "Connecting wallet",
            MintProgress::TxPreparing => "Preparing transaction",
            MintProgress::TxSigningOrSubmitting => "Signing request",
            MintProgress::TxConfirming => "Processing transaction",
            MintProgress::Success => "Success! NFT created",
            MintProgress::Failed(_) => "Mint failed",
        }
    }

    /// Returns `true` for `Success` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, MintProgress::Success | MintProgress::Failed(_))
    }

    /// Returns `true` only for `Idle`.
    pub fn is_idle(&self) -> bool {
        matches!(self, MintProgress::Idle)
    }
}

/// Result of a successfully confirmed mint.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MintOutcome {
    /// Hash of the confirmed mint transaction.
    pub transaction_hash: H256,
    /// Token id extracted from the receipt's `Transfer` event, when present.
    ///
    /// Extraction is best-effort: a receipt without a recognisable event
    /// yields `None`, never a failed mint.
    pub token_id: Option<U256>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_states_are_strictly_ordered() {
        let states = [
            MintProgress::Idle,
            MintProgress::WalletConnecting,
            MintProgress::TxPreparing,
            MintProgress::TxSigningOrSubmitting,
            MintProgress::TxConfirming,
            MintProgress::Success,
        ];

        for (i, state) in states.iter().enumerate() {
            assert_eq!(state.step_index() as usize, i);
        }
    }

    #[test]
    fn terminal_states_are_success_and_failed() {
        assert!(MintProgress::Success.is_terminal());
        assert!(MintProgress::Failed("user rejected".to_string()).is_terminal());
        assert!(!MintProgress::TxConfirming.is_terminal());
        assert!(!MintProgress::Idle.is_terminal());
    }

    #[test]
    fn labels_match_the_ui_step_text() {
        assert_eq!(MintProgress::Idle.label(), "Ready to mint");
        assert_eq!(MintProgress::Success.label(), "Success! NFT created");
        assert_eq!(
            MintProgress::Failed("boom".to_string()).label(),
            "Mint failed"
        );
    }
}
