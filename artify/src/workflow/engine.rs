//! The mint attempt state machine.
//!
//! One [`MintWorkflow`] drives one mint attempt at a time:
//!
//! 1. entry guards (cid present, policy satisfied, wallet installed) run
//!    before any state changes, so a rejected trigger leaves no trace,
//! 2. wallet connect (idempotent, via the connector),
//! 3. mint request construction from the upload result,
//! 4. transaction submission through the wallet,
//! 5. bounded receipt polling until confirmation or timeout.
//!
//! Failures at any step terminate the attempt in `Failed` with a
//! human-readable reason, then the tracker resets to `Idle` so the user can
//! simply re-trigger. Nothing is retried automatically and no partial state
//! survives a failed attempt.

use std::thread;
use std::time::Instant;

use ethers_core::types::{TransactionReceipt, H256, U64};

use crate::config::{ContractConfig, MintPolicy};
use crate::contract::{self, MintRequest};
use crate::error::MintError;
use crate::types::{MintOutcome, MintProgress, UploadResult};
use crate::wallet::{WalletConnector, WalletProvider};

use super::progress::{NullObserver, ProgressObserver, ProgressTracker};

/// Drives mint attempts against a wallet provider.
pub struct MintWorkflow<P> {
    connector: WalletConnector<P>,
    contract: ContractConfig,
    policy: MintPolicy,
    tracker: ProgressTracker,
}

impl<P> MintWorkflow<P> {
    pub fn new(connector: WalletConnector<P>, contract: ContractConfig, policy: MintPolicy) -> Self {
        Self {
            connector,
            contract,
            policy,
            tracker: ProgressTracker::new(),
        }
    }

    /// Returns the current attempt progress.
    pub fn progress(&self) -> &MintProgress {
        self.tracker.current()
    }

    /// Returns the wallet connector, e.g. to subscribe to session changes.
    pub fn connector_mut(&mut self) -> &mut WalletConnector<P> {
        &mut self.connector
    }
}

impl<P: WalletProvider> MintWorkflow<P> {
    /// Runs one mint attempt without progress reporting.
    pub fn mint(&mut self, upload: &UploadResult) -> Result<MintOutcome, MintError> {
        self.mint_with_observer(upload, &mut NullObserver)
    }

    /// Runs one mint attempt, reporting every transition to `observer`.
    ///
    /// The entry guards run before the tracker is claimed: an invalid input
    /// or a missing wallet fails the call without a state change and without
    /// touching the provider.
    pub fn mint_with_observer(
        &mut self,
        upload: &UploadResult,
        observer: &mut dyn ProgressObserver,
    ) -> Result<MintOutcome, MintError> {
        if upload.cid.is_empty() {
            return Err(MintError::Validation("cid"));
        }
        if let Some(required) = &self.policy.required_prediction {
            if upload.prediction.as_ref() != Some(required) {
                return Err(MintError::Validation("prediction"));
            }
        }
        if !self.connector.is_installed() {
            return Err(MintError::WalletUnavailable);
        }

        self.tracker.begin()?;
        observer.on_progress(self.tracker.current());

        match self.run_attempt(upload, observer) {
            Ok(outcome) => {
                tracing::info!(
                    tx_hash = %outcome.transaction_hash,
                    token_id = ?outcome.token_id,
                    "mint confirmed"
                );
                self.tracker.finish(MintProgress::Success, observer);
                Ok(outcome)
            }
            Err(e) => {
                tracing::warn!(error = %e, "mint attempt failed");
                self.tracker
                    .finish(MintProgress::Failed(e.to_string()), observer);
                Err(e)
            }
        }
    }

    fn run_attempt(
        &mut self,
        upload: &UploadResult,
        observer: &mut dyn ProgressObserver,
    ) -> Result<MintOutcome, MintError> {
        let session = self.connector.connect()?;

        self.tracker.advance(MintProgress::TxPreparing, observer);
        let request = MintRequest::from_upload(upload, session.address)?;
        let tx = request.to_transaction(self.contract.address, self.contract.abi);

        self.tracker
            .advance(MintProgress::TxSigningOrSubmitting, observer);
        let tx_hash = self.connector.provider().send_transaction(&tx)?;
        tracing::debug!(%tx_hash, "mint transaction submitted");

        self.tracker.advance(MintProgress::TxConfirming, observer);
        let receipt = self.wait_for_receipt(tx_hash)?;

        if receipt.status == Some(U64::zero()) {
            return Err(MintError::ContractRevert(
                "transaction reverted on-chain".to_string(),
            ));
        }

        let token_id = contract::parse_token_id(&receipt);
        Ok(MintOutcome {
            transaction_hash: tx_hash,
            token_id,
        })
    }

    /// Polls for the receipt until it appears or the deadline passes.
    fn wait_for_receipt(&self, tx_hash: H256) -> Result<TransactionReceipt, MintError> {
        let deadline = Instant::now() + self.contract.confirmation_timeout;

        loop {
            if let Some(receipt) = self.connector.provider().transaction_receipt(tx_hash)? {
                return Ok(receipt);
            }
            if Instant::now() >= deadline {
                return Err(MintError::Timeout);
            }
            thread::sleep(self.contract.poll_interval);
        }
    }
}
