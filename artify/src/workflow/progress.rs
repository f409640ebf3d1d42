//! Progress tracking for a single mint attempt.
//!
//! [`ProgressTracker`] is the sole owner and mutator of [`MintProgress`].
//! It enforces two invariants:
//!
//! - at most one attempt is in flight: `begin` fails while the tracker is
//!   away from `Idle`,
//! - transitions only move forward, or jump to `Failed` from any
//!   non-terminal state; terminal states return to `Idle` via `finish`.

use crate::error::MintError;
use crate::types::MintProgress;

/// Receives every progress transition of a mint attempt, in order.
///
/// Implementations should be cheap; the workflow calls them synchronously
/// between steps.
pub trait ProgressObserver {
    fn on_progress(&mut self, progress: &MintProgress);
}

/// Observer that discards all transitions.
pub struct NullObserver;

impl ProgressObserver for NullObserver {
    fn on_progress(&mut self, _progress: &MintProgress) {}
}

/// Owns the progress state of the current mint attempt.
pub struct ProgressTracker {
    current: MintProgress,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            current: MintProgress::Idle,
        }
    }

    /// Returns the current progress state.
    pub fn current(&self) -> &MintProgress {
        &self.current
    }

    /// Claims the tracker for a new attempt.
    ///
    /// Fails with [`MintError::AttemptInProgress`] unless the tracker is
    /// `Idle`, which is what makes double-triggering (e.g. a double click)
    /// harmless.
    pub fn begin(&mut self) -> Result<(), MintError> {
        if !self.current.is_idle() {
            return Err(MintError::AttemptInProgress);
        }
        self.current = MintProgress::WalletConnecting;
        Ok(())
    }

    /// Advances to `state`, notifying `observer`.
    ///
    /// Callers only move forward through the sequence or into `Failed`; the
    /// tracker records the state as given.
    pub fn advance(&mut self, state: MintProgress, observer: &mut dyn ProgressObserver) {
        self.current = state;
        observer.on_progress(&self.current);
    }

    /// Ends the attempt in a terminal state and resets to `Idle`.
    ///
    /// The observer sees the terminal state; the reset back to `Idle` is
    /// internal, so a subsequent `begin` succeeds immediately.
    pub fn finish(&mut self, terminal: MintProgress, observer: &mut dyn ProgressObserver) {
        observer.on_progress(&terminal);
        self.current = MintProgress::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Observer that records the sequence of states it saw.
    pub(crate) struct RecordingObserver {
        pub seen: Vec<MintProgress>,
    }

    impl RecordingObserver {
        pub(crate) fn new() -> Self {
            Self { seen: Vec::new() }
        }
    }

    impl ProgressObserver for RecordingObserver {
        fn on_progress(&mut self, progress: &MintProgress) {
            self.seen.push(progress.clone());
        }
    }

    #[test]
    fn begin_claims_the_tracker_exactly_once() {
        let mut tracker = ProgressTracker::new();

        tracker.begin().expect("first begin should succeed");
        let err = tracker.begin().unwrap_err();
        assert!(matches!(err, MintError::AttemptInProgress));
    }

    #[test]
    fn finish_resets_to_idle_so_a_new_attempt_can_start() {
        let mut tracker = ProgressTracker::new();
        let mut observer = RecordingObserver::new();

        tracker.begin().expect("begin should succeed");
        tracker.finish(MintProgress::Success, &mut observer);

        assert!(tracker.current().is_idle());
        tracker.begin().expect("tracker should be reusable after finish");
    }

    #[test]
    fn observer_sees_transitions_in_order() {
        let mut tracker = ProgressTracker::new();
        let mut observer = RecordingObserver::new();

        tracker.begin().expect("begin should succeed");
        tracker.advance(MintProgress::TxPreparing, &mut observer);
        tracker.advance(MintProgress::TxSigningOrSubmitting, &mut observer);
        tracker.finish(
            MintProgress::Failed("user rejected".to_string()),
            &mut observer,
        );

        assert_eq!(
            observer.seen,
            vec![
                MintProgress::TxPreparing,
                MintProgress::TxSigningOrSubmitting,
                MintProgress::Failed("user rejected".to_string()),
            ]
        );
    }
}
