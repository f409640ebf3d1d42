//! The mint workflow: entry guards, progress tracking and the attempt
//! state machine.
//!
//! [`MintWorkflow`] drives one mint attempt end to end: connect the wallet,
//! build and submit the mint transaction, wait for confirmation, and report
//! the outcome. [`ProgressTracker`] owns the attempt's [`MintProgress`]
//! state and enforces the single-attempt invariant; observers receive every
//! transition in order.

pub mod engine;
pub mod progress;

pub use engine::MintWorkflow;
pub use progress::{NullObserver, ProgressObserver, ProgressTracker};
