//! Store error types

use thiserror::Error;

/// Errors reported by the stores
///
/// A missing key is not an error: lookups return `Ok(None)`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A request was sent after the worker was stopped
    #[error("{store} is stopped")]
    Stopped { store: &'static str },

    /// `stop()` was called on a store that is already stopped
    #[error("{store} was already stopped")]
    AlreadyStopped { store: &'static str },

    /// The worker dropped a request without answering it
    #[error("{store} worker went away before replying")]
    WorkerGone { store: &'static str },

    /// The worker task panicked
    #[error("{store} worker panicked: {reason}")]
    WorkerPanicked { store: &'static str, reason: String },
}
