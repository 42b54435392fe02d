//! Error types for the Checkpoints subsystem
//!
//! Soft outcomes (a block that is not in the main chain, a chain that has
//! not reached its first checkpoint) are never errors here; they surface as
//! `false` or `None`. Everything in [`CheckpointError`] aborts the current
//! operation.

use crate::ports::outbound::StoreError;
use std::fmt;
use thiserror::Error;

/// Checkpoints subsystem errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckpointError {
    /// The store failed to produce data that earlier logic proved must exist,
    /// or failed for a reason other than a plain miss.
    #[error("Store inconsistency: {reason}")]
    StoreInconsistency { reason: String },

    /// Caller passed a block whose claimed height disagrees with the
    /// main-chain index.
    #[error("Passed block height of {claimed} does not match the main chain height of {indexed}")]
    HeightMismatch { claimed: u64, indexed: u64 },

    /// An alternate history would branch below the locked-in checkpoint.
    #[error("Fork at height {fork_height} is below the checkpoint at height {checkpoint_height}")]
    ForkBelowCheckpoint {
        fork_height: u64,
        checkpoint_height: u64,
    },

    /// Configured checkpoint list violates ordering.
    #[error("Invalid checkpoint set: {reason}")]
    InvalidCheckpointSet { reason: String },

    /// Configured checkpoint hash could not be decoded.
    #[error("Invalid checkpoint hash {value:?}: {reason}")]
    InvalidHash { value: String, reason: String },

    /// Configuration could not be loaded.
    #[error("Configuration error: {reason}")]
    Config { reason: String },
}

impl CheckpointError {
    /// Store inconsistency for a block or header that must exist.
    pub fn missing(what: impl fmt::Display, cause: &StoreError) -> Self {
        CheckpointError::StoreInconsistency {
            reason: format!("{} must exist: {}", what, cause),
        }
    }

    /// Data corruption or a broken protocol invariant; fatal to the
    /// current acceptance attempt.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CheckpointError::StoreInconsistency { .. })
    }

    /// Contract violation by the caller.
    pub fn is_caller_bug(&self) -> bool {
        matches!(self, CheckpointError::HeightMismatch { .. })
    }
}

impl From<StoreError> for CheckpointError {
    fn from(err: StoreError) -> Self {
        CheckpointError::StoreInconsistency {
            reason: err.to_string(),
        }
    }
}

/// Result type for checkpoint operations
pub type CheckpointResult<T> = Result<T, CheckpointError>;
