//! Domain module for the Checkpoints subsystem
//!
//! ## Core Modules
//! - checkpoint: `Checkpoint` and the immutable `CheckpointSet`
//! - cursor: anchor cache and its monotonic advance
//! - candidate: checkpoint-candidate evaluation
//! - invariants: confirmation window, timestamp bracketing, set ordering

pub mod candidate;
pub mod checkpoint;
pub mod cursor;
pub mod invariants;

pub use candidate::{
    first_nonstandard_output, is_nonstandard_transaction, CandidateEvaluator, CandidateVerdict,
};
pub use checkpoint::{Checkpoint, CheckpointSet};
pub use cursor::CheckpointCursor;
pub use invariants::{
    invariant_strictly_ascending, is_buried, timestamps_bracketed, CHECKPOINT_CONFIRMATIONS,
};
