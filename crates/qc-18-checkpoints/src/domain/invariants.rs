//! # Domain Invariants
//!
//! Business rules shared by the cursor and the candidate evaluator.

use super::checkpoint::Checkpoint;
use crate::error::{CheckpointError, CheckpointResult};

/// Number of blocks a checkpoint candidate must sit below the best tip.
pub const CHECKPOINT_CONFIRMATIONS: u64 = 2016;

/// Invariant: configured checkpoints are strictly height-ascending, so
/// heights are also unique.
pub fn invariant_strictly_ascending(entries: &[Checkpoint]) -> CheckpointResult<()> {
    for pair in entries.windows(2) {
        if pair[1].height <= pair[0].height {
            return Err(CheckpointError::InvalidCheckpointSet {
                reason: format!(
                    "checkpoint at height {} follows height {}",
                    pair[1].height, pair[0].height
                ),
            });
        }
    }
    Ok(())
}

/// Whether a block at `height` has at least `confirmations` blocks on top
/// of it when the tip is at `best_height`.
///
/// A tip lower than `confirmations` buries nothing deep enough.
pub fn is_buried(height: u64, best_height: u64, confirmations: u64) -> bool {
    match best_height.checked_sub(confirmations) {
        Some(deepest_allowed) => height <= deepest_allowed,
        None => false,
    }
}

/// Timestamps of the neighbours must bracket the candidate's:
/// `prev <= current <= next`.
///
/// This is stricter than the median-time rule the chain itself enforces,
/// so it rejects some valid blocks near clock-skew boundaries. `prev` is
/// `None` only for genesis.
pub fn timestamps_bracketed(prev: Option<u64>, current: u64, next: u64) -> bool {
    let after_prev = prev.map_or(true, |prev| prev <= current);
    after_prev && current <= next
}
