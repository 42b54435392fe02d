//! Driving Ports (API - Inbound)
//!
//! The contract exposed to the chain manager and to maintenance tooling.

use crate::domain::Checkpoint;
use crate::error::CheckpointResult;
use shared_types::{Block, Hash};
use std::sync::Arc;

/// Primary Checkpoints API
///
/// All operations are synchronous: they either complete from cache or
/// block on store I/O.
pub trait CheckpointApi: Send + Sync {
    /// Latest checkpoint block known to be in the main chain, refreshing the
    /// cursor for `best_height` as needed. `None` until the chain reaches
    /// the first checkpoint.
    fn resolve_anchor(&self, best_height: u64) -> CheckpointResult<Option<Arc<Block>>>;

    /// Whether `(height, hash)` is consistent with the pinned history.
    fn verify_pinned_hash(&self, height: u64, hash: &Hash) -> bool;

    /// Whether `block` qualifies as a future checkpoint at `best_height`.
    ///
    /// Fails with `HeightMismatch` if the claimed height disagrees with the
    /// main-chain index.
    fn evaluate_candidate(&self, block: &Block, best_height: u64) -> CheckpointResult<bool>;

    /// Whether the network defines any checkpoints.
    fn has_checkpoints(&self) -> bool;

    /// Highest configured checkpoint, reached or not.
    fn latest_configured(&self) -> Option<Checkpoint>;

    /// Full configured list, height-ascending.
    fn checkpoints(&self) -> Vec<Checkpoint>;
}
