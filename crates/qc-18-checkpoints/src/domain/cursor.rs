//! Checkpoint cursor
//!
//! Caches the latest checkpoint known to be in the main chain (the anchor)
//! and the next checkpoint expected as the chain grows.
//!
//! ## States
//!
//! ```text
//! [COLD] ──first resolve──→ [WARM: anchor?, next?]
//!                                │
//!                                ├── next = None            → anchor (fully advanced)
//!                                ├── best < next.height     → anchor (not yet due)
//!                                └── best >= next.height    → lock in next, repeat
//! ```
//!
//! Once the main chain passes a checkpoint height, no reorg below it is
//! permitted, so the cursor only ever moves forward.

use super::checkpoint::{Checkpoint, CheckpointSet};
use crate::error::{CheckpointError, CheckpointResult};
use crate::ports::outbound::{ChainStore, StoreView};
use shared_types::{hash_to_hex, Block};
use std::sync::Arc;
use tracing::{debug, error, info};

/// The locked-in checkpoint block and its position in the set.
#[derive(Clone, Debug)]
struct Anchor {
    index: usize,
    block: Arc<Block>,
}

/// Mutable cache over a [`CheckpointSet`].
///
/// Not synchronized on its own; the owner serializes access (see
/// `CheckpointService`).
#[derive(Clone, Debug, Default)]
pub struct CheckpointCursor {
    anchor: Option<Anchor>,
    next: Option<usize>,
}

impl CheckpointCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nothing has been resolved yet.
    pub fn is_cold(&self) -> bool {
        self.anchor.is_none() && self.next.is_none()
    }

    /// Cached anchor block, without consulting the store.
    pub fn anchor(&self) -> Option<Arc<Block>> {
        self.anchor.as_ref().map(|a| Arc::clone(&a.block))
    }

    /// Height of the cached anchor.
    pub fn anchor_height(&self) -> Option<u64> {
        self.anchor.as_ref().map(|a| a.block.height)
    }

    /// Next checkpoint the cursor is waiting for.
    pub fn next_checkpoint<'a>(&self, set: &'a CheckpointSet) -> Option<&'a Checkpoint> {
        self.next.and_then(|index| set.get(index))
    }

    /// Return the current anchor for `best_height`, refreshing the cache.
    ///
    /// `None` means the chain has not reached any checkpoint yet.
    pub fn resolve(
        &mut self,
        set: &CheckpointSet,
        store: &dyn ChainStore,
        best_height: u64,
    ) -> CheckpointResult<Option<Arc<Block>>> {
        if !set.has_checkpoints() {
            return Ok(None);
        }

        if self.is_cold() {
            return self.cold_start(set, store);
        }

        // Fully advanced, or the next checkpoint is still ahead of the tip.
        let due = match self.next_checkpoint(set) {
            Some(next) => best_height >= next.height,
            None => false,
        };
        if !due {
            return Ok(self.anchor());
        }

        let view = store.view()?;
        while let Some(index) = self.next {
            match set.get(index) {
                Some(next) if best_height >= next.height => {
                    self.lock_in(set, view.as_ref(), index)?;
                }
                _ => break,
            }
        }
        Ok(self.anchor())
    }

    /// Scan from the highest checkpoint down; the first (highest) entry
    /// found in the main chain wins.
    fn cold_start(
        &mut self,
        set: &CheckpointSet,
        store: &dyn ChainStore,
    ) -> CheckpointResult<Option<Arc<Block>>> {
        let view = store.view()?;
        for index in (0..set.len()).rev() {
            let Some(checkpoint) = set.get(index) else {
                continue;
            };
            if view.is_in_main_chain(&checkpoint.hash)? {
                self.lock_in(set, view.as_ref(), index)?;
                return Ok(self.anchor());
            }
            debug!(
                "[qc-18] Checkpoint {} not in main chain yet",
                checkpoint
            );
        }

        // Chain is below the first checkpoint.
        self.next = Some(0);
        Ok(None)
    }

    /// Cache the block for checkpoint `index` as the anchor and point
    /// `next` at the following entry.
    fn lock_in(
        &mut self,
        set: &CheckpointSet,
        view: &dyn StoreView,
        index: usize,
    ) -> CheckpointResult<()> {
        let checkpoint = set
            .get(index)
            .ok_or_else(|| CheckpointError::InvalidCheckpointSet {
                reason: format!("no checkpoint at index {}", index),
            })?;

        if !view.is_in_main_chain(&checkpoint.hash)? {
            error!(
                "[qc-18] Chain passed checkpoint {} but it is not in the main chain",
                checkpoint
            );
            return Err(CheckpointError::StoreInconsistency {
                reason: format!("checkpoint {} is not in the main chain", checkpoint),
            });
        }

        let block = view.block_by_hash(&checkpoint.hash).map_err(|e| {
            error!("[qc-18] Checkpoint block {} missing: {}", checkpoint, e);
            CheckpointError::missing(
                format!("checkpoint block {}", hash_to_hex(&checkpoint.hash)),
                &e,
            )
        })?;

        if block.height != checkpoint.height {
            error!(
                "[qc-18] Checkpoint block {} stored at height {}",
                checkpoint, block.height
            );
            return Err(CheckpointError::StoreInconsistency {
                reason: format!(
                    "checkpoint {} stored at height {}",
                    checkpoint, block.height
                ),
            });
        }

        info!("[qc-18] 🔒 Locked in checkpoint {}", checkpoint);
        self.anchor = Some(Anchor {
            index,
            block: Arc::new(block),
        });
        self.next = (index + 1 < set.len()).then_some(index + 1);
        Ok(())
    }

    /// Index of the anchor in the set.
    pub fn anchor_index(&self) -> Option<usize> {
        self.anchor.as_ref().map(|a| a.index)
    }
}
