//! Checkpoint Service - composes the checkpoint table, the anchor cursor
//! and the candidate evaluator over the outbound ports.
//!
//! The cursor is the only mutable state. It sits behind its own lock so
//! that refilling the cache never races with itself, independent of
//! whatever lock the chain manager holds around best-tip updates.

use crate::config::CheckpointConfig;
use crate::domain::{
    CandidateEvaluator, CandidateVerdict, Checkpoint, CheckpointCursor, CheckpointSet,
};
use crate::error::{CheckpointError, CheckpointResult};
use crate::ports::inbound::CheckpointApi;
use crate::ports::outbound::{ChainState, ChainStore, ScriptClassifier};
use parking_lot::RwLock;
use shared_types::{hash_to_hex, Block, Hash};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Checkpoints subsystem service
pub struct CheckpointService<S, C, K>
where
    S: ChainStore,
    C: ChainState,
    K: ScriptClassifier,
{
    set: Arc<CheckpointSet>,
    cursor: RwLock<CheckpointCursor>,
    evaluator: CandidateEvaluator,
    store: Arc<S>,
    chain_state: Arc<C>,
    classifier: Arc<K>,
}

impl<S, C, K> CheckpointService<S, C, K>
where
    S: ChainStore,
    C: ChainState,
    K: ScriptClassifier,
{
    /// Build the service from network configuration.
    pub fn new(
        config: &CheckpointConfig,
        store: Arc<S>,
        chain_state: Arc<C>,
        classifier: Arc<K>,
    ) -> CheckpointResult<Self> {
        config.validate()?;
        let set = config.build_set()?;
        info!(
            "[qc-18] Loaded {} checkpoints (confirmations: {})",
            set.len(),
            config.confirmations
        );
        Ok(Self::with_set(
            Arc::new(set),
            config.confirmations,
            store,
            chain_state,
            classifier,
        ))
    }

    /// Build the service over an already validated set.
    pub fn with_set(
        set: Arc<CheckpointSet>,
        confirmations: u64,
        store: Arc<S>,
        chain_state: Arc<C>,
        classifier: Arc<K>,
    ) -> Self {
        Self {
            set,
            cursor: RwLock::new(CheckpointCursor::new()),
            evaluator: CandidateEvaluator::new(confirmations),
            store,
            chain_state,
            classifier,
        }
    }

    /// The configured checkpoint table.
    pub fn checkpoint_set(&self) -> &CheckpointSet {
        &self.set
    }

    pub fn confirmations(&self) -> u64 {
        self.evaluator.confirmations()
    }

    /// Anchor for the current best height.
    pub fn current_anchor(&self) -> CheckpointResult<Option<Arc<Block>>> {
        self.resolve_anchor(self.chain_state.best_height())
    }

    /// Anchor already held by the cursor. Never touches the store and
    /// never advances.
    pub fn cached_anchor(&self) -> Option<Arc<Block>> {
        self.cursor.read().anchor()
    }

    /// Candidate check at the current best height.
    pub fn is_checkpoint_candidate(&self, block: &Block) -> CheckpointResult<bool> {
        self.evaluate_candidate(block, self.chain_state.best_height())
    }

    /// Like [`CheckpointApi::evaluate_candidate`] but reports which check
    /// failed.
    pub fn evaluate_candidate_verdict(
        &self,
        block: &Block,
        best_height: u64,
    ) -> CheckpointResult<CandidateVerdict> {
        let view = self.store.view()?;
        let verdict =
            self.evaluator
                .evaluate(view.as_ref(), self.classifier.as_ref(), block, best_height)?;
        log_verdict(block, &verdict);
        Ok(verdict)
    }

    /// Reject an alternate history whose last common block with the main
    /// chain is at `fork_height` if it would replace the anchor.
    ///
    /// Forking exactly at the anchor keeps the anchor and is allowed.
    pub fn check_fork_point(&self, fork_height: u64) -> CheckpointResult<()> {
        let Some(anchor) = self.current_anchor()? else {
            return Ok(());
        };
        if fork_height < anchor.height {
            warn!(
                "[qc-18] ⛔ Rejected fork at height {} below checkpoint at height {}",
                fork_height, anchor.height
            );
            return Err(CheckpointError::ForkBelowCheckpoint {
                fork_height,
                checkpoint_height: anchor.height,
            });
        }
        Ok(())
    }

    /// Scan the main chain downward from `best - confirmations` for up to
    /// `max` candidates, highest first.
    ///
    /// Stops above the latest configured checkpoint, or at genesis when
    /// there is none.
    pub fn find_candidates(&self, max: usize) -> CheckpointResult<Vec<Checkpoint>> {
        let best_height = self.chain_state.best_height();
        let Some(start) = best_height.checked_sub(self.evaluator.confirmations()) else {
            return Ok(Vec::new());
        };
        let lowest = self.set.latest().map_or(0, |cp| cp.height + 1);
        if max == 0 || start < lowest {
            return Ok(Vec::new());
        }

        let view = self.store.view()?;
        let mut found = Vec::new();
        for height in (lowest..=start).rev() {
            let hash = view
                .header_by_height(height)
                .map_err(|e| CheckpointError::missing(format!("header at height {}", height), &e))?
                .hash();
            let block = view.block_by_hash(&hash).map_err(|e| {
                CheckpointError::missing(format!("block {}", hash_to_hex(&hash)), &e)
            })?;

            let verdict = self.evaluator.evaluate(
                view.as_ref(),
                self.classifier.as_ref(),
                &block,
                best_height,
            )?;
            log_verdict(&block, &verdict);
            if verdict.is_candidate() {
                found.push(Checkpoint::new(height, hash));
                if found.len() == max {
                    break;
                }
            }
        }
        Ok(found)
    }
}

fn log_verdict(block: &Block, verdict: &CandidateVerdict) {
    let hash = hash_to_hex(&block.hash());
    match verdict {
        CandidateVerdict::Candidate => {
            info!(
                "[qc-18] Block {} at height {} is a checkpoint candidate",
                hash, block.height
            );
        }
        rejected => {
            debug!(
                "[qc-18] Block {} at height {} rejected as candidate: {:?}",
                hash, block.height, rejected
            );
        }
    }
}

impl<S, C, K> CheckpointApi for CheckpointService<S, C, K>
where
    S: ChainStore,
    C: ChainState,
    K: ScriptClassifier,
{
    fn resolve_anchor(&self, best_height: u64) -> CheckpointResult<Option<Arc<Block>>> {
        let mut cursor = self.cursor.write();
        cursor.resolve(&self.set, self.store.as_ref(), best_height)
    }

    fn verify_pinned_hash(&self, height: u64, hash: &Hash) -> bool {
        match self.set.by_height(height) {
            None => true,
            Some(checkpoint) if checkpoint.hash == *hash => {
                info!("[qc-18] ✅ Verified checkpoint {}", checkpoint);
                true
            }
            Some(checkpoint) => {
                warn!(
                    "[qc-18] Block {} at height {} conflicts with checkpoint {}",
                    hash_to_hex(hash),
                    height,
                    checkpoint
                );
                false
            }
        }
    }

    fn evaluate_candidate(&self, block: &Block, best_height: u64) -> CheckpointResult<bool> {
        Ok(self
            .evaluate_candidate_verdict(block, best_height)?
            .is_candidate())
    }

    fn has_checkpoints(&self) -> bool {
        self.set.has_checkpoints()
    }

    fn latest_configured(&self) -> Option<Checkpoint> {
        self.set.latest().copied()
    }

    fn checkpoints(&self) -> Vec<Checkpoint> {
        self.set.list().to_vec()
    }
}
