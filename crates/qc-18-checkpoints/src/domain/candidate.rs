//! Checkpoint candidate evaluation
//!
//! A good checkpoint candidate:
//! - is in the main chain,
//! - sits at least `confirmations` blocks below the best tip,
//! - has neighbours whose timestamps bracket its own,
//! - contains only standard output scripts.
//!
//! Candidates are advisory. Adding one to a network's checkpoint list is a
//! manual, reviewed decision.

use super::invariants::{is_buried, timestamps_bracketed};
use crate::error::{CheckpointError, CheckpointResult};
use crate::ports::outbound::{ScriptClassifier, StoreView};
use shared_types::{hash_to_hex, Block, Transaction};

/// Outcome of a candidate evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CandidateVerdict {
    /// All checks passed.
    Candidate,
    /// Orphaned, forked or unknown block.
    NotInMainChain,
    /// Fewer than `confirmations` blocks on top.
    TooShallow { height: u64, best_height: u64 },
    /// Neighbouring timestamps do not bracket the block's.
    TimestampsOutOfOrder,
    /// Some output script classifies as non-standard.
    NonStandardOutput { tx_index: usize, output_index: usize },
}

impl CandidateVerdict {
    pub fn is_candidate(&self) -> bool {
        matches!(self, CandidateVerdict::Candidate)
    }
}

/// Index of the first non-standard output in `tx`, if any.
pub fn first_nonstandard_output(
    tx: &Transaction,
    classifier: &dyn ScriptClassifier,
) -> Option<usize> {
    tx.outputs
        .iter()
        .position(|out| !classifier.classify(&out.pk_script).is_standard())
}

/// Whether any output of `tx` uses a non-standard script.
pub fn is_nonstandard_transaction(tx: &Transaction, classifier: &dyn ScriptClassifier) -> bool {
    first_nonstandard_output(tx, classifier).is_some()
}

/// Stateless candidate evaluator.
#[derive(Clone, Copy, Debug)]
pub struct CandidateEvaluator {
    confirmations: u64,
}

impl CandidateEvaluator {
    pub fn new(confirmations: u64) -> Self {
        Self { confirmations }
    }

    pub fn confirmations(&self) -> u64 {
        self.confirmations
    }

    /// Run every check against one store snapshot, stopping at the first
    /// failure.
    ///
    /// Errors only on a claimed/indexed height mismatch or a store fault.
    pub fn evaluate(
        &self,
        view: &dyn StoreView,
        classifier: &dyn ScriptClassifier,
        block: &Block,
        best_height: u64,
    ) -> CheckpointResult<CandidateVerdict> {
        let hash = block.hash();

        let height = match view.height_for_hash(&hash) {
            Ok(height) => height,
            Err(e) if e.is_not_found() => return Ok(CandidateVerdict::NotInMainChain),
            Err(e) => return Err(e.into()),
        };

        if height != block.height {
            return Err(CheckpointError::HeightMismatch {
                claimed: block.height,
                indexed: height,
            });
        }

        if !is_buried(height, best_height, self.confirmations) {
            return Ok(CandidateVerdict::TooShallow {
                height,
                best_height,
            });
        }

        // Genesis has no predecessor to compare against.
        let prev_time = if height == 0 {
            None
        } else {
            let parent = &block.header.parent_hash;
            let header = view.header_by_hash(parent).map_err(|e| {
                CheckpointError::missing(format!("previous header {}", hash_to_hex(parent)), &e)
            })?;
            Some(header.timestamp)
        };
        let next_time = view
            .header_by_height(height + 1)
            .map_err(|e| CheckpointError::missing(format!("header at height {}", height + 1), &e))?
            .timestamp;

        if !timestamps_bracketed(prev_time, block.header.timestamp, next_time) {
            return Ok(CandidateVerdict::TimestampsOutOfOrder);
        }

        for (tx_index, tx) in block.transactions.iter().enumerate() {
            if let Some(output_index) = first_nonstandard_output(tx, classifier) {
                return Ok(CandidateVerdict::NonStandardOutput {
                    tx_index,
                    output_index,
                });
            }
        }

        Ok(CandidateVerdict::Candidate)
    }
}
