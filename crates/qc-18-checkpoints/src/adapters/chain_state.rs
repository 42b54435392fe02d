//! Chain-state adapter
//!
//! Shared best-tip record updated by the chain manager as blocks connect.

use crate::ports::outbound::ChainState;
use parking_lot::RwLock;
use shared_types::{Hash, ZERO_HASH};

/// Best tip guarded by a read/write lock. Height and hash always change
/// together.
#[derive(Debug)]
pub struct SharedChainState {
    tip: RwLock<(u64, Hash)>,
}

impl SharedChainState {
    pub fn new(height: u64, hash: Hash) -> Self {
        Self {
            tip: RwLock::new((height, hash)),
        }
    }

    /// Move the tip. Callers hold their own chain lock while doing so.
    pub fn set_tip(&self, height: u64, hash: Hash) {
        *self.tip.write() = (height, hash);
    }
}

impl Default for SharedChainState {
    fn default() -> Self {
        Self::new(0, ZERO_HASH)
    }
}

impl ChainState for SharedChainState {
    fn best_height(&self) -> u64 {
        self.tip.read().0
    }

    fn best_hash(&self) -> Hash {
        self.tip.read().1
    }
}
