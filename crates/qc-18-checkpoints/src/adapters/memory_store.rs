//! In-memory chain store
//!
//! Implements `ChainStore` with copy-on-write snapshots: every `view()`
//! captures an `Arc` of the current chain data, so later writes never leak
//! into an open view.

use crate::ports::outbound::{ChainStore, StoreError, StoreResult, StoreView};
use parking_lot::RwLock;
use shared_types::{Block, BlockHeader, Hash};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone, Default)]
struct ChainData {
    /// Every stored block, main chain or not.
    blocks: HashMap<Hash, Block>,
    /// Main-chain index: height -> hash.
    main_by_height: BTreeMap<u64, Hash>,
    /// Main-chain index: hash -> height.
    main_by_hash: HashMap<Hash, u64>,
}

/// In-memory block store for tests and tooling.
#[derive(Default)]
pub struct InMemoryChainStore {
    data: RwLock<Arc<ChainData>>,
    fail_reads: RwLock<bool>,
}

impl InMemoryChainStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `block` and index it in the main chain at `block.height`.
    ///
    /// A different block already indexed at that height is demoted to a
    /// side block.
    pub fn connect_block(&self, block: Block) {
        let hash = block.hash();
        let mut guard = self.data.write();
        let data = Arc::make_mut(&mut guard);
        if let Some(previous) = data.main_by_height.insert(block.height, hash) {
            if previous != hash {
                data.main_by_hash.remove(&previous);
            }
        }
        data.main_by_hash.insert(hash, block.height);
        data.blocks.insert(hash, block);
    }

    /// Store `block` without indexing it in the main chain.
    pub fn store_side_block(&self, block: Block) {
        let mut guard = self.data.write();
        Arc::make_mut(&mut guard).blocks.insert(block.hash(), block);
    }

    /// Remove every main-chain index entry above `height`. Block data is
    /// kept, as after a reorganization.
    pub fn disconnect_above(&self, height: u64) {
        let mut guard = self.data.write();
        let data = Arc::make_mut(&mut guard);
        let removed = data.main_by_height.split_off(&(height + 1));
        for hash in removed.values() {
            data.main_by_hash.remove(hash);
        }
        debug!("[qc-18] Disconnected {} blocks above {}", removed.len(), height);
    }

    /// Drop the stored block data but keep its index entries, simulating a
    /// corrupted store.
    pub fn drop_block_data(&self, hash: &Hash) {
        let mut guard = self.data.write();
        Arc::make_mut(&mut guard).blocks.remove(hash);
    }

    /// Make every subsequent `view()` fail with a backend error.
    pub fn fail_reads(&self, fail: bool) {
        *self.fail_reads.write() = fail;
    }

    /// Highest main-chain height and hash.
    pub fn tip(&self) -> Option<(u64, Hash)> {
        let guard = self.data.read();
        guard
            .main_by_height
            .iter()
            .next_back()
            .map(|(height, hash)| (*height, *hash))
    }
}

impl ChainStore for InMemoryChainStore {
    fn view(&self) -> StoreResult<Box<dyn StoreView + '_>> {
        if *self.fail_reads.read() {
            return Err(StoreError::Backend {
                reason: "store unavailable".to_string(),
            });
        }
        Ok(Box::new(MemoryView {
            data: Arc::clone(&self.data.read()),
        }))
    }
}

/// Snapshot over one version of the chain data.
struct MemoryView {
    data: Arc<ChainData>,
}

impl MemoryView {
    fn block(&self, hash: &Hash) -> StoreResult<&Block> {
        self.data
            .blocks
            .get(hash)
            .ok_or_else(|| StoreError::block_not_found(hash))
    }
}

impl StoreView for MemoryView {
    fn is_in_main_chain(&self, hash: &Hash) -> StoreResult<bool> {
        Ok(self.data.main_by_hash.contains_key(hash))
    }

    fn height_for_hash(&self, hash: &Hash) -> StoreResult<u64> {
        match self.data.main_by_hash.get(hash) {
            Some(height) => Ok(*height),
            None if self.data.blocks.contains_key(hash) => {
                Err(StoreError::NotInMainChain { hash: *hash })
            }
            None => Err(StoreError::block_not_found(hash)),
        }
    }

    fn block_by_hash(&self, hash: &Hash) -> StoreResult<Block> {
        let mut block = self.block(hash)?.clone();
        if let Some(height) = self.data.main_by_hash.get(hash) {
            block.height = *height;
        }
        Ok(block)
    }

    fn header_by_hash(&self, hash: &Hash) -> StoreResult<BlockHeader> {
        Ok(self.block(hash)?.header.clone())
    }

    fn header_by_height(&self, height: u64) -> StoreResult<BlockHeader> {
        let hash = self
            .data
            .main_by_height
            .get(&height)
            .ok_or_else(|| StoreError::height_not_found(height))?;
        Ok(self.block(hash)?.header.clone())
    }
}
