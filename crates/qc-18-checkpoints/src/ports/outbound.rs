//! # Outbound Ports (Driven Ports)
//!
//! Dependencies required by the Checkpoints service.
//!
//! These are the interfaces the host node implements: a transactional
//! block store, the chain-state tip, and script template classification.

use shared_types::{hash_to_hex, Block, BlockHeader, Hash};
use thiserror::Error;

/// Errors reported by a [`StoreView`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Requested item does not exist.
    #[error("Not found: {what}")]
    NotFound { what: String },

    /// Block exists but is not part of the main chain.
    #[error("Block {} is not in the main chain", hash_to_hex(.hash))]
    NotInMainChain { hash: Hash },

    /// Backend failure (I/O, decoding, closed database).
    #[error("Store backend error: {reason}")]
    Backend { reason: String },
}

impl StoreError {
    /// Soft miss: the item is absent or off the main chain.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::NotFound { .. } | StoreError::NotInMainChain { .. }
        )
    }

    /// Convenience constructor for a missing block by hash.
    pub fn block_not_found(hash: &Hash) -> Self {
        StoreError::NotFound {
            what: format!("block {}", hash_to_hex(hash)),
        }
    }

    /// Convenience constructor for a missing header at a height.
    pub fn height_not_found(height: u64) -> Self {
        StoreError::NotFound {
            what: format!("header at height {}", height),
        }
    }
}

/// Result type for store reads
pub type StoreResult<T> = Result<T, StoreError>;

/// One isolated, read-only snapshot of the block store.
///
/// Every read through the same view observes the same chain state.
pub trait StoreView {
    /// Whether a block with this hash is connected in the main chain.
    fn is_in_main_chain(&self, hash: &Hash) -> StoreResult<bool>;

    /// Main-chain height of the block with this hash.
    ///
    /// Fails with `NotFound`/`NotInMainChain` when absent or off-chain.
    fn height_for_hash(&self, hash: &Hash) -> StoreResult<u64>;

    /// Full block by hash.
    fn block_by_hash(&self, hash: &Hash) -> StoreResult<Block>;

    /// Header by hash.
    fn header_by_hash(&self, hash: &Hash) -> StoreResult<BlockHeader>;

    /// Main-chain header at a height.
    fn header_by_height(&self, height: u64) -> StoreResult<BlockHeader>;
}

/// Abstract interface for the block store.
///
/// Production: a database-backed store provided by the node.
/// Testing: `InMemoryChainStore` (adapters/memory_store.rs)
pub trait ChainStore: Send + Sync {
    /// Open a read-only snapshot. No writes originate from this subsystem.
    fn view(&self) -> StoreResult<Box<dyn StoreView + '_>>;
}

/// Best-chain tip as tracked by the chain manager.
pub trait ChainState: Send + Sync {
    /// Height of the current best block.
    fn best_height(&self) -> u64;

    /// Hash of the current best block.
    fn best_hash(&self) -> Hash;
}

/// Output script template classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScriptClass {
    /// None of the recognised templates.
    NonStandard,
    /// `<pubkey> OP_CHECKSIG`
    PubKey,
    /// `OP_DUP OP_HASH160 <20 bytes> OP_EQUALVERIFY OP_CHECKSIG`
    PubKeyHash,
    /// `OP_HASH160 <20 bytes> OP_EQUAL`
    ScriptHash,
    /// `m <pubkey>... n OP_CHECKMULTISIG`
    MultiSig,
    /// `OP_RETURN <data>`
    NullData,
}

impl ScriptClass {
    /// Every class except `NonStandard`.
    pub fn is_standard(self) -> bool {
        self != ScriptClass::NonStandard
    }
}

/// Script template classifier.
pub trait ScriptClassifier: Send + Sync {
    /// Classify an output (locking) script.
    fn classify(&self, pk_script: &[u8]) -> ScriptClass;
}
