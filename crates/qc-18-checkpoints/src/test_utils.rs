//! # Test Utilities
//!
//! Deterministic chain fixtures shared by unit tests, the integration
//! crate and the benchmarks.

use crate::adapters::InMemoryChainStore;
use crate::domain::{Checkpoint, CheckpointSet};
use shared_types::{Block, BlockHeader, OutPoint, Transaction, TxIn, TxOut, ZERO_HASH};
use std::collections::HashMap;

/// Timestamp of the genesis block built by [`ChainBuilder`].
pub const GENESIS_TIME: u64 = 1_600_000_000;

/// Seconds between consecutive built blocks.
pub const BLOCK_SPACING: u64 = 600;

/// Standard pay-to-pubkey-hash script over a 20-byte hash filled with `tag`.
pub fn p2pkh_script(tag: u8) -> Vec<u8> {
    let mut script = vec![0x76, 0xa9, 20];
    script.extend_from_slice(&[tag; 20]);
    script.extend_from_slice(&[0x88, 0xac]);
    script
}

/// A script no standard template matches.
pub fn nonstandard_script() -> Vec<u8> {
    vec![0xff, 0xfe, 0xfd]
}

/// Coinbase transaction for `height`, paying to a P2PKH output.
pub fn coinbase(height: u64) -> Transaction {
    Transaction {
        version: 1,
        inputs: vec![TxIn {
            previous_output: OutPoint {
                txid: ZERO_HASH,
                index: u32::MAX,
            },
            signature_script: height.to_le_bytes().to_vec(),
            sequence: u32::MAX,
        }],
        outputs: vec![TxOut {
            value: 50_0000_0000,
            pk_script: p2pkh_script((height % 251) as u8),
        }],
        lock_time: 0,
    }
}

/// Builds a parent-linked main chain from genesis.
#[derive(Clone, Debug, Default)]
pub struct ChainBuilder {
    timestamps: HashMap<u64, u64>,
    transactions: HashMap<u64, Vec<Transaction>>,
    salt: u64,
}

impl ChainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the timestamp of the block at `height`.
    pub fn timestamp_at(mut self, height: u64, timestamp: u64) -> Self {
        self.timestamps.insert(height, timestamp);
        self
    }

    /// Replace the transactions of the block at `height`.
    pub fn transactions_at(mut self, height: u64, transactions: Vec<Transaction>) -> Self {
        self.transactions.insert(height, transactions);
        self
    }

    /// Mix `salt` into every nonce, producing a distinct chain with the
    /// same shape.
    pub fn salt(mut self, salt: u64) -> Self {
        self.salt = salt;
        self
    }

    /// Blocks at heights `0..=tip_height`.
    pub fn build(&self, tip_height: u64) -> Vec<Block> {
        let mut blocks: Vec<Block> = Vec::with_capacity(tip_height as usize + 1);
        let mut parent_hash = ZERO_HASH;
        for height in 0..=tip_height {
            let transactions = self
                .transactions
                .get(&height)
                .cloned()
                .unwrap_or_else(|| vec![coinbase(height)]);
            let mut block = Block {
                header: BlockHeader {
                    version: 1,
                    parent_hash,
                    merkle_root: ZERO_HASH,
                    timestamp: self
                        .timestamps
                        .get(&height)
                        .copied()
                        .unwrap_or(GENESIS_TIME + height * BLOCK_SPACING),
                    bits: 0x207f_ffff,
                    nonce: height ^ self.salt.rotate_left(32),
                },
                transactions,
                height,
            };
            block.header.merkle_root = block.compute_merkle_root();
            parent_hash = block.hash();
            blocks.push(block);
        }
        blocks
    }
}

/// Store holding `blocks` as its main chain.
pub fn store_with_chain(blocks: &[Block]) -> InMemoryChainStore {
    let store = InMemoryChainStore::new();
    for block in blocks {
        store.connect_block(block.clone());
    }
    store
}

/// Checkpoints pinning `blocks` at the given heights.
///
/// # Panics
///
/// If a height is outside `blocks` or the heights are not ascending.
pub fn checkpoints_at(blocks: &[Block], heights: &[u64]) -> CheckpointSet {
    let entries = heights
        .iter()
        .map(|&h| Checkpoint::new(h, blocks[h as usize].hash()))
        .collect();
    CheckpointSet::new(entries).expect("checkpoint heights must be ascending")
}
