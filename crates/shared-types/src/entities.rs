//! # Core Domain Entities
//!
//! Defines the chain entities consumed by the validation subsystems.
//!
//! ## Clusters
//!
//! - **Chain**: `Block`, `BlockHeader`
//! - **Transactions**: `Transaction`, `TxIn`, `TxOut`, `OutPoint`
//!
//! Hashes are double SHA-256 over a fixed little-endian field encoding, so
//! every node derives the same identifier for the same header.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use sha2::{Digest, Sha256};

use crate::errors::HashParseError;

// =============================================================================
// CLUSTER A: THE CHAIN
// =============================================================================

/// A 32-byte hash (double SHA-256).
pub type Hash = [u8; 32];

/// The all-zero hash, used as the parent of the genesis block.
pub const ZERO_HASH: Hash = [0u8; 32];

/// Double SHA-256 of `data`.
pub fn sha256d(data: &[u8]) -> Hash {
    let first = Sha256::digest(data);
    Sha256::digest(first).into()
}

/// Render a hash as lowercase hex.
pub fn hash_to_hex(hash: &Hash) -> String {
    hex::encode(hash)
}

/// Parse a 64-character hex string (optionally `0x`-prefixed) into a hash.
pub fn hash_from_hex(value: &str) -> Result<Hash, HashParseError> {
    let normalized = value.strip_prefix("0x").unwrap_or(value);
    if normalized.len() != 64 {
        return Err(HashParseError::InvalidLength {
            expected: 64,
            actual: normalized.len(),
        });
    }
    let bytes = hex::decode(normalized).map_err(|e| HashParseError::InvalidHex(e.to_string()))?;
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&bytes);
    Ok(hash)
}

/// The header of a block.
///
/// The height is deliberately not part of the header: it is a property of
/// the block's position in a chain, not of the block itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BlockHeader {
    /// Protocol version for this block.
    pub version: u32,
    /// Hash of the parent block (creates the chain linkage).
    pub parent_hash: Hash,
    /// Merkle root of all transactions in the block.
    pub merkle_root: Hash,
    /// Unix timestamp (seconds) when the block was produced.
    pub timestamp: u64,
    /// Compact difficulty target.
    pub bits: u32,
    /// Proof-of-work nonce.
    pub nonce: u64,
}

impl BlockHeader {
    /// Compute the block hash.
    pub fn hash(&self) -> Hash {
        let mut buf = Vec::with_capacity(4 + 32 + 32 + 8 + 4 + 8);
        buf.extend_from_slice(&self.version.to_le_bytes());
        buf.extend_from_slice(&self.parent_hash);
        buf.extend_from_slice(&self.merkle_root);
        buf.extend_from_slice(&self.timestamp.to_le_bytes());
        buf.extend_from_slice(&self.bits.to_le_bytes());
        buf.extend_from_slice(&self.nonce.to_le_bytes());
        sha256d(&buf)
    }
}

/// A fully materialized block.
///
/// `height` is the height the holder claims the block occupies. It is
/// not committed to by the header hash, so consumers that care must
/// cross-check it against the main-chain index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Block {
    /// The block header.
    pub header: BlockHeader,
    /// All transactions in this block, coinbase first.
    pub transactions: Vec<Transaction>,
    /// Claimed height in the chain.
    pub height: u64,
}

impl Block {
    /// Hash of the block header.
    pub fn hash(&self) -> Hash {
        self.header.hash()
    }

    /// Merkle root over the transaction ids, duplicating the last leaf on
    /// odd levels.
    pub fn compute_merkle_root(&self) -> Hash {
        let mut level: Vec<Hash> = self.transactions.iter().map(Transaction::txid).collect();
        if level.is_empty() {
            return sha256d(&[]);
        }
        while level.len() > 1 {
            if level.len() % 2 == 1 {
                let last = level[level.len() - 1];
                level.push(last);
            }
            level = level
                .chunks(2)
                .map(|pair| {
                    let mut concat = [0u8; 64];
                    concat[..32].copy_from_slice(&pair[0]);
                    concat[32..].copy_from_slice(&pair[1]);
                    sha256d(&concat)
                })
                .collect();
        }
        level[0]
    }
}

// =============================================================================
// CLUSTER B: TRANSACTIONS
// =============================================================================

/// Reference to a previous transaction output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct OutPoint {
    /// Id of the transaction holding the output.
    pub txid: Hash,
    /// Output index within that transaction.
    pub index: u32,
}

/// A transaction input.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TxIn {
    /// The output being spent. All-zero for coinbase inputs.
    pub previous_output: OutPoint,
    /// Unlocking script.
    #[serde_as(as = "Bytes")]
    pub signature_script: Vec<u8>,
    /// Sequence number.
    pub sequence: u32,
}

/// A transaction output.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TxOut {
    /// Amount in base units.
    pub value: u64,
    /// Locking script.
    #[serde_as(as = "Bytes")]
    pub pk_script: Vec<u8>,
}

/// A transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Transaction {
    /// Transaction format version.
    pub version: u32,
    /// Inputs being spent.
    pub inputs: Vec<TxIn>,
    /// Outputs being created.
    pub outputs: Vec<TxOut>,
    /// Earliest height or time the transaction may be included.
    pub lock_time: u32,
}

impl Transaction {
    /// Compute the transaction id.
    pub fn txid(&self) -> Hash {
        let mut buf = Vec::new();
        buf.extend_from_slice(&self.version.to_le_bytes());
        buf.extend_from_slice(&(self.inputs.len() as u64).to_le_bytes());
        for input in &self.inputs {
            buf.extend_from_slice(&input.previous_output.txid);
            buf.extend_from_slice(&input.previous_output.index.to_le_bytes());
            buf.extend_from_slice(&(input.signature_script.len() as u64).to_le_bytes());
            buf.extend_from_slice(&input.signature_script);
            buf.extend_from_slice(&input.sequence.to_le_bytes());
        }
        buf.extend_from_slice(&(self.outputs.len() as u64).to_le_bytes());
        for output in &self.outputs {
            buf.extend_from_slice(&output.value.to_le_bytes());
            buf.extend_from_slice(&(output.pk_script.len() as u64).to_le_bytes());
            buf.extend_from_slice(&output.pk_script);
        }
        buf.extend_from_slice(&self.lock_time.to_le_bytes());
        sha256d(&buf)
    }

    /// A coinbase transaction has a single input spending the null outpoint.
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1
            && self.inputs[0].previous_output.txid == ZERO_HASH
            && self.inputs[0].previous_output.index == u32::MAX
    }
}
