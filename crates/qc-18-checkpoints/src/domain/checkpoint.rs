//! Checkpoint entity and the configured checkpoint table

use super::invariants::invariant_strictly_ascending;
use crate::error::CheckpointResult;
use serde::{Deserialize, Serialize};
use shared_types::{hash_to_hex, Hash};
use std::collections::HashMap;
use std::fmt;

/// A trusted `(height, hash)` pair: the block at `height` is permanently
/// part of canonical history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Block height
    pub height: u64,
    /// Block hash pinned at that height
    pub hash: Hash,
}

impl Checkpoint {
    pub fn new(height: u64, hash: Hash) -> Self {
        Self { height, hash }
    }
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.height, hash_to_hex(&self.hash))
    }
}

/// Immutable, height-ordered table of checkpoints for one network.
///
/// Built once at chain initialization and never mutated afterwards, so it
/// can be shared freely across threads.
#[derive(Clone, Debug, Default)]
pub struct CheckpointSet {
    entries: Vec<Checkpoint>,
    by_height: HashMap<u64, usize>,
}

impl CheckpointSet {
    /// Build a set, rejecting lists that are not strictly height-ascending.
    pub fn new(entries: Vec<Checkpoint>) -> CheckpointResult<Self> {
        invariant_strictly_ascending(&entries)?;
        let by_height = entries
            .iter()
            .enumerate()
            .map(|(index, cp)| (cp.height, index))
            .collect();
        Ok(Self { entries, by_height })
    }

    /// A network without checkpoints.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Full ordered list.
    pub fn list(&self) -> &[Checkpoint] {
        &self.entries
    }

    pub fn has_checkpoints(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest configured checkpoint.
    pub fn latest(&self) -> Option<&Checkpoint> {
        self.entries.last()
    }

    /// Entry at exactly `height`.
    pub fn by_height(&self, height: u64) -> Option<&Checkpoint> {
        self.by_height.get(&height).map(|&index| &self.entries[index])
    }

    /// Entry at position `index` in height order.
    pub fn get(&self, index: usize) -> Option<&Checkpoint> {
        self.entries.get(index)
    }
}
