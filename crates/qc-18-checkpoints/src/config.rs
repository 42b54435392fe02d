//! # Checkpoint Configuration
//!
//! Per-network checkpoint list and candidate policy. Loaded once at chain
//! initialization and treated as immutable afterwards.

use crate::domain::{Checkpoint, CheckpointSet, CHECKPOINT_CONFIRMATIONS};
use crate::error::{CheckpointError, CheckpointResult};
use serde::{Deserialize, Serialize};
use shared_types::{hash_from_hex, hash_to_hex};

/// One configured checkpoint, hash in hex.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointEntry {
    pub height: u64,
    pub hash: String,
}

impl From<&Checkpoint> for CheckpointEntry {
    fn from(cp: &Checkpoint) -> Self {
        Self {
            height: cp.height,
            hash: hash_to_hex(&cp.hash),
        }
    }
}

/// Checkpoints configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckpointConfig {
    /// Network checkpoints, height-ascending.
    pub checkpoints: Vec<CheckpointEntry>,

    /// Blocks a candidate must sit below the best tip.
    pub confirmations: u64,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            checkpoints: Vec::new(),
            confirmations: CHECKPOINT_CONFIRMATIONS,
        }
    }
}

impl CheckpointConfig {
    /// Create a config for testing (short confirmation window).
    pub fn for_testing() -> Self {
        Self {
            checkpoints: Vec::new(),
            confirmations: 10,
        }
    }

    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> CheckpointResult<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| CheckpointError::Config {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Add a checkpoint entry.
    pub fn with_checkpoint(mut self, checkpoint: &Checkpoint) -> Self {
        self.checkpoints.push(checkpoint.into());
        self
    }

    pub fn with_confirmations(mut self, confirmations: u64) -> Self {
        self.confirmations = confirmations;
        self
    }

    /// A candidate needs at least its successor on top, so zero
    /// confirmations is never valid.
    pub fn validate(&self) -> CheckpointResult<()> {
        if self.confirmations == 0 {
            return Err(CheckpointError::Config {
                reason: "confirmations must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Decode and validate the checkpoint list.
    pub fn build_set(&self) -> CheckpointResult<CheckpointSet> {
        let entries = self
            .checkpoints
            .iter()
            .map(|entry| {
                hash_from_hex(&entry.hash)
                    .map(|hash| Checkpoint::new(entry.height, hash))
                    .map_err(|e| CheckpointError::InvalidHash {
                        value: entry.hash.clone(),
                        reason: e.to_string(),
                    })
            })
            .collect::<CheckpointResult<Vec<_>>>()?;
        CheckpointSet::new(entries)
    }
}
