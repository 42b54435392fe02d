//! # qc-18-checkpoints
//!
//! Checkpoints subsystem: pins known blocks as immovable anchors in chain
//! history and evaluates buried blocks as candidates for future pins.
//!
//! ## Overview
//!
//! This subsystem provides:
//! - **Pinned history**: `(height, hash)` pairs no block may contradict
//! - **Anchor cursor**: cached latest checkpoint reached by the main chain
//! - **Candidate evaluation**: advisory test for the next network checkpoint
//! - **Fork guard**: rejects alternate histories that branch below the anchor
//!
//! ## Architecture
//!
//! ```text
//! Chain manager ──resolve_anchor / verify_pinned_hash──→ Checkpoints (18)
//!                                                            │
//!                                                            ├── view() ──→ ChainStore
//!                                                            ├── best_height() ──→ ChainState
//!                                                            └── classify() ──→ ScriptClassifier
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! qc-18-checkpoints/
//! ├── domain/
//! │   ├── checkpoint.rs   # Checkpoint, CheckpointSet
//! │   ├── cursor.rs       # CheckpointCursor (cold start, advance)
//! │   ├── candidate.rs    # CandidateEvaluator
//! │   └── invariants.rs   # confirmation window, timestamp ordering
//! ├── ports/
//! │   ├── inbound.rs      # CheckpointApi
//! │   └── outbound.rs     # ChainStore, StoreView, ChainState, ScriptClassifier
//! ├── adapters/           # in-memory store, shared tip, script classifier
//! ├── service.rs          # CheckpointService
//! ├── config.rs
//! └── error.rs
//! ```
//!
//! ## Invariants
//!
//! | Invariant | Enforced by |
//! |-----------|-------------|
//! | Checkpoints strictly height-ascending | `CheckpointSet::new` |
//! | Anchor is a stored main-chain block matching its checkpoint | `CheckpointCursor` lock-in |
//! | Cursor only moves forward | `CheckpointCursor::resolve` |
//! | Candidates buried by `confirmations` blocks | `CandidateEvaluator` |
//!
//! ## Example
//!
//! ```rust,ignore
//! use qc_18_checkpoints::{CheckpointApi, CheckpointConfig, CheckpointService};
//!
//! let service = CheckpointService::new(&config, store, chain_state, classifier)?;
//!
//! if !service.verify_pinned_hash(height, &block.hash()) {
//!     return Err(reject("conflicts with checkpoint"));
//! }
//! let anchor = service.resolve_anchor(best_height)?;
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;
pub mod test_utils;

pub use adapters::{InMemoryChainStore, SharedChainState, StandardScriptClassifier};
pub use config::{CheckpointConfig, CheckpointEntry};
pub use domain::{
    CandidateEvaluator, CandidateVerdict, Checkpoint, CheckpointCursor, CheckpointSet,
    CHECKPOINT_CONFIRMATIONS,
};
pub use error::{CheckpointError, CheckpointResult};
pub use ports::{
    ChainState, ChainStore, CheckpointApi, ScriptClass, ScriptClassifier, StoreError,
    StoreResult, StoreView,
};
pub use service::CheckpointService;
