//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implementations of the outbound port traits that ship with the crate.

mod chain_state;
mod memory_store;
mod script_classifier;

pub use chain_state::SharedChainState;
pub use memory_store::InMemoryChainStore;
pub use script_classifier::{StandardScriptClassifier, MAX_DATA_CARRIER_SIZE};
