//! # Ports Layer
//!
//! - `inbound.rs` - Driving ports (API exposed to the chain manager)
//! - `outbound.rs` - Driven ports (store, chain state, script classifier)

pub mod inbound;
pub mod outbound;

pub use inbound::CheckpointApi;
pub use outbound::{
    ChainState, ChainStore, ScriptClass, ScriptClassifier, StoreError, StoreResult, StoreView,
};
