//! # Integration Test Flows
//!
//! Checkpoints (18) driven the way the chain manager drives it: blocks
//! connect to the store, the best tip moves, and the subsystem is queried
//! for its anchor, pin checks and candidates.

pub mod checkpoint_flows;
