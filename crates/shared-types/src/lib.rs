//! # Shared Types Crate
//!
//! This crate contains the chain entities (headers, blocks, transactions)
//! exchanged between the validation subsystems.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **Plain Data**: Entities carry no storage or policy logic; hashing is
//!   the only behaviour attached to them.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
