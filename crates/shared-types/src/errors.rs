//! # Error Types
//!
//! Defines error types used across subsystems.

use thiserror::Error;

/// Errors raised when decoding a hex-encoded hash.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HashParseError {
    /// Wrong number of hex characters.
    #[error("Invalid hash length: expected {expected} hex chars, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Non-hex characters in the input.
    #[error("Invalid hex: {0}")]
    InvalidHex(String),
}
