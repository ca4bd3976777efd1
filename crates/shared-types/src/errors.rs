//! # Error Types
//!
//! Defines error types used across crates.

use thiserror::Error;

/// Errors from parsing a textual address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressParseError {
    /// Input was not valid hexadecimal.
    #[error("Invalid hex in address: {0}")]
    InvalidHex(String),

    /// Decoded byte length was not 20.
    #[error("Invalid address length: expected 20 bytes, got {0}")]
    InvalidLength(usize),
}
