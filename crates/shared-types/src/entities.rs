//! # Core Identity Entities
//!
//! Address and claim topic primitives.

use crate::errors::AddressParseError;

/// A 20-byte Ethereum-style address.
///
/// Identifies both claim issuers and administrative principals.
pub type Address = [u8; 20];

/// Category of claim an issuer may be trusted to emit.
pub type ClaimTopic = u64;

/// The null principal.
pub const ZERO_ADDRESS: Address = [0u8; 20];

/// Returns true for the null principal.
#[must_use]
pub fn is_zero_address(address: &Address) -> bool {
    *address == ZERO_ADDRESS
}

/// Format an address as `0x`-prefixed lowercase hex.
#[must_use]
pub fn format_address(address: &Address) -> String {
    format!("0x{}", hex::encode(address))
}

/// Parse an address from hex, with or without a `0x` prefix.
pub fn parse_address(input: &str) -> Result<Address, AddressParseError> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    let bytes = hex::decode(digits).map_err(|e| AddressParseError::InvalidHex(e.to_string()))?;
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| AddressParseError::InvalidLength(len))
}
