//! # Shared Types Crate
//!
//! Identity primitives used by every crate in the workspace.
//!
//! ## Design Principles
//!
//! - **Opaque Identity**: an [`Address`] is compared, hashed and printed, never
//!   interpreted. Issuers and owner principals share the representation.
//! - **Null Principal**: [`ZERO_ADDRESS`] stands for "no principal" and is never
//!   a valid issuer or owner.
//! - **Uninterpreted Topics**: a [`ClaimTopic`] is only tested for equality.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
