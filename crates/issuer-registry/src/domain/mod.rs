//! # Domain Module
//!
//! Core domain types for the issuer registry.

pub mod entities;
pub mod errors;
pub mod invariants;
pub mod table;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use invariants::*;
pub use table::*;
pub use value_objects::*;
