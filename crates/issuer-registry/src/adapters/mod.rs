//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements outbound port traits for the issuer registry.

mod ownable;
mod snapshot_store;
mod store_lock;

pub use ownable::OwnableAccess;
pub use snapshot_store::{InMemoryStore, JsonFileStore};
pub use store_lock::StoreLock;
