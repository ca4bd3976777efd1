//! # Issuer Registry
//!
//! Tracks which claim issuers are trusted, and for which claim topics.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Answers two questions for the wider compliance system:
//! - is this issuer trusted at all?
//! - is this issuer trusted to emit claim topic X?
//!
//! Mutations are restricted to the principal holding the owner capability;
//! queries are open to anyone. Every applied mutation is announced on the
//! shared bus.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | An issuer appears at most once | `domain/table.rs` - `insert()` check |
//! | Topic sets are never empty | `domain/table.rs` - `validate_topics()` |
//! | Topic sets hold no duplicates | `domain/value_objects.rs` - `TopicSet::from_topics()` |
//! | Enumeration order has no stale issuers | `domain/table.rs` - `remove()` |
//! | Topic index mirrors the table | `domain/invariants.rs` - `invariant_topic_index_consistent()` |
//! | Failed mutations change nothing | `service.rs` - `mutate()` |
//!
//! ## Operations
//!
//! | Operation | Caller | Notification |
//! |-----------|--------|--------------|
//! | `add_trusted_issuer` | owner | `TrustedIssuerAdded` |
//! | `remove_trusted_issuer` | owner | `TrustedIssuerRemoved` |
//! | `update_issuer_claim_topics` | owner | `ClaimTopicsUpdated` |
//! | `transfer_ownership` | owner | `OwnershipTransferred` |
//! | `get_trusted_issuers` | anyone | - |
//! | `is_trusted_issuer` | anyone | - |
//! | `get_trusted_issuer_claim_topics` | anyone | - |
//! | `has_claim_topic` | anyone | - |
//! | `get_trusted_issuers_for_claim_topic` | anyone | - |
//!
//! ## Module Structure
//!
//! ```text
//! issuer-registry/
//! ├── domain/          # IssuerTable, TopicSet, RegistrySnapshot, errors, invariants
//! ├── ports/           # TrustedIssuersApi + AccessControl, SnapshotStore
//! ├── adapters/        # OwnableAccess, JsonFileStore, InMemoryStore, StoreLock
//! ├── service.rs       # IssuerRegistryService (lock, auth gate, notifications)
//! └── config.rs        # RegistryConfig with environment overrides
//! ```
//!
//! ## Usage Example
//!
//! ```
//! use issuer_registry::prelude::*;
//! use shared_bus::NoOpPublisher;
//!
//! let owner = [1u8; 20];
//! let issuer = [7u8; 20];
//! let limits = RegistryLimits::default();
//! let registry =
//!     IssuerRegistryService::with_owner(owner, NoOpPublisher::default(), limits).unwrap();
//!
//! registry.add_trusted_issuer(&owner, issuer, &[1, 2]).unwrap();
//! assert!(registry.is_trusted_issuer(&issuer));
//! assert!(registry.has_claim_topic(&issuer, 2));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::adapters::{InMemoryStore, JsonFileStore, OwnableAccess, StoreLock};
    pub use crate::config::{ConfigError, RegistryConfig};
    pub use crate::domain::{
        IssuerTable, RegistryEntry, RegistryError, RegistryLimits, RegistrySnapshot, TopicSet,
    };
    pub use crate::ports::{AccessControl, SnapshotStore, TrustedIssuersApi};
    pub use crate::service::{IssuerRegistryService, ServiceStats};
}

pub use prelude::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
