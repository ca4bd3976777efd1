//! # Inbound Ports
//!
//! API trait defining what the issuer registry can do.
//!
//! Mutating operations take the caller principal explicitly; whether it holds
//! the owner capability is decided by the registry's `AccessControl`.
//! Queries are open to any caller.

use crate::domain::RegistryError;
use shared_types::{Address, ClaimTopic};

/// Trusted issuers registry API - inbound port.
pub trait TrustedIssuersApi: Send + Sync {
    /// Register `issuer` as trusted for `claim_topics`.
    ///
    /// Emits `TrustedIssuerAdded`.
    fn add_trusted_issuer(
        &self,
        caller: &Address,
        issuer: Address,
        claim_topics: &[ClaimTopic],
    ) -> Result<(), RegistryError>;

    /// Remove `issuer` from the registry.
    ///
    /// Emits `TrustedIssuerRemoved`.
    fn remove_trusted_issuer(
        &self,
        caller: &Address,
        issuer: &Address,
    ) -> Result<(), RegistryError>;

    /// Replace the topic set of `issuer`.
    ///
    /// Emits `ClaimTopicsUpdated`.
    fn update_issuer_claim_topics(
        &self,
        caller: &Address,
        issuer: &Address,
        claim_topics: &[ClaimTopic],
    ) -> Result<(), RegistryError>;

    /// All registered issuers in registration order.
    fn get_trusted_issuers(&self) -> Vec<Address>;

    /// Whether `issuer` is registered.
    fn is_trusted_issuer(&self, issuer: &Address) -> bool;

    /// Topics `issuer` is trusted for. Fails with `NotFound` if unregistered.
    fn get_trusted_issuer_claim_topics(
        &self,
        issuer: &Address,
    ) -> Result<Vec<ClaimTopic>, RegistryError>;

    /// Whether `issuer` is registered and trusted for `claim_topic`.
    /// Never fails.
    fn has_claim_topic(&self, issuer: &Address, claim_topic: ClaimTopic) -> bool;

    /// Issuers trusted for `claim_topic`, in grant order. Empty for unknown topics.
    fn get_trusted_issuers_for_claim_topic(&self, claim_topic: ClaimTopic) -> Vec<Address>;

    /// Move the owner capability to `new_owner`.
    ///
    /// Emits `OwnershipTransferred`.
    fn transfer_ownership(&self, caller: &Address, new_owner: Address) -> Result<(), RegistryError>;

    /// Current owner principal.
    fn owner(&self) -> Address;
}
