//! # Issuer Registry Service
//!
//! The registry component: owns the issuer table and the owner capability
//! under one lock and publishes a notification for every applied mutation.
//!
//! ## Concurrency
//!
//! | Operation | Lock | Notification |
//! |-----------|------|--------------|
//! | add / remove / update / transfer | write | published before the lock is released |
//! | queries | read | none |
//!
//! Each mutation checks the caller, validates, applies and publishes inside a
//! single write critical section, so concurrent mutations are totally ordered,
//! readers never observe a half-applied change, and observers receive
//! notifications in mutation order.

use crate::adapters::OwnableAccess;
use crate::domain::{
    ensure_valid_owner, IssuerTable, RegistryError, RegistryLimits, RegistrySnapshot,
};
use crate::ports::inbound::TrustedIssuersApi;
use crate::ports::outbound::{AccessControl, SnapshotStore};
use parking_lot::RwLock;
use shared_bus::{EventPublisher, RegistryEvent};
use shared_types::{format_address, Address, ClaimTopic};
use tracing::{debug, info, instrument, warn};

/// Statistics for the registry service.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ServiceStats {
    /// Mutations applied.
    pub mutations_applied: u64,
    /// Mutations rejected because the caller was not the owner.
    pub rejected_unauthorized: u64,
    /// Mutations rejected for any other reason.
    pub rejected_invalid: u64,
    /// Notifications handed to the publisher.
    pub notifications_published: u64,
}

struct RegistryState<A> {
    table: IssuerTable,
    access: A,
    stats: ServiceStats,
}

/// The trusted issuers registry.
pub struct IssuerRegistryService<A: AccessControl, P: EventPublisher> {
    state: RwLock<RegistryState<A>>,
    publisher: P,
}

impl<A: AccessControl, P: EventPublisher> IssuerRegistryService<A, P> {
    /// Create an empty registry.
    pub fn new(access: A, publisher: P, limits: RegistryLimits) -> Self {
        Self::with_table(IssuerTable::new(limits), access, publisher)
    }

    /// Rebuild a registry from a snapshot.
    ///
    /// The owner capability comes from `access`; the snapshot's recorded owner
    /// is not consulted. Fails with `InvalidArgument` or `LimitExceeded` if the
    /// snapshot is inconsistent. No notifications are emitted.
    pub fn from_snapshot(
        snapshot: &RegistrySnapshot,
        access: A,
        publisher: P,
        limits: RegistryLimits,
    ) -> Result<Self, RegistryError> {
        let table = IssuerTable::from_snapshot(snapshot, limits)?;
        info!(issuers = table.len(), "Registry restored from snapshot");
        Ok(Self::with_table(table, access, publisher))
    }

    fn with_table(table: IssuerTable, access: A, publisher: P) -> Self {
        Self {
            state: RwLock::new(RegistryState {
                table,
                access,
                stats: ServiceStats::default(),
            }),
            publisher,
        }
    }

    /// Consistent copy of the owner and every entry, in enumeration order.
    pub fn snapshot(&self) -> RegistrySnapshot {
        let state = self.state.read();
        RegistrySnapshot::new(state.access.owner(), state.table.entries())
    }

    /// Write the current snapshot to `store`.
    pub fn persist(&self, store: &dyn SnapshotStore) -> Result<(), RegistryError> {
        store.save(&self.snapshot())
    }

    /// Current service statistics.
    pub fn stats(&self) -> ServiceStats {
        self.state.read().stats.clone()
    }

    /// Number of registered issuers.
    pub fn issuer_count(&self) -> usize {
        self.state.read().table.len()
    }

    /// Configured bounds.
    pub fn limits(&self) -> RegistryLimits {
        self.state.read().table.limits()
    }

    /// The notification publisher.
    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Run one mutation under the write lock.
    ///
    /// The caller check comes first, so a non-owner learns nothing about the
    /// arguments' validity and the state is untouched.
    fn mutate<T>(
        &self,
        caller: &Address,
        operation: &'static str,
        apply: impl FnOnce(&mut RegistryState<A>) -> Result<(T, RegistryEvent), RegistryError>,
    ) -> Result<T, RegistryError> {
        let mut state = self.state.write();

        if !state.access.is_owner(caller) {
            state.stats.rejected_unauthorized += 1;
            warn!(
                operation,
                caller = %format_address(caller),
                "Rejected mutation from non-owner"
            );
            return Err(RegistryError::Unauthorized { caller: *caller });
        }

        match apply(&mut *state) {
            Ok((value, event)) => {
                state.stats.mutations_applied += 1;
                info!(operation, event = event.name(), "Registry mutation applied");
                self.publisher.publish(event);
                state.stats.notifications_published += 1;
                Ok(value)
            }
            Err(err) => {
                state.stats.rejected_invalid += 1;
                warn!(operation, kind = err.kind(), error = %err, "Registry mutation rejected");
                Err(err)
            }
        }
    }
}

impl<P: EventPublisher> IssuerRegistryService<OwnableAccess, P> {
    /// Create an empty registry owned by `owner`.
    pub fn with_owner(
        owner: Address,
        publisher: P,
        limits: RegistryLimits,
    ) -> Result<Self, RegistryError> {
        Ok(Self::new(OwnableAccess::new(owner)?, publisher, limits))
    }

    /// Rebuild a registry from a snapshot, owned by the snapshot's owner.
    pub fn restore(
        snapshot: &RegistrySnapshot,
        publisher: P,
        limits: RegistryLimits,
    ) -> Result<Self, RegistryError> {
        let access = OwnableAccess::new(snapshot.owner)?;
        Self::from_snapshot(snapshot, access, publisher, limits)
    }

    /// Load from `store`. `Ok(None)` when the store holds no snapshot.
    pub fn load(
        store: &dyn SnapshotStore,
        publisher: P,
        limits: RegistryLimits,
    ) -> Result<Option<Self>, RegistryError> {
        match store.load()? {
            Some(snapshot) => Self::restore(&snapshot, publisher, limits).map(Some),
            None => Ok(None),
        }
    }
}

impl<A: AccessControl, P: EventPublisher> TrustedIssuersApi for IssuerRegistryService<A, P> {
    #[instrument(skip(self, caller, issuer), fields(issuer = %format_address(&issuer)))]
    fn add_trusted_issuer(
        &self,
        caller: &Address,
        issuer: Address,
        claim_topics: &[ClaimTopic],
    ) -> Result<(), RegistryError> {
        self.mutate(caller, "add_trusted_issuer", |state| {
            let stored = state.table.insert(issuer, claim_topics)?;
            Ok((
                (),
                RegistryEvent::TrustedIssuerAdded {
                    issuer,
                    claim_topics: stored.to_vec(),
                },
            ))
        })
    }

    #[instrument(skip(self, caller, issuer), fields(issuer = %format_address(issuer)))]
    fn remove_trusted_issuer(
        &self,
        caller: &Address,
        issuer: &Address,
    ) -> Result<(), RegistryError> {
        self.mutate(caller, "remove_trusted_issuer", |state| {
            state.table.remove(issuer)?;
            Ok(((), RegistryEvent::TrustedIssuerRemoved { issuer: *issuer }))
        })
    }

    #[instrument(skip(self, caller, issuer), fields(issuer = %format_address(issuer)))]
    fn update_issuer_claim_topics(
        &self,
        caller: &Address,
        issuer: &Address,
        claim_topics: &[ClaimTopic],
    ) -> Result<(), RegistryError> {
        self.mutate(caller, "update_issuer_claim_topics", |state| {
            let stored = state.table.replace_topics(issuer, claim_topics)?;
            Ok((
                (),
                RegistryEvent::ClaimTopicsUpdated {
                    issuer: *issuer,
                    claim_topics: stored.to_vec(),
                },
            ))
        })
    }

    fn get_trusted_issuers(&self) -> Vec<Address> {
        self.state.read().table.issuers().to_vec()
    }

    fn is_trusted_issuer(&self, issuer: &Address) -> bool {
        self.state.read().table.contains(issuer)
    }

    fn get_trusted_issuer_claim_topics(
        &self,
        issuer: &Address,
    ) -> Result<Vec<ClaimTopic>, RegistryError> {
        let state = self.state.read();
        let topics = state
            .table
            .topics(issuer)
            .ok_or(RegistryError::NotFound(*issuer))?;
        debug!(issuer = %format_address(issuer), topics = topics.len(), "Topic lookup");
        Ok(topics.to_vec())
    }

    fn has_claim_topic(&self, issuer: &Address, claim_topic: ClaimTopic) -> bool {
        self.state.read().table.has_topic(issuer, claim_topic)
    }

    fn get_trusted_issuers_for_claim_topic(&self, claim_topic: ClaimTopic) -> Vec<Address> {
        self.state.read().table.issuers_for_topic(claim_topic).to_vec()
    }

    #[instrument(skip(self, caller, new_owner), fields(new_owner = %format_address(&new_owner)))]
    fn transfer_ownership(
        &self,
        caller: &Address,
        new_owner: Address,
    ) -> Result<(), RegistryError> {
        self.mutate(caller, "transfer_ownership", |state| {
            ensure_valid_owner(&new_owner)?;
            let previous_owner = state.access.transfer_ownership(new_owner)?;
            Ok((
                (),
                RegistryEvent::OwnershipTransferred {
                    previous_owner,
                    new_owner,
                },
            ))
        })
    }

    fn owner(&self) -> Address {
        self.state.read().access.owner()
    }
}
