//! # Issuer Table
//!
//! The registry's data structure. Three views are kept in lock-step:
//!
//! | View | Type | Serves |
//! |------|------|--------|
//! | `entries` | `HashMap<Address, TopicSet>` | O(1) membership and topic lookup |
//! | `order` | `Vec<Address>` | enumeration in registration order |
//! | `by_topic` | `HashMap<ClaimTopic, Vec<Address>>` | issuers trusted for a topic |
//!
//! Every mutating method validates all preconditions before touching any view,
//! so a failed call leaves the table unchanged. Authorization is not checked
//! here; see `service.rs`.

use super::entities::{RegistryEntry, RegistrySnapshot};
use super::errors::{InvariantViolation, RegistryError};
use super::invariants::{
    invariant_order_matches_entries, invariant_topic_index_consistent, invariant_unique_issuers,
    invariant_valid_topics,
};
use super::value_objects::{RegistryLimits, TopicSet};
use shared_types::{is_zero_address, Address, ClaimTopic};
use std::collections::HashMap;

/// Issuer-to-topics table with ordered enumeration and a topic index.
#[derive(Clone, Debug, Default)]
pub struct IssuerTable {
    entries: HashMap<Address, TopicSet>,
    order: Vec<Address>,
    by_topic: HashMap<ClaimTopic, Vec<Address>>,
    limits: RegistryLimits,
}

impl IssuerTable {
    /// Create an empty table.
    pub fn new(limits: RegistryLimits) -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
            by_topic: HashMap::new(),
            limits,
        }
    }

    /// Rebuild a table from entries in enumeration order.
    ///
    /// Fails with `InvalidArgument` on any invariant violation and with
    /// `LimitExceeded` if the entries do not fit `limits`.
    pub fn from_entries(
        entries: Vec<RegistryEntry>,
        limits: RegistryLimits,
    ) -> Result<Self, RegistryError> {
        let order: Vec<Address> = entries.iter().map(|entry| entry.issuer).collect();
        invariant_unique_issuers(&order)?;
        if order.len() > limits.max_issuers {
            return Err(RegistryError::LimitExceeded {
                what: "issuers",
                limit: limits.max_issuers,
            });
        }

        let mut table = Self::new(limits);
        for entry in entries {
            invariant_valid_topics(&entry.issuer, entry.claim_topics.as_slice())?;
            if entry.claim_topics.len() > limits.max_topics_per_issuer {
                return Err(RegistryError::LimitExceeded {
                    what: "claim topics per issuer",
                    limit: limits.max_topics_per_issuer,
                });
            }
            table.index_topics(&entry.issuer, entry.claim_topics.as_slice());
            table.order.push(entry.issuer);
            table.entries.insert(entry.issuer, entry.claim_topics);
        }

        table.check_invariants()?;
        Ok(table)
    }

    /// Rebuild a table from a snapshot's entries.
    pub fn from_snapshot(
        snapshot: &RegistrySnapshot,
        limits: RegistryLimits,
    ) -> Result<Self, RegistryError> {
        Self::from_entries(snapshot.entries.clone(), limits)
    }

    /// Configured bounds.
    pub fn limits(&self) -> RegistryLimits {
        self.limits
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Register `issuer` with `topics` (deduplicated).
    ///
    /// Returns the stored topic set.
    pub fn insert(
        &mut self,
        issuer: Address,
        topics: &[ClaimTopic],
    ) -> Result<TopicSet, RegistryError> {
        ensure_not_zero(&issuer, "issuer")?;
        if self.entries.contains_key(&issuer) {
            return Err(RegistryError::AlreadyExists(issuer));
        }
        let topics = self.validate_topics(topics)?;
        if self.order.len() >= self.limits.max_issuers {
            return Err(RegistryError::LimitExceeded {
                what: "issuers",
                limit: self.limits.max_issuers,
            });
        }

        self.index_topics(&issuer, topics.as_slice());
        self.order.push(issuer);
        self.entries.insert(issuer, topics.clone());
        self.debug_check();
        Ok(topics)
    }

    /// Remove `issuer`, keeping the relative order of the others.
    ///
    /// Returns the topic set the issuer held.
    pub fn remove(&mut self, issuer: &Address) -> Result<TopicSet, RegistryError> {
        let topics = self
            .entries
            .remove(issuer)
            .ok_or(RegistryError::NotFound(*issuer))?;

        self.order.retain(|registered| registered != issuer);
        self.unindex_topics(issuer, topics.iter());
        self.debug_check();
        Ok(topics)
    }

    /// Replace the topic set of `issuer` in place.
    ///
    /// The issuer keeps its enumeration position. In the topic index it keeps
    /// its position for topics present before and after, and is appended for
    /// newly granted topics. Returns the new topic set.
    pub fn replace_topics(
        &mut self,
        issuer: &Address,
        topics: &[ClaimTopic],
    ) -> Result<TopicSet, RegistryError> {
        if !self.entries.contains_key(issuer) {
            return Err(RegistryError::NotFound(*issuer));
        }
        let new_topics = self.validate_topics(topics)?;

        let old_topics = match self.entries.insert(*issuer, new_topics.clone()) {
            Some(old) => old,
            None => return Err(RegistryError::NotFound(*issuer)),
        };
        let revoked: Vec<ClaimTopic> = old_topics
            .iter()
            .filter(|topic| !new_topics.contains(*topic))
            .collect();
        let granted: Vec<ClaimTopic> = new_topics
            .iter()
            .filter(|topic| !old_topics.contains(*topic))
            .collect();

        self.unindex_topics(issuer, revoked.into_iter());
        self.index_topics(issuer, &granted);
        self.debug_check();
        Ok(new_topics)
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Whether `issuer` is registered.
    pub fn contains(&self, issuer: &Address) -> bool {
        self.entries.contains_key(issuer)
    }

    /// Topic set of `issuer`, if registered.
    pub fn topics(&self, issuer: &Address) -> Option<&TopicSet> {
        self.entries.get(issuer)
    }

    /// Whether `issuer` is registered and trusted for `topic`.
    pub fn has_topic(&self, issuer: &Address, topic: ClaimTopic) -> bool {
        self.entries
            .get(issuer)
            .is_some_and(|topics| topics.contains(topic))
    }

    /// Registered issuers in registration order.
    pub fn issuers(&self) -> &[Address] {
        &self.order
    }

    /// Issuers trusted for `topic`, in the order the grant was made.
    pub fn issuers_for_topic(&self, topic: ClaimTopic) -> &[Address] {
        self.by_topic.get(&topic).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of registered issuers.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when no issuer is registered.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Entries in registration order.
    pub fn entries(&self) -> Vec<RegistryEntry> {
        self.order
            .iter()
            .filter_map(|issuer| {
                self.entries.get(issuer).map(|topics| RegistryEntry {
                    issuer: *issuer,
                    claim_topics: topics.clone(),
                })
            })
            .collect()
    }

    /// Verify every structural invariant.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        invariant_unique_issuers(&self.order)?;
        invariant_order_matches_entries(&self.order, &self.entries)?;
        for (issuer, topics) in &self.entries {
            invariant_valid_topics(issuer, topics.as_slice())?;
        }
        invariant_topic_index_consistent(&self.entries, &self.by_topic)
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn validate_topics(&self, topics: &[ClaimTopic]) -> Result<TopicSet, RegistryError> {
        let topics = TopicSet::from_topics(topics);
        if topics.is_empty() {
            return Err(RegistryError::InvalidArgument(
                "claim topic set must not be empty".to_string(),
            ));
        }
        if topics.len() > self.limits.max_topics_per_issuer {
            return Err(RegistryError::LimitExceeded {
                what: "claim topics per issuer",
                limit: self.limits.max_topics_per_issuer,
            });
        }
        Ok(topics)
    }

    fn index_topics(&mut self, issuer: &Address, topics: &[ClaimTopic]) {
        for topic in topics {
            self.by_topic.entry(*topic).or_default().push(*issuer);
        }
    }

    fn unindex_topics(&mut self, issuer: &Address, topics: impl Iterator<Item = ClaimTopic>) {
        for topic in topics {
            if let Some(issuers) = self.by_topic.get_mut(&topic) {
                issuers.retain(|indexed| indexed != issuer);
                if issuers.is_empty() {
                    self.by_topic.remove(&topic);
                }
            }
        }
    }

    fn debug_check(&self) {
        debug_assert!(
            self.check_invariants().is_ok(),
            "issuer table invariant broken: {:?}",
            self.check_invariants()
        );
    }
}

fn ensure_not_zero(address: &Address, role: &str) -> Result<(), RegistryError> {
    if is_zero_address(address) {
        return Err(RegistryError::InvalidArgument(format!(
            "{role} must not be the zero address"
        )));
    }
    Ok(())
}

/// Reject the null principal as a new owner.
pub fn ensure_valid_owner(new_owner: &Address) -> Result<(), RegistryError> {
    ensure_not_zero(new_owner, "owner")
}
