//! # Registry Events
//!
//! Defines the notifications that flow through the shared bus.
//! Each variant corresponds to one successful registry mutation.

use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};
use shared_types::entities::{Address, ClaimTopic};

/// All notifications that can be published to the bus.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryEvent {
    // =========================================================================
    // ISSUER LIFECYCLE
    // =========================================================================
    /// An issuer was registered with its topic set.
    TrustedIssuerAdded {
        /// The registered issuer.
        #[serde_as(as = "Hex")]
        issuer: Address,
        /// Topics the issuer is trusted for, deduplicated, in stored order.
        claim_topics: Vec<ClaimTopic>,
    },

    /// An issuer was removed from the registry.
    TrustedIssuerRemoved {
        /// The removed issuer.
        #[serde_as(as = "Hex")]
        issuer: Address,
    },

    /// An issuer's topic set was replaced.
    ClaimTopicsUpdated {
        /// The updated issuer.
        #[serde_as(as = "Hex")]
        issuer: Address,
        /// The new topic set.
        claim_topics: Vec<ClaimTopic>,
    },

    // =========================================================================
    // ADMINISTRATION
    // =========================================================================
    /// The owner capability moved to a new principal.
    OwnershipTransferred {
        /// Owner before the transfer.
        #[serde_as(as = "Hex")]
        previous_owner: Address,
        /// Owner after the transfer.
        #[serde_as(as = "Hex")]
        new_owner: Address,
    },
}

impl RegistryEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::TrustedIssuerAdded { .. }
            | Self::TrustedIssuerRemoved { .. }
            | Self::ClaimTopicsUpdated { .. } => EventTopic::Issuers,
            Self::OwnershipTransferred { .. } => EventTopic::Ownership,
        }
    }

    /// The issuer this event concerns, if any.
    #[must_use]
    pub fn issuer(&self) -> Option<&Address> {
        match self {
            Self::TrustedIssuerAdded { issuer, .. }
            | Self::TrustedIssuerRemoved { issuer }
            | Self::ClaimTopicsUpdated { issuer, .. } => Some(issuer),
            Self::OwnershipTransferred { .. } => None,
        }
    }

    /// Short event name, as used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::TrustedIssuerAdded { .. } => "TrustedIssuerAdded",
            Self::TrustedIssuerRemoved { .. } => "TrustedIssuerRemoved",
            Self::ClaimTopicsUpdated { .. } => "ClaimTopicsUpdated",
            Self::OwnershipTransferred { .. } => "OwnershipTransferred",
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Issuer added, removed or updated.
    Issuers,
    /// Owner capability changes.
    Ownership,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Issuers to include. Empty means all issuers.
    ///
    /// Events that concern no issuer (ownership transfers) only pass when
    /// this list is empty.
    pub issuers: Vec<Address>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            issuers: Vec::new(),
        }
    }

    /// Create a filter for events about specific issuers.
    #[must_use]
    pub fn for_issuers(issuers: Vec<Address>) -> Self {
        Self {
            topics: Vec::new(),
            issuers,
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &RegistryEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let issuer_match = self.issuers.is_empty()
            || event
                .issuer()
                .is_some_and(|issuer| self.issuers.contains(issuer));

        topic_match && issuer_match
    }
}
