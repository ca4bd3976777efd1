//! # Domain Value Objects
//!
//! Immutable value types for the issuer registry.

use serde::{Deserialize, Serialize};
use shared_types::ClaimTopic;
use std::collections::HashSet;

/// Default bound on registered issuers.
pub const DEFAULT_MAX_ISSUERS: usize = 50;

/// Default bound on topics per issuer.
pub const DEFAULT_MAX_TOPICS_PER_ISSUER: usize = 15;

/// Duplicate-free topic sequence.
///
/// Semantically a set; the first-occurrence order of the input is kept so
/// that reads are reproducible.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicSet(Vec<ClaimTopic>);

impl TopicSet {
    /// Build from a caller-supplied list, dropping repeats.
    #[must_use]
    pub fn from_topics(topics: &[ClaimTopic]) -> Self {
        let mut seen = HashSet::with_capacity(topics.len());
        Self(
            topics
                .iter()
                .copied()
                .filter(|topic| seen.insert(*topic))
                .collect(),
        )
    }

    /// Membership test.
    #[must_use]
    pub fn contains(&self, topic: ClaimTopic) -> bool {
        self.0.contains(&topic)
    }

    /// Number of topics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no topics are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Topics in stored order.
    pub fn iter(&self) -> impl Iterator<Item = ClaimTopic> + '_ {
        self.0.iter().copied()
    }

    /// Topics as a slice, in stored order.
    #[must_use]
    pub fn as_slice(&self) -> &[ClaimTopic] {
        &self.0
    }

    /// Owned copy of the topics.
    #[must_use]
    pub fn to_vec(&self) -> Vec<ClaimTopic> {
        self.0.clone()
    }
}

/// Bounds on registry size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryLimits {
    /// Maximum number of registered issuers.
    pub max_issuers: usize,
    /// Maximum distinct topics per issuer.
    pub max_topics_per_issuer: usize,
}

impl Default for RegistryLimits {
    fn default() -> Self {
        Self {
            max_issuers: DEFAULT_MAX_ISSUERS,
            max_topics_per_issuer: DEFAULT_MAX_TOPICS_PER_ISSUER,
        }
    }
}
