//! # Domain Entities
//!
//! Registry entries and the serializable registry snapshot.

use super::value_objects::TopicSet;
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};
use shared_types::{Address, ClaimTopic};

/// Snapshot format version.
pub const SNAPSHOT_VERSION: u16 = 1;

/// Association between one issuer and the topics it is trusted to emit.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    /// The trusted issuer.
    #[serde_as(as = "Hex")]
    pub issuer: Address,
    /// Topics the issuer is trusted for. Never empty while the entry exists.
    pub claim_topics: TopicSet,
}

impl RegistryEntry {
    /// Create an entry from a raw topic list (deduplicated).
    pub fn new(issuer: Address, claim_topics: &[ClaimTopic]) -> Self {
        Self {
            issuer,
            claim_topics: TopicSet::from_topics(claim_topics),
        }
    }
}

/// Full registry state: owner plus entries in enumeration order.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    /// Format version.
    pub version: u16,
    /// Principal holding the owner capability when the snapshot was taken.
    #[serde_as(as = "Hex")]
    pub owner: Address,
    /// Entries in registration order.
    pub entries: Vec<RegistryEntry>,
}

impl RegistrySnapshot {
    /// Create a snapshot at the current format version.
    pub fn new(owner: Address, entries: Vec<RegistryEntry>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            owner,
            entries,
        }
    }

    /// Issuers in registration order.
    pub fn issuers(&self) -> Vec<Address> {
        self.entries.iter().map(|entry| entry.issuer).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_dedups_topics() {
        let entry = RegistryEntry::new([1u8; 20], &[5, 5, 6]);
        assert_eq!(entry.claim_topics.as_slice(), &[5, 6]);
    }

    #[test]
    fn test_snapshot_json_shape() {
        let snapshot = RegistrySnapshot::new(
            [0xAA; 20],
            vec![RegistryEntry::new([0xBB; 20], &[1, 2])],
        );
        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["version"], 1);
        assert_eq!(json["owner"], "aa".repeat(20));
        assert_eq!(json["entries"][0]["issuer"], "bb".repeat(20));
        assert_eq!(json["entries"][0]["claim_topics"], serde_json::json!([1, 2]));
    }

    #[test]
    fn test_snapshot_issuers_in_order() {
        let snapshot = RegistrySnapshot::new(
            [0xAA; 20],
            vec![
                RegistryEntry::new([2u8; 20], &[1]),
                RegistryEntry::new([1u8; 20], &[1]),
            ],
        );
        assert_eq!(snapshot.issuers(), vec![[2u8; 20], [1u8; 20]]);
    }
}
