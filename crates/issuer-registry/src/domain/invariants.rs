//! # Domain Invariants
//!
//! Structural rules the issuer table must satisfy after every mutation.
//! Checked in full when a table is rebuilt from a snapshot and, in debug
//! builds, after each mutation.

use super::errors::InvariantViolation;
use super::value_objects::TopicSet;
use shared_types::{is_zero_address, Address, ClaimTopic};
use std::collections::{HashMap, HashSet};

/// Invariant: an issuer appears at most once, and never as the zero address.
pub fn invariant_unique_issuers(order: &[Address]) -> Result<(), InvariantViolation> {
    let mut seen = HashSet::with_capacity(order.len());
    for issuer in order {
        if is_zero_address(issuer) {
            return Err(InvariantViolation::ZeroIssuer);
        }
        if !seen.insert(issuer) {
            return Err(InvariantViolation::DuplicateIssuer(*issuer));
        }
    }
    Ok(())
}

/// Invariant: a topic set is non-empty and duplicate-free.
pub fn invariant_valid_topics(
    issuer: &Address,
    topics: &[ClaimTopic],
) -> Result<(), InvariantViolation> {
    if topics.is_empty() {
        return Err(InvariantViolation::EmptyTopics(*issuer));
    }
    let mut seen = HashSet::with_capacity(topics.len());
    for topic in topics {
        if !seen.insert(topic) {
            return Err(InvariantViolation::DuplicateTopic {
                issuer: *issuer,
                topic: *topic,
            });
        }
    }
    Ok(())
}

/// Invariant: enumeration order lists exactly the issuers in the lookup table.
pub fn invariant_order_matches_entries(
    order: &[Address],
    entries: &HashMap<Address, TopicSet>,
) -> Result<(), InvariantViolation> {
    if order.len() != entries.len() {
        return Err(InvariantViolation::OrderMismatch(format!(
            "{} enumerated, {} in table",
            order.len(),
            entries.len()
        )));
    }
    if let Some(stale) = order.iter().find(|issuer| !entries.contains_key(*issuer)) {
        return Err(InvariantViolation::OrderMismatch(format!(
            "{} enumerated but absent from table",
            shared_types::format_address(stale)
        )));
    }
    Ok(())
}

/// Invariant: the topic index is the exact inverse of the lookup table.
pub fn invariant_topic_index_consistent(
    entries: &HashMap<Address, TopicSet>,
    by_topic: &HashMap<ClaimTopic, Vec<Address>>,
) -> Result<(), InvariantViolation> {
    let mut pairs = 0usize;
    for (topic, issuers) in by_topic {
        if issuers.is_empty() {
            return Err(InvariantViolation::TopicIndexMismatch(format!(
                "topic {topic} indexed with no issuers"
            )));
        }
        for issuer in issuers {
            let trusted = entries.get(issuer).is_some_and(|set| set.contains(*topic));
            if !trusted {
                return Err(InvariantViolation::TopicIndexMismatch(format!(
                    "topic {topic} indexes {} which does not hold it",
                    shared_types::format_address(issuer)
                )));
            }
        }
        pairs += issuers.len();
    }

    let expected: usize = entries.values().map(TopicSet::len).sum();
    if pairs != expected {
        return Err(InvariantViolation::TopicIndexMismatch(format!(
            "{pairs} indexed pairs, {expected} held"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(pairs: &[(u8, &[ClaimTopic])]) -> HashMap<Address, TopicSet> {
        pairs
            .iter()
            .map(|(byte, topics)| ([*byte; 20], TopicSet::from_topics(topics)))
            .collect()
    }

    #[test]
    fn test_unique_issuers_pass() {
        assert!(invariant_unique_issuers(&[[1u8; 20], [2u8; 20]]).is_ok());
    }

    #[test]
    fn test_unique_issuers_duplicate() {
        let err = invariant_unique_issuers(&[[1u8; 20], [2u8; 20], [1u8; 20]]).unwrap_err();
        assert_eq!(err, InvariantViolation::DuplicateIssuer([1u8; 20]));
    }

    #[test]
    fn test_unique_issuers_zero() {
        let err = invariant_unique_issuers(&[[0u8; 20]]).unwrap_err();
        assert_eq!(err, InvariantViolation::ZeroIssuer);
    }

    #[test]
    fn test_valid_topics() {
        assert!(invariant_valid_topics(&[1u8; 20], &[1, 2]).is_ok());
        assert!(matches!(
            invariant_valid_topics(&[1u8; 20], &[]),
            Err(InvariantViolation::EmptyTopics(_))
        ));
        assert!(matches!(
            invariant_valid_topics(&[1u8; 20], &[4, 4]),
            Err(InvariantViolation::DuplicateTopic { topic: 4, .. })
        ));
    }

    #[test]
    fn test_order_matches_entries() {
        let entries = table(&[(1, &[1]), (2, &[2])]);
        assert!(invariant_order_matches_entries(&[[2u8; 20], [1u8; 20]], &entries).is_ok());
        assert!(invariant_order_matches_entries(&[[1u8; 20]], &entries).is_err());
        assert!(invariant_order_matches_entries(&[[1u8; 20], [3u8; 20]], &entries).is_err());
    }

    #[test]
    fn test_topic_index_consistent() {
        let entries = table(&[(1, &[1, 2]), (2, &[2])]);
        let mut index = HashMap::new();
        index.insert(1, vec![[1u8; 20]]);
        index.insert(2, vec![[1u8; 20], [2u8; 20]]);
        assert!(invariant_topic_index_consistent(&entries, &index).is_ok());

        // Missing pair
        index.insert(2, vec![[1u8; 20]]);
        assert!(invariant_topic_index_consistent(&entries, &index).is_err());

        // Stale pair
        index.insert(2, vec![[1u8; 20], [2u8; 20]]);
        index.insert(3, vec![[2u8; 20]]);
        assert!(invariant_topic_index_consistent(&entries, &index).is_err());
    }
}
