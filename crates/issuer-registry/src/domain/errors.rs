//! # Domain Errors
//!
//! Error types for the issuer registry. Every failure is deterministic given
//! the current state and arguments; none is transient and none is retried.

use shared_types::{format_address, Address};
use thiserror::Error;

/// Registry error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Caller lacks the owner capability for a mutating call.
    #[error("Unauthorized: {} is not the registry owner", format_address(.caller))]
    Unauthorized {
        /// The rejected caller.
        caller: Address,
    },

    /// Add on an issuer that is already registered.
    #[error("Issuer already registered: {}", format_address(.0))]
    AlreadyExists(Address),

    /// Remove, update or topic lookup on an unregistered issuer.
    #[error("Issuer not registered: {}", format_address(.0))]
    NotFound(Address),

    /// Empty topic set, null address, or malformed snapshot.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A configured bound on issuers or topics would be exceeded.
    #[error("Limit exceeded: at most {limit} {what}")]
    LimitExceeded {
        /// What is bounded.
        what: &'static str,
        /// The bound.
        limit: usize,
    },

    /// Snapshot store failure.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl RegistryError {
    /// Short kind name, as used in logs and statistics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "unauthorized",
            Self::AlreadyExists(_) => "already_exists",
            Self::NotFound(_) => "not_found",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::LimitExceeded { .. } => "limit_exceeded",
            Self::Storage(_) => "storage",
        }
    }
}

/// A broken structural invariant of the issuer table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// An issuer appears more than once.
    #[error("issuer {} appears more than once", format_address(.0))]
    DuplicateIssuer(Address),

    /// An entry exists with no topics.
    #[error("issuer {} has an empty topic set", format_address(.0))]
    EmptyTopics(Address),

    /// A topic appears twice in one entry.
    #[error("issuer {} lists topic {topic} more than once", format_address(.issuer))]
    DuplicateTopic {
        /// Offending issuer.
        issuer: Address,
        /// Repeated topic.
        topic: u64,
    },

    /// The null address is registered as an issuer.
    #[error("the zero address is registered as an issuer")]
    ZeroIssuer,

    /// Enumeration order and lookup table disagree.
    #[error("enumeration order and lookup table disagree: {0}")]
    OrderMismatch(String),

    /// Topic index and lookup table disagree.
    #[error("topic index and lookup table disagree: {0}")]
    TopicIndexMismatch(String),
}

impl From<InvariantViolation> for RegistryError {
    fn from(violation: InvariantViolation) -> Self {
        Self::InvalidArgument(violation.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_error_shows_caller() {
        let err = RegistryError::Unauthorized { caller: [0xAB; 20] };
        assert!(err.to_string().contains(&"ab".repeat(20)));
        assert_eq!(err.kind(), "unauthorized");
    }

    #[test]
    fn test_not_found_error() {
        let err = RegistryError::NotFound([1u8; 20]);
        assert!(err.to_string().contains("not registered"));
    }

    #[test]
    fn test_limit_exceeded_error() {
        let err = RegistryError::LimitExceeded {
            what: "issuers",
            limit: 50,
        };
        assert_eq!(err.to_string(), "Limit exceeded: at most 50 issuers");
    }

    #[test]
    fn test_violation_becomes_invalid_argument() {
        let err: RegistryError = InvariantViolation::EmptyTopics([2u8; 20]).into();
        assert!(matches!(
            err,
            RegistryError::InvalidArgument(ref msg) if msg.contains("empty topic set")
        ));
    }
}
