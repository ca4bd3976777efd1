//! # Outbound Ports
//!
//! Traits for external dependencies: the owner capability and snapshot
//! persistence. Notifications go out through `shared_bus::EventPublisher`.

use crate::domain::{RegistryError, RegistrySnapshot};
use parking_lot::Mutex;
use shared_bus::{EventPublisher, RegistryEvent};
use shared_types::Address;

/// Owner capability - outbound port.
///
/// The registry only consumes the answer to "is this caller the owner"; how
/// the answer is reached is up to the implementation. The capability lives
/// inside the registry's lock so that ownership checks and mutations are
/// serialized together.
pub trait AccessControl: Send + Sync {
    /// Whether `caller` currently holds the owner capability.
    fn is_owner(&self, caller: &Address) -> bool;

    /// The current owner.
    fn owner(&self) -> Address;

    /// Reassign the owner capability. Callers have already checked that the
    /// request comes from the current owner.
    ///
    /// Returns the previous owner.
    fn transfer_ownership(&mut self, new_owner: Address) -> Result<Address, RegistryError>;
}

/// Snapshot persistence - outbound port.
pub trait SnapshotStore: Send + Sync {
    /// Persist a snapshot, replacing any previous one.
    fn save(&self, snapshot: &RegistrySnapshot) -> Result<(), RegistryError>;

    /// Load the last saved snapshot, or `None` if nothing was saved.
    fn load(&self) -> Result<Option<RegistrySnapshot>, RegistryError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Publisher that records every event, for assertions in tests.
#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<RegistryEvent>>,
}

impl RecordingPublisher {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the recorded events, in publish order.
    pub fn events(&self) -> Vec<RegistryEvent> {
        self.events.lock().clone()
    }

    /// Forget recorded events.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(&self, event: RegistryEvent) -> usize {
        self.events.lock().push(event);
        1
    }

    fn events_published(&self) -> u64 {
        self.events.lock().len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_publisher_keeps_order() {
        let publisher = RecordingPublisher::new();
        publisher.publish(RegistryEvent::TrustedIssuerRemoved { issuer: [1u8; 20] });
        publisher.publish(RegistryEvent::TrustedIssuerRemoved { issuer: [2u8; 20] });

        let events = publisher.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], RegistryEvent::TrustedIssuerRemoved { issuer: [2u8; 20] });
        assert_eq!(publisher.events_published(), 2);

        publisher.clear();
        assert!(publisher.events().is_empty());
    }
}
