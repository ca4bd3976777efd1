//! Ownable Access Adapter
//!
//! Implements `AccessControl` with a single owner principal.

use crate::domain::{ensure_valid_owner, RegistryError};
use crate::ports::outbound::AccessControl;
use shared_types::{format_address, Address};
use tracing::debug;

/// Single-owner capability.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnableAccess {
    owner: Address,
}

impl OwnableAccess {
    /// Create with an initial owner. The zero address is rejected.
    pub fn new(owner: Address) -> Result<Self, RegistryError> {
        ensure_valid_owner(&owner)?;
        Ok(Self { owner })
    }
}

impl AccessControl for OwnableAccess {
    fn is_owner(&self, caller: &Address) -> bool {
        *caller == self.owner
    }

    fn owner(&self) -> Address {
        self.owner
    }

    fn transfer_ownership(&mut self, new_owner: Address) -> Result<Address, RegistryError> {
        ensure_valid_owner(&new_owner)?;
        if new_owner == self.owner {
            return Err(RegistryError::InvalidArgument(
                "new owner is already the owner".to_string(),
            ));
        }

        let previous = std::mem::replace(&mut self.owner, new_owner);
        debug!(
            previous = %format_address(&previous),
            new = %format_address(&new_owner),
            "Owner capability reassigned"
        );
        Ok(previous)
    }
}
