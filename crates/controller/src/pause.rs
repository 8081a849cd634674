//! Emergency pause relay
//!
//! An out-of-band trigger for the global pause. The relay has its own
//! identity and a set of pause keys managed by its owner; a trigger from a
//! registered key calls [`MintController::pause_mints`] as the relay, so
//! the relay identity itself must be a guardian.

use mintgate_core::Address;
use std::collections::BTreeSet;

use crate::controller::MintController;
use crate::error::{ControllerError, ControllerResult};

pub struct PauseRelay {
    address: Address,
    owner: Address,
    pause_keys: BTreeSet<Address>,
}

impl PauseRelay {
    pub fn new(address: Address, owner: Address) -> ControllerResult<Self> {
        if address.is_null() || owner.is_null() {
            return Err(ControllerError::NullAddress);
        }
        Ok(Self {
            address,
            owner,
            pause_keys: BTreeSet::new(),
        })
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn is_pause_key(&self, who: &Address) -> bool {
        self.pause_keys.contains(who)
    }

    /// Enable or disable a pause key (relay owner only)
    pub fn modify_pause_key(&mut self, caller: &Address, key: Address, enabled: bool) -> ControllerResult<()> {
        if caller != &self.owner {
            return Err(ControllerError::Unauthorized {
                caller: caller.clone(),
                action: "modify pause keys",
            });
        }
        if key.is_null() {
            return Err(ControllerError::NullAddress);
        }
        if enabled {
            self.pause_keys.insert(key.clone());
        } else {
            self.pause_keys.remove(&key);
        }
        tracing::info!(relay = %self.address, key = %key, enabled, "Pause key modified");
        Ok(())
    }

    /// Pause all mints on behalf of a registered pause key
    pub fn trigger(&self, sender: &Address, controller: &mut MintController) -> ControllerResult<()> {
        if !self.is_pause_key(sender) {
            tracing::warn!(relay = %self.address, sender = %sender, "Pause relay triggered by unknown key");
            return Err(ControllerError::Unauthorized {
                caller: sender.clone(),
                action: "trigger the pause relay",
            });
        }
        tracing::warn!(relay = %self.address, sender = %sender, "Emergency pause triggered");
        controller.pause_mints(&self.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_relay_owner_manages_keys() {
        let mut relay = PauseRelay::new(Address::new("relay"), Address::new("owner")).unwrap();
        let key = Address::new("pager");

        assert!(relay
            .modify_pause_key(&Address::new("mallory"), key.clone(), true)
            .is_err());
        relay
            .modify_pause_key(&Address::new("owner"), key.clone(), true)
            .unwrap();
        assert!(relay.is_pause_key(&key));

        relay
            .modify_pause_key(&Address::new("owner"), key.clone(), false)
            .unwrap();
        assert!(!relay.is_pause_key(&key));
    }

    #[test]
    fn test_null_key_rejected() {
        let mut relay = PauseRelay::new(Address::new("relay"), Address::new("owner")).unwrap();
        assert!(matches!(
            relay.modify_pause_key(&Address::new("owner"), Address::null(), true),
            Err(ControllerError::NullAddress)
        ));
    }
}
