//! Access control
//!
//! The controller owns exactly two identities, `owner` and `mint_key`.
//! Approver, checker and KYC status come from the attribute registry.
//! A guardian is the owner or any address carrying the checker capability.

use mintgate_core::Address;
use mintgate_registry::{AttributeRegistry, Capability};
use serde::{Deserialize, Serialize};

use crate::error::{ControllerError, ControllerResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roles {
    owner: Address,
    #[serde(default)]
    pending_owner: Option<Address>,
    /// Null until the owner assigns a mint key
    #[serde(default = "Address::null")]
    mint_key: Address,
}

fn unauthorized(caller: &Address, action: &'static str) -> ControllerError {
    ControllerError::Unauthorized {
        caller: caller.clone(),
        action,
    }
}

impl Roles {
    pub fn new(owner: Address) -> ControllerResult<Self> {
        if owner.is_null() {
            return Err(ControllerError::NullAddress);
        }
        Ok(Self {
            owner,
            pending_owner: None,
            mint_key: Address::null(),
        })
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    pub fn mint_key(&self) -> &Address {
        &self.mint_key
    }

    pub fn pending_owner(&self) -> Option<&Address> {
        self.pending_owner.as_ref()
    }

    pub fn is_owner(&self, caller: &Address) -> bool {
        &self.owner == caller
    }

    pub fn is_mint_key(&self, caller: &Address) -> bool {
        !self.mint_key.is_null() && &self.mint_key == caller
    }

    pub fn is_guardian(&self, caller: &Address, registry: &dyn AttributeRegistry) -> bool {
        self.is_owner(caller) || registry.has_capability(caller, Capability::MintChecker)
    }

    pub fn require_owner(&self, caller: &Address, action: &'static str) -> ControllerResult<()> {
        if self.is_owner(caller) {
            Ok(())
        } else {
            Err(unauthorized(caller, action))
        }
    }

    pub fn require_owner_or_mint_key(
        &self,
        caller: &Address,
        action: &'static str,
    ) -> ControllerResult<()> {
        if self.is_owner(caller) || self.is_mint_key(caller) {
            Ok(())
        } else {
            Err(unauthorized(caller, action))
        }
    }

    pub fn require_guardian(
        &self,
        caller: &Address,
        registry: &dyn AttributeRegistry,
        action: &'static str,
    ) -> ControllerResult<()> {
        if self.is_guardian(caller, registry) {
            Ok(())
        } else {
            Err(unauthorized(caller, action))
        }
    }

    /// Capability check with no owner override
    pub fn require_capability(
        &self,
        caller: &Address,
        registry: &dyn AttributeRegistry,
        capability: Capability,
        action: &'static str,
    ) -> ControllerResult<()> {
        if registry.has_capability(caller, capability) {
            Ok(())
        } else {
            Err(unauthorized(caller, action))
        }
    }

    /// Rotate the mint key (owner or the current key); returns the old key
    pub fn transfer_mint_key(&mut self, caller: &Address, new_key: Address) -> ControllerResult<Address> {
        self.require_owner_or_mint_key(caller, "transfer the mint key")?;
        if new_key.is_null() {
            return Err(ControllerError::NullAddress);
        }
        Ok(std::mem::replace(&mut self.mint_key, new_key))
    }

    /// First half of the ownership handover
    pub fn begin_ownership_transfer(&mut self, caller: &Address, new_owner: Address) -> ControllerResult<()> {
        self.require_owner(caller, "transfer ownership")?;
        if new_owner.is_null() {
            return Err(ControllerError::NullAddress);
        }
        self.pending_owner = Some(new_owner);
        Ok(())
    }

    /// Second half: only the pending owner may claim. Returns the old owner.
    pub fn claim_ownership(&mut self, caller: &Address) -> ControllerResult<Address> {
        match &self.pending_owner {
            None => Err(ControllerError::NoPendingOwner),
            Some(pending) if pending != caller => Err(unauthorized(caller, "claim ownership")),
            Some(_) => {
                self.pending_owner = None;
                Ok(std::mem::replace(&mut self.owner, caller.clone()))
            }
        }
    }
}
