//! Mintgate Registry - attribute-based capabilities
//!
//! The controller never owns approver, checker or KYC state. It asks an
//! [`AttributeRegistry`] whether an address carries a named attribute,
//! and maps the answer onto a [`Capability`].

pub mod capability;
pub mod error;
pub mod memory;

pub use capability::Capability;
pub use error::RegistryError;
pub use memory::{AttributeGrant, InMemoryRegistry};

use mintgate_core::Address;

/// Read-only view over an externally managed attribute store
pub trait AttributeRegistry: Send + Sync {
    /// Name used in logs and replacement events
    fn name(&self) -> &str {
        "attribute-registry"
    }

    /// Does `who` carry a non-zero value for `attribute`?
    fn has_attribute(&self, who: &Address, attribute: &str) -> bool;

    /// Capability lookup in terms of the attribute it is stored under
    fn has_capability(&self, who: &Address, capability: Capability) -> bool {
        self.has_attribute(who, capability.attribute_name())
    }
}
