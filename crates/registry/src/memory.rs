//! In-memory attribute registry
//!
//! Shared behind an `Arc`; attributes can be granted or withdrawn at any
//! time and the controller sees the change on its next call.

use mintgate_core::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use crate::error::RegistryError;
use crate::AttributeRegistry;

/// One attribute assignment, as stored on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeGrant {
    pub address: Address,
    pub attribute: String,
    pub value: u64,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone)]
struct AttributeValue {
    value: u64,
    notes: String,
}

/// Registry backed by a map of address -> attribute -> value
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    attributes: RwLock<HashMap<Address, HashMap<String, AttributeValue>>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a list of grants
    pub fn from_grants(grants: impl IntoIterator<Item = AttributeGrant>) -> Result<Self, RegistryError> {
        let registry = Self::new();
        for grant in grants {
            registry.set_attribute(&grant.address, &grant.attribute, grant.value, &grant.notes)?;
        }
        Ok(registry)
    }

    /// Load grants from a JSON array file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let content = std::fs::read_to_string(path)?;
        let grants: Vec<AttributeGrant> = serde_json::from_str(&content)?;
        Self::from_grants(grants)
    }

    /// Write all grants as a JSON array file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RegistryError> {
        let json = serde_json::to_string_pretty(&self.grants())?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Set (or overwrite) an attribute. A value of 0 means "not set".
    pub fn set_attribute(
        &self,
        who: &Address,
        attribute: &str,
        value: u64,
        notes: &str,
    ) -> Result<(), RegistryError> {
        if attribute.trim().is_empty() {
            return Err(RegistryError::EmptyAttribute);
        }
        let mut attributes = self.attributes.write().unwrap_or_else(|e| e.into_inner());
        attributes.entry(who.clone()).or_default().insert(
            attribute.to_string(),
            AttributeValue {
                value,
                notes: notes.to_string(),
            },
        );
        tracing::debug!(address = %who, attribute, value, "Attribute set");
        Ok(())
    }

    /// Remove an attribute entirely; returns whether it was present
    pub fn clear_attribute(&self, who: &Address, attribute: &str) -> bool {
        let mut attributes = self.attributes.write().unwrap_or_else(|e| e.into_inner());
        let removed = attributes
            .get_mut(who)
            .and_then(|entries| entries.remove(attribute))
            .is_some();
        if removed {
            tracing::debug!(address = %who, attribute, "Attribute cleared");
        }
        removed
    }

    /// Raw stored value (0 when absent)
    pub fn attribute_value(&self, who: &Address, attribute: &str) -> u64 {
        let attributes = self.attributes.read().unwrap_or_else(|e| e.into_inner());
        attributes
            .get(who)
            .and_then(|entries| entries.get(attribute))
            .map(|entry| entry.value)
            .unwrap_or(0)
    }

    /// All grants, sorted by address then attribute for stable output
    pub fn grants(&self) -> Vec<AttributeGrant> {
        let attributes = self.attributes.read().unwrap_or_else(|e| e.into_inner());
        let mut grants: Vec<AttributeGrant> = attributes
            .iter()
            .flat_map(|(address, entries)| {
                entries.iter().map(move |(attribute, entry)| AttributeGrant {
                    address: address.clone(),
                    attribute: attribute.clone(),
                    value: entry.value,
                    notes: entry.notes.clone(),
                })
            })
            .collect();
        grants.sort_by(|a, b| (&a.address, &a.attribute).cmp(&(&b.address, &b.attribute)));
        grants
    }
}

impl AttributeRegistry for InMemoryRegistry {
    fn name(&self) -> &str {
        "in-memory"
    }

    fn has_attribute(&self, who: &Address, attribute: &str) -> bool {
        self.attribute_value(who, attribute) != 0
    }
}
