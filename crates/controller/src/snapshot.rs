//! Controller snapshots
//!
//! A snapshot is the complete owned state of a controller. Collaborators
//! (registry, calendar, clock, asset ledger) are not part of it and are
//! supplied again on restore.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::access::Roles;
use crate::config::PolicyConfig;
use crate::error::StoreError;
use crate::operation::OperationLedger;
use crate::quota::DailyQuota;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerSnapshot {
    pub roles: Roles,
    pub policy: PolicyConfig,
    pub quota: DailyQuota,
    pub ledger: OperationLedger,
    pub mints_paused: bool,
}

impl ControllerSnapshot {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
