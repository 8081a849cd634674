//! Mint operations and the ledger that owns them
//!
//! The ledger is an arena: operations are appended and never removed.
//! Revoking or finalizing vacates a slot in place (`amount == 0`), and
//! [`OperationLedger::invalidate_all`] bumps a generation counter so every
//! existing index turns stale without being touched.

use chrono::{DateTime, Utc};
use mintgate_core::{Address, Amount};
use serde::{Deserialize, Serialize};

use crate::error::{ControllerError, ControllerResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintOperation {
    pub recipient: Address,
    pub amount: Amount,
    pub requester: Address,
    /// Distinct approvers in signing order
    pub approvals: Vec<Address>,
    /// `None` once vacated
    pub requested_at: Option<DateTime<Utc>>,
    pub paused: bool,
    /// Ledger generation the operation was created in
    pub generation: u64,
}

impl MintOperation {
    pub fn is_vacated(&self) -> bool {
        self.amount.is_zero()
    }

    pub fn approval_count(&self) -> usize {
        self.approvals.len()
    }

    pub fn has_approved(&self, approver: &Address) -> bool {
        self.approvals.contains(approver)
    }

    /// Returns false if `approver` already signed
    fn add_approval(&mut self, approver: Address) -> bool {
        if self.has_approved(&approver) {
            return false;
        }
        self.approvals.push(approver);
        true
    }

    /// Zero the slot in place. Requester and generation are kept for audit.
    fn vacate(&mut self) {
        self.recipient = Address::null();
        self.amount = Amount::ZERO;
        self.approvals.clear();
        self.requested_at = None;
        self.paused = false;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationLedger {
    operations: Vec<MintOperation>,
    generation: u64,
}

impl OperationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Raw slot, regardless of vacancy or generation
    pub fn get(&self, index: usize) -> Option<&MintOperation> {
        self.operations.get(index)
    }

    pub fn operations(&self) -> &[MintOperation] {
        &self.operations
    }

    /// Operations that can still be approved or finalized
    pub fn pending(&self) -> impl Iterator<Item = (usize, &MintOperation)> {
        self.operations
            .iter()
            .enumerate()
            .filter(move |(_, op)| !op.is_vacated() && op.generation == self.generation)
    }

    /// Existing, not vacated, current generation
    pub fn live(&self, index: usize) -> ControllerResult<&MintOperation> {
        let op = self
            .operations
            .get(index)
            .ok_or(ControllerError::OperationNotFound(index))?;
        if op.is_vacated() {
            return Err(ControllerError::OperationVacated(index));
        }
        if op.generation != self.generation {
            return Err(ControllerError::StaleOperation {
                index,
                generation: op.generation,
            });
        }
        Ok(op)
    }

    fn live_mut(&mut self, index: usize) -> ControllerResult<&mut MintOperation> {
        self.live(index)?;
        self.operations
            .get_mut(index)
            .ok_or(ControllerError::OperationNotFound(index))
    }

    /// Append a fresh operation in the current generation; returns its index
    pub fn append(
        &mut self,
        recipient: Address,
        amount: Amount,
        requester: Address,
        requested_at: DateTime<Utc>,
    ) -> usize {
        self.operations.push(MintOperation {
            recipient,
            amount,
            requester,
            approvals: Vec::new(),
            requested_at: Some(requested_at),
            paused: false,
            generation: self.generation,
        });
        self.operations.len() - 1
    }

    /// Record an approval; returns the new approval count
    pub fn approve(&mut self, index: usize, approver: &Address) -> ControllerResult<usize> {
        let op = self.live_mut(index)?;
        if !op.add_approval(approver.clone()) {
            return Err(ControllerError::AlreadyApproved {
                index,
                approver: approver.clone(),
            });
        }
        Ok(op.approval_count())
    }

    pub fn set_paused(&mut self, index: usize, paused: bool) -> ControllerResult<()> {
        self.live_mut(index)?.paused = paused;
        Ok(())
    }

    /// Vacate a live slot; returns the operation as it was
    pub fn vacate(&mut self, index: usize) -> ControllerResult<MintOperation> {
        let op = self.live_mut(index)?;
        let previous = op.clone();
        op.vacate();
        Ok(previous)
    }

    /// Make every existing index stale; returns the new generation
    pub fn invalidate_all(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }
}
