//! Controller errors
//!
//! Every variant is a rejected call. A returned error always means no
//! controller state was changed.

use chrono::{DateTime, Utc};
use mintgate_calendar::{CalendarDate, CalendarError, ClosedReason};
use mintgate_core::{Address, Amount};
use thiserror::Error;

use crate::asset::AssetError;

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("{caller} is not authorized to {action}")]
    Unauthorized { caller: Address, action: &'static str },

    #[error("Recipient {0} has not passed KYC/AML")]
    RecipientNotVerified(Address),

    #[error("Mint amount must be greater than zero")]
    ZeroAmount,

    #[error("All mints are paused")]
    MintsPaused,

    #[error("Minting is closed: {0}")]
    MintingClosed(ClosedReason),

    #[error("Daily mint limit exceeded: requested {requested}, minted today {minted_today}, limit {limit}")]
    DailyLimitExceeded {
        requested: Amount,
        minted_today: Amount,
        limit: Amount,
    },

    #[error("Amount overflow")]
    AmountOverflow,

    #[error("Mint operation {0} does not exist")]
    OperationNotFound(usize),

    #[error("Mint operation {0} was revoked or already finalized")]
    OperationVacated(usize),

    #[error("Mint operation {index} belongs to invalidated generation {generation}")]
    StaleOperation { index: usize, generation: u64 },

    #[error("Mint operation {0} is paused")]
    OperationPaused(usize),

    #[error("{approver} already approved mint operation {index}")]
    AlreadyApproved { index: usize, approver: Address },

    #[error("Mint operation {index} has {have} approvals, {need} required")]
    InsufficientApprovals { index: usize, have: usize, need: usize },

    #[error("Mint operation {index} is still inside its review window")]
    TimelockActive {
        index: usize,
        eligible_at: Option<DateTime<Utc>>,
    },

    #[error("Address cannot be null")]
    NullAddress,

    #[error("No check time at index {index} ({count} configured)")]
    CheckTimeIndexOutOfRange { index: usize, count: usize },

    #[error("{0} is not a declared holiday")]
    HolidayNotDeclared(CalendarDate),

    #[error("No ownership transfer is pending")]
    NoPendingOwner,

    #[error("Invalid burn bounds: min {min} exceeds max {max}")]
    InvalidBurnBounds { min: Amount, max: Amount },

    #[error("Invalid staking fees: {0}")]
    InvalidStakingFees(String),

    #[error("Calendar error: {0}")]
    Calendar(#[from] CalendarError),

    #[error("Asset ledger error: {0}")]
    AssetLedger(#[from] AssetError),
}

/// Result type for controller operations
pub type ControllerResult<T> = Result<T, ControllerError>;

/// Errors from file-backed snapshots and state
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_message() {
        let err = ControllerError::Unauthorized {
            caller: Address::new("pause-key"),
            action: "request mints",
        };
        assert_eq!(err.to_string(), "pause-key is not authorized to request mints");
    }

    #[test]
    fn test_limit_message_carries_values() {
        let err = ControllerError::DailyLimitExceeded {
            requested: Amount::from(20),
            minted_today: Amount::from(20),
            limit: Amount::from(30),
        };
        let message = err.to_string();
        assert!(message.contains("requested 20"));
        assert!(message.contains("limit 30"));
    }
}
