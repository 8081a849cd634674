//! Controller events
//!
//! One event per successful state change, carrying the actor and the
//! before/after values needed to audit it. Records are buffered by the
//! controller and drained by the host (usually into the [`EventJournal`]).
//!
//! [`EventJournal`]: crate::journal::EventJournal

use chrono::{DateTime, Utc};
use mintgate_core::{Address, Amount};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::StakingFees;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum ControllerEvent {
    // === Mint operations ===
    MintRequested {
        op_index: usize,
        recipient: Address,
        amount: Amount,
        requester: Address,
    },

    MintApproved {
        op_index: usize,
        approver: Address,
        approvals: usize,
    },

    MintRevoked {
        op_index: usize,
        revoked_by: Address,
    },

    MintFinalized {
        op_index: usize,
        recipient: Address,
        amount: Amount,
        mint_key: Address,
    },

    MintPauseChanged {
        op_index: usize,
        paused: bool,
        actor: Address,
    },

    AllMintsPauseChanged {
        paused: bool,
        actor: Address,
    },

    AllPendingMintsInvalidated {
        generation: u64,
        actor: Address,
    },

    MintedTodayReset {
        previous: Amount,
        actor: Address,
    },

    // === Policy ===
    DailyLimitChanged {
        old_limit: Amount,
        new_limit: Amount,
        actor: Address,
    },

    SmallMintThresholdChanged {
        old_threshold: Amount,
        new_threshold: Amount,
        actor: Address,
    },

    ApprovalThresholdChanged {
        old_small: u8,
        old_large: u8,
        new_small: u8,
        new_large: u8,
        actor: Address,
    },

    MintCheckTimeAdded {
        hour: u32,
        minute: u32,
        actor: Address,
    },

    MintCheckTimeRemoved {
        index: usize,
        hour: u32,
        minute: u32,
        actor: Address,
    },

    HolidayModified {
        year: i32,
        month: u32,
        day: u32,
        declared: bool,
        actor: Address,
    },

    // === Roles ===
    /// `actor` is the owner or the outgoing key rotating itself
    MintKeyTransferred {
        previous: Address,
        new: Address,
        actor: Address,
    },

    OwnershipTransferStarted {
        owner: Address,
        pending_owner: Address,
    },

    OwnershipTransferred {
        previous: Address,
        new: Address,
    },

    // === Collaborators ===
    CalendarReplaced {
        name: String,
        offset_minutes: Option<i32>,
        actor: Address,
    },

    RegistryReplaced {
        name: String,
        actor: Address,
    },

    AssetLedgerReplaced {
        name: String,
        actor: Address,
    },

    // === Asset ledger administration ===
    BurnBoundsChanged {
        min: Amount,
        max: Amount,
        actor: Address,
    },

    StakingFeesChanged {
        old: StakingFees,
        new: StakingFees,
        actor: Address,
    },

    StakerChanged {
        staker: Address,
        actor: Address,
    },

    TokenNameChanged {
        name: String,
        symbol: String,
        actor: Address,
    },

    DelegatedFromChanged {
        source: Address,
        actor: Address,
    },

    DelegatedToNewContract {
        delegate: Address,
        balance_sheet: Address,
        allowance_sheet: Address,
        actor: Address,
    },

    ReclaimContractRequested {
        contract: Address,
        actor: Address,
    },

    ContractOwnershipClaimed {
        contract: Address,
        actor: Address,
    },

    NativeBalanceReclaimed {
        amount: Amount,
        actor: Address,
    },

    TokenReclaimed {
        token: Address,
        amount: Amount,
        actor: Address,
    },
}

impl ControllerEvent {
    /// Stable name matching the serialized `event_type` tag
    pub fn kind(&self) -> &'static str {
        match self {
            ControllerEvent::MintRequested { .. } => "mint_requested",
            ControllerEvent::MintApproved { .. } => "mint_approved",
            ControllerEvent::MintRevoked { .. } => "mint_revoked",
            ControllerEvent::MintFinalized { .. } => "mint_finalized",
            ControllerEvent::MintPauseChanged { .. } => "mint_pause_changed",
            ControllerEvent::AllMintsPauseChanged { .. } => "all_mints_pause_changed",
            ControllerEvent::AllPendingMintsInvalidated { .. } => "all_pending_mints_invalidated",
            ControllerEvent::MintedTodayReset { .. } => "minted_today_reset",
            ControllerEvent::DailyLimitChanged { .. } => "daily_limit_changed",
            ControllerEvent::SmallMintThresholdChanged { .. } => "small_mint_threshold_changed",
            ControllerEvent::ApprovalThresholdChanged { .. } => "approval_threshold_changed",
            ControllerEvent::MintCheckTimeAdded { .. } => "mint_check_time_added",
            ControllerEvent::MintCheckTimeRemoved { .. } => "mint_check_time_removed",
            ControllerEvent::HolidayModified { .. } => "holiday_modified",
            ControllerEvent::MintKeyTransferred { .. } => "mint_key_transferred",
            ControllerEvent::OwnershipTransferStarted { .. } => "ownership_transfer_started",
            ControllerEvent::OwnershipTransferred { .. } => "ownership_transferred",
            ControllerEvent::CalendarReplaced { .. } => "calendar_replaced",
            ControllerEvent::RegistryReplaced { .. } => "registry_replaced",
            ControllerEvent::BurnBoundsChanged { .. } => "burn_bounds_changed",
            ControllerEvent::StakingFeesChanged { .. } => "staking_fees_changed",
            ControllerEvent::StakerChanged { .. } => "staker_changed",
            ControllerEvent::TokenNameChanged { .. } => "token_name_changed",
            ControllerEvent::AssetLedgerReplaced { .. } => "asset_ledger_replaced",
            ControllerEvent::DelegatedFromChanged { .. } => "delegated_from_changed",
            ControllerEvent::DelegatedToNewContract { .. } => "delegated_to_new_contract",
            ControllerEvent::ReclaimContractRequested { .. } => "reclaim_contract_requested",
            ControllerEvent::ContractOwnershipClaimed { .. } => "contract_ownership_claimed",
            ControllerEvent::NativeBalanceReclaimed { .. } => "native_balance_reclaimed",
            ControllerEvent::TokenReclaimed { .. } => "token_reclaimed",
        }
    }

    /// Caller whose successful call produced the event
    pub fn actor(&self) -> &Address {
        match self {
            ControllerEvent::MintRequested { requester, .. } => requester,
            ControllerEvent::MintApproved { approver, .. } => approver,
            ControllerEvent::MintRevoked { revoked_by, .. } => revoked_by,
            ControllerEvent::MintFinalized { mint_key, .. } => mint_key,
            ControllerEvent::OwnershipTransferStarted { owner, .. } => owner,
            ControllerEvent::OwnershipTransferred { new, .. } => new,
            ControllerEvent::MintPauseChanged { actor, .. }
            | ControllerEvent::AllMintsPauseChanged { actor, .. }
            | ControllerEvent::AllPendingMintsInvalidated { actor, .. }
            | ControllerEvent::MintedTodayReset { actor, .. }
            | ControllerEvent::DailyLimitChanged { actor, .. }
            | ControllerEvent::SmallMintThresholdChanged { actor, .. }
            | ControllerEvent::ApprovalThresholdChanged { actor, .. }
            | ControllerEvent::MintCheckTimeAdded { actor, .. }
            | ControllerEvent::MintCheckTimeRemoved { actor, .. }
            | ControllerEvent::HolidayModified { actor, .. }
            | ControllerEvent::MintKeyTransferred { actor, .. }
            | ControllerEvent::CalendarReplaced { actor, .. }
            | ControllerEvent::RegistryReplaced { actor, .. }
            | ControllerEvent::AssetLedgerReplaced { actor, .. }
            | ControllerEvent::BurnBoundsChanged { actor, .. }
            | ControllerEvent::StakingFeesChanged { actor, .. }
            | ControllerEvent::StakerChanged { actor, .. }
            | ControllerEvent::TokenNameChanged { actor, .. }
            | ControllerEvent::DelegatedFromChanged { actor, .. }
            | ControllerEvent::DelegatedToNewContract { actor, .. }
            | ControllerEvent::ReclaimContractRequested { actor, .. }
            | ControllerEvent::ContractOwnershipClaimed { actor, .. }
            | ControllerEvent::NativeBalanceReclaimed { actor, .. }
            | ControllerEvent::TokenReclaimed { actor, .. } => actor,
        }
    }
}

/// An event stamped with a unique id and the controller clock's time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub event: ControllerEvent,
}

impl EventRecord {
    pub fn new(event: ControllerEvent, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp,
            event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_serialized_tag() {
        let events = vec![
            ControllerEvent::MintRequested {
                op_index: 0,
                recipient: Address::new("alice"),
                amount: Amount::from(10),
                requester: Address::new("mint-key"),
            },
            ControllerEvent::AllPendingMintsInvalidated {
                generation: 1,
                actor: Address::new("owner"),
            },
            ControllerEvent::StakingFeesChanged {
                old: StakingFees::default(),
                new: StakingFees::default(),
                actor: Address::new("owner"),
            },
            ControllerEvent::NativeBalanceReclaimed {
                amount: Amount::from(3),
                actor: Address::new("owner"),
            },
        ];

        for event in events {
            let value = serde_json::to_value(&event).unwrap();
            assert_eq!(value["event_type"], event.kind());
        }
    }

    #[test]
    fn test_record_round_trip_keeps_amount_as_string() {
        let record = EventRecord::new(
            ControllerEvent::DailyLimitChanged {
                old_limit: Amount::ZERO,
                new_limit: Amount::from(100),
                actor: Address::new("owner"),
            },
            Utc::now(),
        );

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains(r#""new_limit":"100""#));
        assert!(json.contains(r#""actor":"owner""#));

        let parsed: EventRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_record_ids_are_unique() {
        let event = ControllerEvent::StakerChanged {
            staker: Address::new("staker"),
            actor: Address::new("owner"),
        };
        let a = EventRecord::new(event.clone(), Utc::now());
        let b = EventRecord::new(event, Utc::now());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_actor_names_the_caller() {
        let rotation = ControllerEvent::MintKeyTransferred {
            previous: Address::new("k1"),
            new: Address::new("k2"),
            actor: Address::new("k1"),
        };
        assert_eq!(rotation.actor(), &Address::new("k1"));

        let approval = ControllerEvent::MintApproved {
            op_index: 0,
            approver: Address::new("approver-1"),
            approvals: 1,
        };
        assert_eq!(approval.actor(), &Address::new("approver-1"));
    }
}
