//! Mintgate Controller - the mint-operation state machine
//!
//! A mint moves through request → approvals → finalize. Along the way it is
//! gated by:
//!
//! - **Roles**: owner and mint key request/finalize, registry approvers approve,
//!   guardians (owner or registry checkers) pause and declare holidays
//! - **Daily quota**: requested volume per calendar day is capped by `mint_limit`
//! - **Calendar**: no non-owner requests on weekends or holidays
//! - **Timelock**: non-owners finalize only after the next check time plus a buffer
//!
//! All state lives in [`MintController`]; every successful call buffers an
//! [`EventRecord`] that hosts drain into the hash-chained [`EventJournal`].

pub mod access;
pub mod asset;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod journal;
pub mod operation;
pub mod pause;
pub mod quota;
pub mod snapshot;

pub use access::Roles;
pub use asset::{AssetError, AssetLedger, AssetState, InMemoryAssetLedger};
pub use config::{PolicyConfig, StakingFees};
pub use controller::{Collaborators, MintController, SharedController};
pub use error::{ControllerError, ControllerResult, StoreError};
pub use event::{ControllerEvent, EventRecord};
pub use journal::{verify_chain, EventJournal, JournalEntry, JournalError, JournalResult, GENESIS_HASH};
pub use operation::{MintOperation, OperationLedger};
pub use pause::PauseRelay;
pub use quota::{DailyQuota, QuotaReservation};
pub use snapshot::ControllerSnapshot;
