//! Mint controller
//!
//! Single entry point for every state change. Each call validates all of
//! its preconditions before mutating anything, so an `Err` always leaves
//! the controller untouched and buffers no event.
//!
//! Calls take `&mut self`; hosts that share a controller across threads
//! wrap it with [`MintController::into_shared`] so calls are serialized.

use chrono::{DateTime, Utc};
use mintgate_calendar::{Calendar, CalendarDate, CalendarGate, CheckTime, Clock};
use mintgate_core::{Address, Amount};
use mintgate_registry::{AttributeRegistry, Capability};
use std::sync::{Arc, Mutex};

use crate::access::Roles;
use crate::asset::AssetLedger;
use crate::config::{PolicyConfig, StakingFees};
use crate::error::{ControllerError, ControllerResult};
use crate::event::{ControllerEvent, EventRecord};
use crate::operation::{MintOperation, OperationLedger};
use crate::quota::DailyQuota;
use crate::snapshot::ControllerSnapshot;

/// Controller shared between threads; the mutex serializes every call
pub type SharedController = Arc<Mutex<MintController>>;

/// External collaborators injected into the controller
#[derive(Clone)]
pub struct Collaborators {
    pub registry: Arc<dyn AttributeRegistry>,
    pub calendar: Arc<dyn Calendar>,
    pub clock: Arc<dyn Clock>,
    pub asset: Arc<dyn AssetLedger>,
}

pub struct MintController {
    roles: Roles,
    policy: PolicyConfig,
    quota: DailyQuota,
    ledger: OperationLedger,
    mints_paused: bool,
    registry: Arc<dyn AttributeRegistry>,
    calendar: Arc<dyn Calendar>,
    clock: Arc<dyn Clock>,
    asset: Arc<dyn AssetLedger>,
    events: Vec<EventRecord>,
}

impl MintController {
    pub fn new(owner: Address, policy: PolicyConfig, collaborators: Collaborators) -> ControllerResult<Self> {
        policy.validate()?;
        let roles = Roles::new(owner)?;
        tracing::info!(
            owner = %roles.owner(),
            calendar = collaborators.calendar.name(),
            registry = collaborators.registry.name(),
            asset = collaborators.asset.name(),
            "Mint controller created"
        );
        Ok(Self::assemble(
            roles,
            policy,
            DailyQuota::default(),
            OperationLedger::new(),
            false,
            collaborators,
        ))
    }

    /// Rebuild a controller from a snapshot
    pub fn restore(snapshot: ControllerSnapshot, collaborators: Collaborators) -> ControllerResult<Self> {
        snapshot.policy.validate()?;
        if snapshot.roles.owner().is_null() {
            return Err(ControllerError::NullAddress);
        }
        tracing::debug!(
            operations = snapshot.ledger.len(),
            generation = snapshot.ledger.generation(),
            "Mint controller restored"
        );
        Ok(Self::assemble(
            snapshot.roles,
            snapshot.policy,
            snapshot.quota,
            snapshot.ledger,
            snapshot.mints_paused,
            collaborators,
        ))
    }

    fn assemble(
        roles: Roles,
        policy: PolicyConfig,
        quota: DailyQuota,
        ledger: OperationLedger,
        mints_paused: bool,
        collaborators: Collaborators,
    ) -> Self {
        Self {
            roles,
            policy,
            quota,
            ledger,
            mints_paused,
            registry: collaborators.registry,
            calendar: collaborators.calendar,
            clock: collaborators.clock,
            asset: collaborators.asset,
            events: Vec::new(),
        }
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            roles: self.roles.clone(),
            policy: self.policy.clone(),
            quota: self.quota.clone(),
            ledger: self.ledger.clone(),
            mints_paused: self.mints_paused,
        }
    }

    pub fn into_shared(self) -> SharedController {
        Arc::new(Mutex::new(self))
    }

    /// Take every event buffered since the last drain, oldest first
    pub fn drain_events(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: ControllerEvent) {
        let record = EventRecord::new(event, self.clock.now());
        self.events.push(record);
    }

    fn gate(&self) -> CalendarGate<'_> {
        CalendarGate::new(
            self.calendar.as_ref(),
            &self.policy.check_times,
            &self.policy.holidays,
        )
        .with_buffer_minutes(self.policy.finalize_buffer_minutes)
    }

    fn today(&self, now: DateTime<Utc>) -> CalendarDate {
        self.calendar.decompose(now).date()
    }

    // ------------------------------------------------------------------
    // Mint operations
    // ------------------------------------------------------------------

    /// Create a pending mint; returns its operation index
    pub fn request_mint(&mut self, caller: &Address, recipient: &Address, amount: Amount) -> ControllerResult<usize> {
        self.roles.require_owner_or_mint_key(caller, "request mints")?;
        if self.mints_paused {
            return Err(ControllerError::MintsPaused);
        }
        if !self.registry.has_capability(recipient, Capability::KycPassed) {
            return Err(ControllerError::RecipientNotVerified(recipient.clone()));
        }
        if amount.is_zero() {
            return Err(ControllerError::ZeroAmount);
        }

        let now = self.clock.now();
        if !self.roles.is_owner(caller) {
            if let Some(reason) = self.gate().closed_reason(now) {
                tracing::warn!(caller = %caller, reason = %reason, "Mint request on a closed day");
                return Err(ControllerError::MintingClosed(reason));
            }
        }

        let today = self.today(now);
        let reservation = self
            .quota
            .reserve(amount, self.policy.mint_limit, today)
            .map_err(|err| {
                tracing::warn!(caller = %caller, amount = %amount, error = %err, "Mint request over quota");
                err
            })?;

        if reservation.rolled_over {
            tracing::info!(day = %today, previous = %self.quota.minted_today(), "Quota window rolled over");
        }
        self.quota.commit(reservation);
        let op_index = self
            .ledger
            .append(recipient.clone(), amount, caller.clone(), now);

        tracing::info!(
            op_index,
            recipient = %recipient,
            amount = %amount,
            requester = %caller,
            minted_today = %self.quota.minted_today(),
            "Mint requested"
        );
        self.emit(ControllerEvent::MintRequested {
            op_index,
            recipient: recipient.clone(),
            amount,
            requester: caller.clone(),
        });
        Ok(op_index)
    }

    pub fn approve_mint(&mut self, caller: &Address, op_index: usize) -> ControllerResult<()> {
        self.roles.require_capability(
            caller,
            self.registry.as_ref(),
            Capability::MintApprover,
            "approve mints",
        )?;
        let approvals = self.ledger.approve(op_index, caller)?;

        tracing::info!(op_index, approver = %caller, approvals, "Mint approved");
        self.emit(ControllerEvent::MintApproved {
            op_index,
            approver: caller.clone(),
            approvals,
        });
        Ok(())
    }

    /// Vacate a pending mint. Quota already consumed is not returned.
    pub fn revoke_mint(&mut self, caller: &Address, op_index: usize) -> ControllerResult<()> {
        let op = self.ledger.live(op_index)?;
        if !self.roles.is_owner(caller) && &op.requester != caller {
            return Err(ControllerError::Unauthorized {
                caller: caller.clone(),
                action: "revoke this mint",
            });
        }
        let previous = self.ledger.vacate(op_index)?;

        tracing::info!(op_index, revoked_by = %caller, amount = %previous.amount, "Mint revoked");
        self.emit(ControllerEvent::MintRevoked {
            op_index,
            revoked_by: caller.clone(),
        });
        Ok(())
    }

    /// Credit the recipient through the asset ledger and vacate the slot.
    ///
    /// Non-owners need the tier's approval count and an elapsed timelock;
    /// the owner bypasses both. If the asset ledger fails the operation
    /// stays pending with its approvals intact.
    pub fn finalize_mint(&mut self, caller: &Address, op_index: usize) -> ControllerResult<()> {
        self.roles.require_owner_or_mint_key(caller, "finalize mints")?;
        let now = self.clock.now();
        let op = self.ledger.live(op_index)?;
        if op.paused {
            return Err(ControllerError::OperationPaused(op_index));
        }

        if !self.roles.is_owner(caller) {
            let need = usize::from(self.policy.required_approvals(op.amount));
            let have = op.approval_count();
            if have < need {
                return Err(ControllerError::InsufficientApprovals {
                    index: op_index,
                    have,
                    need,
                });
            }

            let requested_at = op
                .requested_at
                .ok_or(ControllerError::OperationVacated(op_index))?;
            let gate = self.gate();
            if !gate.enough_time_passed(requested_at, now) {
                let eligible_at = gate.eligible_at(requested_at);
                tracing::warn!(
                    op_index,
                    requested_at = %requested_at,
                    eligible_at = ?eligible_at,
                    "Finalize attempted inside review window"
                );
                return Err(ControllerError::TimelockActive {
                    index: op_index,
                    eligible_at,
                });
            }
        }

        let recipient = op.recipient.clone();
        let amount = op.amount;
        if let Err(err) = self.asset.mint(&recipient, amount) {
            tracing::error!(op_index, recipient = %recipient, amount = %amount, error = %err, "Asset ledger mint failed");
            return Err(err.into());
        }
        self.ledger.vacate(op_index)?;

        tracing::info!(op_index, recipient = %recipient, amount = %amount, mint_key = %caller, "Mint finalized");
        self.emit(ControllerEvent::MintFinalized {
            op_index,
            recipient,
            amount,
            mint_key: caller.clone(),
        });
        Ok(())
    }

    /// Guardians may pause a single operation
    pub fn pause_mint(&mut self, caller: &Address, op_index: usize) -> ControllerResult<()> {
        self.roles
            .require_guardian(caller, self.registry.as_ref(), "pause mints")?;
        self.ledger.set_paused(op_index, true)?;

        tracing::info!(op_index, actor = %caller, "Mint paused");
        self.emit(ControllerEvent::MintPauseChanged {
            op_index,
            paused: true,
            actor: caller.clone(),
        });
        Ok(())
    }

    pub fn unpause_mint(&mut self, caller: &Address, op_index: usize) -> ControllerResult<()> {
        self.roles.require_owner(caller, "unpause mints")?;
        self.ledger.set_paused(op_index, false)?;

        tracing::info!(op_index, actor = %caller, "Mint unpaused");
        self.emit(ControllerEvent::MintPauseChanged {
            op_index,
            paused: false,
            actor: caller.clone(),
        });
        Ok(())
    }

    /// Turn every existing operation stale in one step
    pub fn invalidate_all_pending_mints(&mut self, caller: &Address) -> ControllerResult<()> {
        self.roles
            .require_owner(caller, "invalidate pending mints")?;
        let generation = self.ledger.invalidate_all();

        tracing::info!(generation, actor = %caller, "All pending mints invalidated");
        self.emit(ControllerEvent::AllPendingMintsInvalidated {
            generation,
            actor: caller.clone(),
        });
        Ok(())
    }

    /// Global pause; blocks new requests only
    pub fn pause_mints(&mut self, caller: &Address) -> ControllerResult<()> {
        self.roles
            .require_guardian(caller, self.registry.as_ref(), "pause all mints")?;
        self.mints_paused = true;

        tracing::warn!(actor = %caller, "All mints paused");
        self.emit(ControllerEvent::AllMintsPauseChanged {
            paused: true,
            actor: caller.clone(),
        });
        Ok(())
    }

    pub fn unpause_mints(&mut self, caller: &Address) -> ControllerResult<()> {
        self.roles.require_owner(caller, "unpause all mints")?;
        self.mints_paused = false;

        tracing::info!(actor = %caller, "All mints unpaused");
        self.emit(ControllerEvent::AllMintsPauseChanged {
            paused: false,
            actor: caller.clone(),
        });
        Ok(())
    }

    pub fn reset_minted_today(&mut self, caller: &Address) -> ControllerResult<()> {
        self.roles.require_owner(caller, "reset the daily quota")?;
        let today = self.today(self.clock.now());
        let previous = self.quota.reset(today);

        tracing::info!(previous = %previous, actor = %caller, "Minted-today counter reset");
        self.emit(ControllerEvent::MintedTodayReset {
            previous,
            actor: caller.clone(),
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Policy
    // ------------------------------------------------------------------

    pub fn set_mint_limit(&mut self, caller: &Address, limit: Amount) -> ControllerResult<()> {
        self.roles.require_owner(caller, "set the mint limit")?;
        let old_limit = self.policy.set_mint_limit(limit);

        tracing::info!(old = %old_limit, new = %limit, "Daily mint limit changed");
        self.emit(ControllerEvent::DailyLimitChanged {
            old_limit,
            new_limit: limit,
            actor: caller.clone(),
        });
        Ok(())
    }

    pub fn set_small_mint_threshold(&mut self, caller: &Address, threshold: Amount) -> ControllerResult<()> {
        self.roles
            .require_owner(caller, "set the small mint threshold")?;
        let old_threshold = self.policy.set_small_mint_threshold(threshold);

        tracing::info!(old = %old_threshold, new = %threshold, "Small mint threshold changed");
        self.emit(ControllerEvent::SmallMintThresholdChanged {
            old_threshold,
            new_threshold: threshold,
            actor: caller.clone(),
        });
        Ok(())
    }

    pub fn set_minimal_approvals(&mut self, caller: &Address, small: u8, large: u8) -> ControllerResult<()> {
        self.roles
            .require_owner(caller, "set approval thresholds")?;
        let (old_small, old_large) = self.policy.set_minimal_approvals(small, large);

        tracing::info!(small, large, "Approval thresholds changed");
        self.emit(ControllerEvent::ApprovalThresholdChanged {
            old_small,
            old_large,
            new_small: small,
            new_large: large,
            actor: caller.clone(),
        });
        Ok(())
    }

    pub fn add_mint_check_time(&mut self, caller: &Address, hour: u32, minute: u32) -> ControllerResult<()> {
        self.roles.require_owner(caller, "add check times")?;
        let check = CheckTime::new(hour, minute)?;
        self.policy.add_check_time(check);

        tracing::info!(check_time = %check, "Mint check time added");
        self.emit(ControllerEvent::MintCheckTimeAdded {
            hour,
            minute,
            actor: caller.clone(),
        });
        Ok(())
    }

    /// Remove by position; the last check time moves into the hole
    pub fn remove_mint_check_time(&mut self, caller: &Address, index: usize) -> ControllerResult<()> {
        self.roles.require_owner(caller, "remove check times")?;
        let count = self.policy.check_times.len();
        let removed = self
            .policy
            .remove_check_time(index)
            .ok_or(ControllerError::CheckTimeIndexOutOfRange { index, count })?;

        tracing::info!(index, check_time = %removed, "Mint check time removed");
        self.emit(ControllerEvent::MintCheckTimeRemoved {
            index,
            hour: removed.hour,
            minute: removed.minute,
            actor: caller.clone(),
        });
        Ok(())
    }

    /// Guardians may declare holidays; declaring twice is harmless
    pub fn add_holiday(&mut self, caller: &Address, year: i32, month: u32, day: u32) -> ControllerResult<()> {
        self.roles
            .require_guardian(caller, self.registry.as_ref(), "declare holidays")?;
        let date = CalendarDate::new(year, month, day)?;
        self.policy.declare_holiday(date);

        tracing::info!(date = %date, actor = %caller, "Holiday declared");
        self.emit(ControllerEvent::HolidayModified {
            year,
            month,
            day,
            declared: true,
            actor: caller.clone(),
        });
        Ok(())
    }

    pub fn remove_holiday(&mut self, caller: &Address, year: i32, month: u32, day: u32) -> ControllerResult<()> {
        self.roles.require_owner(caller, "remove holidays")?;
        let date = CalendarDate::new(year, month, day)?;
        if !self.policy.lift_holiday(&date) {
            return Err(ControllerError::HolidayNotDeclared(date));
        }

        tracing::info!(date = %date, actor = %caller, "Holiday removed");
        self.emit(ControllerEvent::HolidayModified {
            year,
            month,
            day,
            declared: false,
            actor: caller.clone(),
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Roles
    // ------------------------------------------------------------------

    pub fn transfer_mint_key(&mut self, caller: &Address, new_key: Address) -> ControllerResult<()> {
        let previous = self.roles.transfer_mint_key(caller, new_key.clone())?;

        tracing::info!(previous = %previous, new = %new_key, actor = %caller, "Mint key transferred");
        self.emit(ControllerEvent::MintKeyTransferred {
            previous,
            new: new_key,
            actor: caller.clone(),
        });
        Ok(())
    }

    pub fn transfer_ownership(&mut self, caller: &Address, new_owner: Address) -> ControllerResult<()> {
        self.roles
            .begin_ownership_transfer(caller, new_owner.clone())?;

        tracing::info!(owner = %caller, pending_owner = %new_owner, "Ownership transfer started");
        self.emit(ControllerEvent::OwnershipTransferStarted {
            owner: caller.clone(),
            pending_owner: new_owner,
        });
        Ok(())
    }

    pub fn claim_ownership(&mut self, caller: &Address) -> ControllerResult<()> {
        let previous = self.roles.claim_ownership(caller)?;

        tracing::info!(previous = %previous, new = %caller, "Ownership transferred");
        self.emit(ControllerEvent::OwnershipTransferred {
            previous,
            new: caller.clone(),
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Collaborators
    // ------------------------------------------------------------------

    /// Swap the calendar adapter.
    ///
    /// A fixed offset is recorded in the policy so snapshots rebuild the
    /// same calendar; other calendars leave the recorded offset as is.
    pub fn set_calendar(&mut self, caller: &Address, calendar: Arc<dyn Calendar>) -> ControllerResult<()> {
        self.roles.require_owner(caller, "replace the calendar")?;
        let name = calendar.name().to_string();
        let offset_minutes = calendar.offset_minutes();
        self.calendar = calendar;
        match offset_minutes {
            Some(offset) => self.policy.time_zone_offset_minutes = offset,
            None => tracing::warn!(calendar = %name, "Calendar has no fixed offset; snapshots keep the previous one"),
        }

        tracing::info!(calendar = %name, offset_minutes = ?offset_minutes, actor = %caller, "Calendar replaced");
        self.emit(ControllerEvent::CalendarReplaced {
            name,
            offset_minutes,
            actor: caller.clone(),
        });
        Ok(())
    }

    pub fn set_registry(&mut self, caller: &Address, registry: Arc<dyn AttributeRegistry>) -> ControllerResult<()> {
        self.roles.require_owner(caller, "replace the registry")?;
        let name = registry.name().to_string();
        self.registry = registry;

        tracing::info!(registry = %name, actor = %caller, "Registry replaced");
        self.emit(ControllerEvent::RegistryReplaced {
            name,
            actor: caller.clone(),
        });
        Ok(())
    }

    /// Swap the ledger credited on finalize; pending operations carry over
    pub fn set_asset(&mut self, caller: &Address, asset: Arc<dyn AssetLedger>) -> ControllerResult<()> {
        self.roles.require_owner(caller, "replace the asset ledger")?;
        let name = asset.name().to_string();
        self.asset = asset;

        tracing::info!(asset = %name, actor = %caller, "Asset ledger replaced");
        self.emit(ControllerEvent::AssetLedgerReplaced {
            name,
            actor: caller.clone(),
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Asset ledger administration
    // ------------------------------------------------------------------

    pub fn set_burn_bounds(&mut self, caller: &Address, min: Amount, max: Amount) -> ControllerResult<()> {
        self.roles.require_owner(caller, "set burn bounds")?;
        if min > max {
            return Err(ControllerError::InvalidBurnBounds { min, max });
        }
        self.asset.set_burn_bounds(min, max)?;

        tracing::info!(min = %min, max = %max, "Burn bounds changed");
        self.emit(ControllerEvent::BurnBoundsChanged {
            min,
            max,
            actor: caller.clone(),
        });
        Ok(())
    }

    pub fn change_staking_fees(&mut self, caller: &Address, fees: StakingFees) -> ControllerResult<()> {
        self.roles.require_owner(caller, "change staking fees")?;
        if let Some(field) = fees.zero_denominator() {
            return Err(ControllerError::InvalidStakingFees(format!("{} is zero", field)));
        }
        self.asset.change_staking_fees(&fees)?;
        let old = self.policy.set_staking_fees(fees.clone());

        tracing::info!("Staking fees changed");
        self.emit(ControllerEvent::StakingFeesChanged {
            old,
            new: fees,
            actor: caller.clone(),
        });
        Ok(())
    }

    pub fn change_staker(&mut self, caller: &Address, staker: Address) -> ControllerResult<()> {
        self.roles.require_owner(caller, "change the staker")?;
        if staker.is_null() {
            return Err(ControllerError::NullAddress);
        }
        self.asset.change_staker(&staker)?;

        tracing::info!(staker = %staker, "Staker changed");
        self.emit(ControllerEvent::StakerChanged {
            staker,
            actor: caller.clone(),
        });
        Ok(())
    }

    pub fn change_token_name(&mut self, caller: &Address, name: &str, symbol: &str) -> ControllerResult<()> {
        self.roles.require_owner(caller, "change the token name")?;
        self.asset.change_token_name(name, symbol)?;

        tracing::info!(name, symbol, "Token name changed");
        self.emit(ControllerEvent::TokenNameChanged {
            name: name.to_string(),
            symbol: symbol.to_string(),
            actor: caller.clone(),
        });
        Ok(())
    }

    pub fn set_delegated_from(&mut self, caller: &Address, source: Address) -> ControllerResult<()> {
        self.roles.require_owner(caller, "set the delegating ledger")?;
        self.asset.set_delegated_from(&source)?;

        tracing::info!(source = %source, "Delegated-from ledger set");
        self.emit(ControllerEvent::DelegatedFromChanged {
            source,
            actor: caller.clone(),
        });
        Ok(())
    }

    /// Point the asset ledger at its successor, handing over both sheets
    pub fn delegate_to_new_contract(
        &mut self,
        caller: &Address,
        delegate: Address,
        balance_sheet: Address,
        allowance_sheet: Address,
    ) -> ControllerResult<()> {
        self.roles
            .require_owner(caller, "delegate to a new contract")?;
        if delegate.is_null() {
            return Err(ControllerError::NullAddress);
        }
        self.asset
            .delegate_to_new_contract(&delegate, &balance_sheet, &allowance_sheet)?;

        tracing::warn!(delegate = %delegate, actor = %caller, "Asset ledger delegated to new contract");
        self.emit(ControllerEvent::DelegatedToNewContract {
            delegate,
            balance_sheet,
            allowance_sheet,
            actor: caller.clone(),
        });
        Ok(())
    }

    /// Ask the ledger to offer `contract` to the owner; complete with
    /// [`MintController::issue_claim_ownership`]
    pub fn request_reclaim_contract(&mut self, caller: &Address, contract: Address) -> ControllerResult<()> {
        self.roles.require_owner(caller, "reclaim contracts")?;
        self.asset.request_reclaim_contract(&contract, caller)?;

        tracing::info!(contract = %contract, "Contract reclaim requested");
        self.emit(ControllerEvent::ReclaimContractRequested {
            contract,
            actor: caller.clone(),
        });
        Ok(())
    }

    pub fn issue_claim_ownership(&mut self, caller: &Address, contract: Address) -> ControllerResult<()> {
        self.roles.require_owner(caller, "claim contracts")?;
        self.asset.claim_contract(&contract, caller)?;

        tracing::info!(contract = %contract, owner = %caller, "Contract ownership claimed");
        self.emit(ControllerEvent::ContractOwnershipClaimed {
            contract,
            actor: caller.clone(),
        });
        Ok(())
    }

    /// Sweep the ledger's native balance to the owner; returns the amount
    pub fn request_reclaim_native(&mut self, caller: &Address) -> ControllerResult<Amount> {
        self.roles
            .require_owner(caller, "reclaim the native balance")?;
        let amount = self.asset.reclaim_native(caller)?;

        tracing::info!(amount = %amount, owner = %caller, "Native balance reclaimed");
        self.emit(ControllerEvent::NativeBalanceReclaimed {
            amount,
            actor: caller.clone(),
        });
        Ok(amount)
    }

    /// Sweep `token` units held at the ledger's address to the owner
    pub fn request_reclaim_token(&mut self, caller: &Address, token: Address) -> ControllerResult<Amount> {
        self.roles.require_owner(caller, "reclaim tokens")?;
        let amount = self.asset.reclaim_token(&token, caller)?;

        tracing::info!(token = %token, amount = %amount, owner = %caller, "Tokens reclaimed");
        self.emit(ControllerEvent::TokenReclaimed {
            token,
            amount,
            actor: caller.clone(),
        });
        Ok(amount)
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn owner(&self) -> &Address {
        self.roles.owner()
    }

    pub fn mint_key(&self) -> &Address {
        self.roles.mint_key()
    }

    pub fn roles(&self) -> &Roles {
        &self.roles
    }

    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    /// Stored counter; a request on a new day would see zero
    pub fn minted_today(&self) -> Amount {
        self.quota.minted_today()
    }

    pub fn mint_paused(&self) -> bool {
        self.mints_paused
    }

    pub fn generation(&self) -> u64 {
        self.ledger.generation()
    }

    /// Raw slot at `index`, including vacated and stale ones
    pub fn mint_operation(&self, index: usize) -> Option<&MintOperation> {
        self.ledger.get(index)
    }

    pub fn mint_operations(&self) -> &[MintOperation] {
        self.ledger.operations()
    }

    /// Operations that can still be approved or finalized
    pub fn pending_mints(&self) -> Vec<(usize, &MintOperation)> {
        self.ledger.pending().collect()
    }

    pub fn number_of_check_times(&self) -> usize {
        self.policy.check_times.len()
    }

    pub fn mint_check_time(&self, index: usize) -> Option<CheckTime> {
        self.policy.check_times.get(index).copied()
    }

    pub fn minting_allowed_today(&self) -> bool {
        self.gate().minting_allowed_today(self.clock.now())
    }

    pub fn enough_time_passed(&self, requested_at: DateTime<Utc>) -> bool {
        self.gate().enough_time_passed(requested_at, self.clock.now())
    }

    /// When a non-owner may first finalize operation `index`
    pub fn eligible_at(&self, index: usize) -> Option<DateTime<Utc>> {
        let requested_at = self.ledger.get(index)?.requested_at?;
        self.gate().eligible_at(requested_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::InMemoryAssetLedger;
    use chrono::TimeZone;
    use mintgate_calendar::{FixedOffsetCalendar, ManualClock};
    use mintgate_registry::InMemoryRegistry;

    struct Fixture {
        controller: MintController,
        registry: Arc<InMemoryRegistry>,
        asset: Arc<InMemoryAssetLedger>,
        owner: Address,
        mint_key: Address,
    }

    fn fixture() -> Fixture {
        let registry = Arc::new(InMemoryRegistry::new());
        let asset = Arc::new(InMemoryAssetLedger::new());
        // Monday 2024-01-08 07:20 UTC
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 8, 7, 20, 0).unwrap()));
        let owner = Address::new("owner");
        let mint_key = Address::new("mint-key");

        registry
            .set_attribute(&Address::new("alice"), Capability::KycPassed.attribute_name(), 1, "")
            .unwrap();

        let collaborators = Collaborators {
            registry: registry.clone(),
            calendar: Arc::new(FixedOffsetCalendar::utc()),
            clock,
            asset: asset.clone(),
        };
        let mut controller = MintController::new(owner.clone(), PolicyConfig::default(), collaborators).unwrap();
        controller.set_mint_limit(&owner, Amount::from(100)).unwrap();
        controller.transfer_mint_key(&owner, mint_key.clone()).unwrap();
        controller.drain_events();

        Fixture {
            controller,
            registry,
            asset,
            owner,
            mint_key,
        }
    }

    #[test]
    fn test_rejected_call_buffers_no_event() {
        let mut f = fixture();
        let err = f
            .controller
            .request_mint(&f.mint_key, &Address::new("bob"), Amount::from(10))
            .unwrap_err();

        assert!(matches!(err, ControllerError::RecipientNotVerified(_)));
        assert!(f.controller.drain_events().is_empty());
        assert_eq!(f.controller.minted_today(), Amount::ZERO);
    }

    #[test]
    fn test_zero_amount_rejected() {
        let mut f = fixture();
        assert!(matches!(
            f.controller
                .request_mint(&f.mint_key, &Address::new("alice"), Amount::ZERO),
            Err(ControllerError::ZeroAmount)
        ));
    }

    #[test]
    fn test_request_emits_event_with_index() {
        let mut f = fixture();
        let index = f
            .controller
            .request_mint(&f.mint_key, &Address::new("alice"), Amount::from(10))
            .unwrap();

        let events = f.controller.drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].event,
            ControllerEvent::MintRequested {
                op_index: index,
                recipient: Address::new("alice"),
                amount: Amount::from(10),
                requester: f.mint_key.clone(),
            }
        );
    }

    #[test]
    fn test_owner_finalizes_without_approvals_or_wait() {
        let mut f = fixture();
        let index = f
            .controller
            .request_mint(&f.mint_key, &Address::new("alice"), Amount::from(10))
            .unwrap();

        f.controller.finalize_mint(&f.owner, index).unwrap();
        assert_eq!(f.asset.balance_of(&Address::new("alice")), Amount::from(10));
        assert!(f.controller.mint_operation(index).unwrap().is_vacated());
    }

    #[test]
    fn test_owner_cannot_finalize_paused_operation() {
        let mut f = fixture();
        let index = f
            .controller
            .request_mint(&f.mint_key, &Address::new("alice"), Amount::from(10))
            .unwrap();
        f.controller.pause_mint(&f.owner, index).unwrap();

        assert!(matches!(
            f.controller.finalize_mint(&f.owner, index),
            Err(ControllerError::OperationPaused(_))
        ));
    }

    #[test]
    fn test_snapshot_restore_keeps_state() {
        let mut f = fixture();
        f.controller
            .request_mint(&f.mint_key, &Address::new("alice"), Amount::from(10))
            .unwrap();
        let snapshot = f.controller.snapshot();

        let collaborators = Collaborators {
            registry: f.registry.clone(),
            calendar: Arc::new(FixedOffsetCalendar::utc()),
            clock: Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 8, 9, 0, 0).unwrap())),
            asset: f.asset.clone(),
        };
        let restored = MintController::restore(snapshot.clone(), collaborators).unwrap();

        assert_eq!(restored.snapshot(), snapshot);
        assert_eq!(restored.minted_today(), Amount::from(10));
        assert_eq!(restored.pending_mints().len(), 1);
    }

    #[test]
    fn test_shared_controller_serializes_calls() {
        let f = fixture();
        let mint_key = f.mint_key.clone();
        let shared = f.controller.into_shared();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = Arc::clone(&shared);
                let mint_key = mint_key.clone();
                std::thread::spawn(move || {
                    let mut controller = shared.lock().unwrap();
                    controller
                        .request_mint(&mint_key, &Address::new("alice"), Amount::from(30))
                        .is_ok()
                })
            })
            .collect();

        let accepted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        // limit 100 admits exactly three requests of 30
        assert_eq!(accepted, 3);
        assert_eq!(shared.lock().unwrap().minted_today(), Amount::from(90));
    }
}
