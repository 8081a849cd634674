//! Asset ledger collaborator
//!
//! The controller only ever credits supply through [`AssetLedger::mint`]
//! and forwards a handful of owner-only administration calls. Balance and
//! fee bookkeeping belong to the ledger implementation.
//!
//! Contract custody follows a two-step handover: the ledger offers a
//! contract it owns (`request_reclaim_contract`), and the new owner then
//! completes it (`claim_contract`).

use mintgate_core::{Address, Amount};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use thiserror::Error;

use crate::config::StakingFees;
use crate::error::StoreError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssetError {
    #[error("Mint rejected: {0}")]
    MintRejected(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Asset ledger unavailable: {0}")]
    Unavailable(String),
}

/// Downstream ledger credited on finalize
pub trait AssetLedger: Send + Sync {
    fn name(&self) -> &str {
        "asset-ledger"
    }

    fn mint(&self, to: &Address, amount: Amount) -> Result<(), AssetError>;

    fn set_burn_bounds(&self, min: Amount, max: Amount) -> Result<(), AssetError>;

    fn change_staking_fees(&self, fees: &StakingFees) -> Result<(), AssetError>;

    fn change_staker(&self, staker: &Address) -> Result<(), AssetError>;

    fn change_token_name(&self, name: &str, symbol: &str) -> Result<(), AssetError>;

    /// Record the predecessor ledger this one takes calls from
    fn set_delegated_from(&self, source: &Address) -> Result<(), AssetError>;

    /// Forward calls to `delegate` and hand it both storage contracts.
    ///
    /// Fails unless the ledger currently owns both sheets.
    fn delegate_to_new_contract(
        &self,
        delegate: &Address,
        balance_sheet: &Address,
        allowance_sheet: &Address,
    ) -> Result<(), AssetError>;

    /// Offer ownership of a contract the ledger owns to `to`
    fn request_reclaim_contract(&self, contract: &Address, to: &Address) -> Result<(), AssetError>;

    /// Complete a pending handover; `claimant` must be the offered owner
    fn claim_contract(&self, contract: &Address, claimant: &Address) -> Result<(), AssetError>;

    /// Sweep the native balance held by the ledger to `to`
    fn reclaim_native(&self, to: &Address) -> Result<Amount, AssetError>;

    /// Sweep units of `token` held at the ledger's own address to `to`
    fn reclaim_token(&self, token: &Address, to: &Address) -> Result<Amount, AssetError>;
}

/// Owner and pending owner of a contract tracked by the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractCustody {
    pub owner: Address,
    #[serde(default)]
    pub pending_owner: Option<Address>,
}

fn default_ledger_address() -> Address {
    Address::new("asset-ledger")
}

fn default_balance_sheet() -> Address {
    Address::new("balance-sheet")
}

fn default_allowance_sheet() -> Address {
    Address::new("allowance-sheet")
}

fn default_contracts() -> BTreeMap<Address, ContractCustody> {
    [default_balance_sheet(), default_allowance_sheet()]
        .into_iter()
        .map(|sheet| {
            (
                sheet,
                ContractCustody {
                    owner: default_ledger_address(),
                    pending_owner: None,
                },
            )
        })
        .collect()
}

/// Serializable state of [`InMemoryAssetLedger`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetState {
    /// The ledger's own identity, also the token it issues
    #[serde(default = "default_ledger_address")]
    pub address: Address,
    #[serde(default)]
    pub balances: BTreeMap<Address, Amount>,
    #[serde(default)]
    pub total_supply: Amount,
    #[serde(default)]
    pub burn_min: Amount,
    #[serde(default)]
    pub burn_max: Amount,
    #[serde(default)]
    pub staking_fees: StakingFees,
    #[serde(default)]
    pub staker: Option<Address>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub delegated_from: Option<Address>,
    #[serde(default)]
    pub delegate: Option<Address>,
    #[serde(default = "default_balance_sheet")]
    pub balance_sheet: Address,
    #[serde(default = "default_allowance_sheet")]
    pub allowance_sheet: Address,
    #[serde(default = "default_contracts")]
    pub contracts: BTreeMap<Address, ContractCustody>,
    /// Native balance sent to the ledger's address
    #[serde(default)]
    pub native_held: Amount,
    #[serde(default)]
    pub native_paid_out: BTreeMap<Address, Amount>,
}

impl Default for AssetState {
    fn default() -> Self {
        Self {
            address: default_ledger_address(),
            balances: BTreeMap::new(),
            total_supply: Amount::ZERO,
            burn_min: Amount::ZERO,
            burn_max: Amount::ZERO,
            staking_fees: StakingFees::default(),
            staker: None,
            name: String::new(),
            symbol: String::new(),
            delegated_from: None,
            delegate: None,
            balance_sheet: default_balance_sheet(),
            allowance_sheet: default_allowance_sheet(),
            contracts: default_contracts(),
            native_held: Amount::ZERO,
            native_paid_out: BTreeMap::new(),
        }
    }
}

/// In-process asset ledger used by tests and the CLI
pub struct InMemoryAssetLedger {
    state: RwLock<AssetState>,
    fail_next_mint: AtomicBool,
}

impl InMemoryAssetLedger {
    pub fn new() -> Self {
        Self::from_state(AssetState::default())
    }

    pub fn from_state(state: AssetState) -> Self {
        Self {
            state: RwLock::new(state),
            fail_next_mint: AtomicBool::new(false),
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_state(serde_json::from_str(&content)?))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.state())?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn state(&self) -> AssetState {
        self.state.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn balance_of(&self, who: &Address) -> Amount {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .balances
            .get(who)
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    pub fn total_supply(&self) -> Amount {
        self.state.read().unwrap_or_else(|e| e.into_inner()).total_supply
    }

    pub fn address(&self) -> Address {
        self.state.read().unwrap_or_else(|e| e.into_inner()).address.clone()
    }

    pub fn contract_owner(&self, contract: &Address) -> Option<Address> {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contracts
            .get(contract)
            .map(|custody| custody.owner.clone())
    }

    /// Native value forced onto the ledger's address
    pub fn deposit_native(&self, amount: Amount) -> Result<(), AssetError> {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.native_held = state
            .native_held
            .checked_add(&amount)
            .ok_or_else(|| AssetError::InvalidParameter("native balance overflow".to_string()))?;
        Ok(())
    }

    /// Make the next `mint` call fail once
    pub fn fail_next_mint(&self) {
        self.fail_next_mint.store(true, Ordering::SeqCst);
    }
}

impl Default for InMemoryAssetLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetLedger for InMemoryAssetLedger {
    fn name(&self) -> &str {
        "in-memory"
    }

    fn mint(&self, to: &Address, amount: Amount) -> Result<(), AssetError> {
        if self.fail_next_mint.swap(false, Ordering::SeqCst) {
            return Err(AssetError::Unavailable("injected mint failure".to_string()));
        }
        if to.is_null() {
            return Err(AssetError::MintRejected("recipient is null".to_string()));
        }

        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        let supply = state
            .total_supply
            .checked_add(&amount)
            .ok_or_else(|| AssetError::MintRejected("total supply overflow".to_string()))?;
        let balance = state
            .balances
            .get(to)
            .copied()
            .unwrap_or(Amount::ZERO)
            .checked_add(&amount)
            .ok_or_else(|| AssetError::MintRejected("balance overflow".to_string()))?;

        state.total_supply = supply;
        state.balances.insert(to.clone(), balance);
        tracing::debug!(to = %to, amount = %amount, supply = %supply, "Supply minted");
        Ok(())
    }

    fn set_burn_bounds(&self, min: Amount, max: Amount) -> Result<(), AssetError> {
        if min > max {
            return Err(AssetError::InvalidParameter(format!(
                "burn min {} exceeds max {}",
                min, max
            )));
        }
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.burn_min = min;
        state.burn_max = max;
        Ok(())
    }

    fn change_staking_fees(&self, fees: &StakingFees) -> Result<(), AssetError> {
        if let Some(field) = fees.zero_denominator() {
            return Err(AssetError::InvalidParameter(format!("{} is zero", field)));
        }
        self.state.write().unwrap_or_else(|e| e.into_inner()).staking_fees = fees.clone();
        Ok(())
    }

    fn change_staker(&self, staker: &Address) -> Result<(), AssetError> {
        if staker.is_null() {
            return Err(AssetError::InvalidParameter("staker is null".to_string()));
        }
        self.state.write().unwrap_or_else(|e| e.into_inner()).staker = Some(staker.clone());
        Ok(())
    }

    fn change_token_name(&self, name: &str, symbol: &str) -> Result<(), AssetError> {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.name = name.to_string();
        state.symbol = symbol.to_string();
        Ok(())
    }

    fn set_delegated_from(&self, source: &Address) -> Result<(), AssetError> {
        self.state.write().unwrap_or_else(|e| e.into_inner()).delegated_from = Some(source.clone());
        Ok(())
    }

    fn delegate_to_new_contract(
        &self,
        delegate: &Address,
        balance_sheet: &Address,
        allowance_sheet: &Address,
    ) -> Result<(), AssetError> {
        if delegate.is_null() {
            return Err(AssetError::InvalidParameter("delegate is null".to_string()));
        }

        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        for sheet in [balance_sheet, allowance_sheet] {
            let owned = state
                .contracts
                .get(sheet)
                .is_some_and(|custody| custody.owner == state.address);
            if !owned {
                return Err(AssetError::InvalidParameter(format!(
                    "{} is not owned by the ledger",
                    sheet
                )));
            }
        }

        for sheet in [balance_sheet, allowance_sheet] {
            state.contracts.insert(
                sheet.clone(),
                ContractCustody {
                    owner: delegate.clone(),
                    pending_owner: None,
                },
            );
        }
        state.delegate = Some(delegate.clone());
        tracing::debug!(delegate = %delegate, "Ledger delegated");
        Ok(())
    }

    fn request_reclaim_contract(&self, contract: &Address, to: &Address) -> Result<(), AssetError> {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        let address = state.address.clone();
        match state.contracts.get_mut(contract) {
            Some(custody) if custody.owner == address => {
                custody.pending_owner = Some(to.clone());
                Ok(())
            }
            _ => Err(AssetError::InvalidParameter(format!(
                "{} is not owned by the ledger",
                contract
            ))),
        }
    }

    fn claim_contract(&self, contract: &Address, claimant: &Address) -> Result<(), AssetError> {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        match state.contracts.get_mut(contract) {
            Some(custody) if custody.pending_owner.as_ref() == Some(claimant) => {
                custody.owner = claimant.clone();
                custody.pending_owner = None;
                Ok(())
            }
            _ => Err(AssetError::InvalidParameter(format!(
                "no handover of {} pending for {}",
                contract, claimant
            ))),
        }
    }

    fn reclaim_native(&self, to: &Address) -> Result<Amount, AssetError> {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        let amount = state.native_held;
        let paid = state
            .native_paid_out
            .get(to)
            .copied()
            .unwrap_or(Amount::ZERO)
            .checked_add(&amount)
            .ok_or_else(|| AssetError::InvalidParameter("native balance overflow".to_string()))?;

        state.native_paid_out.insert(to.clone(), paid);
        state.native_held = Amount::ZERO;
        Ok(amount)
    }

    fn reclaim_token(&self, token: &Address, to: &Address) -> Result<Amount, AssetError> {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        let address = state.address.clone();
        if token != &address {
            return Err(AssetError::InvalidParameter(format!("unknown token {}", token)));
        }

        let held = state.balances.remove(&address).unwrap_or(Amount::ZERO);
        let balance = state
            .balances
            .get(to)
            .copied()
            .unwrap_or(Amount::ZERO)
            .checked_add(&held)
            .ok_or_else(|| AssetError::MintRejected("balance overflow".to_string()))?;
        state.balances.insert(to.clone(), balance);
        Ok(held)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_mint_credits_balance_and_supply() {
        let ledger = InMemoryAssetLedger::new();
        let alice = Address::new("alice");

        ledger.mint(&alice, Amount::from(10)).unwrap();
        ledger.mint(&alice, Amount::from(5)).unwrap();

        assert_eq!(ledger.balance_of(&alice), Amount::from(15));
        assert_eq!(ledger.total_supply(), Amount::from(15));
        assert_eq!(ledger.balance_of(&Address::new("bob")), Amount::ZERO);
    }

    #[test]
    fn test_fail_next_mint_is_one_shot() {
        let ledger = InMemoryAssetLedger::new();
        let alice = Address::new("alice");
        ledger.fail_next_mint();

        assert!(matches!(
            ledger.mint(&alice, Amount::from(10)),
            Err(AssetError::Unavailable(_))
        ));
        assert_eq!(ledger.total_supply(), Amount::ZERO);

        ledger.mint(&alice, Amount::from(10)).unwrap();
        assert_eq!(ledger.total_supply(), Amount::from(10));
    }

    #[test]
    fn test_burn_bounds_validation() {
        let ledger = InMemoryAssetLedger::new();
        assert!(ledger.set_burn_bounds(Amount::from(10), Amount::from(5)).is_err());
        ledger.set_burn_bounds(Amount::from(5), Amount::from(10)).unwrap();

        let state = ledger.state();
        assert_eq!(state.burn_min, Amount::from(5));
        assert_eq!(state.burn_max, Amount::from(10));
    }

    #[test]
    fn test_state_file_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("supply.json");

        let ledger = InMemoryAssetLedger::new();
        ledger.mint(&Address::new("alice"), Amount::from(42)).unwrap();
        ledger.change_token_name("Mint USD", "MUSD").unwrap();
        ledger.save(&path).unwrap();

        let reloaded = InMemoryAssetLedger::from_file(&path).unwrap();
        assert_eq!(reloaded.balance_of(&Address::new("alice")), Amount::from(42));
        assert_eq!(reloaded.state().symbol, "MUSD");
    }

    #[test]
    fn test_legacy_state_file_gets_default_custody() {
        let state: AssetState = serde_json::from_str(r#"{"total_supply": "5"}"#).unwrap();
        assert_eq!(state.address, Address::new("asset-ledger"));
        assert_eq!(
            state.contracts[&state.balance_sheet].owner,
            Address::new("asset-ledger")
        );
    }

    #[test]
    fn test_delegation_requires_owned_sheets() {
        let ledger = InMemoryAssetLedger::new();
        let state = ledger.state();
        let delegate = Address::new("ledger-v2");

        assert!(ledger
            .delegate_to_new_contract(&delegate, &Address::new("0x123"), &Address::new("0x234"))
            .is_err());
        assert!(ledger.state().delegate.is_none());

        ledger
            .delegate_to_new_contract(&delegate, &state.balance_sheet, &state.allowance_sheet)
            .unwrap();
        assert_eq!(ledger.contract_owner(&state.balance_sheet), Some(delegate.clone()));
        assert_eq!(ledger.contract_owner(&state.allowance_sheet), Some(delegate.clone()));

        // sheets already handed over
        assert!(ledger
            .delegate_to_new_contract(&delegate, &state.balance_sheet, &state.allowance_sheet)
            .is_err());
    }

    #[test]
    fn test_contract_handover_needs_matching_claimant() {
        let ledger = InMemoryAssetLedger::new();
        let sheet = ledger.state().balance_sheet;
        let owner = Address::new("owner");

        assert!(ledger.claim_contract(&sheet, &owner).is_err());
        ledger.request_reclaim_contract(&sheet, &owner).unwrap();
        assert!(ledger.claim_contract(&sheet, &Address::new("mallory")).is_err());

        ledger.claim_contract(&sheet, &owner).unwrap();
        assert_eq!(ledger.contract_owner(&sheet), Some(owner.clone()));
        assert!(ledger.request_reclaim_contract(&sheet, &owner).is_err());
    }

    #[test]
    fn test_reclaim_native_and_token() {
        let ledger = InMemoryAssetLedger::new();
        let owner = Address::new("owner");
        ledger.deposit_native(Amount::from(10)).unwrap();
        ledger.mint(&ledger.address(), Amount::from(40)).unwrap();

        assert_eq!(ledger.reclaim_native(&owner).unwrap(), Amount::from(10));
        assert_eq!(ledger.reclaim_native(&owner).unwrap(), Amount::ZERO);
        assert_eq!(ledger.state().native_paid_out[&owner], Amount::from(10));

        assert!(ledger.reclaim_token(&Address::new("other-token"), &owner).is_err());
        assert_eq!(ledger.reclaim_token(&ledger.address(), &owner).unwrap(), Amount::from(40));
        assert_eq!(ledger.balance_of(&owner), Amount::from(40));
        assert_eq!(ledger.balance_of(&ledger.address()), Amount::ZERO);
        assert_eq!(ledger.total_supply(), Amount::from(40));
    }
}
