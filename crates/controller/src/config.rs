//! Mint policy configuration
//!
//! Every knob starts at zero and both schedule sets start empty, so a fresh
//! controller refuses non-owner mints until the owner configures it.
//! Partial JSON files keep defaults for missing fields.

use mintgate_calendar::{CalendarDate, CalendarError, CheckTime, DEFAULT_FINALIZE_BUFFER_MINUTES};
use mintgate_core::Amount;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Policy knobs owned by the controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    // === Quota ===
    /// Ceiling on volume requested within one quota window
    #[serde(default)]
    pub mint_limit: Amount,

    // === Approval tiers ===
    /// Amounts at or below this need `small_mint_approvals`
    #[serde(default)]
    pub small_mint_threshold: Amount,

    #[serde(default)]
    pub small_mint_approvals: u8,

    #[serde(default)]
    pub large_mint_approvals: u8,

    // === Schedule ===
    /// Daily review instants. Duplicates are allowed.
    #[serde(default)]
    pub check_times: Vec<CheckTime>,

    #[serde(default)]
    pub holidays: BTreeSet<CalendarDate>,

    /// Safety buffer after a check time (minutes)
    #[serde(default = "default_finalize_buffer_minutes")]
    pub finalize_buffer_minutes: u32,

    /// Offset applied by the calendar adapter before decomposition
    #[serde(default)]
    pub time_zone_offset_minutes: i32,

    // === Asset ledger ===
    #[serde(default)]
    pub staking_fees: StakingFees,
}

/// Fee parameters forwarded to the asset ledger
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StakingFees {
    pub transfer_fee_numerator: u64,
    pub transfer_fee_denominator: u64,
    pub mint_fee_numerator: u64,
    pub mint_fee_denominator: u64,
    pub mint_fee_flat: Amount,
    pub burn_fee_numerator: u64,
    pub burn_fee_denominator: u64,
    pub burn_fee_flat: Amount,
}

impl StakingFees {
    /// Name of the first zero denominator, if any
    pub fn zero_denominator(&self) -> Option<&'static str> {
        if self.transfer_fee_denominator == 0 {
            Some("transfer_fee_denominator")
        } else if self.mint_fee_denominator == 0 {
            Some("mint_fee_denominator")
        } else if self.burn_fee_denominator == 0 {
            Some("burn_fee_denominator")
        } else {
            None
        }
    }
}

fn default_finalize_buffer_minutes() -> u32 {
    DEFAULT_FINALIZE_BUFFER_MINUTES
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            mint_limit: Amount::ZERO,
            small_mint_threshold: Amount::ZERO,
            small_mint_approvals: 0,
            large_mint_approvals: 0,
            check_times: Vec::new(),
            holidays: BTreeSet::new(),
            finalize_buffer_minutes: default_finalize_buffer_minutes(),
            time_zone_offset_minutes: 0,
            staking_fees: StakingFees::default(),
        }
    }
}

impl PolicyConfig {
    /// Load configuration from JSON file
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        config
            .validate()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(config)
    }

    /// Re-check values that serde accepts but the schedule cannot use
    pub fn validate(&self) -> Result<(), CalendarError> {
        for check in &self.check_times {
            CheckTime::new(check.hour, check.minute)?;
        }
        for date in &self.holidays {
            CalendarDate::new(date.year, date.month, date.day)?;
        }
        Ok(())
    }

    /// Approvals needed for `amount` under the tier rule
    pub fn required_approvals(&self, amount: Amount) -> u8 {
        if amount <= self.small_mint_threshold {
            self.small_mint_approvals
        } else {
            self.large_mint_approvals
        }
    }

    pub fn set_mint_limit(&mut self, limit: Amount) -> Amount {
        std::mem::replace(&mut self.mint_limit, limit)
    }

    pub fn set_small_mint_threshold(&mut self, threshold: Amount) -> Amount {
        std::mem::replace(&mut self.small_mint_threshold, threshold)
    }

    /// Returns the previous `(small, large)` pair
    pub fn set_minimal_approvals(&mut self, small: u8, large: u8) -> (u8, u8) {
        let previous = (self.small_mint_approvals, self.large_mint_approvals);
        self.small_mint_approvals = small;
        self.large_mint_approvals = large;
        previous
    }

    pub fn add_check_time(&mut self, check: CheckTime) {
        self.check_times.push(check);
    }

    /// Swap-remove by position; the last check time fills the hole
    pub fn remove_check_time(&mut self, index: usize) -> Option<CheckTime> {
        if index < self.check_times.len() {
            Some(self.check_times.swap_remove(index))
        } else {
            None
        }
    }

    /// Returns false when the date was already declared
    pub fn declare_holiday(&mut self, date: CalendarDate) -> bool {
        self.holidays.insert(date)
    }

    pub fn lift_holiday(&mut self, date: &CalendarDate) -> bool {
        self.holidays.remove(date)
    }

    pub fn set_staking_fees(&mut self, fees: StakingFees) -> StakingFees {
        std::mem::replace(&mut self.staking_fees, fees)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    fn amount(value: rust_decimal::Decimal) -> Amount {
        Amount::new(value).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = PolicyConfig::default();

        assert_eq!(config.mint_limit, Amount::ZERO);
        assert_eq!(config.small_mint_threshold, Amount::ZERO);
        assert_eq!(config.small_mint_approvals, 0);
        assert_eq!(config.large_mint_approvals, 0);
        assert!(config.check_times.is_empty());
        assert!(config.holidays.is_empty());
        assert_eq!(config.finalize_buffer_minutes, 30);
        assert_eq!(config.time_zone_offset_minutes, 0);
    }

    #[test]
    fn test_required_approvals_by_tier() {
        let mut config = PolicyConfig::default();
        config.set_small_mint_threshold(amount(dec!(11)));
        config.set_minimal_approvals(2, 3);

        assert_eq!(config.required_approvals(amount(dec!(10))), 2);
        assert_eq!(config.required_approvals(amount(dec!(11))), 2);
        assert_eq!(config.required_approvals(amount(dec!(11.01))), 3);
        assert_eq!(config.required_approvals(amount(dec!(30))), 3);
    }

    #[test]
    fn test_setters_return_previous_value() {
        let mut config = PolicyConfig::default();

        assert_eq!(config.set_mint_limit(amount(dec!(100))), Amount::ZERO);
        assert_eq!(config.set_mint_limit(amount(dec!(30))), amount(dec!(100)));
        assert_eq!(config.set_minimal_approvals(2, 3), (0, 0));
        assert_eq!(config.set_minimal_approvals(1, 1), (2, 3));
    }

    #[test]
    fn test_remove_check_time_swaps_last_into_hole() {
        let mut config = PolicyConfig::default();
        config.add_check_time(CheckTime::new(8, 0).unwrap());
        config.add_check_time(CheckTime::new(12, 0).unwrap());
        config.add_check_time(CheckTime::new(20, 0).unwrap());

        let removed = config.remove_check_time(0);
        assert_eq!(removed, Some(CheckTime::new(8, 0).unwrap()));
        assert_eq!(config.check_times[0], CheckTime::new(20, 0).unwrap());
        assert_eq!(config.check_times.len(), 2);
        assert_eq!(config.remove_check_time(5), None);
    }

    #[test]
    fn test_holiday_set_semantics() {
        let mut config = PolicyConfig::default();
        let date = CalendarDate::new(2024, 12, 25).unwrap();

        assert!(config.declare_holiday(date));
        assert!(!config.declare_holiday(date));
        assert!(config.lift_holiday(&date));
        assert!(!config.lift_holiday(&date));
    }

    #[test]
    fn test_staking_fees_zero_denominator() {
        let mut fees = StakingFees {
            transfer_fee_numerator: 7,
            transfer_fee_denominator: 10_000,
            mint_fee_numerator: 0,
            mint_fee_denominator: 10_000,
            mint_fee_flat: Amount::ZERO,
            burn_fee_numerator: 0,
            burn_fee_denominator: 10_000,
            burn_fee_flat: Amount::ZERO,
        };
        assert_eq!(fees.zero_denominator(), None);

        fees.mint_fee_denominator = 0;
        assert_eq!(fees.zero_denominator(), Some("mint_fee_denominator"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"mint_limit": "100", "check_times": [{{"hour": 8, "minute": 0}}]}}"#
        )
        .unwrap();

        let config = PolicyConfig::from_file(file.path()).unwrap();
        assert_eq!(config.mint_limit, amount(dec!(100)));
        assert_eq!(config.check_times.len(), 1);
        assert_eq!(config.finalize_buffer_minutes, 30);
        assert!(config.holidays.is_empty());
    }

    #[test]
    fn test_file_with_bad_check_time_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"check_times": [{{"hour": 24, "minute": 0}}]}}"#).unwrap();

        let err = PolicyConfig::from_file(file.path()).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }
}
