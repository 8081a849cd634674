//! Amount - Non-negative decimal quantity of the controlled asset
//!
//! Mint requests, limits, thresholds and fee flats are all `Amount`s.
//! JSON carries them as strings so no precision is lost.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Amount cannot be negative: {0}")]
    NegativeAmount(Decimal),

    #[error("Invalid amount: {0}")]
    Invalid(String),
}

/// Quantity of the asset; never negative.
///
/// ```
/// use mintgate_core::Amount;
/// use rust_decimal::Decimal;
///
/// let limit: Amount = "100".parse().unwrap();
/// let requested = Amount::new(Decimal::new(30, 0)).unwrap();
/// assert!(requested.checked_add(&requested).unwrap() < limit);
///
/// assert!(Amount::new(Decimal::new(-1, 0)).is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(AmountError::NegativeAmount(value));
        }
        Ok(Self(value))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// `None` when the sum leaves the decimal range
    pub fn checked_add(&self, other: &Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(Decimal::from(value))
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim()).map_err(|_| AmountError::Invalid(s.to_string()))?;
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_negative_rejected() {
        assert!(matches!(
            Amount::new(dec!(-0.01)),
            Err(AmountError::NegativeAmount(_))
        ));
        assert_eq!(Decimal::from(Amount::new(dec!(100)).unwrap()), dec!(100));
    }

    #[test]
    fn test_zero_detection() {
        assert!(Amount::ZERO.is_zero());
        assert!(Amount::default().is_zero());
        assert!(Amount::new(dec!(-0)).unwrap().is_zero());
        assert!(!Amount::from(1).is_zero());
    }

    #[test]
    fn test_checked_add_overflow() {
        assert_eq!(Amount::from(20).checked_add(&Amount::from(10)), Some(Amount::from(30)));

        let max = Amount::new(Decimal::MAX).unwrap();
        assert!(max.checked_add(&Amount::from(1)).is_none());
    }

    #[test]
    fn test_from_str() {
        assert_eq!(" 12.5 ".parse::<Amount>().unwrap(), Amount::new(dec!(12.5)).unwrap());
        assert!(matches!("-3".parse::<Amount>(), Err(AmountError::NegativeAmount(_))));
        assert!(matches!("ten".parse::<Amount>(), Err(AmountError::Invalid(_))));
    }

    #[test]
    fn test_serde_as_string() {
        let amount = Amount::new(dec!(123.45)).unwrap();
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "\"123.45\"");
        assert_eq!(serde_json::from_str::<Amount>(&json).unwrap(), amount);
        assert!(serde_json::from_str::<Amount>("\"-1\"").is_err());
    }
}
