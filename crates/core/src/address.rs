//! Address - identity of an actor known to the controller

use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque account identity.
///
/// The empty string and any `0x`-prefixed string made only of zeros are
/// treated as the null address. Key rotations and ownership transfers
/// must never target it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Create an address from any string-like identity
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The canonical null address
    pub fn null() -> Self {
        Self(String::new())
    }

    /// Check whether this is the null address
    pub fn is_null(&self) -> bool {
        let raw = self.0.trim();
        if raw.is_empty() {
            return true;
        }
        match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
            Some(hex) => hex.chars().all(|c| c == '0'),
            None => false,
        }
    }

    /// Borrow the underlying identity string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "<null>")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Address {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
