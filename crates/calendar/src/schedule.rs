//! Daily check-time schedule

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CalendarError;

/// A daily (hour, minute) instant at which guardians review pending mints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CheckTime {
    pub hour: u32,
    pub minute: u32,
}

impl CheckTime {
    /// Create a check time; hour must be < 24 and minute < 60
    pub fn new(hour: u32, minute: u32) -> Result<Self, CalendarError> {
        if hour >= 24 || minute >= 60 {
            return Err(CalendarError::InvalidCheckTime { hour, minute });
        }
        Ok(Self { hour, minute })
    }

    /// Minutes since local midnight
    pub fn minute_of_day(&self) -> u32 {
        self.hour * 60 + self.minute
    }
}

impl fmt::Display for CheckTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}
