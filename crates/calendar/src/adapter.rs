//! Calendar adapter - timestamp decomposition

use chrono::{DateTime, Datelike, FixedOffset, Offset, Timelike, Utc};

use crate::error::CalendarError;
use crate::parts::DateParts;

/// Converts a UTC timestamp into local date/time parts.
///
/// Implementations must be pure: the same timestamp always yields the
/// same parts.
pub trait Calendar: Send + Sync {
    /// Name used in logs and replacement events
    fn name(&self) -> &str;

    /// Decompose a timestamp into year/month/day/weekday/hour/minute
    fn decompose(&self, timestamp: DateTime<Utc>) -> DateParts;

    /// Fixed offset from UTC in minutes, if the calendar has one
    fn offset_minutes(&self) -> Option<i32> {
        None
    }
}

/// Calendar that applies a fixed offset from UTC before decomposing.
#[derive(Debug, Clone)]
pub struct FixedOffsetCalendar {
    offset: FixedOffset,
    name: String,
}

impl FixedOffsetCalendar {
    /// Plain UTC calendar
    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
            name: "utc".to_string(),
        }
    }

    /// Calendar whose local time is UTC shifted by `minutes` (east positive)
    pub fn with_offset_minutes(minutes: i32) -> Result<Self, CalendarError> {
        let offset = minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(CalendarError::InvalidOffset(minutes))?;
        Ok(Self {
            offset,
            name: format!("utc{:+}m", minutes),
        })
    }
}

impl Default for FixedOffsetCalendar {
    fn default() -> Self {
        Self::utc()
    }
}

impl Calendar for FixedOffsetCalendar {
    fn name(&self) -> &str {
        &self.name
    }

    fn decompose(&self, timestamp: DateTime<Utc>) -> DateParts {
        let local = timestamp.with_timezone(&self.offset);
        DateParts {
            year: local.year(),
            month: local.month(),
            day: local.day(),
            weekday: local.weekday(),
            hour: local.hour(),
            minute: local.minute(),
        }
    }

    fn offset_minutes(&self) -> Option<i32> {
        Some(self.offset.local_minus_utc() / 60)
    }
}
