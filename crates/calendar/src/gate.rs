//! Calendar gate - when may mints be requested and finalized
//!
//! Two independent questions:
//!
//! 1. **Is today a minting day?** Weekends and declared holidays are closed.
//! 2. **Has a request waited long enough?** A request must sit through the
//!    next scheduled check time, plus a safety buffer, before a non-owner
//!    may finalize it.
//!
//! ```text
//!   request 07:20        check 08:00        eligible 08:30
//!   ──────●──────────────────┃─────────────────────●──────────▶
//!                            │◀──── buffer ───────▶│
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::adapter::Calendar;
use crate::parts::CalendarDate;
use crate::schedule::CheckTime;

/// Minutes in a calendar day
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Buffer after a check time before a request becomes finalizable
pub const DEFAULT_FINALIZE_BUFFER_MINUTES: u32 = 30;

/// Why minting is closed on a given day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClosedReason {
    Weekend { date: CalendarDate },
    Holiday { date: CalendarDate },
}

impl fmt::Display for ClosedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClosedReason::Weekend { date } => write!(f, "{} is a weekend day", date),
            ClosedReason::Holiday { date } => write!(f, "{} is a declared holiday", date),
        }
    }
}

/// Read-only view over the schedule used to answer timing questions
pub struct CalendarGate<'a> {
    calendar: &'a dyn Calendar,
    check_times: &'a [CheckTime],
    holidays: &'a BTreeSet<CalendarDate>,
    buffer: Duration,
}

impl<'a> CalendarGate<'a> {
    pub fn new(
        calendar: &'a dyn Calendar,
        check_times: &'a [CheckTime],
        holidays: &'a BTreeSet<CalendarDate>,
    ) -> Self {
        Self {
            calendar,
            check_times,
            holidays,
            buffer: Duration::minutes(i64::from(DEFAULT_FINALIZE_BUFFER_MINUTES)),
        }
    }

    /// Override the safety buffer after a check time
    pub fn with_buffer_minutes(mut self, minutes: u32) -> Self {
        self.buffer = Duration::minutes(i64::from(minutes));
        self
    }

    /// Returns the reason minting is closed at `now`, if it is
    pub fn closed_reason(&self, now: DateTime<Utc>) -> Option<ClosedReason> {
        let parts = self.calendar.decompose(now);
        let date = parts.date();
        if parts.is_weekend() {
            return Some(ClosedReason::Weekend { date });
        }
        if self.holidays.contains(&date) {
            return Some(ClosedReason::Holiday { date });
        }
        None
    }

    pub fn minting_allowed_today(&self, now: DateTime<Utc>) -> bool {
        self.closed_reason(now).is_none()
    }

    /// The first check time strictly after the request's local hour:minute,
    /// wrapping to tomorrow's earliest check time when none remain today.
    ///
    /// Returns `None` when no check times are configured.
    pub fn next_check_time(&self, requested_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let earliest = self.check_times.iter().map(CheckTime::minute_of_day).min()?;
        let requested = self.calendar.decompose(requested_at).minute_of_day();

        let later_today = self
            .check_times
            .iter()
            .map(CheckTime::minute_of_day)
            .filter(|minute| *minute > requested)
            .min();

        let minutes_ahead = match later_today {
            Some(minute) => minute - requested,
            None => MINUTES_PER_DAY - requested + earliest,
        };

        // Anchor on the start of the request's minute so check times land on :00 seconds
        let minute_start = DateTime::from_timestamp(requested_at.timestamp().div_euclid(60) * 60, 0)?;
        Some(minute_start + Duration::minutes(i64::from(minutes_ahead)))
    }

    /// Earliest instant a non-owner may finalize a request made at `requested_at`
    pub fn eligible_at(&self, requested_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.next_check_time(requested_at)
            .map(|check| check + self.buffer)
    }

    /// With no check times configured this is always false.
    pub fn enough_time_passed(&self, requested_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self.eligible_at(requested_at) {
            Some(eligible) => now >= eligible,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::FixedOffsetCalendar;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        // January 2024: the 8th is a Monday
        Utc.with_ymd_and_hms(2024, 1, day, hour, minute, 0).unwrap()
    }

    fn schedule() -> Vec<CheckTime> {
        vec![CheckTime::new(8, 0).unwrap(), CheckTime::new(20, 0).unwrap()]
    }

    #[test]
    fn test_weekdays_open_weekends_closed() {
        let calendar = FixedOffsetCalendar::utc();
        let holidays = BTreeSet::new();
        let checks = schedule();
        let gate = CalendarGate::new(&calendar, &checks, &holidays);

        assert!(gate.minting_allowed_today(at(8, 10, 0)));
        assert!(gate.minting_allowed_today(at(12, 23, 59)));
        assert!(!gate.minting_allowed_today(at(13, 0, 0)));
        assert!(!gate.minting_allowed_today(at(14, 12, 0)));
        assert_eq!(
            gate.closed_reason(at(13, 9, 0)),
            Some(ClosedReason::Weekend { date: CalendarDate::new(2024, 1, 13).unwrap() })
        );
    }

    #[test]
    fn test_holiday_closes_day() {
        let calendar = FixedOffsetCalendar::utc();
        let mut holidays = BTreeSet::new();
        let new_years = CalendarDate::new(2024, 1, 9).unwrap();
        holidays.insert(new_years);
        let checks = schedule();
        let gate = CalendarGate::new(&calendar, &checks, &holidays);

        assert_eq!(
            gate.closed_reason(at(9, 11, 0)),
            Some(ClosedReason::Holiday { date: new_years })
        );
        assert!(gate.minting_allowed_today(at(10, 11, 0)));
    }

    #[test]
    fn test_next_check_time_same_day() {
        let calendar = FixedOffsetCalendar::utc();
        let holidays = BTreeSet::new();
        let checks = schedule();
        let gate = CalendarGate::new(&calendar, &checks, &holidays);

        assert_eq!(gate.next_check_time(at(8, 7, 20)), Some(at(8, 8, 0)));
        assert_eq!(gate.next_check_time(at(8, 10, 32)), Some(at(8, 20, 0)));
        // Exactly on a check time: the next one counts
        assert_eq!(gate.next_check_time(at(8, 8, 0)), Some(at(8, 20, 0)));
    }

    #[test]
    fn test_next_check_time_wraps_to_tomorrow() {
        let calendar = FixedOffsetCalendar::utc();
        let holidays = BTreeSet::new();
        let checks = schedule();
        let gate = CalendarGate::new(&calendar, &checks, &holidays);

        assert_eq!(gate.next_check_time(at(8, 21, 34)), Some(at(9, 8, 0)));
        assert_eq!(gate.next_check_time(at(8, 20, 0)), Some(at(9, 8, 0)));
    }

    #[test]
    fn test_seconds_are_ignored_when_anchoring() {
        let calendar = FixedOffsetCalendar::utc();
        let holidays = BTreeSet::new();
        let checks = schedule();
        let gate = CalendarGate::new(&calendar, &checks, &holidays);

        let requested = Utc.with_ymd_and_hms(2024, 1, 8, 7, 20, 45).unwrap();
        assert_eq!(gate.next_check_time(requested), Some(at(8, 8, 0)));
    }

    #[test]
    fn test_buffer_after_check_time() {
        let calendar = FixedOffsetCalendar::utc();
        let holidays = BTreeSet::new();
        let checks = schedule();
        let gate = CalendarGate::new(&calendar, &checks, &holidays);

        // Requested 07:20, check 08:00, eligible 08:30
        assert!(gate.enough_time_passed(at(8, 7, 20), at(8, 10, 20)));
        assert!(gate.enough_time_passed(at(8, 7, 20), at(8, 8, 30)));
        assert!(!gate.enough_time_passed(at(8, 7, 20), at(8, 8, 29)));

        // Requested 07:23 or 07:25, one hour later is still inside the buffer
        assert!(!gate.enough_time_passed(at(8, 7, 23), at(8, 8, 23)));
        assert!(!gate.enough_time_passed(at(8, 7, 25), at(8, 8, 25)));

        // Right after the request nothing has passed
        assert!(!gate.enough_time_passed(at(8, 7, 20), at(8, 7, 20)));
    }

    #[test]
    fn test_requests_from_yesterday() {
        let calendar = FixedOffsetCalendar::utc();
        let holidays = BTreeSet::new();
        let checks = schedule();
        let gate = CalendarGate::new(&calendar, &checks, &holidays);
        let now = at(9, 9, 0);

        assert!(gate.enough_time_passed(at(8, 7, 29), now));
        assert!(gate.enough_time_passed(at(8, 8, 31), now));
        assert!(gate.enough_time_passed(at(8, 10, 32), now));
        assert!(gate.enough_time_passed(at(8, 18, 32), now));

        // After the last check time: waits for this morning's 08:00 + buffer
        assert!(!gate.enough_time_passed(at(8, 21, 34), at(9, 8, 15)));
        assert!(gate.enough_time_passed(at(8, 21, 34), now));
    }

    #[test]
    fn test_custom_buffer() {
        let calendar = FixedOffsetCalendar::utc();
        let holidays = BTreeSet::new();
        let checks = schedule();
        let gate = CalendarGate::new(&calendar, &checks, &holidays).with_buffer_minutes(0);

        assert!(gate.enough_time_passed(at(8, 7, 20), at(8, 8, 0)));
        assert_eq!(gate.eligible_at(at(8, 7, 20)), Some(at(8, 8, 0)));
    }

    #[test]
    fn test_no_check_times_never_enough() {
        let calendar = FixedOffsetCalendar::utc();
        let holidays = BTreeSet::new();
        let gate = CalendarGate::new(&calendar, &[], &holidays);

        assert_eq!(gate.next_check_time(at(8, 7, 20)), None);
        assert!(!gate.enough_time_passed(at(8, 7, 20), at(20, 0, 0)));
    }

    #[test]
    fn test_check_times_are_local() {
        // UTC+7: 08:00 local is 01:00 UTC
        let calendar = FixedOffsetCalendar::with_offset_minutes(7 * 60).unwrap();
        let holidays = BTreeSet::new();
        let checks = schedule();
        let gate = CalendarGate::new(&calendar, &checks, &holidays);

        assert_eq!(gate.next_check_time(at(8, 0, 20)), Some(at(8, 1, 0)));
        assert_eq!(gate.eligible_at(at(8, 0, 20)), Some(at(8, 1, 30)));
    }

    #[test]
    fn test_closed_reason_display() {
        let date = CalendarDate::new(2024, 1, 13).unwrap();
        assert_eq!(
            ClosedReason::Weekend { date }.to_string(),
            "2024-01-13 is a weekend day"
        );
        assert_eq!(
            ClosedReason::Holiday { date }.to_string(),
            "2024-01-13 is a declared holiday"
        );
    }
}
