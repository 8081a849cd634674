//! Daily quota tracker
//!
//! `minted_today` counts requested volume since the last reset. The window
//! is a calendar day as seen by the calendar adapter: the first request on
//! a new day starts from zero. Checking and committing are split so the
//! controller can validate everything else before touching the counter.

use mintgate_calendar::CalendarDate;
use mintgate_core::Amount;
use serde::{Deserialize, Serialize};

use crate::error::{ControllerError, ControllerResult};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyQuota {
    minted_today: Amount,
    /// Day of the last reset or commit; `None` before the first one
    window_day: Option<CalendarDate>,
}

/// Capacity check result, applied with [`DailyQuota::commit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaReservation {
    pub minted_after: Amount,
    pub window_day: CalendarDate,
    pub rolled_over: bool,
}

impl DailyQuota {
    /// Stored counter, without applying any pending day rollover
    pub fn minted_today(&self) -> Amount {
        self.minted_today
    }

    pub fn window_day(&self) -> Option<CalendarDate> {
        self.window_day
    }

    /// Whether a request on `today` starts a new window
    pub fn rolls_over(&self, today: CalendarDate) -> bool {
        matches!(self.window_day, Some(day) if day != today)
    }

    /// Volume counted against a request made on `today`
    pub fn effective_minted(&self, today: CalendarDate) -> Amount {
        if self.rolls_over(today) {
            Amount::ZERO
        } else {
            self.minted_today
        }
    }

    /// Check `amount` against `limit` after any implicit reset for `today`
    pub fn reserve(
        &self,
        amount: Amount,
        limit: Amount,
        today: CalendarDate,
    ) -> ControllerResult<QuotaReservation> {
        let minted = self.effective_minted(today);
        let minted_after = minted
            .checked_add(&amount)
            .ok_or(ControllerError::AmountOverflow)?;

        if minted_after > limit {
            return Err(ControllerError::DailyLimitExceeded {
                requested: amount,
                minted_today: minted,
                limit,
            });
        }

        Ok(QuotaReservation {
            minted_after,
            window_day: today,
            rolled_over: self.rolls_over(today),
        })
    }

    pub fn commit(&mut self, reservation: QuotaReservation) {
        self.minted_today = reservation.minted_after;
        self.window_day = Some(reservation.window_day);
    }

    /// Manual reset; returns the volume that was cleared
    pub fn reset(&mut self, today: CalendarDate) -> Amount {
        self.window_day = Some(today);
        std::mem::replace(&mut self.minted_today, Amount::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> CalendarDate {
        CalendarDate::new(2024, 1, d).unwrap()
    }

    #[test]
    fn test_reserve_within_limit() {
        let quota = DailyQuota::default();
        let reservation = quota
            .reserve(Amount::from(20), Amount::from(30), day(8))
            .unwrap();

        assert_eq!(reservation.minted_after, Amount::from(20));
        assert!(!reservation.rolled_over);
        // reserve alone does not mutate
        assert_eq!(quota.minted_today(), Amount::ZERO);
    }

    #[test]
    fn test_second_request_exceeds_limit() {
        let mut quota = DailyQuota::default();
        let first = quota
            .reserve(Amount::from(20), Amount::from(30), day(8))
            .unwrap();
        quota.commit(first);

        let err = quota
            .reserve(Amount::from(20), Amount::from(30), day(8))
            .unwrap_err();
        match err {
            ControllerError::DailyLimitExceeded {
                requested,
                minted_today,
                limit,
            } => {
                assert_eq!(requested, Amount::from(20));
                assert_eq!(minted_today, Amount::from(20));
                assert_eq!(limit, Amount::from(30));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_exactly_at_limit_is_allowed() {
        let mut quota = DailyQuota::default();
        let reservation = quota
            .reserve(Amount::from(30), Amount::from(30), day(8))
            .unwrap();
        quota.commit(reservation);
        assert_eq!(quota.minted_today(), Amount::from(30));
    }

    #[test]
    fn test_manual_reset_restores_capacity() {
        let mut quota = DailyQuota::default();
        quota.commit(
            quota
                .reserve(Amount::from(20), Amount::from(30), day(8))
                .unwrap(),
        );

        assert_eq!(quota.reset(day(8)), Amount::from(20));
        assert_eq!(quota.minted_today(), Amount::ZERO);
        assert!(quota
            .reserve(Amount::from(20), Amount::from(30), day(8))
            .is_ok());
    }

    #[test]
    fn test_new_day_checks_against_reset_value() {
        let mut quota = DailyQuota::default();
        quota.commit(
            quota
                .reserve(Amount::from(30), Amount::from(30), day(8))
                .unwrap(),
        );

        assert_eq!(quota.effective_minted(day(9)), Amount::ZERO);
        let reservation = quota
            .reserve(Amount::from(25), Amount::from(30), day(9))
            .unwrap();
        assert!(reservation.rolled_over);
        assert_eq!(reservation.minted_after, Amount::from(25));

        quota.commit(reservation);
        assert_eq!(quota.window_day(), Some(day(9)));
    }

    #[test]
    fn test_rejected_rollover_leaves_counter_untouched() {
        let mut quota = DailyQuota::default();
        quota.commit(
            quota
                .reserve(Amount::from(30), Amount::from(30), day(8))
                .unwrap(),
        );

        assert!(quota
            .reserve(Amount::from(31), Amount::from(30), day(9))
            .is_err());
        assert_eq!(quota.minted_today(), Amount::from(30));
        assert_eq!(quota.window_day(), Some(day(8)));
    }

    #[test]
    fn test_zero_limit_rejects_everything() {
        let quota = DailyQuota::default();
        assert!(quota
            .reserve(Amount::from(1), Amount::ZERO, day(8))
            .is_err());
    }
}
