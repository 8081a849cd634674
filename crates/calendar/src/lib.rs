//! Mintgate Calendar
//!
//! Everything the controller needs to reason about wall-clock time:
//!
//! - [`Calendar`] - converts a timestamp into local date/time parts
//! - [`CheckTime`] / [`CalendarDate`] - the daily review schedule and holidays
//! - [`CalendarGate`] - weekday/holiday rule and the finalize timelock
//! - [`Clock`] - injectable source of "now" ([`SystemClock`], [`ManualClock`])

pub mod adapter;
pub mod clock;
pub mod error;
pub mod gate;
pub mod parts;
pub mod schedule;

pub use adapter::{Calendar, FixedOffsetCalendar};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::CalendarError;
pub use gate::{CalendarGate, ClosedReason, DEFAULT_FINALIZE_BUFFER_MINUTES, MINUTES_PER_DAY};
pub use parts::{CalendarDate, DateParts};
pub use schedule::CheckTime;
