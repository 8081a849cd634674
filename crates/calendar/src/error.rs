//! Calendar errors

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Invalid check time {hour:02}:{minute:02}")]
    InvalidCheckTime { hour: u32, minute: u32 },

    #[error("Invalid calendar date {year:04}-{month:02}-{day:02}")]
    InvalidDate { year: i32, month: u32, day: u32 },

    #[error("Invalid time zone offset: {0} minutes")]
    InvalidOffset(i32),
}
