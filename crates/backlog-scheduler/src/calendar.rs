//! Calendar arithmetic for sprint windows
//!
//! Sprints run Monday to Friday. A sprint of `n` weeks starts on a Monday
//! and ends on the Friday of its n-th week; the next sprint starts on the
//! following Monday.

use crate::error::ScheduleError;
use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Next Monday strictly after `today`
#[must_use]
pub fn next_monday(today: NaiveDate) -> NaiveDate {
    let days_ahead = 7 - i64::from(today.weekday().num_days_from_monday());
    today + Duration::days(days_ahead)
}

/// `date` if it is a Monday, otherwise the next Monday
#[must_use]
pub fn monday_on_or_after(date: NaiveDate) -> NaiveDate {
    if date.weekday() == Weekday::Mon {
        date
    } else {
        next_monday(date)
    }
}

/// A Monday-to-Friday sprint window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SprintWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl SprintWindow {
    /// Window of `weeks` weeks starting on `start` (a Monday)
    pub fn new(start: NaiveDate, weeks: u32) -> Result<Self, ScheduleError> {
        let days = i64::from(weeks) * 7 - 3;
        let end = start
            .checked_add_signed(Duration::days(days))
            .ok_or(ScheduleError::DateOverflow(start))?;
        Ok(Self { start, end })
    }

    /// Monday following this window's Friday
    pub fn next_start(&self) -> Result<NaiveDate, ScheduleError> {
        self.end
            .checked_add_signed(Duration::days(3))
            .ok_or(ScheduleError::DateOverflow(self.end))
    }

    /// Length in calendar days, both ends included
    #[must_use]
    pub fn calendar_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Whether two windows share at least one day
    #[must_use]
    pub fn overlaps(&self, other: &SprintWindow) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}
