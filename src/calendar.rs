//! Calendar-week arithmetic used to index the sunrise/sunset table.
//!
//! The week number follows the ISO-8601 rule (weeks start on Monday, week 1
//! contains the year's first Thursday) but is computed with a small
//! closed-form formula that is only valid for 1901–2099, where every year
//! divisible by 4 is a leap year.
//!
//! Out-of-range input yields the sentinel `0` instead of an error so the
//! control loop can reject the tick cheaply.  Callers must check for it
//! before touching the schedule table.

use serde::{Deserialize, Serialize};

/// First year the formula handles.  Jan 1 1901 was a Tuesday.
pub const MIN_YEAR: u16 = 1901;
/// Last year the formula handles (no century exception up to here).
pub const MAX_YEAR: u16 = 2099;

/// Sentinel returned for out-of-range dates.
pub const INVALID_WEEK: u8 = 0;

/// A plain calendar date as produced by the clock port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CalendarDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl CalendarDate {
    pub const fn new(year: u16, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }

    /// Calendar week of this date, or [`INVALID_WEEK`].
    pub fn week(&self) -> u8 {
        calendar_week(self.year, self.month, self.day)
    }
}

impl core::fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Days in each month of a common year.
const MONTH_DAYS: [u16; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Weekday adjustment for January 1 of `year`.
///
/// If Jan 1 falls on: Mo Tu We Th Fr Sa Su
/// the adjustment is:  6  7  8  9  3  4  5
fn jan1_adjustment(year: i32) -> i32 {
    let offset = year - i32::from(MIN_YEAR);
    (offset + offset.div_euclid(4) + 4).rem_euclid(7) + 3
}

fn day_of_year(year: u16, month: u8, day: u8) -> i32 {
    let leap = year % 4 == 0;
    let mut doy = i32::from(day);
    for (idx, len) in MONTH_DAYS.iter().enumerate().take(usize::from(month - 1)) {
        doy += i32::from(*len);
        if idx == 1 && leap {
            doy += 1;
        }
    }
    doy
}

/// Compute the calendar week (1..=53) for a date, or `0` when the input is
/// outside 1901–2099, month 1–12 or day 1–31.
pub fn calendar_week(year: u16, month: u8, day: u8) -> u8 {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return INVALID_WEEK;
    }
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return INVALID_WEEK;
    }

    let adj = jan1_adjustment(i32::from(year));
    let week = (adj + day_of_year(year, month, day)) / 7;

    if week < 1 {
        // Belongs to the last week of the previous year.
        let prev_adj = jan1_adjustment(i32::from(year) - 1);
        if prev_adj == 9 || (prev_adj == 8 && year % 4 == 1) {
            return 53;
        }
        return 52;
    }

    if week > 52 {
        // Week 53 exists only for years starting on Thursday, or leap years
        // starting on Wednesday.
        if adj == 9 || (adj == 8 && year % 4 == 0) {
            return 53;
        }
        return 1;
    }

    week as u8
}
