//! Week-indexed sunrise/sunset table.
//!
//! One [`ScheduleEntry`] per calendar week (1..=53) holds the local sunrise
//! and sunset instants plus how long to ramp and hold the light around them.
//! The table is configuration, not algorithm: the state machine receives a
//! [`ScheduleTable`] by value, so a site-specific table can be swapped in
//! without touching control logic.
//!
//! ```text
//!   sunrise ──ramp 0→100──▶ hold (ramp + hold) ──▶ off
//!   sunset  ──force 100──▶ hold (hold) ──ramp 100→0──▶ off
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Number of rows in the table (weeks 1..=53).
pub const WEEKS: usize = 53;

/// Sunrise/sunset parameters for one calendar week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub sunrise_hour: u8,
    pub sunrise_minute: u8,
    pub sunset_hour: u8,
    pub sunset_minute: u8,
    /// Duration of the dimming ramp, minutes.
    pub ramp_minutes: u16,
    /// Duration of the hold around the ramp, minutes.
    pub hold_minutes: u16,
}

impl ScheduleEntry {
    pub const fn new(
        sunrise_hour: u8,
        sunrise_minute: u8,
        sunset_hour: u8,
        sunset_minute: u8,
        ramp_minutes: u16,
        hold_minutes: u16,
    ) -> Self {
        Self {
            sunrise_hour,
            sunrise_minute,
            sunset_hour,
            sunset_minute,
            ramp_minutes,
            hold_minutes,
        }
    }

    /// Sunrise as minutes after midnight.
    pub fn sunrise_minute_of_day(&self) -> u16 {
        u16::from(self.sunrise_hour) * 60 + u16::from(self.sunrise_minute)
    }

    /// Sunset as minutes after midnight.
    pub fn sunset_minute_of_day(&self) -> u16 {
        u16::from(self.sunset_hour) * 60 + u16::from(self.sunset_minute)
    }

    pub fn ramp_secs(&self) -> u32 {
        u32::from(self.ramp_minutes) * 60
    }

    pub fn hold_secs(&self) -> u32 {
        u32::from(self.hold_minutes) * 60
    }

    /// Weeks with neither ramp nor hold leave the light alone.
    pub fn is_noop(&self) -> bool {
        self.ramp_minutes == 0 && self.hold_minutes == 0
    }

    fn is_well_formed(&self) -> bool {
        self.sunrise_hour < 24
            && self.sunrise_minute < 60
            && self.sunset_hour < 24
            && self.sunset_minute < 60
    }
}

/// Fixed table of 53 week rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleTable {
    rows: [ScheduleEntry; WEEKS],
}

impl ScheduleTable {
    /// Build a table from custom rows.  Rejects hours ≥ 24 or minutes ≥ 60.
    pub fn new(rows: [ScheduleEntry; WEEKS]) -> Result<Self> {
        if rows.iter().all(ScheduleEntry::is_well_formed) {
            Ok(Self { rows })
        } else {
            Err(Error::Config("schedule row with hour >= 24 or minute >= 60"))
        }
    }

    /// The compiled-in table for the coop site.
    pub fn builtin() -> Self {
        Self {
            rows: SITE_SCHEDULE,
        }
    }

    /// Look up the row for `week` (1..=53).
    ///
    /// Week `0` is the calendar sentinel and must have been filtered by the
    /// caller; reaching here with it is an invariant violation.
    pub fn lookup(&self, week: u8) -> Result<&ScheduleEntry> {
        debug_assert!(
            (1..=WEEKS as u8).contains(&week),
            "schedule lookup with invalid week {week}"
        );
        match week {
            1..=53 => Ok(&self.rows[usize::from(week) - 1]),
            _ => Err(Error::InvalidScheduleIndex(week)),
        }
    }
}

impl Default for ScheduleTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Local times (CET/CEST) for 48.8°N 12.0°E.  Ramp and hold stretch the
/// short winter days towards ~14 h of light; long summer weeks are no-ops.
#[rustfmt::skip]
pub const SITE_SCHEDULE: [ScheduleEntry; WEEKS] = [
    /*  1 */ ScheduleEntry::new( 8,  5, 16, 25, 30, 170),
    /*  2 */ ScheduleEntry::new( 8,  4, 16, 32, 30, 165),
    /*  3 */ ScheduleEntry::new( 8,  0, 16, 41, 30, 160),
    /*  4 */ ScheduleEntry::new( 7, 55, 16, 51, 30, 150),
    /*  5 */ ScheduleEntry::new( 7, 47, 17,  2, 30, 140),
    /*  6 */ ScheduleEntry::new( 7, 38, 17, 14, 30, 130),
    /*  7 */ ScheduleEntry::new( 7, 27, 17, 26, 30, 120),
    /*  8 */ ScheduleEntry::new( 7, 15, 17, 37, 30, 110),
    /*  9 */ ScheduleEntry::new( 7,  2, 17, 49, 30,  95),
    /* 10 */ ScheduleEntry::new( 6, 48, 18,  0, 30,  85),
    /* 11 */ ScheduleEntry::new( 6, 34, 18, 11, 30,  70),
    /* 12 */ ScheduleEntry::new( 6, 19, 18, 22, 30,  60),
    /* 13 */ ScheduleEntry::new( 6,  5, 18, 32, 30,  45),
    /* 14 */ ScheduleEntry::new( 6, 50, 19, 42, 30,  35),
    /* 15 */ ScheduleEntry::new( 6, 35, 19, 53, 30,  20),
    /* 16 */ ScheduleEntry::new( 6, 21, 20,  3, 30,  10),
    /* 17 */ ScheduleEntry::new( 6,  7, 20, 13,  0,   0),
    /* 18 */ ScheduleEntry::new( 5, 55, 20, 23,  0,   0),
    /* 19 */ ScheduleEntry::new( 5, 43, 20, 34,  0,   0),
    /* 20 */ ScheduleEntry::new( 5, 33, 20, 43,  0,   0),
    /* 21 */ ScheduleEntry::new( 5, 24, 20, 53,  0,   0),
    /* 22 */ ScheduleEntry::new( 5, 17, 21,  1,  0,   0),
    /* 23 */ ScheduleEntry::new( 5, 12, 21,  8,  0,   0),
    /* 24 */ ScheduleEntry::new( 5,  9, 21, 14,  0,   0),
    /* 25 */ ScheduleEntry::new( 5,  8, 21, 18,  0,   0),
    /* 26 */ ScheduleEntry::new( 5,  9, 21, 19,  0,   0),
    /* 27 */ ScheduleEntry::new( 5, 13, 21, 19,  0,   0),
    /* 28 */ ScheduleEntry::new( 5, 18, 21, 16,  0,   0),
    /* 29 */ ScheduleEntry::new( 5, 25, 21, 11,  0,   0),
    /* 30 */ ScheduleEntry::new( 5, 33, 21,  4,  0,   0),
    /* 31 */ ScheduleEntry::new( 5, 42, 20, 55,  0,   0),
    /* 32 */ ScheduleEntry::new( 5, 51, 20, 45,  0,   0),
    /* 33 */ ScheduleEntry::new( 6,  1, 20, 34,  0,   0),
    /* 34 */ ScheduleEntry::new( 6, 11, 20, 21,  0,   0),
    /* 35 */ ScheduleEntry::new( 6, 21, 20,  7, 30,   5),
    /* 36 */ ScheduleEntry::new( 6, 30, 19, 53, 30,  20),
    /* 37 */ ScheduleEntry::new( 6, 40, 19, 38, 30,  30),
    /* 38 */ ScheduleEntry::new( 6, 50, 19, 23, 30,  45),
    /* 39 */ ScheduleEntry::new( 7,  0, 19,  8, 30,  55),
    /* 40 */ ScheduleEntry::new( 7, 10, 18, 53, 30,  70),
    /* 41 */ ScheduleEntry::new( 7, 20, 18, 39, 30,  80),
    /* 42 */ ScheduleEntry::new( 7, 30, 18, 25, 30,  90),
    /* 43 */ ScheduleEntry::new( 7, 41, 18, 11, 30, 105),
    /* 44 */ ScheduleEntry::new( 6, 52, 16, 59, 30, 115),
    /* 45 */ ScheduleEntry::new( 7,  4, 16, 48, 30, 130),
    /* 46 */ ScheduleEntry::new( 7, 15, 16, 38, 30, 140),
    /* 47 */ ScheduleEntry::new( 7, 26, 16, 29, 30, 150),
    /* 48 */ ScheduleEntry::new( 7, 37, 16, 23, 30, 155),
    /* 49 */ ScheduleEntry::new( 7, 46, 16, 18, 30, 165),
    /* 50 */ ScheduleEntry::new( 7, 54, 16, 16, 30, 170),
    /* 51 */ ScheduleEntry::new( 8,  0, 16, 16, 30, 170),
    /* 52 */ ScheduleEntry::new( 8,  4, 16, 19, 30, 170),
    /* 53 */ ScheduleEntry::new( 8,  5, 16, 24, 30, 170),
];

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
