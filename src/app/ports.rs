//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ LightService (domain)
//! ```
//!
//! Driven adapters (clock, dimmer, switch, thermometer, event sinks)
//! implement these traits.  The [`LightService`](super::service::LightService)
//! consumes them via generics, so the domain core never touches hardware
//! directly.
//!
//! The clock, timer and dimmer ports are shared with the ramp thread, so
//! they take `&self` / are `Send + Sync` where needed.  Port errors are
//! typed; callers must handle every variant explicitly.

use core::time::Duration;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::calendar::CalendarDate;
use crate::error::{ActuatorError, ClockError};
use crate::ramp::CancelToken;

use super::events::AppEvent;

// ───────────────────────────────────────────────────────────────
// Clock reading
// ───────────────────────────────────────────────────────────────

/// One wall-clock sample, already split into the fields the state
/// machine needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockReading {
    pub date: CalendarDate,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    /// Seconds since the Unix epoch, local time base.  Used for hold
    /// arithmetic only.
    pub unix_secs: i64,
}

impl ClockReading {
    pub fn from_datetime(dt: NaiveDateTime) -> Self {
        // Years outside u16 land on the calendar's out-of-range sentinel.
        let year = dt.year().clamp(0, i32::from(u16::MAX)) as u16;
        Self {
            date: CalendarDate::new(year, dt.month() as u8, dt.day() as u8),
            hour: dt.hour() as u8,
            minute: dt.minute() as u8,
            second: dt.second() as u8,
            unix_secs: dt.and_utc().timestamp(),
        }
    }

    /// Back to a chrono value.  `None` if the fields do not form a real
    /// date/time.
    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(
            i32::from(self.date.year),
            u32::from(self.date.month),
            u32::from(self.date.day),
        )?
        .and_hms_opt(
            u32::from(self.hour),
            u32::from(self.minute),
            u32::from(self.second),
        )
    }

    /// Minutes after local midnight.
    pub fn minute_of_day(&self) -> u16 {
        u16::from(self.hour) * 60 + u16::from(self.minute)
    }

    /// Calendar week of the reading's date (0 when out of range).
    pub fn week(&self) -> u8 {
        self.date.week()
    }
}

impl core::fmt::Display for ClockReading {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} {:02}:{:02}:{:02}",
            self.date, self.hour, self.minute, self.second
        )
    }
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: RTC / NTP → domain)
// ───────────────────────────────────────────────────────────────

/// Wall-clock source.  Shared between the control loop and the command
/// path, hence `&self` with interior mutability in implementations.
pub trait ClockPort: Send + Sync {
    /// Current local date/time.
    fn now(&self) -> Result<ClockReading, ClockError>;

    /// Overwrite the clock.  On error the clock must be left untouched.
    fn set_time(&self, time: NaiveDateTime) -> Result<(), ClockError>;
}

// ───────────────────────────────────────────────────────────────
// Timer port (driven adapter: domain → RTOS delay)
// ───────────────────────────────────────────────────────────────

/// Cancellable delay used between ramp steps.
pub trait TimerPort: Send + Sync {
    /// Block for `duration` or until `cancel` fires, whichever is first.
    /// Returns `true` when woken by cancellation.
    fn pause(&self, duration: Duration, cancel: &CancelToken) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → PWM dimmer)
// ───────────────────────────────────────────────────────────────

/// The light dimmer.  Accepts 0–100 %; anything above is rejected with
/// [`ActuatorError::OutOfRange`], never clamped.
pub trait ActuatorPort: Send {
    fn set_duty_cycle(&mut self, percent: u8) -> Result<(), ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// Input ports
// ───────────────────────────────────────────────────────────────

/// Two-position manual switch (SWITCH1).
pub trait SwitchPort {
    /// `true` when the switch is in the "light on" position.
    fn is_closed(&mut self) -> bool;
}

/// Coop thermometer.  `None` when no reading is available.
pub trait TemperaturePort {
    fn temperature_c(&mut self) -> Option<f32>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port.
/// Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}
