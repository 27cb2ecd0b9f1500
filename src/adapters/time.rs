//! System wall-clock adapter.
//!
//! Provides the [`ClockPort`] and the cancellable ramp delay
//! ([`TimerPort`]) for the controller.
//!
//! - **`target_os = "espidf"`**: wraps `gettimeofday()` / `settimeofday()`.
//!   Times before 2020-01-01 are treated as "never set" (RTC lost power,
//!   no NTP yet).
//! - **`not(target_os = "espidf")`**: a wall-clock offset on top of
//!   `std::time::Instant`, for host-side testing and simulation.
//!
//! Either way the clock holds local wall time; seconds since the epoch are
//! counted as if local time were UTC, so no time-zone database is needed.

use core::time::Duration;

use chrono::{DateTime, Datelike, NaiveDateTime};

use crate::app::ports::{ClockPort, ClockReading, TimerPort};
use crate::calendar::{MAX_YEAR, MIN_YEAR};
use crate::error::ClockError;
use crate::ramp::CancelToken;

/// Earliest time accepted as "set" (2020-01-01T00:00:00).
pub const EPOCH_2020: i64 = 1_577_836_800;

fn reading_from_secs(secs: i64) -> Result<ClockReading, ClockError> {
    DateTime::from_timestamp(secs, 0)
        .map(|dt| ClockReading::from_datetime(dt.naive_utc()))
        .ok_or(ClockError::OutOfRange)
}

fn check_range(time: &NaiveDateTime) -> Result<(), ClockError> {
    let year = time.year();
    if year < i32::from(MIN_YEAR) || year > i32::from(MAX_YEAR) {
        return Err(ClockError::OutOfRange);
    }
    Ok(())
}

/// Wall clock for the control loop and the ramp threads.
pub struct SystemClock {
    #[cfg(not(target_os = "espidf"))]
    base: std::sync::Mutex<Option<(i64, std::time::Instant)>>,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            base: std::sync::Mutex::new(None),
        }
    }

    /// Seconds since the epoch, local time base.
    #[cfg(target_os = "espidf")]
    fn unix_secs(&self) -> Result<i64, ClockError> {
        let mut tv = esp_idf_svc::sys::timeval {
            tv_sec: 0,
            tv_usec: 0,
        };
        // SAFETY: plain read of the system time into a stack value.
        if unsafe { esp_idf_svc::sys::gettimeofday(&mut tv, core::ptr::null_mut()) } != 0 {
            return Err(ClockError::Unavailable);
        }
        let secs = i64::from(tv.tv_sec);
        if secs < EPOCH_2020 {
            return Err(ClockError::NotSet);
        }
        Ok(secs)
    }

    /// Seconds since the epoch, local time base.
    #[cfg(not(target_os = "espidf"))]
    fn unix_secs(&self) -> Result<i64, ClockError> {
        let base = *self
            .base
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let (secs, at) = base.ok_or(ClockError::NotSet)?;
        Ok(secs + at.elapsed().as_secs() as i64)
    }

    #[cfg(target_os = "espidf")]
    fn store(&self, secs: i64) -> Result<(), ClockError> {
        let tv = esp_idf_svc::sys::timeval {
            tv_sec: secs as _,
            tv_usec: 0,
        };
        // SAFETY: settimeofday copies the value; no pointers are retained.
        if unsafe { esp_idf_svc::sys::settimeofday(&tv, core::ptr::null()) } != 0 {
            return Err(ClockError::Unavailable);
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn store(&self, secs: i64) -> Result<(), ClockError> {
        *self
            .base
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) =
            Some((secs, std::time::Instant::now()));
        Ok(())
    }
}

impl ClockPort for SystemClock {
    fn now(&self) -> Result<ClockReading, ClockError> {
        reading_from_secs(self.unix_secs()?)
    }

    fn set_time(&self, time: NaiveDateTime) -> Result<(), ClockError> {
        check_range(&time)?;
        let secs = time.and_utc().timestamp();
        if secs < EPOCH_2020 {
            // Would read back as "never set".
            return Err(ClockError::OutOfRange);
        }
        self.store(secs)
    }
}

impl TimerPort for SystemClock {
    fn pause(&self, duration: Duration, cancel: &CancelToken) -> bool {
        cancel.wait_timeout(duration)
    }
}
