//! Unified error types for the CoopLight firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! control loop's recovery path uniform.  All variants are `Copy` so they
//! can be passed through the state machine and ramp slot without allocation.
//!
//! None of these errors are fatal: the control loop logs them and carries
//! on, so a light-control failure never takes the rest of the device down.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Year/month/day outside the range the calendar-week math supports.
    InvalidDate,
    /// A week outside 1..=53 reached the schedule table.
    InvalidScheduleIndex(u8),
    /// A ramp with `start == stop` was requested.
    DegenerateRamp,
    /// A ramp was requested while another one is still running.
    RampConflict,
    /// The set-time payload did not match `YYYY-MM-DDThh:mm:ss`.
    MalformedTimeString,
    /// The dimmer rejected a write.
    Actuator(ActuatorError),
    /// The wall clock is unavailable or refused an update.
    Clock(ClockError),
    /// A configuration value failed validation.
    Config(&'static str),
    /// A worker thread could not be spawned.
    TaskSpawn,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDate => write!(f, "date out of range"),
            Self::InvalidScheduleIndex(week) => write!(f, "invalid schedule index: week {week}"),
            Self::DegenerateRamp => write!(f, "ramp start equals stop"),
            Self::RampConflict => write!(f, "a ramp is already running"),
            Self::MalformedTimeString => {
                write!(f, "malformed date/time, expected YYYY-MM-DDThh:mm:ss")
            }
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Clock(e) => write!(f, "clock: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::TaskSpawn => write!(f, "task spawn failed"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// Duty cycle above 100 %.  Never clamped.
    OutOfRange(u8),
    /// PWM duty-cycle write failed.
    PwmWriteFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange(percent) => write!(f, "duty cycle {percent}% out of range (0-100)"),
            Self::PwmWriteFailed => write!(f, "PWM write failed"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Clock errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockError {
    /// The clock has never been set (RTC lost power, no NTP yet).
    NotSet,
    /// The clock hardware did not answer.
    Unavailable,
    /// The requested time is outside what the clock can represent.
    OutOfRange,
}

impl fmt::Display for ClockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotSet => write!(f, "time not set"),
            Self::Unavailable => write!(f, "clock unavailable"),
            Self::OutOfRange => write!(f, "time out of range"),
        }
    }
}

impl From<ClockError> for Error {
    fn from(e: ClockError) -> Self {
        Self::Clock(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
