//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (web form,
//! serial console, physical switch handling) that the
//! [`LightService`](super::service::LightService) interprets and acts upon.

use core::fmt;

/// Capacity of the raw date/time payload (`YYYY-MM-DDThh:mm:ss` is 19).
pub const DATE_TIME_CAPACITY: usize = 32;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LightCommand {
    /// Set the wall clock from a `YYYY-MM-DDThh:mm:ss` string.
    SetDateTime(heapless::String<DATE_TIME_CAPACITY>),

    /// Dark threshold, 0–100 %.
    SetThresholdDark(u8),

    /// Bright threshold, 0–100 %.
    SetThresholdBright(u8),

    /// Short ramp from the current duty to 100 %.
    LightOn,

    /// Short ramp from the current duty to 0 %.
    LightOff,

    /// Resume the sunrise/sunset schedule.
    EnableSchedule,

    /// Stop the schedule, cancel any ramp, light off.
    DisableSchedule,
}

/// Why a form parameter could not be turned into a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamError {
    UnknownParameter,
    InvalidValue,
    TooLong,
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownParameter => write!(f, "unknown parameter"),
            Self::InvalidValue => write!(f, "invalid value"),
            Self::TooLong => write!(f, "value too long"),
        }
    }
}

impl LightCommand {
    /// Map a submitted form field to a command.
    ///
    /// | name                   | value                    |
    /// |------------------------|--------------------------|
    /// | `InputDateTime`        | `YYYY-MM-DDThh:mm:ss`    |
    /// | `InputThresholdDark`   | `0`–`100`                |
    /// | `InputThresholdBright` | `0`–`100`                |
    /// | `Light`                | `on` / `off`             |
    /// | `Schedule`             | `enable` / `disable`     |
    ///
    /// Thresholds are parsed strictly; nothing is coerced.
    pub fn from_param(name: &str, value: &str) -> Result<Self, ParamError> {
        let value = value.trim();
        match name {
            "InputDateTime" => {
                let mut raw = heapless::String::new();
                raw.push_str(value).map_err(|_| ParamError::TooLong)?;
                Ok(Self::SetDateTime(raw))
            }
            "InputThresholdDark" => parse_percent(value).map(Self::SetThresholdDark),
            "InputThresholdBright" => parse_percent(value).map(Self::SetThresholdBright),
            "Light" => match value {
                "on" => Ok(Self::LightOn),
                "off" => Ok(Self::LightOff),
                _ => Err(ParamError::InvalidValue),
            },
            "Schedule" => match value {
                "enable" => Ok(Self::EnableSchedule),
                "disable" => Ok(Self::DisableSchedule),
                _ => Err(ParamError::InvalidValue),
            },
            _ => Err(ParamError::UnknownParameter),
        }
    }
}

fn parse_percent(value: &str) -> Result<u8, ParamError> {
    match value.parse::<u8>() {
        Ok(percent) if percent <= 100 => Ok(percent),
        _ => Err(ParamError::InvalidValue),
    }
}
