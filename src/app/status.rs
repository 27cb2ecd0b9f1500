//! Status snapshot for the control surface.
//!
//! The control loop periodically publishes a [`StatusReport`] to the
//! [`StatusBoard`]; the network side reads the latest one without touching
//! the service.  The web page fills its `%NAME%` placeholders through
//! [`StatusReport::placeholder`].

use std::sync::{Mutex, PoisonError};

use crate::app::ports::ClockReading;
use crate::fsm::StateId;
use crate::schedule::ScheduleEntry;

/// Firmware version reported on the status page.
pub const FIRMWARE_VERSION: &str = env!("CARGO_PKG_VERSION");

const TIME_NOT_SET: &str = "time not set";
const SCHEDULE_DISABLED: &str = "schedule disabled";

/// Everything the status page shows.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    /// `None` when the clock is not set or unreadable.
    pub clock: Option<ClockReading>,
    pub temperature_c: Option<f32>,
    pub duty_percent: u8,
    pub state: StateId,
    pub schedule_enabled: bool,
    /// Today's schedule row, when the clock is usable.
    pub today: Option<ScheduleEntry>,
    pub threshold_dark_percent: u8,
    pub threshold_bright_percent: u8,
    pub light_on: bool,
    pub ramp_running: bool,
    pub version: &'static str,
}

impl StatusReport {
    /// Render one named placeholder.  `None` for names the page does not
    /// know about.
    pub fn placeholder(&self, name: &str) -> Option<String> {
        let text = match name {
            "DATE_TIME" => match &self.clock {
                Some(clock) => clock.to_string(),
                None => TIME_NOT_SET.to_owned(),
            },
            "TEMP" => match self.temperature_c {
                Some(t) => format!("{t:.1}"),
                None => "n/a".to_owned(),
            },
            "LIGHT_DUTYCYCLE" => self.duty_percent.to_string(),
            "SUNRISE" => self.schedule_time(|e| (e.sunrise_hour, e.sunrise_minute)),
            "SUNSET" => self.schedule_time(|e| (e.sunset_hour, e.sunset_minute)),
            "THRESHOLD_DARK" => self.threshold_dark_percent.to_string(),
            "THRESHOLD_BRIGHT" => self.threshold_bright_percent.to_string(),
            "STATE" => self.state.name().to_owned(),
            "SCHEDULE" if self.schedule_enabled => "enabled".to_owned(),
            "SCHEDULE" => SCHEDULE_DISABLED.to_owned(),
            "VERSION" => self.version.to_owned(),
            _ => return None,
        };
        Some(text)
    }

    fn schedule_time(&self, pick: impl Fn(&ScheduleEntry) -> (u8, u8)) -> String {
        if !self.schedule_enabled {
            return SCHEDULE_DISABLED.to_owned();
        }
        match &self.today {
            Some(entry) => {
                let (hour, minute) = pick(entry);
                format!("{hour:02}:{minute:02}:00")
            }
            None => TIME_NOT_SET.to_owned(),
        }
    }
}

/// Latest published status, shared between the control loop and readers.
#[derive(Debug, Default)]
pub struct StatusBoard {
    latest: Mutex<Option<StatusReport>>,
}

impl StatusBoard {
    pub const fn new() -> Self {
        Self {
            latest: Mutex::new(None),
        }
    }

    pub fn publish(&self, report: StatusReport) {
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(report);
    }

    /// Most recent report, if any was published yet.
    pub fn latest(&self) -> Option<StatusReport> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Status shared between the control loop and the web handler.
pub static STATUS: StatusBoard = StatusBoard::new();
