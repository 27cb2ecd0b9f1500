//! Fuzz target: web form parameters
//!
//! Splits the input at the first `=` into a field name and value, maps it
//! through `LightCommand::from_param`, and feeds any accepted command to a
//! live `LightService` on a simulated clock.  Checks:
//! - No panics under arbitrary input
//! - Thresholds stay within 0..=100 and dark never exceeds bright
//! - The duty cycle never leaves 0..=100
//!
//! cargo fuzz run fuzz_form_params

#![no_main]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::NaiveDateTime;
use cooplight::app::commands::LightCommand;
use cooplight::app::events::AppEvent;
use cooplight::app::ports::{
    ActuatorPort, ClockPort, ClockReading, EventSink, TemperaturePort, TimerPort,
};
use cooplight::app::service::LightService;
use cooplight::config::SystemConfig;
use cooplight::error::{ActuatorError, ClockError};
use cooplight::ramp::CancelToken;
use cooplight::schedule::ScheduleTable;
use libfuzzer_sys::fuzz_target;

struct MemClock(Mutex<Option<NaiveDateTime>>);

impl ClockPort for MemClock {
    fn now(&self) -> Result<ClockReading, ClockError> {
        self.0
            .lock()
            .unwrap()
            .map(ClockReading::from_datetime)
            .ok_or(ClockError::NotSet)
    }

    fn set_time(&self, time: NaiveDateTime) -> Result<(), ClockError> {
        *self.0.lock().unwrap() = Some(time);
        Ok(())
    }
}

struct NoWait;

impl TimerPort for NoWait {
    fn pause(&self, _duration: Duration, cancel: &CancelToken) -> bool {
        cancel.is_cancelled()
    }
}

struct NullDimmer;

impl ActuatorPort for NullDimmer {
    fn set_duty_cycle(&mut self, percent: u8) -> Result<(), ActuatorError> {
        if percent > 100 {
            return Err(ActuatorError::OutOfRange(percent));
        }
        Ok(())
    }
}

struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _event: &AppEvent) {}
}

struct NoSensor;

impl TemperaturePort for NoSensor {
    fn temperature_c(&mut self) -> Option<f32> {
        None
    }
}

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Some((name, value)) = text.split_once('=') else {
        return;
    };
    let Ok(cmd) = LightCommand::from_param(name, value) else {
        return;
    };

    let clock = Arc::new(MemClock(Mutex::new(None)));
    let mut app = LightService::new(
        SystemConfig::default(),
        ScheduleTable::builtin(),
        clock,
        NullDimmer,
        Arc::new(NoWait),
    )
    .unwrap();
    let mut sink = Discard;
    app.start(&mut sink);

    let _ = app.handle_command(cmd, &mut sink);
    app.wait_for_ramp();

    let config = app.config();
    assert!(config.threshold_dark_percent <= config.threshold_bright_percent);
    assert!(config.threshold_bright_percent <= 100);

    let report = app.status(&mut NoSensor);
    assert!(report.duty_percent <= 100);
});
