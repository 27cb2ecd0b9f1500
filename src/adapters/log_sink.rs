//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! A status-page or MQTT adapter would implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Status(s) => {
                info!(
                    "STATUS | {} | state={} | duty={}% | light={} | ramp={} | \
                     T={}\u{00b0}C | sunrise={} sunset={} | dark={}% bright={}%",
                    s.placeholder("DATE_TIME").unwrap_or_default(),
                    s.state,
                    s.duty_percent,
                    if s.light_on { "on" } else { "off" },
                    if s.ramp_running { "running" } else { "idle" },
                    s.placeholder("TEMP").unwrap_or_default(),
                    s.placeholder("SUNRISE").unwrap_or_default(),
                    s.placeholder("SUNSET").unwrap_or_default(),
                    s.threshold_dark_percent,
                    s.threshold_bright_percent,
                );
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {} -> {}", from, to);
            }
            AppEvent::RampStarted(request) => {
                info!("RAMP | {}", request);
            }
            AppEvent::RampRejected(request) => {
                warn!("RAMP | rejected {}", request);
            }
            AppEvent::DutyForced(percent) => {
                info!("DUTY | forced {}%", percent);
            }
            AppEvent::ScheduleChanged { enabled } => {
                info!(
                    "SCHEDULE | {}",
                    if *enabled { "enabled" } else { "disabled" }
                );
            }
            AppEvent::ClockSet(reading) => {
                info!("CLOCK | set to {}", reading);
            }
            AppEvent::CommandFailed(e) => {
                warn!("COMMAND | failed: {}", e);
            }
            AppEvent::Started {
                state,
                schedule_enabled,
            } => {
                info!(
                    "START | initial_state={} schedule={}",
                    state,
                    if *schedule_enabled { "enabled" } else { "disabled" }
                );
            }
        }
    }
}
