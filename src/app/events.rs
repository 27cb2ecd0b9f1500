//! Outbound application events.
//!
//! The [`LightService`](super::service::LightService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to serial, push to a status page,
//! etc.

use crate::app::ports::ClockReading;
use crate::app::status::StatusReport;
use crate::error::Error;
use crate::fsm::StateId;
use crate::ramp::RampRequest;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The service has started (carries initial state and schedule flag).
    Started { state: StateId, schedule_enabled: bool },

    /// The FSM transitioned between states.
    StateChanged { from: StateId, to: StateId },

    /// A ramp thread was started (or a degenerate ramp written directly).
    RampStarted(RampRequest),

    /// A ramp request was dropped because another ramp is running.
    RampRejected(RampRequest),

    /// The dimmer was set directly, bypassing any ramp.
    DutyForced(u8),

    /// The sunrise/sunset schedule was switched on or off.
    ScheduleChanged { enabled: bool },

    /// The wall clock was set.
    ClockSet(ClockReading),

    /// A command could not be carried out.
    CommandFailed(Error),

    /// Periodic status snapshot.
    Status(StatusReport),
}
