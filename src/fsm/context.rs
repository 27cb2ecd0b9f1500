//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the single struct that state handlers read from and
//! write to: the latest clock sample, the schedule table, the row that
//! triggered the current cycle, hold timestamps, per-day trigger latches
//! and the dimmer commands to apply after the tick.  Think of it as the
//! "blackboard" in a blackboard architecture.

use crate::app::ports::ClockReading;
use crate::calendar::CalendarDate;
use crate::config::SystemConfig;
use crate::ramp::RampRequest;
use crate::schedule::{ScheduleEntry, ScheduleTable};

// ---------------------------------------------------------------------------
// Dimmer commands (written by state handlers; consumed by the service)
// ---------------------------------------------------------------------------

/// Commands that state handlers write to request dimmer actions.
/// Applied in field order: cancel, force, ramp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LightCommands {
    /// Stop the running ramp (and wait for it) before anything else.
    pub cancel_ramp: bool,
    /// Write this duty immediately.
    pub force_duty: Option<u8>,
    /// Start this ramp.
    pub ramp: Option<RampRequest>,
}

impl LightCommands {
    /// Drain the pending commands, leaving the slot empty.
    pub fn take(&mut self) -> Self {
        core::mem::take(self)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct FsmContext {
    // -- Timing --
    /// Ticks elapsed since the current state was entered.
    pub ticks_in_state: u64,
    /// Monotonic total tick count.
    pub total_ticks: u64,

    // -- Inputs --
    /// Latest wall-clock sample; `None` when the clock could not be read.
    pub clock: Option<ClockReading>,
    /// Week-indexed sunrise/sunset table.
    pub table: ScheduleTable,
    /// System configuration (tunable parameters).
    pub config: SystemConfig,

    // -- Cycle state --
    /// Schedule row captured when the current sunrise/sunset cycle began.
    pub entry: Option<ScheduleEntry>,
    /// Clock timestamp (unix seconds) at which the current hold started.
    pub hold_started_at: Option<i64>,
    /// Day on which the sunrise trigger last fired.
    pub last_sunrise: Option<CalendarDate>,
    /// Day on which the sunset trigger last fired.
    pub last_sunset: Option<CalendarDate>,
    /// `false` while the clock's date lies outside the calendar range.
    pub calendar_ok: bool,

    // -- Outputs --
    /// Commands to be applied to the dimmer after the FSM tick.
    pub commands: LightCommands,
}

impl FsmContext {
    pub fn new(config: SystemConfig, table: ScheduleTable) -> Self {
        Self {
            ticks_in_state: 0,
            total_ticks: 0,
            clock: None,
            table,
            config,
            entry: None,
            hold_started_at: None,
            last_sunrise: None,
            last_sunset: None,
            calendar_ok: true,
            commands: LightCommands::default(),
        }
    }

    /// Seconds since the current hold started, by wall clock.
    ///
    /// If the clock was set backwards past the start, the hold restarts from
    /// now instead of stalling forever.
    pub fn hold_elapsed_secs(&mut self) -> Option<i64> {
        let now = self.clock?.unix_secs;
        let started = *self.hold_started_at.get_or_insert(now);
        if now < started {
            self.hold_started_at = Some(now);
            return Some(0);
        }
        Some(now - started)
    }

    /// Forget the current cycle (row and hold), keep the day latches.
    pub fn clear_cycle(&mut self) {
        self.entry = None;
        self.hold_started_at = None;
    }
}
