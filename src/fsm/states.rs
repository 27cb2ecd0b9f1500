//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers: no closures, no
//! dynamic dispatch, no heap.  Handlers only read the context and leave
//! dimmer commands behind; they never block, so a hold is simply a state
//! that keeps returning `None` until its wall-clock deadline passes.
//!
//! ```text
//!  IDLE ──[sunrise]──▶ RAMPING_UP ──[next tick]──▶ HOLDING_AFTER_SUNRISE
//!   ▲ ▲                                                    │
//!   │ └──────[ramp + hold since ramp start, force 0]───────┘
//!   │
//!   ├──[sunset, force 100]──▶ HOLDING_AFTER_SUNSET ──[hold elapsed]──▶ RAMPING_DOWN
//!   │                                                                       │
//!   └───────────────────────────────[next tick]─────────────────────────────┘
//!
//!  disable ──▶ STOPPED (force 0, cancel ramp) ──▶ IDLE
//! ```
//!
//! The two ramping states last one tick.  Hold deadlines are anchored to
//! the trigger tick (the sunrise hold clock starts when the ramp is
//! dispatched), so a late tick out of RAMPING_UP does not stretch the hold.

use super::context::FsmContext;
use super::{StateDescriptor, StateId};
use crate::calendar::INVALID_WEEK;
use crate::error::Error;
use crate::ramp::RampRequest;
use crate::schedule::ScheduleEntry;
use log::{info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: Idle
        StateDescriptor {
            id: StateId::Idle,
            on_enter: Some(idle_enter),
            on_exit: None,
            on_update: idle_update,
        },
        // Index 1: RampingUp
        StateDescriptor {
            id: StateId::RampingUp,
            on_enter: Some(ramping_up_enter),
            on_exit: None,
            on_update: ramping_up_update,
        },
        // Index 2: HoldingAfterSunrise
        StateDescriptor {
            id: StateId::HoldingAfterSunrise,
            on_enter: None,
            on_exit: None,
            on_update: holding_after_sunrise_update,
        },
        // Index 3: HoldingAfterSunset
        StateDescriptor {
            id: StateId::HoldingAfterSunset,
            on_enter: Some(holding_after_sunset_enter),
            on_exit: None,
            on_update: holding_after_sunset_update,
        },
        // Index 4: RampingDown
        StateDescriptor {
            id: StateId::RampingDown,
            on_enter: Some(ramping_down_enter),
            on_exit: None,
            on_update: ramping_down_update,
        },
        // Index 5: Stopped
        StateDescriptor {
            id: StateId::Stopped,
            on_enter: Some(stopped_enter),
            on_exit: None,
            on_update: stopped_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  Helpers
// ═══════════════════════════════════════════════════════════════════════════

/// `true` when `now` is at or after `target` and at most `window`
/// minutes past it (all in minutes after midnight).
fn within_window(now: u16, target: u16, window: u8) -> bool {
    now >= target && now - target <= u16::from(window)
}

/// Today's schedule row, or `None` if the clock or calendar data is unusable.
///
/// An unusable date is reported once when it appears and once when it clears.
fn todays_entry(ctx: &mut FsmContext) -> Option<ScheduleEntry> {
    let clock = ctx.clock?;
    let week = clock.week();
    if week == INVALID_WEEK {
        if ctx.calendar_ok {
            warn!("IDLE: {} ({}), skipping", Error::InvalidDate, clock.date);
        }
        ctx.calendar_ok = false;
        return None;
    }
    if !ctx.calendar_ok {
        info!("IDLE: date {} usable again (week {})", clock.date, week);
    }
    ctx.calendar_ok = true;
    match ctx.table.lookup(week) {
        Ok(entry) => Some(*entry),
        Err(e) => {
            warn!("IDLE: {}", e);
            None
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE: waiting for today's sunrise or sunset
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut FsmContext) {
    ctx.clear_cycle();
    info!("IDLE: waiting for sunrise/sunset");
}

fn idle_update(ctx: &mut FsmContext) -> Option<StateId> {
    let clock = ctx.clock?;
    let entry = todays_entry(ctx)?;
    if entry.is_noop() {
        return None;
    }

    let now = clock.minute_of_day();
    let window = ctx.config.trigger_window_minutes;

    if ctx.last_sunrise != Some(clock.date)
        && within_window(now, entry.sunrise_minute_of_day(), window)
    {
        info!(
            "IDLE: sunrise {:02}:{:02} (week {})",
            entry.sunrise_hour,
            entry.sunrise_minute,
            clock.week()
        );
        ctx.last_sunrise = Some(clock.date);
        ctx.entry = Some(entry);
        return Some(StateId::RampingUp);
    }

    if ctx.last_sunset != Some(clock.date)
        && within_window(now, entry.sunset_minute_of_day(), window)
    {
        info!(
            "IDLE: sunset {:02}:{:02} (week {})",
            entry.sunset_hour,
            entry.sunset_minute,
            clock.week()
        );
        ctx.last_sunset = Some(clock.date);
        ctx.entry = Some(entry);
        return Some(StateId::HoldingAfterSunset);
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  RAMPING_UP: dawn ramp dispatched, control loop keeps ticking
// ═══════════════════════════════════════════════════════════════════════════

fn ramping_up_enter(ctx: &mut FsmContext) {
    hold_enter(ctx);
    if let Some(entry) = ctx.entry {
        ctx.commands.ramp = Some(RampRequest::new(0, 100, entry.ramp_secs()));
    }
}

fn ramping_up_update(_ctx: &mut FsmContext) -> Option<StateId> {
    Some(StateId::HoldingAfterSunrise)
}

// ═══════════════════════════════════════════════════════════════════════════
//  HOLDING_AFTER_SUNRISE: light stays on for ramp + hold, counted from
//  the moment the ramp was dispatched
// ═══════════════════════════════════════════════════════════════════════════

fn hold_enter(ctx: &mut FsmContext) {
    ctx.hold_started_at = ctx.clock.map(|c| c.unix_secs);
}

fn holding_after_sunrise_update(ctx: &mut FsmContext) -> Option<StateId> {
    let Some(entry) = ctx.entry else {
        return Some(StateId::Idle);
    };
    let limit = i64::from(entry.hold_secs() + entry.ramp_secs());
    if ctx.hold_elapsed_secs()? >= limit {
        info!("HOLD: sunrise hold of {}s done, light off", limit);
        ctx.commands.cancel_ramp = true;
        ctx.commands.force_duty = Some(0);
        return Some(StateId::Idle);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  HOLDING_AFTER_SUNSET: full brightness until the dusk ramp
// ═══════════════════════════════════════════════════════════════════════════

fn holding_after_sunset_enter(ctx: &mut FsmContext) {
    ctx.commands.cancel_ramp = true;
    ctx.commands.force_duty = Some(100);
    hold_enter(ctx);
}

fn holding_after_sunset_update(ctx: &mut FsmContext) -> Option<StateId> {
    let Some(entry) = ctx.entry else {
        return Some(StateId::Idle);
    };
    let limit = i64::from(entry.hold_secs());
    if ctx.hold_elapsed_secs()? >= limit {
        info!("HOLD: sunset hold of {}s done, dimming down", limit);
        return Some(StateId::RampingDown);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  RAMPING_DOWN: dusk ramp dispatched
// ═══════════════════════════════════════════════════════════════════════════

fn ramping_down_enter(ctx: &mut FsmContext) {
    if let Some(entry) = ctx.entry {
        ctx.commands.ramp = Some(RampRequest::new(100, 0, entry.ramp_secs()));
    }
}

fn ramping_down_update(_ctx: &mut FsmContext) -> Option<StateId> {
    Some(StateId::Idle)
}

// ═══════════════════════════════════════════════════════════════════════════
//  STOPPED: schedule disabled; transient on the way back to Idle
// ═══════════════════════════════════════════════════════════════════════════

fn stopped_enter(ctx: &mut FsmContext) {
    ctx.commands.cancel_ramp = true;
    ctx.commands.force_duty = Some(0);
    ctx.commands.ramp = None;
    warn!("STOPPED: light control halted, light off");
}

fn stopped_update(_ctx: &mut FsmContext) -> Option<StateId> {
    Some(StateId::Idle)
}
