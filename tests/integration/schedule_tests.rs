//! Integration tests for the clock → FSM → ramp → dimmer pipeline.
//!
//! The simulated clock doubles as the ramp timer, so a 30 minute ramp
//! finishes instantly and leaves the clock 30 minutes later.

use std::sync::Arc;

use cooplight::app::events::AppEvent;
use cooplight::app::ports::ClockPort;
use cooplight::fsm::StateId;
use cooplight::ramp::{RampOutcome, RampRequest};

use super::mock_hw::{InstantTimer, LogSink, MockSwitch, SimClock, datetime, started_service};

#[test]
fn sunrise_ramps_up_holds_and_switches_off() {
    let clock = Arc::new(SimClock::at("2022-11-07T06:00:00"));
    let mut sink = LogSink::new();
    let (mut app, writes) = started_service(&clock, Arc::clone(&clock), &mut sink);
    let mut switch = MockSwitch::default();

    app.tick(&mut switch, &mut sink);
    assert_eq!(app.state(), StateId::RampingUp);
    assert!(sink.contains(&AppEvent::RampStarted(RampRequest::new(0, 100, 1800))));
    assert!(sink.contains(&AppEvent::StateChanged {
        from: StateId::Idle,
        to: StateId::RampingUp,
    }));

    assert_eq!(app.wait_for_ramp(), Some(RampOutcome::Completed));
    assert_eq!(app.duty(), 100);
    assert_eq!(clock.time(), Some(datetime("2022-11-07T06:30:00")));

    // The ramp took 30 of the 90 minutes; the hold ends at 07:30.
    app.tick(&mut switch, &mut sink);
    assert_eq!(app.state(), StateId::HoldingAfterSunrise);

    clock.advance_minutes(59);
    app.tick(&mut switch, &mut sink);
    assert_eq!(app.state(), StateId::HoldingAfterSunrise);
    assert_eq!(app.duty(), 100);

    clock.advance_minutes(1);
    app.tick(&mut switch, &mut sink);
    assert_eq!(app.state(), StateId::Idle);
    assert_eq!(app.duty(), 0);
    assert!(sink.contains(&AppEvent::DutyForced(0)));

    let all = writes.all();
    assert_eq!(all.len(), 102);
    assert!(all[..101].windows(2).all(|w| w[1] == w[0] + 1));
    assert_eq!(writes.last(), Some(0));
}

#[test]
fn sunrise_fires_once_per_day() {
    let clock = Arc::new(SimClock::at("2022-11-07T06:00:00"));
    let mut sink = LogSink::new();
    let (mut app, _writes) = started_service(&clock, Arc::new(InstantTimer), &mut sink);
    let mut switch = MockSwitch::default();

    app.tick(&mut switch, &mut sink);
    app.wait_for_ramp();
    app.tick(&mut switch, &mut sink);
    clock.advance_minutes(90);
    app.tick(&mut switch, &mut sink);
    assert_eq!(app.state(), StateId::Idle);

    // Clock wound back into the trigger window on the same day.
    clock.set_time(datetime("2022-11-07T06:01:00")).unwrap();
    app.tick(&mut switch, &mut sink);
    assert_eq!(app.state(), StateId::Idle);
    assert_eq!(sink.count("RampStarted"), 1);

    // Next morning it fires again.
    clock.set_time(datetime("2022-11-08T06:02:00")).unwrap();
    app.tick(&mut switch, &mut sink);
    assert_eq!(app.state(), StateId::RampingUp);
    assert_eq!(sink.count("RampStarted"), 2);
}

#[test]
fn sunset_forces_full_then_ramps_down() {
    let clock = Arc::new(SimClock::at("2022-11-07T20:00:00"));
    let mut sink = LogSink::new();
    let (mut app, writes) = started_service(&clock, Arc::clone(&clock), &mut sink);
    let mut switch = MockSwitch::default();

    app.tick(&mut switch, &mut sink);
    assert_eq!(app.state(), StateId::HoldingAfterSunset);
    assert_eq!(app.duty(), 100);
    assert_eq!(writes.all(), vec![100]);

    clock.advance_minutes(59);
    app.tick(&mut switch, &mut sink);
    assert_eq!(app.state(), StateId::HoldingAfterSunset);

    clock.advance_minutes(1);
    app.tick(&mut switch, &mut sink);
    assert_eq!(app.state(), StateId::RampingDown);
    assert!(sink.contains(&AppEvent::RampStarted(RampRequest::new(100, 0, 1800))));

    assert_eq!(app.wait_for_ramp(), Some(RampOutcome::Completed));
    assert_eq!(app.duty(), 0);

    app.tick(&mut switch, &mut sink);
    assert_eq!(app.state(), StateId::Idle);

    // Later the same evening nothing re-fires.
    app.tick(&mut switch, &mut sink);
    assert_eq!(app.state(), StateId::Idle);
    assert_eq!(writes.last(), Some(0));
}

#[test]
fn outside_windows_nothing_happens() {
    let clock = Arc::new(SimClock::at("2022-11-07T06:03:00"));
    let mut sink = LogSink::new();
    let (mut app, writes) = started_service(&clock, Arc::new(InstantTimer), &mut sink);
    let mut switch = MockSwitch::default();

    for _ in 0..5 {
        app.tick(&mut switch, &mut sink);
        clock.advance_minutes(60);
    }
    // 06:03 .. 10:03, never within two minutes of 06:00 or 20:00
    assert_eq!(app.state(), StateId::Idle);
    assert!(writes.all().is_empty());
}

#[test]
fn late_tick_within_window_still_triggers() {
    let clock = Arc::new(SimClock::at("2022-11-07T06:02:59"));
    let mut sink = LogSink::new();
    let (mut app, _writes) = started_service(&clock, Arc::new(InstantTimer), &mut sink);

    app.tick(&mut MockSwitch::default(), &mut sink);
    assert_eq!(app.state(), StateId::RampingUp);
}

#[test]
fn date_outside_calendar_keeps_idle_without_writes() {
    let clock = Arc::new(SimClock::at("2150-06-01T06:00:00"));
    let mut sink = LogSink::new();
    let (mut app, writes) = started_service(&clock, Arc::new(InstantTimer), &mut sink);

    app.tick(&mut MockSwitch::default(), &mut sink);
    assert_eq!(app.state(), StateId::Idle);
    assert!(writes.all().is_empty());
    assert_eq!(sink.count("StateChanged"), 0);
}

#[test]
fn lost_clock_is_seeded_at_boot() {
    let clock = Arc::new(SimClock::unset());
    let mut sink = LogSink::new();
    let (mut app, writes) = started_service(&clock, Arc::new(InstantTimer), &mut sink);

    // Boot seeded the lost clock with 2022-01-01 00:00.
    assert_eq!(clock.time(), Some(datetime("2022-01-01T00:00:00")));

    app.tick(&mut MockSwitch::default(), &mut sink);
    assert_eq!(app.state(), StateId::Idle);
    assert!(writes.all().is_empty());
}

#[test]
fn late_tick_after_ramp_does_not_stretch_hold() {
    let clock = Arc::new(SimClock::at("2022-11-07T06:00:00"));
    let mut sink = LogSink::new();
    let (mut app, _writes) = started_service(&clock, Arc::new(InstantTimer), &mut sink);
    let mut switch = MockSwitch::default();

    app.tick(&mut switch, &mut sink);
    app.wait_for_ramp();

    // Control loop stalled for five minutes before the next tick.
    clock.advance_minutes(5);
    app.tick(&mut switch, &mut sink);
    assert_eq!(app.state(), StateId::HoldingAfterSunrise);

    clock.set_time(datetime("2022-11-07T07:29:00")).unwrap();
    app.tick(&mut switch, &mut sink);
    assert_eq!(app.state(), StateId::HoldingAfterSunrise);

    clock.set_time(datetime("2022-11-07T07:30:00")).unwrap();
    app.tick(&mut switch, &mut sink);
    assert_eq!(app.state(), StateId::Idle);
    assert_eq!(app.duty(), 0);
}
