//! Integration tests for manual light control: commands, SWITCH1 and the
//! schedule on/off switch, all against the single ramp slot.

use std::sync::Arc;
use std::time::{Duration, Instant};

use cooplight::Error;
use cooplight::app::commands::LightCommand;
use cooplight::app::events::AppEvent;
use cooplight::fsm::StateId;
use cooplight::ramp::{RampOutcome, RampRequest};

use super::mock_hw::{
    BlockingTimer, FastTimer, InstantTimer, LogSink, MockSwitch, SimClock, started_service,
};

#[test]
fn light_on_then_off_ends_dark() {
    let clock = Arc::new(SimClock::at("2022-05-04T10:00:00"));
    let mut sink = LogSink::new();
    let (mut app, writes) = started_service(&clock, Arc::new(InstantTimer), &mut sink);

    app.handle_command(LightCommand::LightOn, &mut sink).unwrap();
    assert!(app.light_on());
    assert_eq!(app.wait_for_ramp(), Some(RampOutcome::Completed));
    assert_eq!(app.duty(), 100);

    app.handle_command(LightCommand::LightOff, &mut sink).unwrap();
    assert!(!app.light_on());
    assert_eq!(app.wait_for_ramp(), Some(RampOutcome::Completed));
    assert_eq!(app.duty(), 0);

    assert!(sink.contains(&AppEvent::RampStarted(RampRequest::new(0, 100, 2))));
    assert!(sink.contains(&AppEvent::RampStarted(RampRequest::new(100, 0, 2))));
    assert_eq!(writes.all().len(), 202);
}

#[test]
fn light_off_when_already_dark_is_a_single_write() {
    let clock = Arc::new(SimClock::at("2022-05-04T10:00:00"));
    let mut sink = LogSink::new();
    let (mut app, writes) = started_service(&clock, Arc::new(InstantTimer), &mut sink);

    app.handle_command(LightCommand::LightOff, &mut sink).unwrap();
    assert!(!app.is_ramp_running());
    assert_eq!(app.wait_for_ramp(), None);
    assert_eq!(writes.all(), vec![0]);
}

#[test]
fn light_off_while_ramp_runs_is_a_no_op() {
    let clock = Arc::new(SimClock::at("2022-11-07T06:00:00"));
    let mut sink = LogSink::new();
    let (mut app, _writes) = started_service(&clock, Arc::new(BlockingTimer), &mut sink);
    let mut switch = MockSwitch::default();

    // Sunrise: a 30 minute ramp with 18 s between steps.
    app.tick(&mut switch, &mut sink);
    assert_eq!(app.state(), StateId::RampingUp);
    assert!(app.is_ramp_running());
    let duty_before = app.duty();

    assert_eq!(
        app.handle_command(LightCommand::LightOff, &mut sink),
        Err(Error::RampConflict)
    );
    assert_eq!(app.duty(), duty_before);
    assert_eq!(app.state(), StateId::RampingUp);
    assert!(!app.light_on());
    assert_eq!(sink.count("RampRejected"), 1);
    assert!(sink.contains(&AppEvent::CommandFailed(Error::RampConflict)));
    // Dropping the service cancels the blocked ramp.
}

#[test]
fn disable_mid_ramp_forces_dark_within_a_tick() {
    let clock = Arc::new(SimClock::at("2022-11-07T06:00:00"));
    let mut sink = LogSink::new();
    let (mut app, writes) = started_service(&clock, Arc::new(FastTimer), &mut sink);
    let mut switch = MockSwitch::default();

    app.tick(&mut switch, &mut sink);
    assert_eq!(app.state(), StateId::RampingUp);

    let started = Instant::now();
    while app.duty() == 0 && started.elapsed() < Duration::from_secs(2) {
        std::thread::sleep(Duration::from_millis(1));
    }

    let disabled_at = Instant::now();
    app.handle_command(LightCommand::DisableSchedule, &mut sink)
        .unwrap();
    assert!(disabled_at.elapsed() < Duration::from_millis(u64::from(app.config().tick_interval_ms)));

    assert!(!app.is_ramp_running());
    assert_eq!(app.duty(), 0);
    assert_eq!(writes.last(), Some(0));
    assert_eq!(app.state(), StateId::Idle);
    assert!(!app.schedule_enabled());
    assert!(sink.contains(&AppEvent::ScheduleChanged { enabled: false }));

    // Disabled: ticks leave the state machine alone, even at sunrise.
    app.tick(&mut switch, &mut sink);
    assert_eq!(app.state(), StateId::Idle);

    app.handle_command(LightCommand::EnableSchedule, &mut sink)
        .unwrap();
    assert!(app.schedule_enabled());
    assert!(sink.contains(&AppEvent::ScheduleChanged { enabled: true }));
}

#[test]
fn switch_edges_drive_manual_ramps() {
    let clock = Arc::new(SimClock::at("2022-05-04T10:00:00"));
    let mut sink = LogSink::new();
    let (mut app, _writes) = started_service(&clock, Arc::new(InstantTimer), &mut sink);
    let mut switch = MockSwitch::default();

    app.tick(&mut switch, &mut sink);
    assert_eq!(sink.count("RampStarted"), 0);

    switch.closed = true;
    app.tick(&mut switch, &mut sink);
    app.wait_for_ramp();
    assert!(app.light_on());
    assert_eq!(app.duty(), 100);

    // Level unchanged: no new request.
    app.tick(&mut switch, &mut sink);
    assert_eq!(sink.count("RampStarted"), 1);

    switch.closed = false;
    app.tick(&mut switch, &mut sink);
    app.wait_for_ramp();
    assert!(!app.light_on());
    assert_eq!(app.duty(), 0);
    assert_eq!(sink.count("RampStarted"), 2);
}

#[test]
fn switch_agreeing_with_light_state_does_nothing() {
    let clock = Arc::new(SimClock::at("2022-05-04T10:00:00"));
    let mut sink = LogSink::new();
    let (mut app, _writes) = started_service(&clock, Arc::new(InstantTimer), &mut sink);
    let mut switch = MockSwitch::default();

    app.handle_command(LightCommand::LightOn, &mut sink).unwrap();
    app.wait_for_ramp();

    // Closing the switch matches the light already being on.
    switch.closed = true;
    app.tick(&mut switch, &mut sink);
    assert_eq!(sink.count("RampStarted"), 1);
    assert!(app.light_on());
}

#[test]
fn switch_flipped_during_ramp_acts_once_ramp_ends() {
    let clock = Arc::new(SimClock::at("2022-05-04T10:00:00"));
    let mut sink = LogSink::new();
    let (mut app, _writes) = started_service(&clock, Arc::new(FastTimer), &mut sink);
    let mut switch = MockSwitch::default();

    app.handle_command(LightCommand::LightOn, &mut sink).unwrap();
    app.wait_for_ramp();
    app.handle_command(LightCommand::LightOff, &mut sink).unwrap();
    assert!(app.is_ramp_running());

    // Closed mid-ramp: held back, not rejected.
    switch.closed = true;
    app.tick(&mut switch, &mut sink);
    assert!(!app.light_on());
    assert_eq!(sink.count("RampStarted"), 2);
    assert_eq!(sink.count("RampRejected"), 0);

    app.wait_for_ramp();
    assert_eq!(app.duty(), 0);

    app.tick(&mut switch, &mut sink);
    assert!(app.light_on());
    assert_eq!(sink.count("RampStarted"), 3);
    app.wait_for_ramp();
    assert_eq!(app.duty(), 100);

    // Acted on once; later ticks with the switch still closed do nothing.
    app.tick(&mut switch, &mut sink);
    assert_eq!(sink.count("RampStarted"), 3);
}

#[test]
fn light_off_overrides_closed_switch() {
    let clock = Arc::new(SimClock::at("2022-05-04T10:00:00"));
    let mut sink = LogSink::new();
    let (mut app, _writes) = started_service(&clock, Arc::new(InstantTimer), &mut sink);
    let mut switch = MockSwitch { closed: true };

    app.tick(&mut switch, &mut sink);
    app.wait_for_ramp();
    assert!(app.light_on());

    app.handle_command(LightCommand::LightOff, &mut sink).unwrap();
    app.wait_for_ramp();
    app.tick(&mut switch, &mut sink);
    assert!(!app.light_on());
    assert_eq!(app.duty(), 0);
}

#[test]
fn disable_during_sunrise_hold_forces_dark() {
    let clock = Arc::new(SimClock::at("2022-11-07T06:00:00"));
    let mut sink = LogSink::new();
    let (mut app, writes) = started_service(&clock, Arc::new(InstantTimer), &mut sink);
    let mut switch = MockSwitch::default();

    app.tick(&mut switch, &mut sink);
    app.wait_for_ramp();
    app.tick(&mut switch, &mut sink);
    assert_eq!(app.state(), StateId::HoldingAfterSunrise);
    assert_eq!(app.duty(), 100);

    app.handle_command(LightCommand::DisableSchedule, &mut sink)
        .unwrap();
    assert_eq!(app.state(), StateId::Idle);
    assert_eq!(app.duty(), 0);
    assert_eq!(writes.last(), Some(0));
    assert!(sink.contains(&AppEvent::StateChanged {
        from: StateId::HoldingAfterSunrise,
        to: StateId::Idle,
    }));

    clock.advance_minutes(90);
    app.tick(&mut switch, &mut sink);
    assert_eq!(app.state(), StateId::Idle);
    assert_eq!(sink.count("RampStarted"), 1);

    // Re-enabled later the same morning: the day's sunrise has been used.
    app.handle_command(LightCommand::EnableSchedule, &mut sink)
        .unwrap();
    app.tick(&mut switch, &mut sink);
    assert_eq!(app.state(), StateId::Idle);
    assert_eq!(writes.last(), Some(0));
}

#[test]
fn disable_during_sunset_hold_forces_dark() {
    let clock = Arc::new(SimClock::at("2022-11-07T20:00:00"));
    let mut sink = LogSink::new();
    let (mut app, writes) = started_service(&clock, Arc::new(InstantTimer), &mut sink);
    let mut switch = MockSwitch::default();

    app.tick(&mut switch, &mut sink);
    assert_eq!(app.state(), StateId::HoldingAfterSunset);

    app.handle_command(LightCommand::DisableSchedule, &mut sink)
        .unwrap();
    assert_eq!(app.state(), StateId::Idle);
    assert_eq!(app.duty(), 0);
    assert_eq!(writes.all(), vec![100, 0]);

    clock.advance_minutes(60);
    app.tick(&mut switch, &mut sink);
    assert_eq!(app.state(), StateId::Idle);
    assert_eq!(sink.count("RampStarted"), 0);
    assert_eq!(writes.all(), vec![100, 0]);
}
