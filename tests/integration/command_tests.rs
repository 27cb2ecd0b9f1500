//! Integration tests for the command path: form parameters, the command
//! queue and the status placeholders the web page renders.

use std::sync::Arc;

use cooplight::Error;
use cooplight::app::commands::{LightCommand, ParamError};
use cooplight::app::events::AppEvent;
use cooplight::app::ports::ClockReading;
use cooplight::app::queue::CommandQueue;
use cooplight::app::service::LightService;
use cooplight::config::SystemConfig;

use super::mock_hw::{
    FixedThermometer, InstantTimer, LogSink, RecordingDimmer, SimClock, datetime, flat_table,
    started_service,
};

fn set_time(raw: &str) -> LightCommand {
    LightCommand::from_param("InputDateTime", raw).unwrap()
}

#[test]
fn set_date_time_updates_clock() {
    let clock = Arc::new(SimClock::at("2022-05-04T10:00:00"));
    let mut sink = LogSink::new();
    let (mut app, _writes) = started_service(&clock, Arc::new(InstantTimer), &mut sink);

    app.handle_command(set_time("2023-03-15T07:45:10"), &mut sink)
        .unwrap();
    assert_eq!(clock.time(), Some(datetime("2023-03-15T07:45:10")));
    assert!(sink.contains(&AppEvent::ClockSet(ClockReading::from_datetime(datetime(
        "2023-03-15T07:45:10"
    )))));
}

#[test]
fn malformed_date_time_is_rejected() {
    let clock = Arc::new(SimClock::at("2022-05-04T10:00:00"));
    let mut sink = LogSink::new();
    let (mut app, _writes) = started_service(&clock, Arc::new(InstantTimer), &mut sink);

    for raw in ["2023-03-15 07:45:10", "2023-13-01T00:00:00", "yesterday", ""] {
        assert_eq!(
            app.handle_command(set_time(raw), &mut sink),
            Err(Error::MalformedTimeString),
            "{raw:?}"
        );
    }
    assert_eq!(clock.time(), Some(datetime("2022-05-04T10:00:00")));
    assert_eq!(sink.count("CommandFailed"), 4);
    assert_eq!(sink.count("ClockSet"), 0);
}

#[test]
fn form_parameters_reach_the_service() {
    let clock = Arc::new(SimClock::at("2022-05-04T10:00:00"));
    let mut sink = LogSink::new();
    let (mut app, _writes) = started_service(&clock, Arc::new(InstantTimer), &mut sink);

    for (name, value) in [
        ("InputThresholdDark", "20"),
        ("InputThresholdBright", "80"),
        ("Schedule", "disable"),
        ("Light", "on"),
    ] {
        let cmd = LightCommand::from_param(name, value).unwrap();
        app.handle_command(cmd, &mut sink).unwrap();
    }
    app.wait_for_ramp();

    let report = app.status(&mut FixedThermometer(None));
    assert_eq!(report.threshold_dark_percent, 20);
    assert_eq!(report.threshold_bright_percent, 80);
    assert!(!report.schedule_enabled);
    assert!(report.light_on);
    assert_eq!(report.duty_percent, 100);

    assert_eq!(
        LightCommand::from_param("InputThresholdDark", "101"),
        Err(ParamError::InvalidValue)
    );
    assert_eq!(
        LightCommand::from_param("Brightness", "50"),
        Err(ParamError::UnknownParameter)
    );
}

#[test]
fn queued_commands_are_drained_in_one_pass() {
    let clock = Arc::new(SimClock::at("2022-05-04T10:00:00"));
    let mut sink = LogSink::new();
    let (mut app, _writes) = started_service(&clock, Arc::new(InstantTimer), &mut sink);
    let queue = CommandQueue::new();

    queue.submit(LightCommand::SetThresholdDark(10)).unwrap();
    queue.submit(LightCommand::LightOn).unwrap();

    assert_eq!(app.drain_commands(&queue, &mut sink), 2);
    assert_eq!(app.drain_commands(&queue, &mut sink), 0);
    assert_eq!(app.config().threshold_dark_percent, 10);
    assert!(app.light_on());
}

#[test]
fn failed_queued_command_does_not_block_the_rest() {
    let clock = Arc::new(SimClock::at("2022-05-04T10:00:00"));
    let mut sink = LogSink::new();
    let (mut app, _writes) = started_service(&clock, Arc::new(InstantTimer), &mut sink);
    let queue = CommandQueue::new();

    queue.submit(set_time("not a time")).unwrap();
    queue.submit(LightCommand::SetThresholdBright(90)).unwrap();

    assert_eq!(app.drain_commands(&queue, &mut sink), 2);
    assert!(sink.contains(&AppEvent::CommandFailed(Error::MalformedTimeString)));
    assert_eq!(app.config().threshold_bright_percent, 90);
}

#[test]
fn status_without_clock_reports_time_not_set() {
    let clock = Arc::new(SimClock::unset());
    let (dimmer, _writes) = RecordingDimmer::new();
    let app = LightService::new(
        SystemConfig::default(),
        flat_table(),
        Arc::clone(&clock),
        dimmer,
        Arc::new(InstantTimer),
    )
    .unwrap();

    let report = app.status(&mut FixedThermometer(Some(21.04)));
    assert_eq!(report.clock, None);
    assert_eq!(report.placeholder("DATE_TIME").as_deref(), Some("time not set"));
    assert_eq!(report.placeholder("SUNRISE").as_deref(), Some("time not set"));
    assert_eq!(report.placeholder("TEMP").as_deref(), Some("21.0"));
    assert_eq!(report.placeholder("NOPE"), None);
}

#[test]
fn status_shows_todays_schedule() {
    let clock = Arc::new(SimClock::at("2022-05-04T10:00:00"));
    let mut sink = LogSink::new();
    let (app, _writes) = started_service(&clock, Arc::new(InstantTimer), &mut sink);

    let report = app.status(&mut FixedThermometer(None));
    assert_eq!(
        report.placeholder("DATE_TIME").as_deref(),
        Some("2022-05-04 10:00:00")
    );
    assert_eq!(report.placeholder("SUNRISE").as_deref(), Some("06:00:00"));
    assert_eq!(report.placeholder("SUNSET").as_deref(), Some("20:00:00"));
    assert_eq!(report.placeholder("TEMP").as_deref(), Some("n/a"));
    assert_eq!(report.placeholder("STATE").as_deref(), Some("Idle"));
}

#[test]
fn status_after_disable_reports_schedule_disabled() {
    let clock = Arc::new(SimClock::at("2022-05-04T10:00:00"));
    let mut sink = LogSink::new();
    let (mut app, _writes) = started_service(&clock, Arc::new(InstantTimer), &mut sink);

    app.handle_command(LightCommand::DisableSchedule, &mut sink)
        .unwrap();
    let report = app.status(&mut FixedThermometer(None));
    assert_eq!(report.placeholder("SCHEDULE").as_deref(), Some("schedule disabled"));
    assert_eq!(report.placeholder("SUNRISE").as_deref(), Some("schedule disabled"));
}

#[test]
fn date_beyond_calendar_has_no_schedule_row() {
    let clock = Arc::new(SimClock::at("2022-05-04T10:00:00"));
    let mut sink = LogSink::new();
    let (mut app, _writes) = started_service(&clock, Arc::new(InstantTimer), &mut sink);

    // The simulated clock takes any parseable time.
    app.handle_command(set_time("2150-01-01T00:00:00"), &mut sink)
        .unwrap();
    let report = app.status(&mut FixedThermometer(None));
    assert_eq!(report.today, None);
    assert_eq!(report.placeholder("SUNRISE").as_deref(), Some("time not set"));
}
