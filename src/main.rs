//! CoopLight Firmware, main entry point.
//!
//! Hexagonal architecture around a fixed-period control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter    LogEventSink   SystemClock    Dimmer       │
//! │  (Switch+Temp)      (EventSink)    (Clock+Timer)  (Actuator)   │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              LightService (pure logic)                 │    │
//! │  │  FSM · RampRunner · manual override                    │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  COMMANDS queue (web → loop) · STATUS board (loop → web)       │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::prelude::Peripherals;
use log::info;

use cooplight::adapters::hardware::HardwareAdapter;
use cooplight::adapters::log_sink::LogEventSink;
use cooplight::adapters::time::SystemClock;
use cooplight::app::events::AppEvent;
use cooplight::app::ports::EventSink;
use cooplight::app::queue::COMMANDS;
use cooplight::app::service::LightService;
use cooplight::app::status::STATUS;
use cooplight::config::SystemConfig;
use cooplight::drivers::hw_init::{self, BoardDimmer, BoardHeartbeat, BoardSwitch};
use cooplight::drivers::status_led;
use cooplight::drivers::task_pin::{self, CONTROL_TASK};
use cooplight::drivers::watchdog::{self, Watchdog};
use cooplight::schedule::ScheduleTable;

type App = LightService<SystemClock, BoardDimmer, SystemClock>;
type Hardware = HardwareAdapter<BoardSwitch, BoardHeartbeat>;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  CoopLight v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Initialise hardware peripherals ────────────────────
    let peripherals = Peripherals::take()?;
    let board = hw_init::init_peripherals(peripherals.ledc)?;

    // ── 3. Configuration and schedule ─────────────────────────
    let config = SystemConfig::default();
    let table = ScheduleTable::builtin();

    // ── 4. Construct adapters and the service ─────────────────
    let clock = Arc::new(SystemClock::new());
    let mut sink = LogEventSink::new();
    let mut app = LightService::new(
        config.clone(),
        table,
        Arc::clone(&clock),
        board.dimmer,
        clock,
    )?;
    let hw = HardwareAdapter::new(board.switch, board.heartbeat);

    app.start(&mut sink);

    // ── 5. Control loop on the application core ───────────────
    info!("System ready. Entering control loop.");
    let control = task_pin::spawn_on_core(CONTROL_TASK, move || {
        control_loop(&config, app, hw, sink);
    })?;
    control
        .join()
        .map_err(|_| anyhow!("control task panicked"))?;
    Ok(())
}

fn control_loop(config: &SystemConfig, mut app: App, mut hw: Hardware, mut sink: LogEventSink) {
    let watchdog = Watchdog::new(watchdog::timeout_for_tick(config.tick_interval_ms));
    let tick = Duration::from_millis(u64::from(config.tick_interval_ms));
    let ticks_per_status = config.ticks_per_status();
    let mut delay = FreeRtos;

    loop {
        // Commands queued by the web handler since the last tick.
        app.drain_commands(&COMMANDS, &mut sink);

        app.tick(&mut hw, &mut sink);
        hw.heartbeat(status_led::network_up(), &mut delay);

        if app.tick_count() % ticks_per_status == 0 {
            let report = app.status(&mut hw);
            STATUS.publish(report.clone());
            sink.emit(&AppEvent::Status(report));
        }

        // Feed watchdog on every iteration.
        watchdog.feed();
        std::thread::sleep(tick);
    }
}
