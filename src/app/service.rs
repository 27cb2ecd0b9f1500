//! Application service, the hexagonal core.
//!
//! [`LightService`] owns the FSM, its context, the clock handle and the
//! ramp runner (which owns the dimmer).  It exposes a hardware-agnostic
//! API; switch, thermometer and event sink are passed in at call sites so
//! the whole service runs against mock adapters in tests.
//!
//! ```text
//!  ClockPort ──▶ ┌─────────────────────────┐ ──▶ EventSink
//!  SwitchPort ──▶│      LightService       │
//!                │  FSM · RampRunner       │──▶ ActuatorPort (ramp thread)
//!                └─────────────────────────┘
//! ```

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, info, warn};

use crate::calendar::INVALID_WEEK;
use crate::config::SystemConfig;
use crate::error::{ClockError, Error, Result};
use crate::fsm::context::FsmContext;
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::ramp::{DimmerOutput, RampOutcome, RampRequest, RampRunner};
use crate::schedule::{ScheduleEntry, ScheduleTable};

use super::commands::LightCommand;
use super::events::AppEvent;
use super::ports::{
    ActuatorPort, ClockPort, ClockReading, EventSink, SwitchPort, TemperaturePort, TimerPort,
};
use super::queue::CommandQueue;
use super::status::{FIRMWARE_VERSION, StatusReport};

/// Format accepted by [`LightCommand::SetDateTime`].
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Time the clock is seeded with when it reports "not set" at boot.
fn fallback_time() -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(2022, 1, 1)?.and_hms_opt(0, 0, 0)
}

// ───────────────────────────────────────────────────────────────
// LightService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct LightService<C, A, T> {
    fsm: Fsm,
    ctx: FsmContext,
    clock: Arc<C>,
    ramps: RampRunner<A, T>,
    /// Manual on/off state, flipped by the switch and the light commands.
    light_on: bool,
    /// Switch level seen on the previous tick.
    last_switch: bool,
    /// Whether the last clock read succeeded (for edge-only logging).
    clock_ok: bool,
    tick_count: u64,
}

impl<C, A, T> LightService<C, A, T>
where
    C: ClockPort,
    A: ActuatorPort + 'static,
    T: TimerPort + 'static,
{
    /// Construct the service.  Fails if `config` does not validate.
    ///
    /// Does **not** start the FSM; call [`start`](Self::start) next.
    pub fn new(
        config: SystemConfig,
        table: ScheduleTable,
        clock: Arc<C>,
        actuator: A,
        timer: Arc<T>,
    ) -> Result<Self> {
        config.validate()?;
        let ctx = FsmContext::new(config, table);
        let fsm = Fsm::new(build_state_table(), StateId::Idle);
        let ramps = RampRunner::new(Arc::new(DimmerOutput::new(actuator)), timer);

        Ok(Self {
            fsm,
            ctx,
            clock,
            ramps,
            light_on: false,
            last_switch: false,
            clock_ok: true,
            tick_count: 0,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Seed a lost clock, enter Idle and announce the start.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        match self.clock.now() {
            Ok(now) => info!("Clock reads {}", now),
            Err(ClockError::NotSet) => self.seed_clock(),
            Err(e) => warn!("Clock unreadable at boot: {}", e),
        }

        self.fsm.start(&mut self.ctx);
        sink.emit(&AppEvent::Started {
            state: self.fsm.current_state(),
            schedule_enabled: self.schedule_enabled(),
        });
        info!(
            "LightService started in {} (schedule {})",
            self.fsm.current_state(),
            if self.schedule_enabled() { "enabled" } else { "disabled" }
        );
    }

    fn seed_clock(&self) {
        let Some(seed) = fallback_time() else {
            return;
        };
        match self.clock.set_time(seed) {
            Ok(()) => warn!("RTC lost power, clock seeded with {}", seed),
            Err(e) => warn!("RTC lost power and could not be seeded: {}", e),
        }
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one control cycle: switch → clock → FSM → dimmer.
    pub fn tick(&mut self, switch: &mut impl SwitchPort, sink: &mut impl EventSink) {
        self.tick_count += 1;

        // 1. Manual switch, independent of the schedule
        self.poll_switch(switch, sink);

        if !self.schedule_enabled() {
            return;
        }

        // 2. Clock sample
        self.ctx.clock = self.read_clock();

        // 3. FSM tick (pure state logic)
        let prev_state = self.fsm.current_state();
        self.fsm.tick(&mut self.ctx);

        // 4. Apply dimmer commands
        self.apply_commands(sink);

        // 5. Emit state change if the FSM moved
        let new_state = self.fsm.current_state();
        if new_state != prev_state {
            sink.emit(&AppEvent::StateChanged {
                from: prev_state,
                to: new_state,
            });
        }
    }

    fn read_clock(&mut self) -> Option<ClockReading> {
        match self.clock.now() {
            Ok(reading) => {
                if !self.clock_ok {
                    info!("Clock readable again: {}", reading);
                }
                self.clock_ok = true;
                Some(reading)
            }
            Err(e) => {
                if self.clock_ok {
                    warn!("Clock unavailable: {}", e);
                }
                self.clock_ok = false;
                None
            }
        }
    }

    /// Act on a switch level change that disagrees with the light state.
    ///
    /// While a ramp runs the change stays pending and is retried on the
    /// following ticks.  The level is recorded only once the light agrees
    /// with it, so a web command can still override a closed switch.
    fn poll_switch(&mut self, switch: &mut impl SwitchPort, sink: &mut impl EventSink) {
        let closed = switch.is_closed();
        if closed == self.last_switch {
            return;
        }
        if closed == self.light_on {
            self.last_switch = closed;
            return;
        }
        if self.ramps.is_running() {
            debug!("SWITCH1 change pending until the ramp ends");
            return;
        }
        info!("SWITCH1 {}", if closed { "closed" } else { "open" });
        match self.manual(closed, sink) {
            Ok(()) => self.last_switch = closed,
            Err(e) => debug!("SWITCH1 request retried next tick: {}", e),
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Carry out an external command (web form, serial console, …).
    ///
    /// Failures are logged and emitted as [`AppEvent::CommandFailed`]
    /// before being returned.
    pub fn handle_command(&mut self, cmd: LightCommand, sink: &mut impl EventSink) -> Result<()> {
        let result = self.execute(cmd, sink);
        if let Err(e) = result {
            warn!("Command failed: {}", e);
            sink.emit(&AppEvent::CommandFailed(e));
        }
        result
    }

    /// Handle every queued command.  Returns how many were taken.
    pub fn drain_commands(&mut self, queue: &CommandQueue, sink: &mut impl EventSink) -> usize {
        let mut handled = 0;
        while let Some(cmd) = queue.try_next() {
            let _ = self.handle_command(cmd, sink);
            handled += 1;
        }
        handled
    }

    fn execute(&mut self, cmd: LightCommand, sink: &mut impl EventSink) -> Result<()> {
        match cmd {
            LightCommand::SetDateTime(raw) => {
                let time = NaiveDateTime::parse_from_str(raw.as_str(), DATE_TIME_FORMAT)
                    .map_err(|_| Error::MalformedTimeString)?;
                self.clock.set_time(time)?;
                info!("Clock set to {}", time);
                sink.emit(&AppEvent::ClockSet(ClockReading::from_datetime(time)));
            }
            LightCommand::SetThresholdDark(percent) => {
                let mut config = self.ctx.config.clone();
                config.threshold_dark_percent = percent;
                self.update_config(config)?;
                info!("Dark threshold set to {}%", percent);
            }
            LightCommand::SetThresholdBright(percent) => {
                let mut config = self.ctx.config.clone();
                config.threshold_bright_percent = percent;
                self.update_config(config)?;
                info!("Bright threshold set to {}%", percent);
            }
            LightCommand::LightOn => self.manual(true, sink)?,
            LightCommand::LightOff => self.manual(false, sink)?,
            LightCommand::EnableSchedule => self.enable_schedule(sink),
            LightCommand::DisableSchedule => self.disable_schedule(sink),
        }
        Ok(())
    }

    fn update_config(&mut self, config: SystemConfig) -> Result<()> {
        config.validate()?;
        self.ctx.config = config;
        Ok(())
    }

    /// Short ramp from the current duty to full on or off.
    fn manual(&mut self, on: bool, sink: &mut impl EventSink) -> Result<()> {
        let target = if on { 100 } else { 0 };
        let request =
            RampRequest::new(self.ramps.duty(), target, self.ctx.config.manual_ramp_secs);
        match self.ramps.start(request) {
            Ok(_) => {
                self.light_on = on;
                sink.emit(&AppEvent::RampStarted(request));
                Ok(())
            }
            Err(Error::RampConflict) => {
                sink.emit(&AppEvent::RampRejected(request));
                Err(Error::RampConflict)
            }
            Err(e) => Err(e),
        }
    }

    fn enable_schedule(&mut self, sink: &mut impl EventSink) {
        if self.schedule_enabled() {
            debug!("Schedule already enabled");
            return;
        }
        self.ctx.config.schedule_enabled = true;
        info!("Schedule enabled in {}", self.fsm.current_state());
        sink.emit(&AppEvent::ScheduleChanged { enabled: true });
    }

    /// Cancel any ramp, pass through Stopped (light off) and park in Idle.
    fn disable_schedule(&mut self, sink: &mut impl EventSink) {
        let prev_state = self.fsm.current_state();
        if let Some(outcome) = self.ramps.cancel() {
            debug!("Ramp ended on disable: {:?}", outcome);
        }

        self.fsm.force_transition(StateId::Stopped, &mut self.ctx);
        self.apply_commands(sink);
        self.fsm.force_transition(StateId::Idle, &mut self.ctx);

        self.ctx.config.schedule_enabled = false;
        self.light_on = false;

        if prev_state != StateId::Idle {
            sink.emit(&AppEvent::StateChanged {
                from: prev_state,
                to: StateId::Idle,
            });
        }
        sink.emit(&AppEvent::ScheduleChanged { enabled: false });
        info!("Schedule disabled");
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a status snapshot.  Reads the clock and the thermometer.
    pub fn status(&self, thermometer: &mut impl TemperaturePort) -> StatusReport {
        let clock = self.clock.now().ok();
        StatusReport {
            clock,
            temperature_c: thermometer.temperature_c(),
            duty_percent: self.ramps.duty(),
            state: self.fsm.current_state(),
            schedule_enabled: self.schedule_enabled(),
            today: clock.and_then(|c| self.entry_for(&c)),
            threshold_dark_percent: self.ctx.config.threshold_dark_percent,
            threshold_bright_percent: self.ctx.config.threshold_bright_percent,
            light_on: self.light_on,
            ramp_running: self.ramps.is_running(),
            version: FIRMWARE_VERSION,
        }
    }

    fn entry_for(&self, clock: &ClockReading) -> Option<ScheduleEntry> {
        match clock.week() {
            INVALID_WEEK => None,
            week => self.ctx.table.lookup(week).ok().copied(),
        }
    }

    /// Current FSM state.
    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn schedule_enabled(&self) -> bool {
        self.ctx.config.schedule_enabled
    }

    /// Last written duty cycle.
    pub fn duty(&self) -> u8 {
        self.ramps.duty()
    }

    pub fn light_on(&self) -> bool {
        self.light_on
    }

    pub fn is_ramp_running(&self) -> bool {
        self.ramps.is_running()
    }

    /// Block until the running ramp (if any) finishes by itself.
    pub fn wait_for_ramp(&self) -> Option<RampOutcome> {
        self.ramps.wait()
    }

    /// The live configuration.
    pub fn config(&self) -> &SystemConfig {
        &self.ctx.config
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // ── Internal ──────────────────────────────────────────────

    /// Translate FSM dimmer commands into ramp-runner calls.
    fn apply_commands(&mut self, sink: &mut impl EventSink) {
        let cmds = self.ctx.commands.take();
        if cmds.is_empty() {
            return;
        }

        if cmds.cancel_ramp || cmds.force_duty.is_some() {
            if let Some(outcome) = self.ramps.cancel() {
                debug!("Running ramp stopped: {:?}", outcome);
            }
        }

        if let Some(duty) = cmds.force_duty {
            match self.ramps.output().write(duty) {
                Ok(()) => sink.emit(&AppEvent::DutyForced(duty)),
                Err(e) => {
                    warn!("Dimmer write {}% failed: {}", duty, e);
                    sink.emit(&AppEvent::CommandFailed(e.into()));
                }
            }
        }

        if let Some(request) = cmds.ramp {
            match self.ramps.start(request) {
                Ok(_) => sink.emit(&AppEvent::RampStarted(request)),
                Err(Error::RampConflict) => sink.emit(&AppEvent::RampRejected(request)),
                Err(e) => {
                    warn!("Ramp {} failed to start: {}", request, e);
                    sink.emit(&AppEvent::CommandFailed(e));
                }
            }
        }
    }
}
