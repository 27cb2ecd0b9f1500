//! Timed, cancellable dimming ramps.
//!
//! A ramp walks the duty cycle from `start` to `stop` one percentage point
//! at a time, pausing `duration / steps` between writes.  It runs on its own
//! thread so the control loop keeps ticking; the [`RampRunner`] slot makes
//! sure at most one ramp drives the dimmer at any moment.
//!
//! ```text
//!   control loop ──start()──▶ RampRunner ──spawn──▶ ramp thread
//!        │                        │                     │
//!        └──────cancel()─────────▶│──CancelToken──────▶ │ (wakes, exits)
//!                                 │◀──────join──────────┘
//! ```

use core::sync::atomic::{AtomicU8, Ordering};
use core::time::Duration;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::JoinHandle;

use log::{debug, info, warn};

use crate::app::ports::{ActuatorPort, TimerPort};
use crate::drivers::task_pin::{self, RAMP_TASK};
use crate::error::{ActuatorError, Error, Result};

// ---------------------------------------------------------------------------
// Request / outcome
// ---------------------------------------------------------------------------

/// One dimming transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RampRequest {
    pub start_percent: u8,
    pub stop_percent: u8,
    pub duration_secs: u32,
}

impl RampRequest {
    pub const fn new(start_percent: u8, stop_percent: u8, duration_secs: u32) -> Self {
        Self {
            start_percent,
            stop_percent,
            duration_secs,
        }
    }

    /// Number of one-point steps after the initial write.
    pub fn steps(&self) -> u32 {
        u32::from(self.start_percent.abs_diff(self.stop_percent))
    }

    pub fn is_degenerate(&self) -> bool {
        self.start_percent == self.stop_percent
    }

    /// Delay between steps.  A degenerate ramp has no steps and therefore
    /// no delay; it is reported as [`Error::DegenerateRamp`].
    pub fn step_delay(&self) -> Result<Duration> {
        match self.steps() {
            0 => Err(Error::DegenerateRamp),
            steps => Ok(Duration::from_millis(
                u64::from(self.duration_secs) * 1000 / u64::from(steps),
            )),
        }
    }

    fn validate(&self) -> Result<()> {
        for percent in [self.start_percent, self.stop_percent] {
            if percent > 100 {
                return Err(ActuatorError::OutOfRange(percent).into());
            }
        }
        Ok(())
    }
}

impl core::fmt::Display for RampRequest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}% -> {}% over {}s",
            self.start_percent, self.stop_percent, self.duration_secs
        )
    }
}

/// How a ramp ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampOutcome {
    /// Every step was written.
    Completed,
    /// `start == stop`: a single write, no stepping.
    Degenerate,
    /// Stopped early; the duty stays at the last written value.
    Cancelled,
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

/// Condvar-backed cancellation flag shared between a ramp and its owner.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation and wake any waiter.
    pub fn cancel(&self) {
        let (flag, cvar) = &*self.inner;
        *flag.lock().unwrap_or_else(PoisonError::into_inner) = true;
        cvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleep up to `timeout`, returning early on cancellation.
    /// Returns `true` if cancelled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (flag, cvar) = &*self.inner;
        let guard = flag.lock().unwrap_or_else(PoisonError::into_inner);
        let (guard, _) = cvar
            .wait_timeout_while(guard, timeout, |cancelled| !*cancelled)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }
}

// ---------------------------------------------------------------------------
// Dimmer output
// ---------------------------------------------------------------------------

/// Mutex-guarded actuator plus the last written duty, readable lock-free.
pub struct DimmerOutput<A> {
    actuator: Mutex<A>,
    duty: AtomicU8,
}

impl<A: ActuatorPort> DimmerOutput<A> {
    pub fn new(actuator: A) -> Self {
        Self {
            actuator: Mutex::new(actuator),
            duty: AtomicU8::new(0),
        }
    }

    /// Write a duty cycle.  The published value only changes on success.
    pub fn write(&self, percent: u8) -> core::result::Result<(), ActuatorError> {
        if percent > 100 {
            return Err(ActuatorError::OutOfRange(percent));
        }
        let mut actuator = self.actuator.lock().unwrap_or_else(PoisonError::into_inner);
        actuator.set_duty_cycle(percent)?;
        self.duty.store(percent, Ordering::Release);
        Ok(())
    }

    /// Last successfully written duty cycle.
    pub fn duty(&self) -> u8 {
        self.duty.load(Ordering::Acquire)
    }

    /// Run `f` with exclusive access to the underlying actuator.
    #[doc(hidden)]
    pub fn with_actuator<R>(&self, f: impl FnOnce(&mut A) -> R) -> R {
        let mut actuator = self.actuator.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut actuator)
    }
}

// ---------------------------------------------------------------------------
// Ramp body
// ---------------------------------------------------------------------------

/// Execute one ramp on the calling thread.
///
/// Writes `start` immediately, then one point per step toward `stop`.
/// Cancellation is observed between steps only.
pub fn run_ramp<A, T>(
    request: RampRequest,
    output: &DimmerOutput<A>,
    timer: &T,
    cancel: &CancelToken,
) -> Result<RampOutcome>
where
    A: ActuatorPort,
    T: TimerPort + ?Sized,
{
    request.validate()?;
    output.write(request.start_percent)?;

    let delay = match request.step_delay() {
        Ok(delay) => delay,
        Err(Error::DegenerateRamp) => return Ok(RampOutcome::Degenerate),
        Err(e) => return Err(e),
    };

    let rising = request.stop_percent > request.start_percent;
    let mut duty = request.start_percent;
    for _ in 0..request.steps() {
        if timer.pause(delay, cancel) {
            debug!("RAMP cancelled at {}%", duty);
            return Ok(RampOutcome::Cancelled);
        }
        duty = if rising { duty + 1 } else { duty - 1 };
        output.write(duty)?;
        debug!("RAMP step {}%", duty);
    }
    Ok(RampOutcome::Completed)
}

// ---------------------------------------------------------------------------
// Runner (single-slot)
// ---------------------------------------------------------------------------

/// How a successful [`RampRunner::start`] was carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampStart {
    /// A ramp thread is now running.
    Spawned,
    /// Degenerate request, handled with a single synchronous write.
    Immediate,
}

struct RampTask {
    request: RampRequest,
    cancel: CancelToken,
    handle: JoinHandle<Result<RampOutcome>>,
}

/// Owns the dimmer and the one-ramp-at-a-time slot.
pub struct RampRunner<A, T> {
    output: Arc<DimmerOutput<A>>,
    timer: Arc<T>,
    slot: Mutex<Option<RampTask>>,
}

impl<A, T> RampRunner<A, T>
where
    A: ActuatorPort + 'static,
    T: TimerPort + 'static,
{
    pub fn new(output: Arc<DimmerOutput<A>>, timer: Arc<T>) -> Self {
        Self {
            output,
            timer,
            slot: Mutex::new(None),
        }
    }

    pub fn output(&self) -> &Arc<DimmerOutput<A>> {
        &self.output
    }

    /// Current duty cycle, lock-free.
    pub fn duty(&self) -> u8 {
        self.output.duty()
    }

    /// Start a ramp unless one is already running.
    ///
    /// A conflicting request is rejected with [`Error::RampConflict`] and
    /// does not touch the duty cycle.
    pub fn start(&self, request: RampRequest) -> Result<RampStart> {
        request.validate()?;

        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        reap_finished(&mut slot);
        if let Some(task) = slot.as_ref() {
            warn!(
                "Ramp {} rejected: {} still running",
                request, task.request
            );
            return Err(Error::RampConflict);
        }

        if request.is_degenerate() {
            self.output.write(request.start_percent)?;
            info!("Ramp {}: {}", request, Error::DegenerateRamp);
            return Ok(RampStart::Immediate);
        }

        let cancel = CancelToken::new();
        let output = Arc::clone(&self.output);
        let timer = Arc::clone(&self.timer);
        let token = cancel.clone();
        let handle = task_pin::spawn_on_core(RAMP_TASK, move || {
            let outcome = run_ramp(request, &*output, &*timer, &token);
            match &outcome {
                Ok(result) => info!("Ramp {} finished: {:?}", request, result),
                Err(e) => warn!("Ramp {} aborted: {}", request, e),
            }
            outcome
        })?;

        info!("Ramp started: {}", request);
        *slot = Some(RampTask {
            request,
            cancel,
            handle,
        });
        Ok(RampStart::Spawned)
    }

    /// `true` while a ramp thread is still stepping.
    pub fn is_running(&self) -> bool {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        reap_finished(&mut slot);
        slot.is_some()
    }

    /// The request of the running ramp, if any.
    pub fn active_request(&self) -> Option<RampRequest> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        reap_finished(&mut slot);
        slot.as_ref().map(|task| task.request)
    }

    /// Cancel the running ramp and wait for its thread to exit.
    /// Returns `None` if nothing was running.
    pub fn cancel(&self) -> Option<RampOutcome> {
        let task = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()?;
        task.cancel.cancel();
        let outcome = join_task(task);
        info!("Ramp cancelled at {}%", self.output.duty());
        outcome
    }

    /// Wait for the running ramp to finish on its own.
    pub fn wait(&self) -> Option<RampOutcome> {
        let task = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()?;
        join_task(task)
    }
}

impl<A, T> Drop for RampRunner<A, T> {
    fn drop(&mut self) {
        let slot = self.slot.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(task) = slot.take() {
            task.cancel.cancel();
            let _ = join_task(task);
        }
    }
}

fn reap_finished(slot: &mut Option<RampTask>) {
    if slot.as_ref().is_some_and(|task| task.handle.is_finished()) {
        if let Some(task) = slot.take() {
            let _ = join_task(task);
        }
    }
}

fn join_task(task: RampTask) -> Option<RampOutcome> {
    match task.handle.join() {
        Ok(Ok(outcome)) => Some(outcome),
        Ok(Err(_)) => None,
        Err(_) => {
            warn!("Ramp thread panicked");
            None
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
