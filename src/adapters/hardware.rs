//! Hardware adapter: bridges the board's inputs to domain port traits.
//!
//! Owns SWITCH1 and the heartbeat LED and carries the latest coop
//! temperature, exposing them through [`SwitchPort`] and
//! [`TemperaturePort`].  The dimmer is not here: the service hands it to
//! the ramp runner, which shares it with the ramp thread.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::app::ports::{SwitchPort, TemperaturePort};
use crate::drivers::status_led::HeartbeatLed;

/// Concrete adapter that combines the board inputs behind port traits.
pub struct HardwareAdapter<S, P> {
    switch: S,
    heartbeat: HeartbeatLed<P>,
    temperature_c: Option<f32>,
}

impl<S, P> HardwareAdapter<S, P>
where
    S: SwitchPort,
    P: OutputPin,
{
    pub fn new(switch: S, heartbeat: HeartbeatLed<P>) -> Self {
        Self {
            switch,
            heartbeat,
            temperature_c: None,
        }
    }

    /// Store a reading from whichever sensor task measures the coop.
    /// Non-finite values clear the reading.
    pub fn record_temperature(&mut self, celsius: f32) {
        self.temperature_c = celsius.is_finite().then_some(celsius);
    }

    /// Blink the heartbeat LED once for this tick.
    pub fn heartbeat(&mut self, network_up: bool, delay: &mut impl DelayNs) {
        self.heartbeat.beat(network_up, delay);
    }
}

// ── SwitchPort implementation ─────────────────────────────────

impl<S: SwitchPort, P> SwitchPort for HardwareAdapter<S, P> {
    fn is_closed(&mut self) -> bool {
        self.switch.is_closed()
    }
}

// ── TemperaturePort implementation ────────────────────────────

impl<S, P> TemperaturePort for HardwareAdapter<S, P> {
    fn temperature_c(&mut self) -> Option<f32> {
        self.temperature_c
    }
}
