//! Heartbeat status LED driver.
//!
//! The LED is switched on at every control tick.  While the network is up
//! it is pulsed off again after 2 ms, giving a short blink per tick; with
//! the network down it stays lit.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the GPIO 26 `PinDriver` built in `hw_init`.
//! On host/test: any `embedded-hal` [`OutputPin`] fake.

use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

/// Pulse length while the network is up.
pub const PULSE_MS: u32 = 2;

/// Network link state, written by whatever owns the network stack.
static NETWORK_UP: AtomicBool = AtomicBool::new(false);

pub fn set_network_up(up: bool) {
    NETWORK_UP.store(up, Ordering::Release);
}

pub fn network_up() -> bool {
    NETWORK_UP.load(Ordering::Acquire)
}

pub struct HeartbeatLed<P> {
    pin: P,
    lit: bool,
}

impl<P: OutputPin> HeartbeatLed<P> {
    pub fn new(pin: P) -> Self {
        Self { pin, lit: false }
    }

    /// One heartbeat.  Blocks for [`PULSE_MS`] when `network_up`.
    pub fn beat(&mut self, network_up: bool, delay: &mut impl DelayNs) {
        self.set(true);
        if network_up {
            delay.delay_ms(PULSE_MS);
            self.set(false);
        }
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }

    fn set(&mut self, on: bool) {
        let result = if on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        if result.is_ok() {
            self.lit = on;
        }
    }
}
