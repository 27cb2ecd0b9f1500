//! PWM light dimmer driver.
//!
//! Wraps any `embedded-hal` [`SetDutyCycle`] output (the LEDC channel on
//! GPIO 16 in production) and exposes it as the domain [`ActuatorPort`].
//! Percentages are mapped onto the channel's full duty range by the HAL
//! (0–255 at 8-bit resolution).
//!
//! ## Dual-target design
//!
//! On ESP-IDF: wraps an `LedcDriver` built in `hw_init`.
//! On host/test: wraps any in-memory `SetDutyCycle` fake.

use embedded_hal::pwm::SetDutyCycle;
use log::warn;

use crate::app::ports::ActuatorPort;
use crate::error::ActuatorError;

pub struct Dimmer<P> {
    pwm: P,
    percent: u8,
}

impl<P: SetDutyCycle> Dimmer<P> {
    pub fn new(pwm: P) -> Self {
        Self { pwm, percent: 0 }
    }

    /// Last percentage successfully written.
    pub fn percent(&self) -> u8 {
        self.percent
    }

    pub fn into_inner(self) -> P {
        self.pwm
    }
}

impl<P: SetDutyCycle + Send> ActuatorPort for Dimmer<P> {
    fn set_duty_cycle(&mut self, percent: u8) -> Result<(), ActuatorError> {
        if percent > 100 {
            return Err(ActuatorError::OutOfRange(percent));
        }
        if let Err(e) = self.pwm.set_duty_cycle_percent(percent) {
            warn!("Dimmer PWM write failed: {:?}", e);
            return Err(ActuatorError::PwmWriteFailed);
        }
        self.percent = percent;
        Ok(())
    }
}
