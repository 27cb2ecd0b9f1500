//! SWITCH1 level reader.
//!
//! ## Hardware
//!
//! Two-position toggle to ground with the internal pull-up enabled, so
//! the pin reads LOW when the switch is closed (light on).  The control
//! loop samples it once per tick; edge handling lives in the service, so
//! the driver reports the raw level only.

use embedded_hal::digital::InputPin;
use log::warn;

use crate::app::ports::SwitchPort;

pub struct Switch<P> {
    pin: P,
    read_failed: bool,
}

impl<P: InputPin> Switch<P> {
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            read_failed: false,
        }
    }
}

impl<P: InputPin> SwitchPort for Switch<P> {
    fn is_closed(&mut self) -> bool {
        match self.pin.is_low() {
            Ok(low) => {
                self.read_failed = false;
                low
            }
            Err(e) => {
                // Reported once per failure streak; a failed read counts as open.
                if !self.read_failed {
                    warn!("SWITCH1 read failed: {:?}", e);
                }
                self.read_failed = true;
                false
            }
        }
    }
}
