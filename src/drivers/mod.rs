//! Peripheral drivers, hardware initialisation, and task helpers.

pub mod dimmer;
#[cfg(target_os = "espidf")]
pub mod hw_init;
pub mod status_led;
pub mod switch;
pub mod task_pin;
pub mod watchdog;
