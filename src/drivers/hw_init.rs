//! One-shot hardware peripheral initialization.
//!
//! Configures the LEDC timer/channel for the dimmer and the two GPIOs
//! (SWITCH1 input with pull-up, heartbeat LED output) through the
//! `esp-idf-hal` drivers, and hands them back wrapped in the crate's
//! `embedded-hal`-generic drivers.  Called once from `main()` before the
//! control loop starts.

use esp_idf_svc::hal::gpio::{AnyIOPin, AnyOutputPin, Input, Output, PinDriver, Pull};
use esp_idf_svc::hal::ledc::config::TimerConfig;
use esp_idf_svc::hal::ledc::{LEDC, LedcDriver, LedcTimerDriver, Resolution};
use esp_idf_svc::hal::units::Hertz;
use esp_idf_svc::sys::EspError;
use log::info;

use crate::drivers::dimmer::Dimmer;
use crate::drivers::status_led::HeartbeatLed;
use crate::drivers::switch::Switch;
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    LedcInitFailed(i32),
    GpioConfigFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::LedcInitFailed(rc) => write!(f, "LEDC timer/channel config failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
        }
    }
}

impl std::error::Error for HwInitError {}

fn ledc_err(e: EspError) -> HwInitError {
    HwInitError::LedcInitFailed(e.code())
}

fn gpio_err(e: EspError) -> HwInitError {
    HwInitError::GpioConfigFailed(e.code())
}

// ── Board ─────────────────────────────────────────────────────

pub type BoardDimmer = Dimmer<LedcDriver<'static>>;
pub type BoardSwitch = Switch<PinDriver<'static, AnyIOPin, Input>>;
pub type BoardHeartbeat = HeartbeatLed<PinDriver<'static, AnyOutputPin, Output>>;

/// Every peripheral the controller drives.
pub struct Board {
    pub dimmer: BoardDimmer,
    pub switch: BoardSwitch,
    pub heartbeat: BoardHeartbeat,
}

pub fn init_peripherals(ledc: LEDC) -> Result<Board, HwInitError> {
    // Timer 0: dimmer (1 kHz, 8-bit)
    let timer = LedcTimerDriver::new(
        ledc.timer0,
        &TimerConfig::new()
            .frequency(Hertz(pins::DIMMER_PWM_FREQ_HZ))
            .resolution(Resolution::Bits8),
    )
    .map_err(ledc_err)?;

    // SAFETY: each GPIO number appears once in `pins` and is claimed only
    // here, once at boot.
    let dimmer_pin = unsafe { AnyOutputPin::new(pins::DIMMER_GPIO) };
    let switch_pin = unsafe { AnyIOPin::new(pins::SWITCH1_GPIO) };
    let led_pin = unsafe { AnyOutputPin::new(pins::STATUS_LED_GPIO) };

    // Channel 0: dimmer PWM, starts dark
    let mut channel = LedcDriver::new(ledc.channel0, timer, dimmer_pin).map_err(ledc_err)?;
    channel.set_duty(0).map_err(ledc_err)?;
    info!(
        "hw_init: LEDC configured (dimmer=CH0 on GPIO{}, {} Hz, {}-bit)",
        pins::DIMMER_GPIO,
        pins::DIMMER_PWM_FREQ_HZ,
        pins::PWM_RESOLUTION_BITS
    );

    let mut switch = PinDriver::input(switch_pin).map_err(gpio_err)?;
    switch.set_pull(Pull::Up).map_err(gpio_err)?;

    let mut led = PinDriver::output(led_pin).map_err(gpio_err)?;
    led.set_low().map_err(gpio_err)?;
    info!(
        "hw_init: GPIO configured (SWITCH1=GPIO{}, LED=GPIO{})",
        pins::SWITCH1_GPIO,
        pins::STATUS_LED_GPIO
    );

    Ok(Board {
        dimmer: Dimmer::new(channel),
        switch: Switch::new(switch),
        heartbeat: HeartbeatLed::new(led),
    })
}
