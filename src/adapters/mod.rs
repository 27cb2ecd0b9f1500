//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements         | Connects to              |
//! |------------|--------------------|--------------------------|
//! | `hardware` | SwitchPort         | SWITCH1 GPIO             |
//! |            | TemperaturePort    | latest coop temperature  |
//! | `log_sink` | EventSink          | Serial log output        |
//! | `time`     | ClockPort          | ESP32 system time        |
//! |            | TimerPort          | condvar-backed delay     |
//!
//! The dimmer's [`ActuatorPort`](crate::app::ports::ActuatorPort) lives in
//! [`drivers::dimmer`](crate::drivers::dimmer).

pub mod hardware;
pub mod log_sink;
pub mod time;
