//! CoopLight firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod calendar;
pub mod config;
pub mod fsm;
pub mod ramp;
pub mod schedule;

pub mod error;
pub mod pins;

// Hardware-facing modules; the ESP-IDF implementations are guarded by cfg
// attributes inside, with host fallbacks for tests and simulation.
pub mod adapters;
pub mod drivers;

pub use error::{Error, Result};
