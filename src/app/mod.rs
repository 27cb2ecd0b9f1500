//! Application core: pure domain logic, zero I/O.
//!
//! This module holds the business rules of the coop light: FSM
//! orchestration, manual override and schedule control.  All interaction
//! with hardware happens through **port traits** defined in [`ports`],
//! keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod queue;
pub mod service;
pub mod status;
