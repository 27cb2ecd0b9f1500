//! GPIO / peripheral pin assignments for the coop light board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Light dimmer (LEDC PWM into the LED driver's dim input)
// ---------------------------------------------------------------------------

/// LEDC PWM output to the dimmer.
pub const DIMMER_GPIO: i32 = 16;
/// LEDC base frequency for the dimmer (1 kHz, driver-compatible).
pub const DIMMER_PWM_FREQ_HZ: u32 = 1_000;
/// LEDC timer resolution (bits).  8-bit gives 0 – 255 duty levels.
pub const PWM_RESOLUTION_BITS: u32 = 8;

// ---------------------------------------------------------------------------
// Manual switch
// ---------------------------------------------------------------------------

/// SWITCH1, two-position toggle to ground.  LOW = closed (light on).
pub const SWITCH1_GPIO: i32 = 27;

// ---------------------------------------------------------------------------
// Status LED
// ---------------------------------------------------------------------------

/// Heartbeat LED, active HIGH.
pub const STATUS_LED_GPIO: i32 = 26;
