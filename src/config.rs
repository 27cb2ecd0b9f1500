//! System configuration parameters
//!
//! All tunable parameters for the coop light controller.
//! Values can be changed at runtime through control commands; how they are
//! persisted is left to the adapter (any serde format works).

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Timing ---
    /// Control loop period (milliseconds)
    pub tick_interval_ms: u32,
    /// Duration of a manual on/off ramp (seconds)
    pub manual_ramp_secs: u32,
    /// Minutes after sunrise/sunset during which the trigger may still fire
    pub trigger_window_minutes: u8,
    /// Status/log report interval (seconds)
    pub status_interval_secs: u32,

    // --- Brightness thresholds ---
    /// Ambient level (0-100%) below which the coop counts as dark
    pub threshold_dark_percent: u8,
    /// Ambient level (0-100%) above which the coop counts as bright
    pub threshold_bright_percent: u8,

    // --- Schedule ---
    /// Run the sunrise/sunset schedule from boot
    pub schedule_enabled: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Timing
            tick_interval_ms: 2000, // 0.5 Hz
            manual_ramp_secs: 2,
            trigger_window_minutes: 2,
            status_interval_secs: 60, // 1/min

            // Thresholds
            threshold_dark_percent: 0,
            threshold_bright_percent: 100,

            // Schedule
            schedule_enabled: true,
        }
    }
}

impl SystemConfig {
    /// Range-check every field.  Invalid values are rejected, not clamped.
    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(Error::Config("tick_interval_ms must be > 0"));
        }
        if self.trigger_window_minutes >= 60 {
            return Err(Error::Config("trigger_window_minutes must be < 60"));
        }
        if self.threshold_dark_percent > 100 {
            return Err(Error::Config("threshold_dark_percent must be <= 100"));
        }
        if self.threshold_bright_percent > 100 {
            return Err(Error::Config("threshold_bright_percent must be <= 100"));
        }
        if self.threshold_dark_percent > self.threshold_bright_percent {
            return Err(Error::Config("dark threshold above bright threshold"));
        }
        Ok(())
    }

    /// Control ticks between two status reports (at least one).
    pub fn ticks_per_status(&self) -> u64 {
        let interval_ms = u64::from(self.status_interval_secs) * 1000;
        (interval_ms / u64::from(self.tick_interval_ms.max(1))).max(1)
    }
}
