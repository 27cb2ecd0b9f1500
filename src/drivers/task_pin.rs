//! Core-pinned thread spawning for the ESP32 dual-core.
//!
//! Wraps `esp_pthread_set_cfg()` so that `std::thread::spawn` creates a
//! FreeRTOS task pinned to a specific CPU core with explicit priority
//! and stack size. On non-ESP targets, falls back to a plain named thread.
//!
//! # ESP-IDF Threading Model
//!
//! ESP-IDF implements `std::thread` via pthreads, which are thin wrappers
//! around FreeRTOS tasks. `esp_pthread_set_cfg()` sets thread-local
//! configuration that applies to the *next* `pthread_create()` call from
//! the calling thread, so the config→spawn pair must not be interleaved
//! with other thread creation on the same thread.

use std::thread::JoinHandle;

use crate::error::{Error, Result};

/// CPU core identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Core {
    /// Core 0 (PRO_CPU): WiFi and lwIP.
    Pro = 0,
    /// Core 1 (APP_CPU): control loop and ramps.
    App = 1,
}

/// Parameters for one spawned task.
#[derive(Debug, Clone, Copy)]
pub struct TaskSpec {
    pub core: Core,
    pub priority: u8,
    pub stack_kb: usize,
    /// Must be NUL-terminated for FreeRTOS (e.g. `"ramp\0"`).
    pub name: &'static str,
}

/// The per-ramp dimming task.
pub const RAMP_TASK: TaskSpec = TaskSpec {
    core: Core::App,
    priority: 5,
    stack_kb: 4,
    name: "ramp\0",
};

/// The schedule/control loop.
pub const CONTROL_TASK: TaskSpec = TaskSpec {
    core: Core::App,
    priority: 4,
    stack_kb: 16,
    name: "control\0",
};

/// Spawn a thread pinned to `spec.core` with the given priority and stack.
#[cfg(target_os = "espidf")]
pub fn spawn_on_core<F, R>(spec: TaskSpec, f: F) -> Result<JoinHandle<R>>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    // SAFETY: the config is consumed by the very next pthread_create on this
    // thread, which is the Builder::spawn below.
    unsafe {
        let mut cfg = esp_idf_sys::esp_create_default_pthread_config();
        cfg.pin_to_core = spec.core as i32;
        cfg.prio = i32::from(spec.priority);
        cfg.stack_size = (spec.stack_kb * 1024) as i32;
        cfg.thread_name = spec.name.as_ptr().cast();
        let ret = esp_idf_sys::esp_pthread_set_cfg(&cfg);
        if ret != esp_idf_sys::ESP_OK as i32 {
            log::warn!("esp_pthread_set_cfg failed: {}", ret);
            return Err(Error::TaskSpawn);
        }
    }

    let display_name = spec.name.trim_end_matches('\0');
    log::debug!(
        "Spawning '{}' on {:?} (pri={}, stack={}KB)",
        display_name,
        spec.core,
        spec.priority,
        spec.stack_kb
    );

    std::thread::Builder::new()
        .name(display_name.into())
        .spawn(f)
        .map_err(|e| {
            log::warn!("spawn '{}' failed: {}", display_name, e);
            Error::TaskSpawn
        })
}

/// Simulation fallback: ignores core affinity and priority.
#[cfg(not(target_os = "espidf"))]
pub fn spawn_on_core<F, R>(spec: TaskSpec, f: F) -> Result<JoinHandle<R>>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    let display_name = spec.name.trim_end_matches('\0');
    log::debug!(
        "Spawning '{}' (sim, no core pinning, stack={}KB)",
        display_name,
        spec.stack_kb
    );

    std::thread::Builder::new()
        .name(display_name.into())
        .stack_size(spec.stack_kb.max(64) * 1024)
        .spawn(f)
        .map_err(|e| {
            log::warn!("spawn '{}' failed: {}", display_name, e);
            Error::TaskSpawn
        })
}
