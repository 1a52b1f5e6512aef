//! Task spawning with explicit FreeRTOS priority and stack size.
//!
//! Wraps `esp_pthread_set_cfg()` so that `std::thread::spawn` creates a
//! FreeRTOS task with the requested priority and stack. The ESP32-C3 has a
//! single core, so tasks carry no affinity. On non-ESP targets it falls
//! back to a plain named thread.
//!
//! `esp_pthread_set_cfg()` sets thread-local configuration for the *next*
//! `pthread_create()` from the calling thread, so the config→spawn pair
//! must not be interleaved with other thread creation on the same thread.

use std::thread::JoinHandle;

use crate::error::{Error, Result};

/// Spawn a task with explicit priority and stack.
///
/// `name` must be null-terminated (e.g. `"sensor\0"`); the terminator is
/// stripped for the Rust-side thread name.
#[cfg(target_os = "espidf")]
pub fn spawn_task(
    priority: u8,
    stack_kb: usize,
    name: &'static str,
    f: impl FnOnce() + Send + 'static,
) -> Result<JoinHandle<()>> {
    // SAFETY: the config struct lives for the duration of the call and
    // `name` is 'static and null-terminated.
    unsafe {
        let mut cfg = esp_idf_sys::esp_create_default_pthread_config();
        cfg.pin_to_core = esp_idf_sys::tskNO_AFFINITY as i32;
        cfg.prio = i32::from(priority);
        cfg.stack_size = (stack_kb * 1024) as _;
        cfg.thread_name = name.as_ptr() as *const _;
        let ret = esp_idf_sys::esp_pthread_set_cfg(&cfg);
        if ret != esp_idf_sys::ESP_OK as i32 {
            log::error!("esp_pthread_set_cfg failed: {ret}");
            return Err(Error::Init("pthread config"));
        }
    }

    let display_name = name.trim_end_matches('\0');
    log::info!(
        "Spawning '{display_name}' (pri={priority}, stack={stack_kb}KB)"
    );

    std::thread::Builder::new()
        .name(display_name.into())
        .spawn(f)
        .map_err(|_| Error::Init("task spawn"))
}

/// Simulation fallback: ignores priority.
#[cfg(not(target_os = "espidf"))]
pub fn spawn_task(
    _priority: u8,
    stack_kb: usize,
    name: &'static str,
    f: impl FnOnce() + Send + 'static,
) -> Result<JoinHandle<()>> {
    let display_name = name.trim_end_matches('\0');
    log::info!("Spawning '{display_name}' (sim, stack={stack_kb}KB)");

    std::thread::Builder::new()
        .name(display_name.into())
        // Host threads need more than the device stacks.
        .stack_size((stack_kb * 1024).max(64 * 1024))
        .spawn(f)
        .map_err(|_| Error::Init("task spawn"))
}
