//! Uninterruptible execution region.
//!
//! Bit-banged protocols sample the line at fixed microsecond offsets; an
//! interrupt or a context switch in the middle of a frame shifts every
//! later sample. [`uninterruptible`] runs a closure with interrupts masked
//! on the calling core.
//!
//! - **`target_os = "espidf"`**: `esp_idf_hal::interrupt::free`, which
//!   enters an ISR-level critical section (interrupts off, no preemption).
//! - **host**: a `critical-section` critical section (the `std` impl
//!   serialises callers on a global lock).
//!
//! The closure must not block on another lock, queue or mutex.

#[cfg(target_os = "espidf")]
pub fn uninterruptible<R>(f: impl FnOnce() -> R) -> R {
    esp_idf_hal::interrupt::free(f)
}

#[cfg(not(target_os = "espidf"))]
pub fn uninterruptible<R>(f: impl FnOnce() -> R) -> R {
    critical_section::with(|_cs| f())
}
