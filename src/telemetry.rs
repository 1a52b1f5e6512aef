//! Telemetry samples and the bounded channel that distributes them.
//!
//! One producer (the acquisition loop) publishes into a fixed-capacity
//! FIFO. Consumers come in two kinds:
//!
//! - exactly one [`TelemetryDrain`] takes samples out, in order, each at
//!   most once (the cloud forwarding path);
//! - any number of [`TelemetryObserver`]s peek at the head without
//!   removing it (alerting, display).
//!
//! Publishing never waits for a consumer: a full buffer drops the new
//! sample and counts it. An observer blocked in `peek` when a sample is
//! published always gets to see it, even if the drain removes it first;
//! observation is latest-value, forwarding is guaranteed-delivery.
//!
//! ```text
//!   TelemetryPublisher ──publish──▶ [ FIFO, N slots ] ──take──▶ TelemetryDrain
//!                                          │
//!                                          └──peek──▶ TelemetryObserver (× n)
//! ```

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use heapless::Deque;
use log::{trace, warn};

use crate::error::ChannelError;
use crate::sensors::aqi::AQI_MAX;

/// Reference buffer depth.
pub const TELEMETRY_QUEUE_DEPTH: usize = 10;

// ---------------------------------------------------------------------------
// Sample
// ---------------------------------------------------------------------------

/// One acquisition cycle's output. Immutable once built; [`Self::new`] is
/// the only constructor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetrySample {
    temperature: f32,
    humidity: f32,
    air_quality_index: u16,
    timestamp_ms: u64,
}

impl TelemetrySample {
    /// `air_quality_index` is clamped to `[0, 500]`.
    pub fn new(temperature: f32, humidity: f32, air_quality_index: u16, timestamp_ms: u64) -> Self {
        Self {
            temperature,
            humidity,
            air_quality_index: air_quality_index.min(AQI_MAX),
            timestamp_ms,
        }
    }

    /// Celsius.
    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// %RH.
    pub fn humidity(&self) -> f32 {
        self.humidity
    }

    pub fn air_quality_index(&self) -> u16 {
        self.air_quality_index
    }

    /// Monotonic milliseconds at publication.
    pub fn timestamp_ms(&self) -> u64 {
        self.timestamp_ms
    }
}

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelStats {
    /// Samples accepted into the buffer.
    pub published: u64,
    /// Samples rejected because the buffer was full.
    pub dropped: u32,
    /// Samples currently waiting for the drain.
    pub depth: usize,
}

struct Slots<const N: usize> {
    queue: Deque<TelemetrySample, N>,
    published: u64,
    /// Most recently accepted sample, tagged with its `published` count.
    latest: Option<(u64, TelemetrySample)>,
}

struct Shared<const N: usize> {
    slots: Mutex<Slots<N>>,
    arrived: Condvar,
    dropped: AtomicU32,
}

impl<const N: usize> Shared<N> {
    fn lock(&self) -> MutexGuard<'_, Slots<N>> {
        // Every critical section is a single push/pop/copy; a poisoned
        // lock still guards consistent data.
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wait on `arrived` until `ready` yields a sample or `timeout` passes.
    fn wait_for(
        &self,
        timeout: Duration,
        mut ready: impl FnMut(&mut Slots<N>) -> Option<TelemetrySample>,
    ) -> Result<TelemetrySample, ChannelError> {
        let deadline = Instant::now() + timeout;
        let mut slots = self.lock();
        loop {
            if let Some(sample) = ready(&mut *slots) {
                return Ok(sample);
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(ChannelError::Timeout);
            }
            slots = self
                .arrived
                .wait_timeout(slots, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    fn stats(&self) -> ChannelStats {
        let slots = self.lock();
        ChannelStats {
            published: slots.published,
            dropped: self.dropped.load(Ordering::Relaxed),
            depth: slots.queue.len(),
        }
    }
}

/// Build a channel with room for `N` undrained samples.
pub fn channel<const N: usize>() -> (
    TelemetryPublisher<N>,
    TelemetryDrain<N>,
    TelemetryObserver<N>,
) {
    const { assert!(N > 0, "telemetry channel needs at least one slot") };
    let shared = Arc::new(Shared {
        slots: Mutex::new(Slots {
            queue: Deque::new(),
            published: 0,
            latest: None,
        }),
        arrived: Condvar::new(),
        dropped: AtomicU32::new(0),
    });
    (
        TelemetryPublisher {
            shared: Arc::clone(&shared),
        },
        TelemetryDrain {
            shared: Arc::clone(&shared),
        },
        TelemetryObserver { shared },
    )
}

/// Producer handle. Not `Clone`: there is one acquisition loop.
pub struct TelemetryPublisher<const N: usize = TELEMETRY_QUEUE_DEPTH> {
    shared: Arc<Shared<N>>,
}

impl<const N: usize> TelemetryPublisher<N> {
    /// Append `sample` without blocking on consumers. A full buffer keeps
    /// its contents and rejects the new sample with [`ChannelError::Full`].
    pub fn publish(&self, sample: TelemetrySample) -> Result<(), ChannelError> {
        let mut slots = self.shared.lock();
        if slots.queue.push_back(sample).is_err() {
            drop(slots);
            let dropped = self.shared.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            warn!(
                "Telemetry buffer full ({N} slots): sample @{}ms dropped ({dropped} total)",
                sample.timestamp_ms()
            );
            return Err(ChannelError::Full);
        }
        slots.published += 1;
        slots.latest = Some((slots.published, sample));
        drop(slots);
        self.shared.arrived.notify_all();
        trace!("Telemetry published @{}ms", sample.timestamp_ms());
        Ok(())
    }

    pub fn stats(&self) -> ChannelStats {
        self.shared.stats()
    }
}

/// The single destructive consumer. Not `Clone`.
pub struct TelemetryDrain<const N: usize = TELEMETRY_QUEUE_DEPTH> {
    shared: Arc<Shared<N>>,
}

impl<const N: usize> TelemetryDrain<N> {
    /// Remove and return the oldest sample, waiting up to `timeout`.
    pub fn take(&mut self, timeout: Duration) -> Result<TelemetrySample, ChannelError> {
        self.shared
            .wait_for(timeout, |slots| slots.queue.pop_front())
    }

    pub fn stats(&self) -> ChannelStats {
        self.shared.stats()
    }
}

/// Non-destructive reader. Clone one per observing task.
pub struct TelemetryObserver<const N: usize = TELEMETRY_QUEUE_DEPTH> {
    shared: Arc<Shared<N>>,
}

impl<const N: usize> Clone for TelemetryObserver<N> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<const N: usize> TelemetryObserver<N> {
    /// Copy of the oldest undrained sample, waiting up to `timeout` for
    /// one to be published. A sample published during the wait is
    /// returned even if the drain has already removed it.
    pub fn peek(&self, timeout: Duration) -> Result<TelemetrySample, ChannelError> {
        let mut seen = None;
        self.shared.wait_for(timeout, |slots| {
            let seen = *seen.get_or_insert(slots.published);
            if let Some(head) = slots.queue.front() {
                return Some(*head);
            }
            match slots.latest {
                Some((seq, sample)) if seq > seen => Some(sample),
                _ => None,
            }
        })
    }

    pub fn stats(&self) -> ChannelStats {
        self.shared.stats()
    }
}
