//! Handle to the state shared between tasks.
//!
//! Built once in `main` and cloned into every observing task. Nothing in
//! the firmware reaches shared state through globals: telemetry goes
//! through the [`TelemetryObserver`], thresholds through the
//! [`ThresholdGuard`].

use std::sync::Arc;
use std::time::Duration;

use crate::alert::thresholds::{AlertThresholds, ThresholdGuard};
use crate::telemetry::{self, TELEMETRY_QUEUE_DEPTH, TelemetryDrain, TelemetryObserver, TelemetryPublisher};

#[derive(Clone)]
pub struct SharedState {
    pub telemetry: TelemetryObserver,
    pub thresholds: Arc<ThresholdGuard>,
}

impl SharedState {
    /// Build the channel and guard. The publisher and the single drain
    /// come back separately so they can be moved into their own tasks.
    pub fn new(
        initial: AlertThresholds,
        lock_timeout: Duration,
    ) -> (Self, TelemetryPublisher, TelemetryDrain) {
        let (publisher, drain, observer) = telemetry::channel::<TELEMETRY_QUEUE_DEPTH>();
        let shared = Self {
            telemetry: observer,
            thresholds: Arc::new(ThresholdGuard::new(initial, lock_timeout)),
        };
        (shared, publisher, drain)
    }
}
