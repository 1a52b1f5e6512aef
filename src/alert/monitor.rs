//! Alert monitor task.
//!
//! Every `alert_check_interval_ms` it peeks at the telemetry head. A
//! sample it has not evaluated yet runs through the [`AlertEngine`];
//! whatever happened, the annunciator's steady outputs are re-applied so
//! they always show the current state.

use std::time::Duration;

use embedded_hal::delay::DelayNs;
use log::{info, trace, warn};

use super::engine::{AlertEngine, Evaluation};
use super::thresholds::AlertThresholds;
use crate::app::ports::{ActuatorPort, Clock, NotificationSink};
use crate::config::SystemConfig;
use crate::drivers::annunciator::Annunciator;
use crate::scheduler::Cadence;
use crate::shared::SharedState;

pub struct AlertMonitor<A, D, N, C> {
    shared: SharedState,
    engine: AlertEngine,
    annunciator: Annunciator<A, D>,
    sink: N,
    clock: C,
    cadence: Cadence,
    peek_timeout: Duration,
    /// Thresholds from the last successful guard read.
    thresholds: AlertThresholds,
    last_evaluated_ms: Option<u64>,
}

impl<A, D, N, C> AlertMonitor<A, D, N, C>
where
    A: ActuatorPort,
    D: DelayNs,
    N: NotificationSink,
    C: Clock,
{
    pub fn new(
        shared: SharedState,
        annunciator: Annunciator<A, D>,
        sink: N,
        clock: C,
        config: &SystemConfig,
    ) -> Self {
        Self {
            shared,
            engine: AlertEngine::new(u64::from(config.notification_cooldown_ms)),
            annunciator,
            sink,
            clock,
            cadence: Cadence::new(u64::from(config.alert_check_interval_ms)),
            peek_timeout: Duration::from_millis(u64::from(config.alert_peek_timeout_ms)),
            thresholds: config.thresholds,
            last_evaluated_ms: None,
        }
    }

    pub fn engine(&self) -> &AlertEngine {
        &self.engine
    }

    pub fn annunciator(&self) -> &Annunciator<A, D> {
        &self.annunciator
    }

    pub fn sink(&self) -> &N {
        &self.sink
    }

    /// One monitor cycle. Returns the evaluation if a new sample was seen.
    pub fn poll(&mut self) -> Option<Evaluation> {
        let fresh = match self.shared.telemetry.peek(self.peek_timeout) {
            Ok(sample) if Some(sample.timestamp_ms()) != self.last_evaluated_ms => Some(sample),
            Ok(_) => None,
            Err(e) => {
                trace!("Alert monitor: {e}");
                None
            }
        };

        let evaluation = fresh.map(|sample| {
            self.refresh_thresholds();
            self.last_evaluated_ms = Some(sample.timestamp_ms());

            let eval = self
                .engine
                .evaluate(&sample, &self.thresholds, self.clock.now_ms());
            if eval.entered_alert() {
                self.annunciator.signal_entry(self.thresholds.buzzer_enabled);
            }
            if let Some(notification) = &eval.notification {
                match self.sink.notify(notification) {
                    Ok(()) => info!("Notification sent: {}", notification.message),
                    Err(e) => warn!("Notification dropped ({e}): {}", notification.message),
                }
            }
            eval
        });

        self.annunciator.hold(self.engine.state());
        evaluation
    }

    /// Task body. Never returns.
    pub fn run(mut self, mut delay: impl DelayNs) -> ! {
        info!(
            "Alert monitor started (every {}ms)",
            self.cadence.period_ms()
        );
        self.annunciator.hold(self.engine.state());
        loop {
            self.poll();
            self.cadence.wait(&self.clock, &mut delay);
        }
    }

    fn refresh_thresholds(&mut self) {
        match self.shared.thresholds.snapshot() {
            Ok(t) => self.thresholds = t,
            Err(e) => warn!("Alert monitor: {e}, keeping previous thresholds"),
        }
    }
}
