//! Alert state machine with notification debouncing.
//!
//! The state always follows the latest sample: it enters a non-Normal
//! state while that condition holds and drops back to `Normal` the first
//! evaluation no condition holds. Notifications are rate-limited
//! separately from the state:
//!
//! - The first alert of a streak (Normal → alert) notifies, unless the
//!   same condition was already announced less than one cooldown ago
//!   (a flapping reading does not re-announce every time it re-crosses).
//! - A change between alert conditions inside a streak notifies only if
//!   the cooldown has elapsed since the last notification of any kind.
//! - Returning to `Normal` always sends a cleared notification.

use log::{debug, info, warn};

use super::thresholds::AlertThresholds;
use super::{AlertState, classify};
use crate::app::events::AlertNotification;
use crate::telemetry::TelemetrySample;

/// Outcome of one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub previous: AlertState,
    pub state: AlertState,
    pub notification: Option<AlertNotification>,
}

impl Evaluation {
    /// The state changed into a (different) alert condition.
    pub fn entered_alert(&self) -> bool {
        self.state.is_alert() && self.state != self.previous
    }

    pub fn changed(&self) -> bool {
        self.state != self.previous
    }
}

pub struct AlertEngine {
    state: AlertState,
    cooldown_ms: u64,
    last_notified_at: Option<u64>,
    /// Last raised condition and when it was announced.
    last_raised: Option<(AlertState, u64)>,
    /// A raise has been sent since the last return to Normal.
    streak_notified: bool,
    suppressed: u32,
}

impl AlertEngine {
    pub fn new(cooldown_ms: u64) -> Self {
        Self {
            state: AlertState::Normal,
            cooldown_ms,
            last_notified_at: None,
            last_raised: None,
            streak_notified: false,
            suppressed: 0,
        }
    }

    pub fn state(&self) -> AlertState {
        self.state
    }

    /// Raise notifications withheld by the cooldown so far.
    pub fn suppressed_count(&self) -> u32 {
        self.suppressed
    }

    pub fn evaluate(
        &mut self,
        sample: &TelemetrySample,
        thresholds: &AlertThresholds,
        now_ms: u64,
    ) -> Evaluation {
        let previous = self.state;
        let target = classify(sample, thresholds);
        if target == previous {
            return Evaluation {
                previous,
                state: target,
                notification: None,
            };
        }
        self.state = target;

        let notification = if target.is_alert() {
            warn!("Alert: {previous} -> {target}");
            if self.may_raise(target, now_ms) {
                self.streak_notified = true;
                self.last_notified_at = Some(now_ms);
                self.last_raised = Some((target, now_ms));
                Some(AlertNotification::raised(
                    target, sample, thresholds, now_ms,
                ))
            } else {
                self.suppressed = self.suppressed.saturating_add(1);
                debug!("Notification for {target} suppressed by cooldown");
                None
            }
        } else {
            info!("Alert condition cleared ({previous})");
            self.streak_notified = false;
            self.last_notified_at = Some(now_ms);
            Some(AlertNotification::cleared(previous, now_ms))
        };

        Evaluation {
            previous,
            state: target,
            notification,
        }
    }

    fn may_raise(&self, target: AlertState, now_ms: u64) -> bool {
        let cooled = |at: u64| now_ms.saturating_sub(at) >= self.cooldown_ms;
        if self.streak_notified {
            self.last_notified_at.is_none_or(cooled)
        } else {
            match self.last_raised {
                Some((state, at)) if state == target => cooled(at),
                _ => true,
            }
        }
    }
}
