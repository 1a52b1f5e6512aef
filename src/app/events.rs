//! Outbound alert notifications.
//!
//! The [`AlertEngine`](crate::alert::engine::AlertEngine) produces these;
//! a [`NotificationSink`](super::ports::NotificationSink) adapter decides
//! where they go (cloud status parameter, serial log, ...).

use core::fmt::Write;

use heapless::String;

use crate::alert::AlertState;
use crate::alert::thresholds::AlertThresholds;
use crate::telemetry::TelemetrySample;

/// Capacity of a notification message, in bytes.
pub const MESSAGE_CAPACITY: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// A new alert condition became active.
    Raised(AlertState),
    /// The active condition cleared; carries the state that ended.
    Cleared(AlertState),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlertNotification {
    pub kind: NotificationKind,
    pub message: String<MESSAGE_CAPACITY>,
    /// Monotonic time the notification was produced.
    pub at_ms: u64,
}

impl AlertNotification {
    pub fn raised(
        state: AlertState,
        sample: &TelemetrySample,
        thresholds: &AlertThresholds,
        at_ms: u64,
    ) -> Self {
        let mut message = String::new();
        // Overflow only truncates the message.
        let _ = match state {
            AlertState::TempHigh => write!(
                message,
                "High Temperature Detected: {:.1}°C (Threshold: {:.1}°C)",
                sample.temperature(),
                thresholds.temp_high
            ),
            AlertState::TempLow => write!(
                message,
                "Low Temperature Detected: {:.1}°C (Threshold: {:.1}°C)",
                sample.temperature(),
                thresholds.temp_low
            ),
            AlertState::HumidityHigh => write!(
                message,
                "High Humidity Detected: {:.1}% (Threshold: {:.1}%)",
                sample.humidity(),
                thresholds.humidity_high
            ),
            AlertState::HumidityLow => write!(
                message,
                "Low Humidity Detected: {:.1}% (Threshold: {:.1}%)",
                sample.humidity(),
                thresholds.humidity_low
            ),
            AlertState::AqiHigh => write!(
                message,
                "Poor Air Quality: AQI={} (Threshold: {})",
                sample.air_quality_index(),
                thresholds.aqi_threshold
            ),
            AlertState::Normal => write!(message, "Normal"),
        };
        Self {
            kind: NotificationKind::Raised(state),
            message,
            at_ms,
        }
    }

    pub fn cleared(previous: AlertState, at_ms: u64) -> Self {
        let mut message = String::new();
        let _ = write!(message, "Alert condition cleared ({previous})");
        Self {
            kind: NotificationKind::Cleared(previous),
            message,
            at_ms,
        }
    }

    pub fn title(&self) -> &'static str {
        match self.kind {
            NotificationKind::Raised(_) => "Environmental Alert!",
            NotificationKind::Cleared(_) => "Normal",
        }
    }

    pub fn is_cleared(&self) -> bool {
        matches!(self.kind, NotificationKind::Cleared(_))
    }
}
