//! Alerting: threshold classification, notification debouncing, and the
//! periodic monitor task that drives the indicator outputs.
//!
//! ```text
//!   TelemetryObserver ──peek──▶ AlertMonitor ──▶ AlertEngine (state + cooldown)
//!                                   │                  │
//!                                   ▼                  ▼
//!                              Annunciator      NotificationSink
//! ```

pub mod engine;
pub mod monitor;
pub mod thresholds;

use core::fmt;

use crate::telemetry::TelemetrySample;
use thresholds::AlertThresholds;

/// Current alert condition. At most one is active; see [`classify`] for
/// the priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlertState {
    #[default]
    Normal,
    TempHigh,
    TempLow,
    HumidityHigh,
    HumidityLow,
    AqiHigh,
}

impl AlertState {
    pub fn is_alert(self) -> bool {
        self != Self::Normal
    }
}

impl fmt::Display for AlertState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::TempHigh => write!(f, "high temperature"),
            Self::TempLow => write!(f, "low temperature"),
            Self::HumidityHigh => write!(f, "high humidity"),
            Self::HumidityLow => write!(f, "low humidity"),
            Self::AqiHigh => write!(f, "poor air quality"),
        }
    }
}

/// First violated threshold, checked in the order temperature-high,
/// temperature-low, humidity-high, humidity-low, AQI. Comparisons are
/// strict: a value equal to its threshold does not alert.
pub fn classify(sample: &TelemetrySample, thresholds: &AlertThresholds) -> AlertState {
    let t = sample.temperature();
    let h = sample.humidity();
    if t > thresholds.temp_high {
        AlertState::TempHigh
    } else if t < thresholds.temp_low {
        AlertState::TempLow
    } else if h > thresholds.humidity_high {
        AlertState::HumidityHigh
    } else if h < thresholds.humidity_low {
        AlertState::HumidityLow
    } else if sample.air_quality_index() > thresholds.aqi_threshold {
        AlertState::AqiHigh
    } else {
        AlertState::Normal
    }
}
