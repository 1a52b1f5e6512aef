//! Runtime-mutable alert thresholds and the guard that serialises updates.
//!
//! Writers (remote parameter updates) and the reader (the alert monitor)
//! share one [`ThresholdGuard`]. Every acquisition is bounded: a writer that
//! cannot get the guard within its timeout gets
//! [`ConfigError::LockTimeout`] and the update is logged and dropped for
//! that attempt; the monitor keeps evaluating against the last thresholds it saw.

use std::sync::{Mutex, MutexGuard, TryLockError};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sensors::aqi::AQI_MAX;

/// Poll period while waiting for a contended guard.
const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertThresholds {
    /// Celsius
    pub temp_high: f32,
    /// Celsius
    pub temp_low: f32,
    /// %RH
    pub humidity_high: f32,
    /// %RH
    pub humidity_low: f32,
    /// Index above which air quality alerts
    pub aqi_threshold: u16,
    /// Gate for the audible alarm only; indicators are unaffected
    pub buzzer_enabled: bool,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            temp_high: 35.0,
            temp_low: 15.0,
            humidity_high: 80.0,
            humidity_low: 30.0,
            aqi_threshold: 150,
            buzzer_enabled: true,
        }
    }
}

impl AlertThresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let values = [
            self.temp_high,
            self.temp_low,
            self.humidity_high,
            self.humidity_low,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::Invalid("threshold is not a finite number"));
        }
        if self.temp_low >= self.temp_high {
            return Err(ConfigError::Invalid("temp_low must be below temp_high"));
        }
        if self.humidity_low >= self.humidity_high {
            return Err(ConfigError::Invalid(
                "humidity_low must be below humidity_high",
            ));
        }
        if self.humidity_low < 0.0 || self.humidity_high > 100.0 {
            return Err(ConfigError::Invalid("humidity thresholds outside 0..=100"));
        }
        if self.aqi_threshold > AQI_MAX {
            return Err(ConfigError::Invalid("aqi_threshold above 500"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Partial updates
// ---------------------------------------------------------------------------

/// A remote parameter update. Absent fields keep their current value.
///
/// Keys are the parameter names shown in the companion app.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdPatch {
    #[serde(rename = "Temp High Threshold", default, skip_serializing_if = "Option::is_none")]
    pub temp_high: Option<f32>,
    #[serde(rename = "Temp Low Threshold", default, skip_serializing_if = "Option::is_none")]
    pub temp_low: Option<f32>,
    #[serde(
        rename = "Humidity High Threshold",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub humidity_high: Option<f32>,
    #[serde(
        rename = "Humidity Low Threshold",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub humidity_low: Option<f32>,
    #[serde(rename = "AQI Threshold", default, skip_serializing_if = "Option::is_none")]
    pub aqi_threshold: Option<u16>,
    #[serde(rename = "Buzzer", default, skip_serializing_if = "Option::is_none")]
    pub buzzer_enabled: Option<bool>,
}

impl ThresholdPatch {
    /// Parse a JSON object of parameter name → value. Unknown keys are
    /// ignored so other devices' parameters can share one payload.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|_| ConfigError::Malformed)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// `base` with every present field replaced.
    pub fn merged_into(&self, base: AlertThresholds) -> AlertThresholds {
        AlertThresholds {
            temp_high: self.temp_high.unwrap_or(base.temp_high),
            temp_low: self.temp_low.unwrap_or(base.temp_low),
            humidity_high: self.humidity_high.unwrap_or(base.humidity_high),
            humidity_low: self.humidity_low.unwrap_or(base.humidity_low),
            aqi_threshold: self.aqi_threshold.unwrap_or(base.aqi_threshold),
            buzzer_enabled: self.buzzer_enabled.unwrap_or(base.buzzer_enabled),
        }
    }
}

// ---------------------------------------------------------------------------
// Guard
// ---------------------------------------------------------------------------

/// Result of a successful apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Changed,
    Unchanged,
}

/// Single-writer guard around the live thresholds.
pub struct ThresholdGuard {
    current: Mutex<AlertThresholds>,
    lock_timeout: Duration,
}

impl ThresholdGuard {
    pub fn new(initial: AlertThresholds, lock_timeout: Duration) -> Self {
        Self {
            current: Mutex::new(initial),
            lock_timeout,
        }
    }

    /// Replace the whole threshold set. Validation happens before the guard
    /// is taken; an identical set is accepted without touching anything.
    pub fn apply_thresholds(&self, new: AlertThresholds) -> Result<ApplyOutcome, ConfigError> {
        new.validate()?;
        let mut current = self.lock().inspect_err(|e| {
            warn!(
                "Threshold update discarded ({e}): temp {:.1}..{:.1}C | humidity {:.1}..{:.1}% | aqi>{} | buzzer={}",
                new.temp_low,
                new.temp_high,
                new.humidity_low,
                new.humidity_high,
                new.aqi_threshold,
                new.buzzer_enabled
            );
        })?;
        Ok(Self::store(&mut current, new))
    }

    /// Merge a partial update under a single guard acquisition.
    pub fn apply_patch(&self, patch: &ThresholdPatch) -> Result<ApplyOutcome, ConfigError> {
        if patch.is_empty() {
            return Ok(ApplyOutcome::Unchanged);
        }
        let mut current = self
            .lock()
            .inspect_err(|e| warn!("Threshold patch discarded ({e}): {patch:?}"))?;
        let merged = patch.merged_into(*current);
        merged.validate()?;
        Ok(Self::store(&mut current, merged))
    }

    /// Copy of the live thresholds.
    pub fn snapshot(&self) -> Result<AlertThresholds, ConfigError> {
        self.with_locked(|t| *t)
    }

    /// Run `f` with the guard held.
    pub fn with_locked<R>(&self, f: impl FnOnce(&AlertThresholds) -> R) -> Result<R, ConfigError> {
        let current = self.lock()?;
        Ok(f(&current))
    }

    fn store(current: &mut AlertThresholds, new: AlertThresholds) -> ApplyOutcome {
        if *current == new {
            debug!("Thresholds unchanged");
            return ApplyOutcome::Unchanged;
        }
        *current = new;
        info!(
            "Thresholds updated: temp {:.1}..{:.1}C | humidity {:.1}..{:.1}% | aqi>{} | buzzer={}",
            new.temp_low,
            new.temp_high,
            new.humidity_low,
            new.humidity_high,
            new.aqi_threshold,
            new.buzzer_enabled
        );
        ApplyOutcome::Changed
    }

    fn lock(&self) -> Result<MutexGuard<'_, AlertThresholds>, ConfigError> {
        let deadline = Instant::now() + self.lock_timeout;
        loop {
            match self.current.try_lock() {
                Ok(guard) => return Ok(guard),
                // Thresholds are plain data; a panicking holder cannot leave
                // them half-written.
                Err(TryLockError::Poisoned(poisoned)) => return Ok(poisoned.into_inner()),
                Err(TryLockError::WouldBlock) => {
                    if Instant::now() >= deadline {
                        return Err(ConfigError::LockTimeout);
                    }
                    std::thread::sleep(LOCK_POLL_INTERVAL);
                }
            }
        }
    }
}
