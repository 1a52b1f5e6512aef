//! System configuration parameters
//!
//! All tunable timing and policy parameters for the EnvLogger firmware.
//! Alert thresholds are runtime-mutable and live behind the
//! [`ThresholdGuard`](crate::alert::thresholds::ThresholdGuard); the value
//! here only seeds it at boot.

use serde::{Deserialize, Serialize};

use crate::alert::thresholds::AlertThresholds;
use crate::error::ConfigError;
use crate::pins;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Acquisition ---
    /// Acquisition cadence (milliseconds, drift-corrected)
    pub sensor_read_interval_ms: u32,
    /// Decode attempts per acquisition cycle
    pub dht_max_retries: u8,
    /// Pause between decode attempts (milliseconds)
    pub dht_retry_delay_ms: u32,
    /// ADC samples averaged per light reading
    pub light_sample_count: u8,
    /// ADC1 channel of the light sensor, used for init and reads alike
    pub light_adc_channel: u32,
    /// Temperature published until the first valid decode (Celsius)
    pub fallback_temperature_c: f32,
    /// Humidity published until the first valid decode (%RH)
    pub fallback_humidity_pct: f32,

    // --- Alerting ---
    /// Alert evaluation interval (milliseconds)
    pub alert_check_interval_ms: u32,
    /// How long the alert task waits on a peek (milliseconds)
    pub alert_peek_timeout_ms: u32,
    /// Minimum time between alert notifications (milliseconds)
    pub notification_cooldown_ms: u32,
    /// Pulses in the alert-entry attention pattern
    pub attention_pulses: u8,
    /// On and off time of each attention pulse (milliseconds)
    pub attention_pulse_ms: u32,
    /// Thresholds applied at boot
    pub thresholds: AlertThresholds,
    /// Bound on acquiring the threshold guard (milliseconds)
    pub config_lock_timeout_ms: u32,

    // --- Consumers ---
    /// Display refresh interval (milliseconds)
    pub display_update_interval_ms: u32,
    /// How long the display waits on a peek (milliseconds)
    pub display_peek_timeout_ms: u32,
    /// Polls without a new sample before the display reports sensor loss
    pub display_stale_polls: u8,
    /// Delay before the cloud forwarder starts draining (milliseconds)
    pub forward_start_delay_ms: u32,
    /// How long the forwarder waits on a take (milliseconds)
    pub forward_take_timeout_ms: u32,
    /// Pause after each forwarded sample (milliseconds)
    pub forward_pace_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Acquisition
            sensor_read_interval_ms: 10_000, // 0.1 Hz
            dht_max_retries: 3,
            dht_retry_delay_ms: 500,
            light_sample_count: 10,
            light_adc_channel: pins::LDR_ADC_CHANNEL,
            fallback_temperature_c: 25.0,
            fallback_humidity_pct: 50.0,

            // Alerting
            alert_check_interval_ms: 2_000,
            alert_peek_timeout_ms: 1_000,
            notification_cooldown_ms: 60_000,
            attention_pulses: 3,
            attention_pulse_ms: 200,
            thresholds: AlertThresholds::default(),
            config_lock_timeout_ms: 1_000,

            // Consumers
            display_update_interval_ms: 2_000,
            display_peek_timeout_ms: 100,
            display_stale_polls: 5,
            forward_start_delay_ms: 5_000,
            forward_take_timeout_ms: 5_000,
            forward_pace_ms: 500,
        }
    }
}

impl SystemConfig {
    /// Reject configurations that would stall a task or never alert.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sensor_read_interval_ms == 0
            || self.alert_check_interval_ms == 0
            || self.display_update_interval_ms == 0
        {
            return Err(ConfigError::Invalid("task interval must be non-zero"));
        }
        if self.dht_max_retries == 0 {
            return Err(ConfigError::Invalid("at least one decode attempt required"));
        }
        if self.light_sample_count == 0 {
            return Err(ConfigError::Invalid("at least one light sample required"));
        }
        if !(0.0..=100.0).contains(&self.fallback_humidity_pct) {
            return Err(ConfigError::Invalid("fallback humidity outside 0..=100"));
        }
        self.thresholds.validate()
    }
}
