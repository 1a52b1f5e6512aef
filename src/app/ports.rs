//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ task loops (acquisition, alerting, forwarding, display)
//! ```
//!
//! Driven adapters (GPIO, ADC, cloud, display) implement these traits. The
//! task loops consume them via generics, so the domain core never touches
//! hardware directly and every loop runs on the host under test.

use crate::app::events::AlertNotification;
use crate::display::DisplayFrame;
use crate::error::{DecodeError, SinkError};
use crate::sensors::SensorReading;
use crate::sensors::dht11::TimingBudget;
use crate::telemetry::TelemetrySample;

// ───────────────────────────────────────────────────────────────
// Sensor ports (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// A temperature/humidity source that is read with one bounded decode.
pub trait ClimateSensor {
    /// One complete decode attempt. Never blocks beyond the sum of the
    /// budget's per-phase bounds.
    fn decode(&mut self, budget: &TimingBudget) -> Result<SensorReading, DecodeError>;
}

/// Raw ambient-light ADC channel.
pub trait LightSensorPort {
    /// One blocking 12-bit sample (0–4095).
    fn read_light_raw(&mut self) -> u16;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Binary alert outputs. Both calls are idempotent.
pub trait ActuatorPort {
    /// Alert indicator (on = alert active).
    fn set_indicator(&mut self, on: bool);

    /// Audible alarm.
    fn set_alarm(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Time
// ───────────────────────────────────────────────────────────────

/// Monotonic milliseconds since boot.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Outbound sinks (driven adapter: domain → cloud / notification / screen)
// ───────────────────────────────────────────────────────────────

/// Upstream telemetry mirror. Called only from the forwarding path;
/// a failed report is not retried.
pub trait CloudMirror {
    fn report(&mut self, sample: &TelemetrySample) -> Result<(), SinkError>;
}

/// Receives alert raise/clear notifications.
pub trait NotificationSink {
    fn notify(&mut self, notification: &AlertNotification) -> Result<(), SinkError>;
}

/// Local status screen. Rendering is the adapter's business.
pub trait DisplayPort {
    fn show_frame(&mut self, frame: &DisplayFrame);

    /// Replace the screen with a single status message.
    fn show_message(&mut self, message: &str);
}
