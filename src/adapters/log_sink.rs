//! Log-backed outbound adapters.
//!
//! Cloud mirror, notification sink and display all write to the ESP-IDF
//! logger (UART / USB-CDC in production). A network or panel driver would
//! implement the same port traits.

use log::{info, warn};
use serde::Serialize;

use crate::app::events::AlertNotification;
use crate::app::ports::{CloudMirror, DisplayPort, NotificationSink};
use crate::display::DisplayFrame;
use crate::error::SinkError;
use crate::sensors::aqi::AqiCategory;
use crate::telemetry::TelemetrySample;

/// Logs every notification as `NOTIFY | <title> | <message>`.
#[derive(Debug, Default)]
pub struct LogNotificationSink {
    sent: u32,
}

impl LogNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> u32 {
        self.sent
    }
}

impl NotificationSink for LogNotificationSink {
    fn notify(&mut self, notification: &AlertNotification) -> Result<(), SinkError> {
        self.sent += 1;
        info!(
            "NOTIFY | {} | {} @{}ms",
            notification.title(),
            notification.message,
            notification.at_ms
        );
        Ok(())
    }
}

/// Cloud variables as they are mirrored upstream.
#[derive(Debug, Serialize)]
pub struct CloudPayload {
    pub temperature: f32,
    pub humidity: f32,
    pub air_quality_index: u16,
    pub aqi_status: &'static str,
    pub timestamp_ms: u64,
}

impl From<&TelemetrySample> for CloudPayload {
    fn from(sample: &TelemetrySample) -> Self {
        Self {
            temperature: sample.temperature(),
            humidity: sample.humidity(),
            air_quality_index: sample.air_quality_index(),
            aqi_status: AqiCategory::from_index(sample.air_quality_index()).label(),
            timestamp_ms: sample.timestamp_ms(),
        }
    }
}

/// Serialises each sample to JSON and logs it. Reports `NotConnected`
/// while the link is marked down.
#[derive(Debug)]
pub struct LogCloudMirror {
    connected: bool,
    last_payload: Option<String>,
}

impl Default for LogCloudMirror {
    fn default() -> Self {
        Self::new()
    }
}

impl LogCloudMirror {
    pub fn new() -> Self {
        Self {
            connected: true,
            last_payload: None,
        }
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    pub fn last_payload(&self) -> Option<&str> {
        self.last_payload.as_deref()
    }
}

impl CloudMirror for LogCloudMirror {
    fn report(&mut self, sample: &TelemetrySample) -> Result<(), SinkError> {
        if !self.connected {
            return Err(SinkError::NotConnected);
        }
        let payload = serde_json::to_string(&CloudPayload::from(sample)).map_err(|e| {
            warn!("CLOUD | payload encoding failed: {e}");
            SinkError::Rejected
        })?;
        info!("CLOUD | {payload}");
        self.last_payload = Some(payload);
        Ok(())
    }
}

/// Logs each rendered frame on one line.
#[derive(Debug, Default)]
pub struct LogDisplay {
    frames: u32,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> u32 {
        self.frames
    }
}

impl DisplayPort for LogDisplay {
    fn show_frame(&mut self, frame: &DisplayFrame) {
        self.frames += 1;
        let [title, temp, humid, aqi] = &frame.lines;
        info!("DISPLAY | {title} | {temp} | {humid} | {aqi}");
    }

    fn show_message(&mut self, message: &str) {
        warn!("DISPLAY | {message}");
    }
}
