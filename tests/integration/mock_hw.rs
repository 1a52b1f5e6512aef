//! Mock ports for integration tests.
//!
//! Records every outbound call so tests can assert on the full history
//! without touching GPIO, ADC or a network.

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use envlogger::app::events::AlertNotification;
use envlogger::app::ports::{
    ActuatorPort, Clock, CloudMirror, DisplayPort, LightSensorPort, NotificationSink,
};
use envlogger::config::SystemConfig;
use envlogger::display::DisplayFrame;
use envlogger::error::SinkError;
use envlogger::telemetry::TelemetrySample;

// ── Actuators ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCall {
    Indicator(bool),
    Alarm(bool),
}

#[derive(Default)]
pub struct MockOutputs {
    pub calls: Vec<ActuatorCall>,
}

#[allow(dead_code)]
impl MockOutputs {
    pub fn indicator(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                ActuatorCall::Indicator(on) => Some(*on),
                ActuatorCall::Alarm(_) => None,
            })
            .unwrap_or(false)
    }

    pub fn alarm(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                ActuatorCall::Alarm(on) => Some(*on),
                ActuatorCall::Indicator(_) => None,
            })
            .unwrap_or(false)
    }

    /// Off→on transitions of the alarm output.
    pub fn alarm_pulses(&self) -> usize {
        let mut on = false;
        let mut pulses = 0;
        for call in &self.calls {
            if let ActuatorCall::Alarm(level) = call {
                if *level && !on {
                    pulses += 1;
                }
                on = *level;
            }
        }
        pulses
    }
}

impl ActuatorPort for MockOutputs {
    fn set_indicator(&mut self, on: bool) {
        self.calls.push(ActuatorCall::Indicator(on));
    }

    fn set_alarm(&mut self, on: bool) {
        self.calls.push(ActuatorCall::Alarm(on));
    }
}

// ── Sensors ───────────────────────────────────────────────────

pub struct FixedLight(pub u16);

impl LightSensorPort for FixedLight {
    fn read_light_raw(&mut self) -> u16 {
        self.0
    }
}

// ── Time ──────────────────────────────────────────────────────

/// Manually advanced clock; clones share the same time.
#[derive(Clone, Default)]
pub struct ManualClock(Rc<Cell<u64>>);

#[allow(dead_code)]
impl ManualClock {
    pub fn set(&self, ms: u64) {
        self.0.set(ms);
    }

    pub fn advance(&self, ms: u64) {
        self.0.set(self.0.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.0.get()
    }
}

/// Returns immediately, totalling what was asked for.
#[derive(Default)]
pub struct NoDelay {
    pub total_ns: u64,
}

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}

// ── Sinks ─────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub sent: Vec<AlertNotification>,
}

impl NotificationSink for RecordingSink {
    fn notify(&mut self, notification: &AlertNotification) -> Result<(), SinkError> {
        self.sent.push(notification.clone());
        Ok(())
    }
}

/// Cloud mirror that fails the reports scripted in `failures`, in order.
#[derive(Default)]
pub struct ScriptedMirror {
    pub failures: VecDeque<Option<SinkError>>,
    pub delivered: Vec<TelemetrySample>,
}

impl CloudMirror for ScriptedMirror {
    fn report(&mut self, sample: &TelemetrySample) -> Result<(), SinkError> {
        if let Some(Some(e)) = self.failures.pop_front() {
            return Err(e);
        }
        self.delivered.push(*sample);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingDisplay {
    pub frames: Vec<DisplayFrame>,
    pub messages: Vec<String>,
}

impl DisplayPort for RecordingDisplay {
    fn show_frame(&mut self, frame: &DisplayFrame) {
        self.frames.push(frame.clone());
    }

    fn show_message(&mut self, message: &str) {
        self.messages.push(message.to_owned());
    }
}

/// Defaults with timeouts short enough for tests.
pub fn test_config() -> SystemConfig {
    SystemConfig {
        alert_peek_timeout_ms: 5,
        display_peek_timeout_ms: 5,
        forward_take_timeout_ms: 5,
        config_lock_timeout_ms: 20,
        ..SystemConfig::default()
    }
}
