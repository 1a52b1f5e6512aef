//! Alert annunciator: indicator LED plus buzzer.
//!
//! Two layers, applied by the alert monitor every cycle:
//!
//! | Layer      | When                        | Output                          |
//! |------------|-----------------------------|---------------------------------|
//! | Attention  | once, on entering an alert  | N buzzer pulses (if enabled)    |
//! | Steady     | every cycle                 | indicator = alert, buzzer off   |
//!
//! The attention pattern is finite and blocking (3 × 200 ms on/off by
//! default); the steady layer is idempotent, so re-applying it every cycle
//! keeps the outputs in step with the current state even if something
//! else touched the pins.

use embedded_hal::delay::DelayNs;
use log::debug;

use crate::alert::AlertState;
use crate::app::ports::ActuatorPort;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttentionPattern {
    pub pulses: u8,
    /// On time and off time of each pulse.
    pub pulse_ms: u32,
}

impl Default for AttentionPattern {
    fn default() -> Self {
        Self {
            pulses: 3,
            pulse_ms: 200,
        }
    }
}

pub struct Annunciator<A, D> {
    outputs: A,
    delay: D,
    pattern: AttentionPattern,
    /// Indicator level last applied, for transition logging.
    indicating: Option<bool>,
}

impl<A: ActuatorPort, D: DelayNs> Annunciator<A, D> {
    pub fn new(outputs: A, delay: D, pattern: AttentionPattern) -> Self {
        Self {
            outputs,
            delay,
            pattern,
            indicating: None,
        }
    }

    /// Light the indicator and, unless the buzzer is disabled, play the
    /// attention pattern. Returns with the buzzer off.
    pub fn signal_entry(&mut self, buzzer_enabled: bool) {
        self.outputs.set_indicator(true);
        if !buzzer_enabled {
            debug!("Buzzer disabled, attention pattern skipped");
            return;
        }
        for _ in 0..self.pattern.pulses {
            self.outputs.set_alarm(true);
            self.delay.delay_ms(self.pattern.pulse_ms);
            self.outputs.set_alarm(false);
            self.delay.delay_ms(self.pattern.pulse_ms);
        }
    }

    /// Drive the steady outputs for `state`.
    pub fn hold(&mut self, state: AlertState) {
        let alert = state.is_alert();
        self.outputs.set_indicator(alert);
        self.outputs.set_alarm(false);
        if self.indicating != Some(alert) {
            debug!("Indicator {}", if alert { "ALERT" } else { "normal" });
            self.indicating = Some(alert);
        }
    }

    pub fn outputs(&self) -> &A {
        &self.outputs
    }
}
