//! Display observer.
//!
//! Peeks at the telemetry head on its own cadence and renders each new
//! sample as a four-line [`DisplayFrame`]. Sensor loss is detected here,
//! not in the acquisition path: after more than `display_stale_polls`
//! consecutive polls without a new sample the screen switches to
//! "No sensor data" until one arrives.

use core::fmt::Write;
use std::time::Duration;

use embedded_hal::delay::DelayNs;
use heapless::String;
use log::{debug, info, warn};

use crate::app::ports::{Clock, DisplayPort};
use crate::config::SystemConfig;
use crate::scheduler::Cadence;
use crate::sensors::aqi::AqiCategory;
use crate::shared::SharedState;
use crate::telemetry::TelemetrySample;

/// Line buffer capacity; text past it is cut off.
pub const LINE_CAPACITY: usize = 24;
pub const NO_DATA_MESSAGE: &str = "No sensor data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayFrame {
    pub lines: [String<LINE_CAPACITY>; 4],
}

impl DisplayFrame {
    pub fn from_sample(sample: &TelemetrySample) -> Self {
        let mut lines: [String<LINE_CAPACITY>; 4] = Default::default();
        let aqi = sample.air_quality_index();
        // Overflow cuts the line short.
        let _ = write!(lines[0], "Env. Monitor");
        let _ = write!(lines[1], "Temp: {:.1} C", sample.temperature());
        let _ = write!(lines[2], "Humid: {:.1}%", sample.humidity());
        let _ = write!(
            lines[3],
            "AQI: {} {}",
            aqi,
            AqiCategory::from_index(aqi).short_label()
        );
        Self { lines }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayUpdate {
    Rendered,
    NoData,
    Unchanged,
}

pub struct DisplayObserver<P, C> {
    shared: SharedState,
    port: P,
    clock: C,
    cadence: Cadence,
    peek_timeout: Duration,
    stale_after: u32,
    polls_without_new: u32,
    last_shown_ms: Option<u64>,
    reporting_loss: bool,
}

impl<P: DisplayPort, C: Clock> DisplayObserver<P, C> {
    pub fn new(shared: SharedState, port: P, clock: C, config: &SystemConfig) -> Self {
        Self {
            shared,
            port,
            clock,
            cadence: Cadence::new(u64::from(config.display_update_interval_ms)),
            peek_timeout: Duration::from_millis(u64::from(config.display_peek_timeout_ms)),
            stale_after: u32::from(config.display_stale_polls),
            polls_without_new: 0,
            last_shown_ms: None,
            reporting_loss: false,
        }
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn poll(&mut self) -> DisplayUpdate {
        if let Ok(sample) = self.shared.telemetry.peek(self.peek_timeout) {
            if Some(sample.timestamp_ms()) != self.last_shown_ms {
                self.port.show_frame(&DisplayFrame::from_sample(&sample));
                self.last_shown_ms = Some(sample.timestamp_ms());
                self.polls_without_new = 0;
                if self.reporting_loss {
                    info!("Display: sensor data back");
                    self.reporting_loss = false;
                }
                return DisplayUpdate::Rendered;
            }
        }

        self.polls_without_new = self.polls_without_new.saturating_add(1);
        if self.polls_without_new > self.stale_after && !self.reporting_loss {
            warn!(
                "Display: no new sample for {} polls",
                self.polls_without_new
            );
            self.port.show_message(NO_DATA_MESSAGE);
            self.reporting_loss = true;
            return DisplayUpdate::NoData;
        }
        debug!("Display: {} polls without a new sample", self.polls_without_new);
        DisplayUpdate::Unchanged
    }

    /// Task body. Never returns.
    pub fn run(mut self, mut delay: impl DelayNs) -> ! {
        info!("Display observer started (every {}ms)", self.cadence.period_ms());
        loop {
            self.poll();
            self.cadence.wait(&self.clock, &mut delay);
        }
    }
}
