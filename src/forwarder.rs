//! Cloud forwarder: the single destructive telemetry consumer.
//!
//! Takes every sample in publication order and reports it to the
//! [`CloudMirror`]. Delivery is at-most-once: a failed report is logged and
//! the sample is gone, so a down link never backs up into the channel
//! beyond its fixed depth.

use std::time::Duration;

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use crate::app::ports::CloudMirror;
use crate::config::SystemConfig;
use crate::error::ChannelError;
use crate::sensors::aqi::AqiCategory;
use crate::telemetry::{TelemetryDrain, TelemetrySample};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForwarderStats {
    pub delivered: u32,
    pub failed: u32,
}

/// Delivered samples per coarse air-quality band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AqiTally {
    /// AQI ≤ 50
    pub good: u32,
    /// 50 < AQI ≤ 100
    pub moderate: u32,
    /// AQI > 100
    pub unhealthy: u32,
}

impl AqiTally {
    fn record(&mut self, aqi: u16) {
        match aqi {
            0..=50 => self.good += 1,
            51..=100 => self.moderate += 1,
            _ => self.unhealthy += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ForwardOutcome {
    Delivered(TelemetrySample),
    Failed(TelemetrySample),
    Idle,
}

pub struct CloudForwarder<M, D> {
    drain: TelemetryDrain,
    mirror: M,
    delay: D,
    take_timeout: Duration,
    pace_ms: u32,
    start_delay_ms: u32,
    stats: ForwarderStats,
    tally: AqiTally,
}

impl<M: CloudMirror, D: DelayNs> CloudForwarder<M, D> {
    pub fn new(drain: TelemetryDrain, mirror: M, delay: D, config: &SystemConfig) -> Self {
        Self {
            drain,
            mirror,
            delay,
            take_timeout: Duration::from_millis(u64::from(config.forward_take_timeout_ms)),
            pace_ms: config.forward_pace_ms,
            start_delay_ms: config.forward_start_delay_ms,
            stats: ForwarderStats::default(),
            tally: AqiTally::default(),
        }
    }

    pub fn stats(&self) -> ForwarderStats {
        self.stats
    }

    pub fn tally(&self) -> AqiTally {
        self.tally
    }

    pub fn mirror(&self) -> &M {
        &self.mirror
    }

    /// Take at most one sample and report it.
    pub fn forward_once(&mut self) -> ForwardOutcome {
        let sample = match self.drain.take(self.take_timeout) {
            Ok(sample) => sample,
            Err(ChannelError::Timeout | ChannelError::Full) => {
                debug!("Forwarder: nothing to send");
                return ForwardOutcome::Idle;
            }
        };

        let outcome = match self.mirror.report(&sample) {
            Ok(()) => {
                self.stats.delivered += 1;
                self.tally.record(sample.air_quality_index());
                info!(
                    "Reported {:.1}C {:.1}% aqi={} ({}) | good={} moderate={} unhealthy={}",
                    sample.temperature(),
                    sample.humidity(),
                    sample.air_quality_index(),
                    AqiCategory::from_index(sample.air_quality_index()).label(),
                    self.tally.good,
                    self.tally.moderate,
                    self.tally.unhealthy
                );
                ForwardOutcome::Delivered(sample)
            }
            Err(e) => {
                self.stats.failed += 1;
                warn!(
                    "Report of sample @{}ms failed: {e}; discarded",
                    sample.timestamp_ms()
                );
                ForwardOutcome::Failed(sample)
            }
        };

        self.delay.delay_ms(self.pace_ms);
        outcome
    }

    /// Task body. Never returns.
    pub fn run(mut self) -> ! {
        info!("Cloud forwarder starting in {}ms", self.start_delay_ms);
        self.delay.delay_ms(self.start_delay_ms);
        loop {
            self.forward_once();
        }
    }
}
