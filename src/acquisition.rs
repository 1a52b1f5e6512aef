//! Acquisition loop: DHT11 + light → air-quality estimate → telemetry.
//!
//! One cycle every `sensor_read_interval_ms`, on a drift-corrected
//! [`Cadence`]:
//!
//! 1. decode the DHT11, up to `dht_max_retries` attempts with
//!    `dht_retry_delay_ms` between them; if all fail, reuse the last valid
//!    reading (stale but never garbage);
//! 2. average `light_sample_count` ADC samples;
//! 3. compute the composite AQI;
//! 4. publish. A full channel drops the sample (counted) and the cycle
//!    carries on.

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use crate::app::ports::{ClimateSensor, Clock, LightSensorPort};
use crate::config::SystemConfig;
use crate::scheduler::Cadence;
use crate::sensors::SensorReading;
use crate::sensors::aqi::{NoiseSource, compute_aqi};
use crate::sensors::dht11::TimingBudget;
use crate::sensors::light;
use crate::telemetry::{TelemetryPublisher, TelemetrySample};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AcquisitionStats {
    pub cycles: u32,
    /// Individual failed decode attempts.
    pub decode_failures: u32,
    /// Cycles that published the previous reading.
    pub stale_cycles: u32,
    /// Samples the channel rejected.
    pub dropped: u32,
}

/// What one cycle produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleReport {
    pub sample: TelemetrySample,
    pub light_level: u16,
    /// The temperature/humidity came from this cycle's decode.
    pub fresh: bool,
    pub attempts: u8,
    pub published: bool,
}

pub struct AcquisitionLoop<S, L, N, C, D> {
    sensor: S,
    light: L,
    noise: N,
    clock: C,
    delay: D,
    publisher: TelemetryPublisher,
    budget: TimingBudget,
    max_attempts: u8,
    retry_delay_ms: u32,
    light_samples: u8,
    cadence: Cadence,
    last_good: SensorReading,
    stats: AcquisitionStats,
}

impl<S, L, N, C, D> AcquisitionLoop<S, L, N, C, D>
where
    S: ClimateSensor,
    L: LightSensorPort,
    N: NoiseSource,
    C: Clock,
    D: DelayNs,
{
    pub fn new(
        sensor: S,
        light: L,
        noise: N,
        clock: C,
        delay: D,
        publisher: TelemetryPublisher,
        config: &SystemConfig,
    ) -> Self {
        Self {
            sensor,
            light,
            noise,
            clock,
            delay,
            publisher,
            budget: TimingBudget::DHT11,
            max_attempts: config.dht_max_retries.max(1),
            retry_delay_ms: config.dht_retry_delay_ms,
            light_samples: config.light_sample_count,
            cadence: Cadence::new(u64::from(config.sensor_read_interval_ms)),
            // Published until the first decode succeeds.
            last_good: SensorReading {
                temperature: config.fallback_temperature_c,
                humidity: config.fallback_humidity_pct,
            },
            stats: AcquisitionStats::default(),
        }
    }

    pub fn stats(&self) -> AcquisitionStats {
        self.stats
    }

    pub fn last_good(&self) -> SensorReading {
        self.last_good
    }

    /// Run one acquisition cycle. Never fails.
    pub fn run_cycle(&mut self) -> CycleReport {
        self.stats.cycles = self.stats.cycles.wrapping_add(1);

        let (fresh, attempts) = self.read_climate();
        if !fresh {
            self.stats.stale_cycles += 1;
            warn!(
                "DHT11: {attempts} attempts failed, reusing {:.1}C / {:.1}%",
                self.last_good.temperature, self.last_good.humidity
            );
        }
        let reading = self.last_good;

        let light_level = light::read_averaged(&mut self.light, self.light_samples);
        let aqi = compute_aqi(
            reading.temperature,
            reading.humidity,
            light_level,
            self.noise.perturbation(),
        );
        let sample = TelemetrySample::new(
            reading.temperature,
            reading.humidity,
            aqi,
            self.clock.now_ms(),
        );

        let published = self.publisher.publish(sample).is_ok();
        if published {
            info!(
                "Sample: {:.1}C {:.1}% light={}/4095 aqi={}",
                reading.temperature, reading.humidity, light_level, aqi
            );
        } else {
            self.stats.dropped += 1;
        }

        CycleReport {
            sample,
            light_level,
            fresh,
            attempts,
            published,
        }
    }

    /// Task body. Never returns.
    pub fn run(mut self) -> ! {
        info!(
            "Acquisition started (every {}ms, {} decode attempts)",
            self.cadence.period_ms(),
            self.max_attempts
        );
        loop {
            self.run_cycle();
            self.cadence.wait(&self.clock, &mut self.delay);
        }
    }

    /// Returns whether `last_good` was refreshed, and the attempts used.
    fn read_climate(&mut self) -> (bool, u8) {
        for attempt in 1..=self.max_attempts {
            match self.sensor.decode(&self.budget) {
                Ok(reading) => {
                    debug!("DHT11: attempt {attempt} ok");
                    self.last_good = reading;
                    return (true, attempt);
                }
                Err(e) => {
                    self.stats.decode_failures += 1;
                    warn!("DHT11: attempt {attempt}/{} failed: {e}", self.max_attempts);
                    if attempt < self.max_attempts {
                        self.delay.delay_ms(self.retry_delay_ms);
                    }
                }
            }
        }
        (false, self.max_attempts)
    }
}
