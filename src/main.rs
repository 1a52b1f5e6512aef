//! EnvLogger firmware entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       Adapters (outer ring)                      │
//! │  OpenDrainLine  AnalogLight  IndicatorPanel  MonotonicClock      │
//! │  LogCloudMirror  LogNotificationSink  LogDisplay  EspRng         │
//! │                                                                  │
//! │  ───────────────────── Port Trait Boundary ───────────────────   │
//! │                                                                  │
//! │  sensor (5) ─▶ telemetry channel ─▶ cloud (4)                    │
//! │                       ├─▶ alert (6)                              │
//! │                       └─▶ display (3)                            │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use anyhow::Result;
use esp_idf_hal::delay::{Ets, FreeRtos};
use log::{error, info, warn};

use envlogger::acquisition::AcquisitionLoop;
use envlogger::adapters::hardware::{AnalogLight, IndicatorPanel};
use envlogger::adapters::log_sink::{LogCloudMirror, LogDisplay, LogNotificationSink};
use envlogger::adapters::rng::platform_rng;
use envlogger::adapters::time::MonotonicClock;
use envlogger::alert::monitor::AlertMonitor;
use envlogger::config::SystemConfig;
use envlogger::display::DisplayObserver;
use envlogger::drivers::annunciator::{Annunciator, AttentionPattern};
use envlogger::drivers::gpio_line::OpenDrainLine;
use envlogger::drivers::hw_init;
use envlogger::drivers::task_pin::spawn_task;
use envlogger::error::Error;
use envlogger::forwarder::CloudForwarder;
use envlogger::pins;
use envlogger::sensors::aqi::RngNoise;
use envlogger::sensors::dht11::Dht11;
use envlogger::shared::SharedState;

// ── Task layout ───────────────────────────────────────────────

const ALERT_PRIORITY: u8 = 6;
const SENSOR_PRIORITY: u8 = 5;
const CLOUD_PRIORITY: u8 = 4;
const DISPLAY_PRIORITY: u8 = 3;
const TASK_STACK_KB: usize = 4;

const STATS_INTERVAL_MS: u32 = 60_000;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("EnvLogger v{} starting", env!("CARGO_PKG_VERSION"));

    // ── 2. Configuration ──────────────────────────────────────
    let config = SystemConfig::default();
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {e}");
        return Err(Error::from(e).into());
    }

    // ── 3. Peripherals ────────────────────────────────────────
    if let Err(e) = hw_init::init_peripherals(config.light_adc_channel) {
        error!("HAL init failed: {e}");
        return Err(e.into());
    }

    // ── 4. Shared state ───────────────────────────────────────
    let (shared, publisher, drain) = SharedState::new(
        config.thresholds,
        Duration::from_millis(u64::from(config.config_lock_timeout_ms)),
    );

    // ── 5. Tasks ──────────────────────────────────────────────
    {
        let shared = shared.clone();
        let config = config.clone();
        spawn_task(ALERT_PRIORITY, TASK_STACK_KB, "alert\0", move || {
            let annunciator = Annunciator::new(
                IndicatorPanel::new(),
                FreeRtos,
                AttentionPattern {
                    pulses: config.attention_pulses,
                    pulse_ms: config.attention_pulse_ms,
                },
            );
            AlertMonitor::new(
                shared,
                annunciator,
                LogNotificationSink::new(),
                MonotonicClock::new(),
                &config,
            )
            .run(FreeRtos)
        })?;
    }

    {
        let config = config.clone();
        spawn_task(SENSOR_PRIORITY, TASK_STACK_KB, "sensor\0", move || {
            let dht = Dht11::new(OpenDrainLine::new(pins::DHT11_GPIO), Ets);
            AcquisitionLoop::new(
                dht,
                AnalogLight::new(config.light_adc_channel),
                RngNoise(platform_rng()),
                MonotonicClock::new(),
                FreeRtos,
                publisher,
                &config,
            )
            .run()
        })?;
    }

    {
        let config = config.clone();
        spawn_task(CLOUD_PRIORITY, TASK_STACK_KB, "cloud\0", move || {
            CloudForwarder::new(drain, LogCloudMirror::new(), FreeRtos, &config).run()
        })?;
    }

    {
        let shared = shared.clone();
        let config = config.clone();
        spawn_task(DISPLAY_PRIORITY, TASK_STACK_KB, "display\0", move || {
            DisplayObserver::new(shared, LogDisplay::new(), MonotonicClock::new(), &config)
                .run(FreeRtos)
        })?;
    }

    info!("All tasks started");

    // ── 6. Housekeeping ───────────────────────────────────────
    loop {
        FreeRtos::delay_ms(STATS_INTERVAL_MS);
        let stats = shared.telemetry.stats();
        info!(
            "STATS | published={} dropped={} depth={}",
            stats.published, stats.dropped, stats.depth
        );
        match shared.thresholds.snapshot() {
            Ok(t) => info!(
                "STATS | thresholds temp {:.1}..{:.1}C humid {:.1}..{:.1}% aqi>{} buzzer={}",
                t.temp_low, t.temp_high, t.humidity_low, t.humidity_high, t.aqi_threshold, t.buzzer_enabled
            ),
            Err(e) => warn!("STATS | thresholds unavailable: {e}"),
        }
    }
}
