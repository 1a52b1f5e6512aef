//! Acquisition → channel → consumers, end to end.

use std::time::Duration;

use envlogger::acquisition::AcquisitionLoop;
use envlogger::display::{DisplayObserver, DisplayUpdate, NO_DATA_MESSAGE};
use envlogger::error::SinkError;
use envlogger::forwarder::{CloudForwarder, ForwardOutcome};
use envlogger::sensors::aqi::{FixedNoise, compute_aqi};
use envlogger::sensors::dht11::Dht11;
use envlogger::sensors::dht11_sim::{SimBehaviour, SimDht11};
use envlogger::shared::SharedState;
use envlogger::telemetry::TelemetrySample;

use crate::mock_hw::{
    FixedLight, ManualClock, NoDelay, RecordingDisplay, ScriptedMirror, test_config,
};

const SHORT: Duration = Duration::from_millis(5);

fn frame(humidity: u8, temp: u8, temp_dec: u8) -> [u8; 5] {
    let sum = humidity.wrapping_add(temp).wrapping_add(temp_dec);
    [humidity, 0, temp, temp_dec, sum]
}

#[test]
fn decoded_reading_reaches_the_cloud() {
    let config = test_config();
    let (shared, publisher, drain) = SharedState::new(config.thresholds, SHORT);
    let sim = SimDht11::new(frame(45, 23, 5));
    let clock = ManualClock::default();
    clock.set(10_000);

    let mut acquisition = AcquisitionLoop::new(
        Dht11::new(sim.line(), sim.delay()),
        FixedLight(2_000),
        FixedNoise(0),
        clock.clone(),
        NoDelay::default(),
        publisher,
        &config,
    );
    let report = acquisition.run_cycle();
    assert!(report.fresh);
    assert_eq!(report.attempts, 1);
    assert!(report.published);

    // Observers see it first without consuming it.
    let peeked = shared.telemetry.peek(SHORT).unwrap();
    assert_eq!(peeked, report.sample);
    assert_eq!(shared.telemetry.stats().depth, 1);

    let mut forwarder =
        CloudForwarder::new(drain, ScriptedMirror::default(), NoDelay::default(), &config);
    match forwarder.forward_once() {
        ForwardOutcome::Delivered(sample) => {
            assert_eq!(sample.temperature(), 23.5);
            assert_eq!(sample.humidity(), 45.0);
            assert_eq!(sample.air_quality_index(), compute_aqi(23.5, 45.0, 2_000, 0));
            assert_eq!(sample.timestamp_ms(), 10_000);
        }
        other => panic!("expected delivery, got {other:?}"),
    }
    assert_eq!(forwarder.mirror().delivered.len(), 1);
    assert_eq!(forwarder.tally().good, 1);
    assert_eq!(shared.telemetry.stats().depth, 0);
}

#[test]
fn silent_sensor_publishes_fallback_then_recovers() {
    let config = test_config();
    let (_shared, publisher, mut drain) = SharedState::new(config.thresholds, SHORT);
    let sim = SimDht11::new(frame(60, 28, 0)).with_behaviour(SimBehaviour::Silent);
    let mut acquisition = AcquisitionLoop::new(
        Dht11::new(sim.line(), sim.delay()),
        FixedLight(2_000),
        FixedNoise(0),
        ManualClock::default(),
        NoDelay::default(),
        publisher,
        &config,
    );

    let report = acquisition.run_cycle();
    assert!(!report.fresh);
    assert_eq!(sim.start_signals(), u32::from(config.dht_max_retries));
    let stale = drain.take(SHORT).unwrap();
    assert_eq!(stale.temperature(), config.fallback_temperature_c);
    assert_eq!(stale.humidity(), config.fallback_humidity_pct);

    sim.set_behaviour(SimBehaviour::Responding);
    assert!(acquisition.run_cycle().fresh);
    let fresh = drain.take(SHORT).unwrap();
    assert_eq!(fresh.temperature(), 28.0);
    assert_eq!(fresh.humidity(), 60.0);
}

#[test]
fn corrupted_frame_never_reaches_consumers() {
    let config = test_config();
    let (_shared, publisher, mut drain) = SharedState::new(config.thresholds, SHORT);
    let mut bad = frame(45, 23, 5);
    bad[4] ^= 0x01;
    let sim = SimDht11::new(bad);
    let mut acquisition = AcquisitionLoop::new(
        Dht11::new(sim.line(), sim.delay()),
        FixedLight(2_000),
        FixedNoise(0),
        ManualClock::default(),
        NoDelay::default(),
        publisher,
        &config,
    );

    let report = acquisition.run_cycle();
    assert!(!report.fresh);
    assert_eq!(acquisition.stats().decode_failures, 3);
    let sample = drain.take(SHORT).unwrap();
    assert_eq!(sample.temperature(), config.fallback_temperature_c);
}

#[test]
fn failed_report_discards_sample_and_moves_on() {
    let config = test_config();
    let (shared, publisher, drain) = SharedState::new(config.thresholds, SHORT);
    let mirror = ScriptedMirror {
        failures: [Some(SinkError::NotConnected), None].into(),
        ..ScriptedMirror::default()
    };
    let mut forwarder = CloudForwarder::new(drain, mirror, NoDelay::default(), &config);

    publisher.publish(TelemetrySample::new(22.0, 45.0, 40, 1)).unwrap();
    publisher.publish(TelemetrySample::new(22.0, 45.0, 120, 2)).unwrap();

    assert!(matches!(forwarder.forward_once(), ForwardOutcome::Failed(s) if s.timestamp_ms() == 1));
    assert!(matches!(forwarder.forward_once(), ForwardOutcome::Delivered(s) if s.timestamp_ms() == 2));
    assert_eq!(forwarder.forward_once(), ForwardOutcome::Idle);

    let stats = forwarder.stats();
    assert_eq!((stats.delivered, stats.failed), (1, 1));
    assert_eq!(forwarder.tally().unhealthy, 1);
    assert_eq!(shared.telemetry.stats().depth, 0);
}

#[test]
fn full_channel_drops_newest_and_keeps_order() {
    let config = test_config();
    let (shared, publisher, drain) = SharedState::new(config.thresholds, SHORT);
    for ts in 0..12 {
        let _ = publisher.publish(TelemetrySample::new(22.0, 45.0, 40, ts));
    }
    let stats = shared.telemetry.stats();
    assert_eq!(stats.depth, 10);
    assert_eq!(stats.dropped, 2);

    let mut forwarder =
        CloudForwarder::new(drain, ScriptedMirror::default(), NoDelay::default(), &config);
    while forwarder.forward_once() != ForwardOutcome::Idle {}
    let order: Vec<u64> = forwarder
        .mirror()
        .delivered
        .iter()
        .map(TelemetrySample::timestamp_ms)
        .collect();
    assert_eq!(order, (0..10).collect::<Vec<_>>());
}

#[test]
fn display_reports_sensor_loss_once() {
    let config = test_config();
    let (shared, publisher, mut drain) = SharedState::new(config.thresholds, SHORT);
    let mut display = DisplayObserver::new(
        shared.clone(),
        RecordingDisplay::default(),
        ManualClock::default(),
        &config,
    );

    publisher.publish(TelemetrySample::new(21.0, 40.0, 55, 1)).unwrap();
    assert_eq!(display.poll(), DisplayUpdate::Rendered);
    drain.take(SHORT).unwrap();

    for _ in 0..config.display_stale_polls {
        assert_eq!(display.poll(), DisplayUpdate::Unchanged);
    }
    assert_eq!(display.poll(), DisplayUpdate::NoData);
    assert_eq!(display.poll(), DisplayUpdate::Unchanged);
    assert_eq!(display.port().messages, vec![NO_DATA_MESSAGE.to_owned()]);

    publisher.publish(TelemetrySample::new(21.5, 41.0, 56, 2)).unwrap();
    assert_eq!(display.poll(), DisplayUpdate::Rendered);
    let frames = &display.port().frames;
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].lines[0].as_str(), "Env. Monitor");
    assert_eq!(frames[1].lines[1].as_str(), "Temp: 21.5 C");
    assert_eq!(frames[1].lines[3].as_str(), "AQI: 56 Moderate");
}
