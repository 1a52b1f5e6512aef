//! Alert monitor against the live channel and threshold guard.

use std::time::Duration;

use envlogger::alert::AlertState;
use envlogger::alert::monitor::AlertMonitor;
use envlogger::alert::thresholds::{AlertThresholds, ApplyOutcome, ThresholdPatch};
use envlogger::app::events::{AlertNotification, NotificationKind};
use envlogger::app::ports::Clock;
use envlogger::drivers::annunciator::{Annunciator, AttentionPattern};
use envlogger::error::ConfigError;
use envlogger::shared::SharedState;
use envlogger::telemetry::{TelemetryDrain, TelemetryPublisher, TelemetrySample};

use crate::mock_hw::{ManualClock, MockOutputs, NoDelay, RecordingSink, test_config};

const SHORT: Duration = Duration::from_millis(5);

type Monitor = AlertMonitor<MockOutputs, NoDelay, RecordingSink, ManualClock>;

struct Rig {
    shared: SharedState,
    publisher: TelemetryPublisher,
    drain: TelemetryDrain,
    clock: ManualClock,
    monitor: Monitor,
}

impl Rig {
    fn new() -> Self {
        let config = test_config();
        let (shared, publisher, drain) = SharedState::new(
            config.thresholds,
            Duration::from_millis(u64::from(config.config_lock_timeout_ms)),
        );
        let clock = ManualClock::default();
        let annunciator = Annunciator::new(
            MockOutputs::default(),
            NoDelay::default(),
            AttentionPattern::default(),
        );
        let monitor = AlertMonitor::new(
            shared.clone(),
            annunciator,
            RecordingSink::default(),
            clock.clone(),
            &config,
        );
        Self {
            shared,
            publisher,
            drain,
            clock,
            monitor,
        }
    }

    /// Publish at the current clock time and let the monitor see it
    /// before the drain consumes it.
    fn feed(&mut self, temperature: f32, humidity: f32, aqi: u16) {
        let now = self.clock.now_ms();
        self.publisher
            .publish(TelemetrySample::new(temperature, humidity, aqi, now))
            .unwrap();
        self.monitor.poll();
        self.drain.take(SHORT).unwrap();
    }

    fn outputs(&self) -> &MockOutputs {
        self.monitor.annunciator().outputs()
    }

    fn sent(&self) -> &[AlertNotification] {
        &self.monitor.sink().sent
    }
}

#[test]
fn high_temperature_scenario() {
    let mut rig = Rig::new();

    rig.clock.set(1_000);
    rig.feed(25.0, 50.0, 50);
    assert_eq!(rig.monitor.engine().state(), AlertState::Normal);
    assert!(!rig.outputs().indicator());

    rig.clock.set(11_000);
    rig.feed(36.0, 50.0, 50);
    assert_eq!(rig.monitor.engine().state(), AlertState::TempHigh);
    assert!(rig.outputs().indicator());
    assert!(!rig.outputs().alarm());
    assert_eq!(rig.outputs().alarm_pulses(), 3);

    // Same condition persists: no new attention pattern.
    rig.clock.set(21_000);
    rig.feed(36.5, 50.0, 50);
    assert_eq!(rig.outputs().alarm_pulses(), 3);
    assert!(rig.outputs().indicator());

    rig.clock.set(31_000);
    rig.feed(25.0, 50.0, 50);
    assert_eq!(rig.monitor.engine().state(), AlertState::Normal);
    assert!(!rig.outputs().indicator());

    let kinds: Vec<NotificationKind> = rig.sent().iter().map(|n| n.kind).collect();
    assert_eq!(
        kinds,
        vec![
            NotificationKind::Raised(AlertState::TempHigh),
            NotificationKind::Cleared(AlertState::TempHigh),
        ]
    );
    assert_eq!(
        rig.sent()[0].message.as_str(),
        "High Temperature Detected: 36.0°C (Threshold: 35.0°C)"
    );
}

#[test]
fn notifications_follow_raise_and_clear() {
    let config = test_config();
    let (shared, publisher, mut drain) = SharedState::new(config.thresholds, SHORT);
    let clock = ManualClock::default();
    let mut monitor = AlertMonitor::new(
        shared,
        Annunciator::new(
            MockOutputs::default(),
            NoDelay::default(),
            AttentionPattern::default(),
        ),
        RecordingSink::default(),
        clock.clone(),
        &config,
    );

    let mut step = |at: u64, t: f32| {
        clock.set(at);
        publisher.publish(TelemetrySample::new(t, 50.0, 50, at)).unwrap();
        let eval = monitor.poll();
        drain.take(SHORT).unwrap();
        eval.and_then(|e| e.notification).map(|n| n.kind)
    };

    assert_eq!(
        step(10_000, 36.0),
        Some(NotificationKind::Raised(AlertState::TempHigh))
    );
    assert_eq!(step(20_000, 36.0), None);
    assert_eq!(
        step(30_000, 25.0),
        Some(NotificationKind::Cleared(AlertState::TempHigh))
    );
    // Re-entry inside the cooldown is indicated but not notified.
    assert_eq!(step(40_000, 36.0), None);
    assert_eq!(monitor.engine().suppressed_count(), 1);
}

#[test]
fn same_sample_is_evaluated_once_but_outputs_are_held() {
    let mut rig = Rig::new();
    rig.clock.set(5_000);
    rig.publisher
        .publish(TelemetrySample::new(36.0, 50.0, 50, 5_000))
        .unwrap();

    assert!(rig.monitor.poll().is_some());
    let calls_after_first = rig.outputs().calls.len();
    assert!(rig.monitor.poll().is_none());
    assert!(rig.outputs().calls.len() > calls_after_first);
    assert!(rig.outputs().indicator());
    assert_eq!(rig.outputs().alarm_pulses(), 3);
}

#[test]
fn disabled_buzzer_still_indicates() {
    let mut rig = Rig::new();
    let patch = ThresholdPatch::from_json(r#"{"Buzzer": false}"#).unwrap();
    assert_eq!(rig.shared.thresholds.apply_patch(&patch), Ok(ApplyOutcome::Changed));

    rig.clock.set(1_000);
    rig.feed(50.0, 95.0, 50);
    assert_eq!(rig.monitor.engine().state(), AlertState::TempHigh);
    assert!(rig.outputs().indicator());
    assert_eq!(rig.outputs().alarm_pulses(), 0);
}

#[test]
fn remote_threshold_change_applies_to_next_sample() {
    let mut rig = Rig::new();
    rig.clock.set(1_000);
    rig.feed(33.0, 50.0, 50);
    assert_eq!(rig.monitor.engine().state(), AlertState::Normal);

    let patch = ThresholdPatch::from_json(r#"{"Temp High Threshold": 32.0}"#).unwrap();
    assert_eq!(rig.shared.thresholds.apply_patch(&patch), Ok(ApplyOutcome::Changed));

    rig.clock.set(11_000);
    rig.feed(33.0, 50.0, 50);
    assert_eq!(rig.monitor.engine().state(), AlertState::TempHigh);
}

#[test]
fn reapplying_thresholds_is_idempotent() {
    let rig = Rig::new();
    let guard = &rig.shared.thresholds;
    let custom = AlertThresholds {
        aqi_threshold: 120,
        ..AlertThresholds::default()
    };
    assert_eq!(guard.apply_thresholds(custom), Ok(ApplyOutcome::Changed));
    assert_eq!(guard.apply_thresholds(custom), Ok(ApplyOutcome::Unchanged));
    assert_eq!(guard.snapshot(), Ok(custom));
}

#[test]
fn reapplying_thresholds_mid_alert_causes_no_churn() {
    let mut rig = Rig::new();
    rig.clock.set(1_000);
    rig.feed(36.0, 50.0, 50);
    assert_eq!(rig.monitor.engine().state(), AlertState::TempHigh);
    assert_eq!(rig.sent().len(), 1);

    let live = rig.shared.thresholds.snapshot().unwrap();
    for _ in 0..2 {
        assert_eq!(
            rig.shared.thresholds.apply_thresholds(live),
            Ok(ApplyOutcome::Unchanged)
        );
    }

    rig.clock.set(11_000);
    rig.feed(36.2, 50.0, 50);
    assert_eq!(rig.monitor.engine().state(), AlertState::TempHigh);
    assert_eq!(rig.sent().len(), 1);
    assert_eq!(rig.outputs().alarm_pulses(), 3);
    assert_eq!(rig.monitor.engine().suppressed_count(), 0);
}

#[test]
fn invalid_update_leaves_thresholds_untouched() {
    let rig = Rig::new();
    let guard = &rig.shared.thresholds;
    let before = guard.snapshot().unwrap();

    let inverted = ThresholdPatch::from_json(r#"{"Temp Low Threshold": 40.0}"#).unwrap();
    assert!(matches!(
        guard.apply_patch(&inverted),
        Err(ConfigError::Invalid(_))
    ));
    assert_eq!(
        ThresholdPatch::from_json("{not json"),
        Err(ConfigError::Malformed)
    );
    assert_eq!(guard.snapshot(), Ok(before));
}

#[test]
fn contended_guard_times_out_and_monitor_keeps_last_thresholds() {
    let mut rig = Rig::new();
    rig.clock.set(1_000);
    rig.feed(25.0, 50.0, 50);

    let guard = std::sync::Arc::clone(&rig.shared.thresholds);
    let outcome = guard.with_locked(|_| {
        // While the guard is held, a writer gives up...
        let writer = rig.shared.thresholds.apply_thresholds(AlertThresholds {
            temp_high: 20.0,
            ..AlertThresholds::default()
        });
        assert_eq!(writer, Err(ConfigError::LockTimeout));
        // ...and the monitor evaluates against its cached copy.
        rig.clock.set(11_000);
        rig.feed(30.0, 50.0, 50);
        rig.monitor.engine().state()
    });
    assert_eq!(outcome, Ok(AlertState::Normal));
}
