//! BadgeService end to end: pulses in, dose, colour, events and keying out.

use crate::mock_hw::{KeyCall, LogSink, RecordingKeyer};

use qccbadge::app::commands::{command_for, AppCommand};
use qccbadge::app::events::AppEvent;
use qccbadge::app::service::{BadgeService, BadgeSnapshot};
use qccbadge::config::BadgeConfig;
use qccbadge::drivers::button::{Button, InputEvent};
use qccbadge::drivers::colour::LedMode;
use qccbadge::keying::KeyingState;
use qccbadge::sensors::dose::DoseUnit;
use qccbadge::sensors::geiger::PulseCounter;
use qccbadge::sensors::rate::{IntegrationMode, WindowConfig, WindowReading, INFINITE_PERIOD_MS};

fn exact_config() -> BadgeConfig {
    BadgeConfig {
        dead_time_us: 0,
        ..BadgeConfig::default()
    }
}

fn make_app(config: BadgeConfig) -> (BadgeService<RecordingKeyer>, LogSink) {
    let mut app = BadgeService::new(config, RecordingKeyer::new(), 0, 42).unwrap();
    let mut sink = LogSink::new();
    app.start(&mut sink);
    (app, sink)
}

/// Tick every `step` ms up to `until`, adding `per_step` pulses before
/// each tick.  Returns the last snapshot.
fn run(
    app: &mut BadgeService<RecordingKeyer>,
    sink: &mut LogSink,
    counter: &PulseCounter,
    from: u32,
    until: u32,
    step: u32,
    per_step: u32,
) -> BadgeSnapshot {
    let mut t = from;
    let mut last = None;
    while t <= until {
        for _ in 0..per_step {
            counter.on_pulse();
        }
        app.actuator_mut().now_ms = t;
        last = Some(app.tick(t, counter, sink));
        t += step;
    }
    last.unwrap()
}

#[test]
fn start_emits_initial_modes() {
    let (_, sink) = make_app(BadgeConfig::default());
    assert_eq!(
        sink.events,
        vec![AppEvent::Started {
            led_mode: LedMode::Radiation,
            unit: DoseUnit::MicroSievertsPerHour
        }]
    );
}

#[test]
fn steady_rate_reaches_dose() {
    let counter = PulseCounter::new();
    let (mut app, mut sink) = make_app(exact_config());

    // 10 pulses/s for one minute.
    let snap = run(&mut app, &mut sink, &counter, 100, 60_000, 100, 1);

    assert_eq!(snap.rates.fast, WindowReading::PerMinute(600));
    assert_eq!(snap.rates.slow, WindowReading::PerMinute(600));
    assert_eq!(snap.cpm, 600.0);
    assert!((snap.dose.value - 600.0 / 153.8).abs() < 1e-4);
    assert_eq!(snap.dose.unit, DoseUnit::MicroSievertsPerHour);
    assert_ne!(snap.colour, (0, 255, 0), "3.9 uSv/h is well above green");
}

#[test]
fn dose_is_logged_each_period() {
    let counter = PulseCounter::new();
    let (mut app, mut sink) = make_app(exact_config());

    run(&mut app, &mut sink, &counter, 100, 59_900, 100, 1);
    assert!(sink.dose_records().is_empty());

    run(&mut app, &mut sink, &counter, 60_000, 120_000, 100, 1);
    let records = sink.dose_records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].uptime_ms, 60_000);
    assert_eq!(records[0].cpm, 600);
    assert_eq!(records[1].cpm, 600);
}

#[test]
fn unit_cycle_changes_display() {
    let counter = PulseCounter::new();
    let (mut app, mut sink) = make_app(exact_config());
    run(&mut app, &mut sink, &counter, 100, 10_000, 100, 1);

    app.handle_command(command_for(InputEvent::Pressed(Button::VolumeDown)), 10_000, &mut sink)
        .unwrap();
    assert_eq!(app.dose_unit(), DoseUnit::MicroRoentgenPerHour);
    assert!(sink.events.contains(&AppEvent::DoseUnitChanged(DoseUnit::MicroRoentgenPerHour)));

    let snap = run(&mut app, &mut sink, &counter, 10_100, 10_100, 100, 1);
    assert_eq!(snap.dose.unit, DoseUnit::MicroRoentgenPerHour);
    let usv = snap.cpm / 153.8;
    assert!((snap.dose.value - usv * 10.388 / 0.27).abs() < 1e-3);
}

#[test]
fn led_mode_cycle_wraps() {
    let (mut app, mut sink) = make_app(BadgeConfig::default());
    for _ in 0..4 {
        app.handle_command(AppCommand::CycleLedMode, 0, &mut sink).unwrap();
    }
    assert_eq!(app.led_mode(), LedMode::Radiation);
    let changes: Vec<_> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::LedModeChanged(m) => Some(*m),
            _ => None,
        })
        .collect();
    assert_eq!(
        changes,
        vec![LedMode::Rssi, LedMode::Pulse, LedMode::Random, LedMode::Radiation]
    );
}

#[test]
fn rssi_mode_follows_signal_strength() {
    let counter = PulseCounter::new();
    let (mut app, mut sink) = make_app(BadgeConfig::default());
    app.handle_command(AppCommand::SetLedMode(LedMode::Rssi), 0, &mut sink).unwrap();

    app.handle_command(AppCommand::SetSignalStrength(0.0), 0, &mut sink).unwrap();
    assert_eq!(app.tick(10, &counter, &mut sink).colour, (0, 255, 0));

    app.handle_command(AppCommand::SetSignalStrength(127.0), 20, &mut sink).unwrap();
    assert_eq!(app.tick(30, &counter, &mut sink).colour, (255, 0, 255));
}

#[test]
fn random_mode_never_repeats() {
    let counter = PulseCounter::new();
    let (mut app, mut sink) = make_app(BadgeConfig::default());
    app.handle_command(AppCommand::SetLedMode(LedMode::Random), 0, &mut sink).unwrap();
    let mut prev = app.tick(0, &counter, &mut sink).colour;
    for t in 1..1000 {
        let c = app.tick(t, &counter, &mut sink).colour;
        assert_ne!(c, prev, "repeat at t={t}");
        prev = c;
    }
}

#[test]
fn free_running_integration_reports_cumulative() {
    let counter = PulseCounter::new();
    let config = BadgeConfig {
        integration: IntegrationMode::FreeRunning,
        ..exact_config()
    };
    let (mut app, mut sink) = make_app(config);
    let snap = run(&mut app, &mut sink, &counter, 100, 30_000, 100, 1);
    assert_eq!(snap.rates.slow, WindowReading::Cumulative(300));
    // Display falls back to the fast window.
    assert_eq!(snap.cpm, 600.0);
}

#[test]
fn free_running_fast_window_is_refused() {
    let config = BadgeConfig {
        integration: IntegrationMode::FreeRunning,
        fast_window: WindowConfig {
            bucket_ms: INFINITE_PERIOD_MS,
            buckets: 50,
        },
        ..exact_config()
    };
    assert!(BadgeService::new(config.clone(), RecordingKeyer::new(), 0, 42).is_err());

    // A running badge keeps its windowed fast rate when handed the same update.
    let counter = PulseCounter::new();
    let (mut app, mut sink) = make_app(exact_config());
    assert!(app
        .handle_command(AppCommand::UpdateConfig(config), 0, &mut sink)
        .is_err());
    let snap = run(&mut app, &mut sink, &counter, 100, 10_000, 100, 10);
    assert_eq!(snap.rates.fast, WindowReading::PerMinute(6000));
    assert!(snap.dose.value > 0.0);
}

#[test]
fn seek_button_sends_and_aborts_beacon() {
    let counter = PulseCounter::new();
    let config = BadgeConfig {
        beacon_message: "SOS".try_into().unwrap(),
        ..exact_config()
    };
    let (mut app, mut sink) = make_app(config);
    let seek = command_for(InputEvent::Pressed(Button::Seek));

    app.handle_command(seek.clone(), 0, &mut sink).unwrap();
    assert!(sink.events.contains(&AppEvent::MessageStarted));
    run(&mut app, &mut sink, &counter, 0, 3000, 1, 0);
    assert_eq!(app.keying_state(), KeyingState::MessageComplete);
    assert!(sink.events.contains(&AppEvent::MessageComplete { aborted: false }));
    assert_eq!(app.actuator().count(KeyCall::Activate), 9);

    // Second press re-arms and starts; third press aborts mid-dash.
    app.handle_command(seek.clone(), 4000, &mut sink).unwrap();
    run(&mut app, &mut sink, &counter, 4000, 4850, 1, 0);
    assert!(app.actuator().is_keyed());
    app.handle_command(seek, 4850, &mut sink).unwrap();
    assert!(!app.actuator().is_keyed());
    assert_eq!(app.keying_state(), KeyingState::MessageComplete);
    assert!(sink.events.contains(&AppEvent::MessageComplete { aborted: true }));
}

#[test]
fn config_update_applies_and_aborts_beacon() {
    let counter = PulseCounter::new();
    let (mut app, mut sink) = make_app(exact_config());
    app.handle_command(AppCommand::StartBeacon, 0, &mut sink).unwrap();
    run(&mut app, &mut sink, &counter, 0, 10, 1, 0);
    assert!(app.keying_state().is_active());

    let update = BadgeConfig {
        dose_unit: DoseUnit::MilliRoentgenPerHour,
        wpm: 20,
        ..exact_config()
    };
    app.handle_command(AppCommand::UpdateConfig(update), 20, &mut sink).unwrap();
    assert_eq!(app.keying_state(), KeyingState::Idle);
    assert!(!app.actuator().is_keyed());
    assert_eq!(app.dose_unit(), DoseUnit::MilliRoentgenPerHour);
    assert_eq!(app.config().wpm, 20);
    assert!(sink.events.contains(&AppEvent::MessageComplete { aborted: true }));
}
