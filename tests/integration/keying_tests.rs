//! CW sender driven against a recording actuator.

use crate::mock_hw::{KeyCall, RecordingKeyer};

use qccbadge::keying::{KeyingState, MorseSender, DEFAULT_BEACON};

fn sender(message: &str, wpm: u16) -> MorseSender<RecordingKeyer> {
    MorseSender::new(message, wpm, RecordingKeyer::new()).unwrap()
}

/// Start at `start` and poll every millisecond until complete or `limit`.
fn run_to_completion(tx: &mut MorseSender<RecordingKeyer>, start: u32, limit: u32) -> u32 {
    tx.actuator_mut().now_ms = start;
    assert!(tx.start(start));
    let mut t = start;
    loop {
        tx.actuator_mut().now_ms = t;
        if tx.poll(t) == KeyingState::MessageComplete || t - start >= limit {
            return t;
        }
        t += 1;
    }
}

#[test]
fn sos_timing_at_12_wpm() {
    let mut tx = sender("SOS", 12);
    let end = run_to_completion(&mut tx, 0, 10_000);

    // 27 units of 100 ms.
    assert_eq!(end, 2700);
    let keyer = tx.actuator();
    assert_eq!(
        keyer.activations(),
        vec![0, 200, 400, 800, 1200, 1600, 2200, 2400, 2600]
    );
    assert_eq!(
        keyer.deactivations(),
        vec![100, 300, 500, 1100, 1500, 1900, 2300, 2500, 2700]
    );
    assert!(!keyer.is_keyed());
}

#[test]
fn lifecycle_calls_bracket_the_message() {
    let mut tx = sender("E E", 20);
    run_to_completion(&mut tx, 1000, 10_000);
    let calls: Vec<KeyCall> = tx.actuator().calls.iter().map(|(_, c)| *c).collect();
    assert_eq!(
        calls,
        vec![
            KeyCall::Ready,
            KeyCall::Activate,
            KeyCall::Deactivate,
            KeyCall::Activate,
            KeyCall::Deactivate,
            KeyCall::Complete,
        ]
    );
}

#[test]
fn word_gap_is_seven_units() {
    let mut tx = sender("E E", 12);
    run_to_completion(&mut tx, 0, 10_000);
    // Dot 0..100, word gap 100..800, dot 800..900.
    assert_eq!(tx.actuator().activations(), vec![0, 800]);
}

#[test]
fn nothing_after_complete() {
    let mut tx = sender("T", 12);
    run_to_completion(&mut tx, 0, 10_000);
    let n = tx.actuator().calls.len();
    for t in 300..2000 {
        tx.poll(t);
    }
    tx.abort();
    assert_eq!(tx.actuator().calls.len(), n);
    assert_eq!(tx.actuator().complete_index(), Some(n - 1));
}

#[test]
fn abort_mid_message_leaves_key_up() {
    let mut tx = sender("MMMM", 12);
    tx.start(0);
    for t in 0..=450 {
        tx.poll(t);
    }
    assert!(tx.actuator().is_keyed(), "second dash should be keyed at 450 ms");
    tx.abort();
    assert_eq!(tx.state(), KeyingState::MessageComplete);
    assert!(!tx.actuator().is_keyed());
    let last_two: Vec<KeyCall> = tx.actuator().calls[tx.actuator().calls.len() - 2..]
        .iter()
        .map(|(_, c)| *c)
        .collect();
    assert_eq!(last_two, vec![KeyCall::Deactivate, KeyCall::Complete]);

    // Second abort is a no-op, and polling does nothing.
    let n = tx.actuator().calls.len();
    tx.abort();
    tx.poll(10_000);
    assert_eq!(tx.actuator().calls.len(), n);
}

#[test]
fn abort_before_start_still_releases() {
    let mut tx = sender("E", 12);
    tx.abort();
    assert_eq!(tx.state(), KeyingState::MessageComplete);
    assert_eq!(tx.actuator().count(KeyCall::Deactivate), 1);
    assert_eq!(tx.actuator().count(KeyCall::Complete), 1);
    assert!(!tx.start(0), "complete sender must be re-armed first");
}

#[test]
fn rearm_sends_again() {
    let mut tx = sender("E", 12);
    run_to_completion(&mut tx, 0, 1000);
    assert!(!tx.start(500));
    assert!(tx.rearm());
    let end = run_to_completion(&mut tx, 500, 1000);
    assert_eq!(end, 600);
    assert_eq!(tx.actuator().count(KeyCall::Activate), 2);
    assert_eq!(tx.actuator().count(KeyCall::Complete), 2);
}

#[test]
fn empty_message_completes_on_first_poll() {
    let mut tx = sender("", 12);
    tx.start(0);
    assert_eq!(tx.poll(0), KeyingState::MessageComplete);
    assert_eq!(tx.actuator().count(KeyCall::Activate), 0);
    assert_eq!(tx.actuator().count(KeyCall::Complete), 1);
}

#[test]
fn default_beacon_starts_with_silence() {
    let mut tx = sender(DEFAULT_BEACON, 12);
    tx.start(0);
    assert!(matches!(
        tx.poll(0),
        KeyingState::SignalOffGap {
            since_ms: 0,
            duration_ms: 4200
        }
    ));
    assert!(!tx.actuator().is_keyed());
}

#[test]
fn sender_tolerates_sparse_polling() {
    let mut tx = sender("EE", 12);
    tx.start(0);
    tx.poll(0);
    // Main loop stalled for a second: each poll still advances one step.
    assert!(matches!(tx.poll(1000), KeyingState::SignalOffGap { since_ms: 1000, .. }));
    assert!(matches!(tx.poll(1300), KeyingState::SignalOn { since_ms: 1300, .. }));
    assert_eq!(tx.poll(1400), KeyingState::MessageComplete);
}
