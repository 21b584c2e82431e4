//! Drivers against mock PWM channels and input pins.

use crate::mock_hw::{MockButtonPin, MockPwm, RecordingKeyer};

use qccbadge::app::ports::KeyActuator;
use qccbadge::drivers::button::{Button, ButtonDriver, InputEvent};
use qccbadge::drivers::keyers::RfKeyer;
use qccbadge::drivers::status_led::StatusLed;
use qccbadge::keying::MorseSender;

#[test]
fn status_led_starts_dark() {
    let led = StatusLed::new(MockPwm::default(), MockPwm::default(), MockPwm::default());
    assert_eq!(led.current_colour(), (0, 0, 0));
}

#[test]
fn status_led_writes_each_channel() {
    let mut led = StatusLed::new(MockPwm::default(), MockPwm::default(), MockPwm::default());
    led.set_colour((255, 128, 0));
    assert_eq!(led.current_colour(), (255, 128, 0));
    let (r, g, b) = led.into_channels();
    assert_eq!((r.duty, g.duty, b.duty), (255, 128, 0));
    // One write from `new`, one from `set_colour`.
    assert_eq!(r.writes, 2);
}

#[test]
fn button_press_fires_once_per_hold() {
    // 0-30 ms bounce, stable from 40 ms, held until 200 ms, released, pressed again.
    let mut script = vec![true, false, true, false];
    script.extend(std::iter::repeat_n(true, 17));
    script.extend(std::iter::repeat_n(false, 5));
    script.extend(std::iter::repeat_n(true, 10));
    let mut btn = ButtonDriver::new(MockButtonPin::new(&script), Button::VolumeUp, 50);

    let mut events = Vec::new();
    for (i, _) in script.iter().enumerate() {
        let t = i as u32 * 10;
        if let Some(e) = btn.tick(t) {
            events.push((t, e));
        }
    }
    assert_eq!(
        events,
        vec![
            (90, InputEvent::Pressed(Button::VolumeUp)),
            (310, InputEvent::Pressed(Button::VolumeUp)),
        ]
    );
}

#[test]
fn rf_keyer_carrier_off_after_sender_abort() {
    let mut tx = MorseSender::new("TTT", 12, RfKeyer::new(MockPwm::default())).unwrap();
    tx.start(0);
    tx.poll(0);
    assert!(tx.actuator().is_keyed());
    tx.abort();
    let carrier = tx.into_actuator().into_inner();
    assert_eq!(carrier.duty, 0);
}

#[test]
fn sender_drives_borrowed_actuator() {
    let mut keyer = RecordingKeyer::new();
    {
        let mut tx = MorseSender::new("E", 12, &mut keyer).unwrap();
        tx.start(0);
        tx.poll(0);
        tx.poll(100);
    }
    assert_eq!(keyer.activations().len(), 1);
    assert!(!keyer.is_keyed());
}

#[test]
fn boxed_actuator_is_an_actuator() {
    let mut boxed: Box<dyn KeyActuator> = Box::new(RecordingKeyer::new());
    boxed.on_ready();
    boxed.activate();
    boxed.deactivate();
    boxed.on_complete();
}
