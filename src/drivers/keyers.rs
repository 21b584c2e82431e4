//! Keying actuators: the three outputs the CW sender can drive.
//!
//! | Keyer         | Hardware                                   | Key down            |
//! |---------------|--------------------------------------------|---------------------|
//! | [`RfKeyer`]   | PWM pin into a wire antenna (~1 MHz AM)    | 50% square carrier  |
//! | [`ToneKeyer`] | PWM pin into the piezo / speaker           | audio square wave   |
//! | [`LightKeyer`]| GPIO on the add-on header (indicator LED)  | pin high            |
//!
//! Each is an independent implementation of
//! [`KeyActuator`](crate::app::ports::KeyActuator); none share state.
//!
//! ## Safety contract
//!
//! `deactivate()` must leave the output silent even if the hardware write
//! reports an error, so errors are logged and never propagated into the
//! sender state machine.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::KeyActuator;

/// Which actuator the beacon keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyerKind {
    Rf,
    Tone,
    Light,
}

// ── RF carrier ────────────────────────────────────────────────

/// Gates a square-wave carrier on the antenna pin.  The PWM channel is set
/// up at the carrier frequency by the caller; this only switches its duty.
pub struct RfKeyer<C> {
    carrier: C,
    keyed: bool,
}

impl<C: SetDutyCycle> RfKeyer<C> {
    pub fn new(carrier: C) -> Self {
        Self {
            carrier,
            keyed: false,
        }
    }

    pub fn is_keyed(&self) -> bool {
        self.keyed
    }

    pub fn into_inner(self) -> C {
        self.carrier
    }
}

impl<C: SetDutyCycle> KeyActuator for RfKeyer<C> {
    fn activate(&mut self) {
        if self.carrier.set_duty_cycle_percent(50).is_err() {
            warn!("rf keyer: carrier on failed");
        }
        self.keyed = true;
    }

    fn deactivate(&mut self) {
        if self.carrier.set_duty_cycle_fully_off().is_err() {
            warn!("rf keyer: carrier off failed");
        }
        self.keyed = false;
    }

    fn on_ready(&mut self) {
        self.deactivate();
        info!("rf keyer: ready");
    }

    fn on_complete(&mut self) {
        self.deactivate();
        info!("rf keyer: complete");
    }
}

// ── Audio tone ────────────────────────────────────────────────

/// Keys a side tone on the speaker pin.  Volume is the duty cycle, capped at
/// 50% where a square wave is loudest.
pub struct ToneKeyer<T> {
    speaker: T,
    volume_percent: u8,
    keyed: bool,
}

impl<T: SetDutyCycle> ToneKeyer<T> {
    pub fn new(speaker: T, volume_percent: u8) -> Self {
        Self {
            speaker,
            volume_percent: volume_percent.clamp(1, 50),
            keyed: false,
        }
    }

    pub fn set_volume(&mut self, percent: u8) {
        self.volume_percent = percent.clamp(1, 50);
    }

    pub fn volume(&self) -> u8 {
        self.volume_percent
    }

    pub fn is_keyed(&self) -> bool {
        self.keyed
    }

    pub fn into_inner(self) -> T {
        self.speaker
    }
}

impl<T: SetDutyCycle> KeyActuator for ToneKeyer<T> {
    fn activate(&mut self) {
        if self.speaker.set_duty_cycle_percent(self.volume_percent).is_err() {
            warn!("tone keyer: tone on failed");
        }
        self.keyed = true;
    }

    fn deactivate(&mut self) {
        if self.speaker.set_duty_cycle_fully_off().is_err() {
            warn!("tone keyer: tone off failed");
        }
        self.keyed = false;
    }

    fn on_ready(&mut self) {
        self.deactivate();
        info!("tone keyer: ready (volume {}%)", self.volume_percent);
    }

    fn on_complete(&mut self) {
        self.deactivate();
        info!("tone keyer: complete");
    }
}

// ── Visual indicator ──────────────────────────────────────────

/// Flashes an indicator LED on a plain GPIO.
pub struct LightKeyer<P> {
    pin: P,
    keyed: bool,
}

impl<P: OutputPin> LightKeyer<P> {
    pub fn new(pin: P) -> Self {
        Self { pin, keyed: false }
    }

    pub fn is_keyed(&self) -> bool {
        self.keyed
    }

    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> KeyActuator for LightKeyer<P> {
    fn activate(&mut self) {
        if self.pin.set_high().is_err() {
            warn!("light keyer: set high failed");
        }
        self.keyed = true;
    }

    fn deactivate(&mut self) {
        if self.pin.set_low().is_err() {
            warn!("light keyer: set low failed");
        }
        self.keyed = false;
    }

    fn on_ready(&mut self) {
        self.deactivate();
        info!("light keyer: ready");
    }

    fn on_complete(&mut self) {
        self.deactivate();
        info!("light keyer: complete");
    }
}
