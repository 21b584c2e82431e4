//! CW beacon: turns a text message into timed key-down / key-up calls on a
//! [`KeyActuator`].
//!
//! ```text
//!   Idle ──start──▶ PreparingSymbol ──▶ SignalOn ──▶ SignalOffGap ─┐
//!                        ▲   │                                    │
//!                        │   └──(no more steps)──▶ MessageComplete│
//!                        └────────────────────────────────────────┘
//! ```
//!
//! The sender never blocks.  The main loop calls [`MorseSender::poll`] with
//! the current time; each poll either leaves the state alone (deadline not
//! reached) or makes exactly one transition.  Deadlines are compared with
//! wrapping arithmetic so the 32-bit millisecond clock may roll over.
//!
//! Whatever happens, the actuator is released before `on_complete`: on
//! normal completion the last key-down has already been released, and
//! [`MorseSender::abort`] releases it unconditionally.

pub mod code;
pub mod plan;

use log::{debug, info, trace};

use crate::app::ports::KeyActuator;
use crate::error::{Error, Result};

pub use plan::{KeyStep, KeyingPlan, SignalLevel, Steps, Timing};

/// Longest message the sender stores.
pub const MESSAGE_CAPACITY: usize = 64;

pub type BeaconMessage = heapless::String<MESSAGE_CAPACITY>;

/// Badge greeting, preceded by six word gaps of silence.
pub const DEFAULT_BEACON: &str = "      C C C greetings qcc0x3 attendee B 73 de abend S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyingState {
    Idle,
    PreparingSymbol,
    SignalOn { since_ms: u32, duration_ms: u32 },
    SignalOffGap { since_ms: u32, duration_ms: u32 },
    MessageComplete,
}

impl KeyingState {
    /// A message has been started and not yet finished.
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Idle | Self::MessageComplete)
    }
}

pub struct MorseSender<A> {
    actuator: A,
    message: BeaconMessage,
    plan: KeyingPlan,
    state: KeyingState,
}

impl<A: KeyActuator> MorseSender<A> {
    pub fn new(message: &str, wpm: u16, actuator: A) -> Result<Self> {
        let mut stored = BeaconMessage::new();
        stored
            .push_str(message)
            .map_err(|_| Error::Config("beacon message too long"))?;
        Ok(Self {
            actuator,
            message: stored,
            plan: KeyingPlan::new(Timing::from_wpm(wpm)),
            state: KeyingState::Idle,
        })
    }

    pub fn state(&self) -> KeyingState {
        self.state
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn timing(&self) -> Timing {
        self.plan.timing()
    }

    /// Begin the message.  Only valid from `Idle`; returns `false` otherwise.
    pub fn start(&mut self, now_ms: u32) -> bool {
        if self.state != KeyingState::Idle {
            return false;
        }
        self.actuator.on_ready();
        self.state = KeyingState::PreparingSymbol;
        debug!(
            "keying: start {:?} at {} ms/unit (t={})",
            self.message.as_str(),
            self.plan.timing().unit_ms(),
            now_ms
        );
        true
    }

    /// Advance by at most one transition.
    pub fn poll(&mut self, now_ms: u32) -> KeyingState {
        match self.state {
            KeyingState::Idle | KeyingState::MessageComplete => {}
            KeyingState::PreparingSymbol => self.advance(now_ms),
            KeyingState::SignalOn {
                since_ms,
                duration_ms,
            } => {
                if now_ms.wrapping_sub(since_ms) >= duration_ms {
                    self.actuator.deactivate();
                    self.advance(now_ms);
                }
            }
            KeyingState::SignalOffGap {
                since_ms,
                duration_ms,
            } => {
                if now_ms.wrapping_sub(since_ms) >= duration_ms {
                    self.advance(now_ms);
                }
            }
        }
        self.state
    }

    /// Stop immediately and release the actuator.  No-op once complete.
    pub fn abort(&mut self) {
        if self.state == KeyingState::MessageComplete {
            return;
        }
        self.actuator.deactivate();
        self.actuator.on_complete();
        self.state = KeyingState::MessageComplete;
        info!("keying: aborted");
    }

    /// Return to `Idle` so the message can be sent again.  Refused while a
    /// message is in flight.
    pub fn rearm(&mut self) -> bool {
        if self.state.is_active() {
            return false;
        }
        self.plan.restart();
        self.state = KeyingState::Idle;
        true
    }

    /// Replace the message and word rate.  Refused while keying.
    pub fn reconfigure(&mut self, message: &str, wpm: u16) -> Result<()> {
        if self.state.is_active() {
            return Err(Error::Config("beacon busy"));
        }
        let mut stored = BeaconMessage::new();
        stored
            .push_str(message)
            .map_err(|_| Error::Config("beacon message too long"))?;
        self.message = stored;
        self.plan = KeyingPlan::new(Timing::from_wpm(wpm));
        self.state = KeyingState::Idle;
        Ok(())
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn actuator_mut(&mut self) -> &mut A {
        &mut self.actuator
    }

    pub fn into_actuator(self) -> A {
        self.actuator
    }

    fn advance(&mut self, now_ms: u32) {
        let Some(step) = self.plan.next_step(&self.message) else {
            self.actuator.on_complete();
            self.state = KeyingState::MessageComplete;
            info!("keying: message complete");
            return;
        };
        trace!("keying: {:?} {} ms", step.level, step.duration_ms);
        self.state = match step.level {
            SignalLevel::On => {
                self.actuator.activate();
                KeyingState::SignalOn {
                    since_ms: now_ms,
                    duration_ms: step.duration_ms,
                }
            }
            SignalLevel::Off => KeyingState::SignalOffGap {
                since_ms: now_ms,
                duration_ms: step.duration_ms,
            },
        };
    }
}
