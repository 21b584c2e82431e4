//! Debounced push-button input.
//!
//! ## Hardware
//!
//! Three active-low momentary switches with pull-ups (volume up, volume
//! down, seek).  The main loop samples each line every tick; a press is
//! reported once the line has read "pressed" continuously for the debounce
//! interval.  Holding the button produces nothing further until it has been
//! released and pressed again.

use embedded_hal::digital::InputPin;
use log::warn;

/// Badge buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    VolumeUp,
    VolumeDown,
    Seek,
}

/// Clean input event for the current loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Pressed(Button),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DebounceState {
    Released,
    Settling { since_ms: u32 },
    Held,
}

/// Edge-triggered debouncer over raw line samples.
#[derive(Debug, Clone)]
pub struct Debouncer {
    debounce_ms: u32,
    state: DebounceState,
}

impl Debouncer {
    pub fn new(debounce_ms: u32) -> Self {
        Self {
            debounce_ms,
            state: DebounceState::Released,
        }
    }

    /// Feed one sample.  Returns `true` exactly once per stable press.
    pub fn update(&mut self, now_ms: u32, pressed: bool) -> bool {
        if !pressed {
            self.state = DebounceState::Released;
            return false;
        }
        match self.state {
            DebounceState::Released => {
                if self.debounce_ms == 0 {
                    self.state = DebounceState::Held;
                    return true;
                }
                self.state = DebounceState::Settling { since_ms: now_ms };
                false
            }
            DebounceState::Settling { since_ms } => {
                if now_ms.wrapping_sub(since_ms) >= self.debounce_ms {
                    self.state = DebounceState::Held;
                    return true;
                }
                false
            }
            DebounceState::Held => false,
        }
    }

    pub fn is_held(&self) -> bool {
        self.state == DebounceState::Held
    }
}

/// A debounced button on an active-low input pin.
pub struct ButtonDriver<P> {
    pin: P,
    button: Button,
    debouncer: Debouncer,
}

impl<P: InputPin> ButtonDriver<P> {
    pub fn new(pin: P, button: Button, debounce_ms: u32) -> Self {
        Self {
            pin,
            button,
            debouncer: Debouncer::new(debounce_ms),
        }
    }

    pub fn button(&self) -> Button {
        self.button
    }

    /// Call from the main loop at each tick.
    pub fn tick(&mut self, now_ms: u32) -> Option<InputEvent> {
        let pressed = match self.pin.is_low() {
            Ok(low) => low,
            Err(_) => {
                warn!("button {:?}: read failed", self.button);
                false
            }
        };
        self.debouncer
            .update(now_ms, pressed)
            .then_some(InputEvent::Pressed(self.button))
    }
}
