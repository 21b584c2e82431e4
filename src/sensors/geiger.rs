//! Geiger-Mueller tube pulse counter.
//!
//! The tube circuit produces one falling edge per ionising event.  The GPIO
//! ISR calls [`gm_isr_handler`], which bumps a 32-bit count; the main loop
//! drains it with [`PulseCounter::read_and_reset`] once per poll.
//!
//! A 32-bit read-modify-write is not atomic on every target this runs on,
//! so both sides go through a `critical_section` rather than relying on
//! native atomics.  Inside the ISR the critical section is already implied;
//! on the main-loop side it masks the interrupt for the copy-and-clear only.

use core::cell::Cell;

use critical_section::Mutex;

/// The badge's single tube counter.  `static` because ISR callbacks cannot
/// capture state.
pub static GM_PULSES: PulseCounter = PulseCounter::new();

/// Called from the GPIO ISR on each tube pulse.
pub fn gm_isr_handler() {
    GM_PULSES.on_pulse();
}

/// Interrupt-shared pulse accumulator.
///
/// The count only grows between resets; it saturates rather than wrapping
/// so a stalled main loop can never make it appear to go backwards.
pub struct PulseCounter {
    count: Mutex<Cell<u32>>,
}

impl Default for PulseCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl PulseCounter {
    pub const fn new() -> Self {
        Self {
            count: Mutex::new(Cell::new(0)),
        }
    }

    /// Record one pulse.  Interrupt context: no floats, no other state.
    #[inline]
    pub fn on_pulse(&self) {
        critical_section::with(|cs| {
            let count = self.count.borrow(cs);
            count.set(count.get().saturating_add(1));
        });
    }

    /// Copy the count and zero it in one interrupt-masked step.
    /// Main-loop context only.
    pub fn read_and_reset(&self) -> u32 {
        critical_section::with(|cs| self.count.borrow(cs).replace(0))
    }

    /// Current count without resetting it.
    pub fn peek(&self) -> u32 {
        critical_section::with(|cs| self.count.borrow(cs).get())
    }
}
