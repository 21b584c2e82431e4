//! Port traits: the boundary between badge logic and the hardware around it.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ BadgeService (domain)
//! ```
//!
//! Driven adapters (keyers, event sinks) implement these traits.  The
//! [`BadgeService`](super::service::BadgeService) consumes them via
//! generics, so the domain core never touches hardware directly.

// ───────────────────────────────────────────────────────────────
// Key actuator port (driven adapter: domain → RF / tone / light)
// ───────────────────────────────────────────────────────────────

/// Anything the CW sender can key.
///
/// Implementations must tolerate `deactivate()` in any state, including
/// repeated calls, and must leave the output silent afterwards even if the
/// underlying write fails.
pub trait KeyActuator {
    /// Key down.
    fn activate(&mut self);

    /// Key up.
    fn deactivate(&mut self);

    /// A message is about to start.
    fn on_ready(&mut self);

    /// The message finished or was aborted.  The key is already up.
    fn on_complete(&mut self);
}

impl<A: KeyActuator + ?Sized> KeyActuator for &mut A {
    fn activate(&mut self) {
        (**self).activate();
    }

    fn deactivate(&mut self) {
        (**self).deactivate();
    }

    fn on_ready(&mut self) {
        (**self).on_ready();
    }

    fn on_complete(&mut self) {
        (**self).on_complete();
    }
}

impl<A: KeyActuator + ?Sized> KeyActuator for Box<A> {
    fn activate(&mut self) {
        (**self).activate();
    }

    fn deactivate(&mut self) {
        (**self).deactivate();
    }

    fn on_ready(&mut self) {
        (**self).on_ready();
    }

    fn on_complete(&mut self) {
        (**self).on_complete();
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
