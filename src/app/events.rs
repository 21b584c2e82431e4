//! Outbound application events.
//!
//! The [`BadgeService`](super::service::BadgeService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.

use serde::Serialize;

use crate::drivers::colour::LedMode;
use crate::sensors::dose::{DoseReading, DoseUnit};

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service has started.
    Started { led_mode: LedMode, unit: DoseUnit },

    /// Periodic dose record.
    DoseLogged(LogRecord),

    LedModeChanged(LedMode),

    DoseUnitChanged(DoseUnit),

    /// The beacon started keying.
    MessageStarted,

    /// The beacon finished, or was cut short.
    MessageComplete { aborted: bool },
}

/// Counts over one logging period and the dose they convert to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LogRecord {
    /// Uptime at the end of the period.
    pub uptime_ms: u32,
    /// Pulses in the period scaled to one minute.
    pub cpm: u32,
    pub dose: DoseReading,
}
