//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events to the logger
//! (UART / USB-CDC on the badge).  Dose records are printed as a human
//! line and as one JSON object so a host script can scrape them.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::DoseLogged(record) => {
                info!("DOSE  | {} CPM | {}", record.cpm, record.dose);
                match record_json(record) {
                    Ok(json) => info!("{}", json),
                    Err(e) => warn!("DOSE  | json encode failed: {}", e),
                }
            }
            AppEvent::Started { led_mode, unit } => {
                info!("START | led={:?} unit={}", led_mode, unit.label());
            }
            AppEvent::LedModeChanged(mode) => {
                info!("LED   | mode={:?}", mode);
            }
            AppEvent::DoseUnitChanged(unit) => {
                info!("UNIT  | {}", unit.label());
            }
            AppEvent::MessageStarted => {
                info!("CW    | beacon started");
            }
            AppEvent::MessageComplete { aborted } => {
                info!("CW    | beacon {}", if *aborted { "aborted" } else { "complete" });
            }
        }
    }
}

/// Render a dose record as the JSON line the sink prints.
pub fn record_json(record: &crate::app::events::LogRecord) -> serde_json::Result<String> {
    serde_json::to_string(record)
}
