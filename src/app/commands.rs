//! Inbound commands to the application service.
//!
//! These come from the buttons (via [`command_for`]) or from whatever
//! provides runtime configuration and signal strength.

use crate::config::BadgeConfig;
use crate::drivers::button::{Button, InputEvent};
use crate::drivers::colour::LedMode;
use crate::sensors::dose::DoseUnit;

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    CycleLedMode,
    SetLedMode(LedMode),
    CycleDoseUnit,
    SetDoseUnit(DoseUnit),

    /// Start the beacon, or stop it if it is already keying.
    ToggleBeacon,
    StartBeacon,
    AbortBeacon,

    /// Latest received signal strength, shown in [`LedMode::Rssi`].
    SetSignalStrength(f32),

    /// Hot-reload configuration.  Rejected unless it validates.
    UpdateConfig(BadgeConfig),
}

/// Button bindings.
pub fn command_for(event: InputEvent) -> AppCommand {
    match event {
        InputEvent::Pressed(Button::VolumeUp) => AppCommand::CycleLedMode,
        InputEvent::Pressed(Button::VolumeDown) => AppCommand::CycleDoseUnit,
        InputEvent::Pressed(Button::Seek) => AppCommand::ToggleBeacon,
    }
}
