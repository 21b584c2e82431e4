//! Input, LED and keyer drivers over `embedded-hal` traits.

pub mod button;
pub mod colour;
pub mod keyers;
pub mod status_led;
