//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter    | Implements | Connects to        |
//! |------------|------------|--------------------|
//! | `log_sink` | EventSink  | Serial log output  |
//! | `time`     | clock      | ESP32 system timer |
//!
//! The keyers implementing `KeyActuator` live in `drivers::keyers`.

pub mod log_sink;
pub mod time;
