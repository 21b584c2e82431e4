//! Application core: badge logic with zero direct I/O.
//!
//! Rate estimation, dose display, LED colour and the CW beacon are
//! orchestrated here.  All interaction with hardware happens through the
//! **port traits** in [`ports`], keeping this layer testable without real
//! peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
