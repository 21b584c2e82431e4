//! QCC badge firmware library.
//!
//! Exposes the pure-logic modules for integration testing.  Everything
//! that touches ESP-IDF lives in the binary behind the `espidf` feature.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod keying;
pub mod pins;
pub mod sensors;
