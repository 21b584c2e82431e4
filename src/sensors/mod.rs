//! Radiation sensing: tube pulse counter, rate windows and dose conversion.
//!
//! ```text
//!  GM tube ISR ──▶ geiger::PulseCounter ──▶ rate::RateEstimator ──▶ dose::to_dose
//! ```

pub mod dose;
pub mod geiger;
pub mod rate;
