//! Counts-per-minute to dose-rate conversion.
//!
//! The tube calibration ratio is expressed in CPM per uSv/h, so uSv/h is
//! the native unit.  The other units are linear rescalings whose factors
//! come from the global average background table, so all three units agree
//! on what "normal background" looks like.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Global average background radiation, uSv/h.
pub const BACKGROUND_USV_H: f32 = 0.27;
/// Global average background radiation, uR/h.
pub const BACKGROUND_UR_H: f32 = 10.388;
/// Global average background radiation, mR/h.
pub const BACKGROUND_MR_H: f32 = 0.010_388;

/// Fraction of live time below which dead-time correction stops growing.
const MIN_LIVE_FRACTION: f32 = 0.1;

/// Display / logging unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DoseUnit {
    MicroSievertsPerHour,
    MicroRoentgenPerHour,
    MilliRoentgenPerHour,
}

impl DoseUnit {
    /// ASCII label (no mu; serial consoles disagree about chars above 127).
    pub const fn label(self) -> &'static str {
        match self {
            Self::MicroSievertsPerHour => "uSv/h",
            Self::MicroRoentgenPerHour => "uR/h",
            Self::MilliRoentgenPerHour => "mR/h",
        }
    }

    /// Average background level expressed in this unit.
    pub const fn background(self) -> f32 {
        match self {
            Self::MicroSievertsPerHour => BACKGROUND_USV_H,
            Self::MicroRoentgenPerHour => BACKGROUND_UR_H,
            Self::MilliRoentgenPerHour => BACKGROUND_MR_H,
        }
    }

    /// Multiplier from uSv/h into this unit.
    pub fn scale(self) -> f32 {
        match self {
            Self::MicroSievertsPerHour => 1.0,
            other => other.background() / BACKGROUND_USV_H,
        }
    }

    /// Next unit in menu order.
    pub const fn next(self) -> Self {
        match self {
            Self::MicroSievertsPerHour => Self::MicroRoentgenPerHour,
            Self::MicroRoentgenPerHour => Self::MilliRoentgenPerHour,
            Self::MilliRoentgenPerHour => Self::MicroSievertsPerHour,
        }
    }
}

/// A converted dose rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DoseReading {
    pub value: f32,
    pub unit: DoseUnit,
}

impl DoseReading {
    pub fn new(cpm: f32, ratio: f32, unit: DoseUnit) -> Self {
        Self {
            value: to_dose(cpm, ratio, unit),
            unit,
        }
    }
}

impl fmt::Display for DoseReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(3);
        write!(f, "{:.*} {}", precision, self.value, self.unit.label())
    }
}

/// `cpm / ratio`, rescaled into `unit`.
///
/// Non-positive rates read as zero dose.  `ratio` must be strictly positive;
/// that is checked when the configuration is validated, not here.
pub fn to_dose(cpm: f32, ratio: f32, unit: DoseUnit) -> f32 {
    cpm.max(0.0) / ratio * unit.scale()
}

/// Correct a measured rate for tube dead time (non-paralysable model).
///
/// `true_cps = cps / (1 - cps * tau)`.  Near saturation the live fraction is
/// floored at [`MIN_LIVE_FRACTION`] so the estimate stays finite.
pub fn dead_time_corrected(cpm: u32, dead_time_us: u32) -> f32 {
    let measured = cpm as f32;
    if dead_time_us == 0 {
        return measured;
    }
    let cps = measured / 60.0;
    let tau = dead_time_us as f32 * 1e-6;
    let live = (1.0 - cps * tau).max(MIN_LIVE_FRACTION);
    measured / live
}
