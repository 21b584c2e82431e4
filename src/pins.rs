//! GPIO / peripheral pin assignments for the badge.
//!
//! Single source of truth: the binary references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Geiger-Mueller tube
// ---------------------------------------------------------------------------

/// Tube pulse output, falling edge per count.  Interrupt-driven.
pub const GM_TUBE_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// Status LED (discrete common-cathode RGB, LEDC PWM per die)
// ---------------------------------------------------------------------------

pub const LED_R_GPIO: i32 = 6;
pub const LED_G_GPIO: i32 = 10;
pub const LED_B_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// Keyer outputs
// ---------------------------------------------------------------------------

/// PWM into the wire antenna (RF keyer) or the piezo (tone keyer).
/// Shared: only one of the two is constructed.
pub const ANTENNA_GPIO: i32 = 9;
/// Add-on header GPIO1, used by the light keyer.
pub const SAO_GPIO1: i32 = 14;
/// Add-on header GPIO2, unused.
pub const SAO_GPIO2: i32 = 15;

// ---------------------------------------------------------------------------
// Buttons (active LOW, internal pull-up)
// ---------------------------------------------------------------------------

pub const VOL_UP_GPIO: i32 = 8;
pub const VOL_DOWN_GPIO: i32 = 7;
pub const SEEK_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// Main-loop timing
// ---------------------------------------------------------------------------

/// Main-loop period (milliseconds).  Well under the fast bucket width and
/// the shortest CW element at any sane word rate.
pub const LOOP_PERIOD_MS: u32 = 5;
