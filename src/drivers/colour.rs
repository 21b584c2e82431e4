//! LED colour mapper.
//!
//! Turns a scalar reading into the RGB tuple for the status LED.  The main
//! loop calls [`ColourMapper::sample`] each tick with the current reading,
//! the active [`LedMode`] and the monotonic time.
//!
//! ## Modes
//!
//! | Mode      | Input                  | Output                                 |
//! |-----------|------------------------|----------------------------------------|
//! | Radiation | dose, uSv/h            | position on the spectrum gradient      |
//! | Rssi      | FM signal strength     | position on the spectrum gradient      |
//! | Pulse     | ignored                | triangular breathing of a fixed hue    |
//! | Random    | ignored                | random colour, never the previous one  |
//!
//! ## Spectra
//!
//! `green → yellow → red → magenta`, or the same with blue prepended.
//! Channels are interpolated linearly between adjacent stops, so the colour
//! is continuous across segment boundaries.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::BadgeConfig;

/// Colour as (R, G, B) tuple, each 0–255.
pub type Rgb = (u8, u8, u8);

pub const BLUE: Rgb = (0, 0, 255);
pub const GREEN: Rgb = (0, 255, 0);
pub const YELLOW: Rgb = (255, 255, 0);
pub const RED: Rgb = (255, 0, 0);
pub const MAGENTA: Rgb = (255, 0, 255);

/// Hue used by the breathing pulse.
pub const PULSE_HUE: Rgb = (0, 180, 255);

/// Largest per-channel step per sample when easing into the pulse pattern.
const PULSE_MAX_STEP: u8 = 16;

static GYRM: [Rgb; 4] = [GREEN, YELLOW, RED, MAGENTA];
static BGYRM: [Rgb; 5] = [BLUE, GREEN, YELLOW, RED, MAGENTA];

/// What drives the LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedMode {
    Radiation,
    Rssi,
    Pulse,
    Random,
}

impl LedMode {
    /// Next mode in button-cycle order.
    pub const fn next(self) -> Self {
        match self {
            Self::Radiation => Self::Rssi,
            Self::Rssi => Self::Pulse,
            Self::Pulse => Self::Random,
            Self::Random => Self::Radiation,
        }
    }
}

/// Gradient reference colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Spectrum {
    GreenToMagenta,
    BlueToMagenta,
}

impl Spectrum {
    pub fn stops(self) -> &'static [Rgb] {
        match self {
            Self::GreenToMagenta => &GYRM,
            Self::BlueToMagenta => &BGYRM,
        }
    }
}

/// Position `x` (clamped to `[0, 1]`) on the piecewise-linear ramp through
/// `stops`.  NaN reads as 0.
pub fn gradient(x: f32, stops: &[Rgb]) -> Rgb {
    match stops {
        [] => (0, 0, 0),
        [only] => *only,
        _ => {
            let x = if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) };
            let segments = stops.len() - 1;
            let pos = x * segments as f32;
            let seg = (pos as usize).min(segments - 1);
            let frac = pos - seg as f32;
            let (a, b) = (stops[seg], stops[seg + 1]);
            (lerp(a.0, b.0, frac), lerp(a.1, b.1, frac), lerp(a.2, b.2, frac))
        }
    }
}

fn lerp(a: u8, b: u8, t: f32) -> u8 {
    let v = a as f32 + (b as f32 - a as f32) * t;
    v.round().clamp(0.0, 255.0) as u8
}

/// Scale a full-intensity colour down to `max` per channel.
fn dim(colour: Rgb, max: u8) -> Rgb {
    let scale = |c: u8| ((c as u16 * max as u16) / 255) as u8;
    (scale(colour.0), scale(colour.1), scale(colour.2))
}

/// Move `from` toward `to` by at most `step`.
fn approach(from: u8, to: u8, step: u8) -> u8 {
    if from < to {
        from.saturating_add(step).min(to)
    } else {
        from.saturating_sub(step).max(to)
    }
}

/// Stateful mapper: remembers the previous sample and owns the flicker RNG.
pub struct ColourMapper {
    spectrum: Spectrum,
    max_intensity: u8,
    rad_full_scale: f32,
    rssi_full_scale: f32,
    pulse_period_ms: u32,
    previous: Rgb,
    rng: SmallRng,
}

impl ColourMapper {
    /// `seed` only affects [`LedMode::Random`].
    pub fn new(config: &BadgeConfig, seed: u64) -> Self {
        Self {
            spectrum: config.spectrum,
            max_intensity: config.led_max_intensity,
            rad_full_scale: config.rad_full_scale_usv_h,
            rssi_full_scale: config.rssi_full_scale,
            pulse_period_ms: config.pulse_period_ms.max(2),
            previous: (0, 0, 0),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Produce the LED colour for this tick.
    pub fn sample(&mut self, input: f32, mode: LedMode, now_ms: u32) -> Rgb {
        let colour = match mode {
            LedMode::Radiation => self.on_gradient(input, self.rad_full_scale),
            LedMode::Rssi => self.on_gradient(input, self.rssi_full_scale),
            LedMode::Pulse => self.breathe(now_ms),
            LedMode::Random => self.flicker(),
        };
        self.previous = colour;
        colour
    }

    /// The last colour returned by [`sample`](Self::sample).
    pub fn previous(&self) -> Rgb {
        self.previous
    }

    /// Pick up new calibration without disturbing the previous sample or
    /// the RNG stream.
    pub fn apply_config(&mut self, config: &BadgeConfig) {
        self.spectrum = config.spectrum;
        self.max_intensity = config.led_max_intensity;
        self.rad_full_scale = config.rad_full_scale_usv_h;
        self.rssi_full_scale = config.rssi_full_scale;
        self.pulse_period_ms = config.pulse_period_ms.max(2);
    }

    fn on_gradient(&self, input: f32, full_scale: f32) -> Rgb {
        dim(gradient(input / full_scale, self.spectrum.stops()), self.max_intensity)
    }

    fn breathe(&self, now_ms: u32) -> Rgb {
        let brightness = triangle(now_ms, self.pulse_period_ms);
        let target = dim(dim(PULSE_HUE, brightness), self.max_intensity);
        let prev = self.previous;
        (
            approach(prev.0, target.0, PULSE_MAX_STEP),
            approach(prev.1, target.1, PULSE_MAX_STEP),
            approach(prev.2, target.2, PULSE_MAX_STEP),
        )
    }

    /// Uniform random colour; nudges a randomly chosen channel if it repeats
    /// the previous sample.  With a max intensity of 0 only black exists.
    fn flicker(&mut self) -> Rgb {
        let max = self.max_intensity;
        if max == 0 {
            return (0, 0, 0);
        }
        let mut colour: Rgb = (
            self.rng.gen_range(0..=max),
            self.rng.gen_range(0..=max),
            self.rng.gen_range(0..=max),
        );
        if colour == self.previous {
            let channel = match self.rng.gen_range(0..3) {
                0 => &mut colour.0,
                1 => &mut colour.1,
                _ => &mut colour.2,
            };
            *channel = if *channel < max { *channel + 1 } else { *channel - 1 };
        }
        colour
    }
}

/// Triangular ramp 0→255→0 over `period_ms`.
fn triangle(phase_ms: u32, period_ms: u32) -> u8 {
    let pos = (phase_ms % period_ms) as u64;
    let half = period_ms as u64 / 2;
    if pos < half {
        ((pos * 255) / half) as u8
    } else {
        (((period_ms as u64 - pos) * 255) / half).min(255) as u8
    }
}
