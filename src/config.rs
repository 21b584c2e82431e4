//! Badge configuration parameters
//!
//! Every calibration input the core consumes.  Values are loaded and stored
//! by an external non-volatile storage collaborator; this module only owns
//! the defaults, validation and the postcard wire form of the blob.

use serde::{Deserialize, Serialize};

use crate::drivers::colour::{LedMode, Spectrum};
use crate::drivers::keyers::KeyerKind;
use crate::error::{Error, Result};
use crate::keying::{BeaconMessage, DEFAULT_BEACON};
use crate::sensors::dose::DoseUnit;
use crate::sensors::rate::{IntegrationMode, WindowConfig, INFINITE_PERIOD_MS, MAX_BUCKETS};

/// Core badge configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BadgeConfig {
    // --- Dose calibration ---
    /// Tube conversion ratio in CPM per uSv/h (J-321 = 153.8)
    pub dose_ratio: f32,
    /// Tube dead time in microseconds (0 disables correction)
    pub dead_time_us: u32,
    /// Unit used for display and logging
    pub dose_unit: DoseUnit,

    // --- LED ---
    /// Dose (uSv/h) that maps to the top of the gradient
    pub rad_full_scale_usv_h: f32,
    /// Signal strength that maps to the top of the gradient
    pub rssi_full_scale: f32,
    /// Reference colour list for the gradient
    pub spectrum: Spectrum,
    /// Maximum per-channel intensity (0-255)
    pub led_max_intensity: u8,
    /// LED mode at boot
    pub led_mode: LedMode,
    /// Breathing period for pulse mode (milliseconds)
    pub pulse_period_ms: u32,

    // --- Rate estimation ---
    /// Windowed averaging or free-running cumulative count on the slow window
    pub integration: IntegrationMode,
    /// Short horizon window (~10 s)
    pub fast_window: WindowConfig,
    /// Long horizon window (~60 s)
    pub slow_window: WindowConfig,
    /// CPM log record interval (seconds)
    pub logging_period_secs: u32,

    // --- Keying ---
    /// CW speed in words per minute
    pub wpm: u16,
    /// Output used for the beacon
    pub keyer: KeyerKind,
    /// Side-tone frequency for the tone keyer (Hz)
    pub tone_hz: u32,
    /// Carrier frequency for the RF keyer (Hz)
    pub rf_carrier_hz: u32,
    /// Message sent when the beacon is triggered
    pub beacon_message: BeaconMessage,

    // --- Input ---
    /// Button debounce interval (milliseconds)
    pub debounce_ms: u32,
}

impl Default for BadgeConfig {
    fn default() -> Self {
        let mut beacon_message = BeaconMessage::new();
        // DEFAULT_BEACON is well inside the message capacity.
        let _ = beacon_message.push_str(DEFAULT_BEACON);

        Self {
            // Dose calibration
            dose_ratio: 153.8,
            dead_time_us: 800,
            dose_unit: DoseUnit::MicroSievertsPerHour,

            // LED: full magenta at 5.71 uSv/h (OSHA annual limit equivalent)
            rad_full_scale_usv_h: 5.71,
            rssi_full_scale: 127.0,
            spectrum: Spectrum::GreenToMagenta,
            led_max_intensity: 255,
            led_mode: LedMode::Radiation,
            pulse_period_ms: 4000,

            // Rate estimation
            integration: IntegrationMode::Windowed,
            fast_window: WindowConfig {
                bucket_ms: 200,
                buckets: 50,
            },
            slow_window: WindowConfig {
                bucket_ms: 5000,
                buckets: 12,
            },
            logging_period_secs: 60,

            // Keying
            wpm: 12,
            keyer: KeyerKind::Rf,
            tone_hz: 700,
            rf_carrier_hz: 1_000_000,
            beacon_message,

            // Input
            debounce_ms: 50,
        }
    }
}

impl BadgeConfig {
    /// Reject values that would make the core divide by zero or index past
    /// its fixed buffers.
    pub fn validate(&self) -> Result<()> {
        if !(self.dose_ratio.is_finite() && self.dose_ratio > 0.0) {
            return Err(Error::Config("dose_ratio must be positive"));
        }
        if !(self.rad_full_scale_usv_h.is_finite() && self.rad_full_scale_usv_h > 0.0) {
            return Err(Error::Config("rad_full_scale_usv_h must be positive"));
        }
        if !(self.rssi_full_scale.is_finite() && self.rssi_full_scale > 0.0) {
            return Err(Error::Config("rssi_full_scale must be positive"));
        }
        if self.led_max_intensity == 0 {
            return Err(Error::Config("led_max_intensity must be non-zero"));
        }
        Self::validate_window(
            &self.fast_window,
            "fast_window.bucket_ms must be a finite non-zero period",
            "fast_window.buckets out of range",
        )?;
        Self::validate_window(
            &self.slow_window,
            "slow_window.bucket_ms must be a finite non-zero period",
            "slow_window.buckets out of range",
        )?;
        if self.pulse_period_ms < 2 {
            return Err(Error::Config("pulse_period_ms too short"));
        }
        if self.logging_period_secs == 0 {
            return Err(Error::Config("logging_period_secs must be non-zero"));
        }
        if self.wpm == 0 {
            return Err(Error::Config("wpm must be non-zero"));
        }
        if self.tone_hz == 0 || self.rf_carrier_hz == 0 {
            return Err(Error::Config("keyer frequency must be non-zero"));
        }
        Ok(())
    }

    /// Free-running is selected by `integration` only, never by the
    /// sentinel period.
    fn validate_window(
        window: &WindowConfig,
        bad_period: &'static str,
        bad_capacity: &'static str,
    ) -> Result<()> {
        if window.bucket_ms == 0 || window.bucket_ms == INFINITE_PERIOD_MS {
            return Err(Error::Config(bad_period));
        }
        if window.buckets == 0 || window.buckets as usize > MAX_BUCKETS {
            return Err(Error::Config(bad_capacity));
        }
        Ok(())
    }

    /// Encode for the storage collaborator.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        postcard::to_allocvec(self).map_err(|_| Error::Config("encode failed"))
    }

    /// Decode a stored blob and validate it before handing it to the core.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let config: Self =
            postcard::from_bytes(bytes).map_err(|_| Error::Config("stored config corrupted"))?;
        config.validate()?;
        Ok(config)
    }
}
