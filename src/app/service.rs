//! Application service: the badge's domain core.
//!
//! [`BadgeService`] owns the rate windows, colour mapper and CW sender.
//! The main loop feeds it the clock and the pulse counter once per tick
//! and applies the returned [`BadgeSnapshot`] to the LED.
//!
//! ```text
//!  PulseCounter ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                   │      BadgeService       │
//!   AppCommand ───▶ │ Rates · Dose · Colour   │ ──▶ KeyActuator
//!                   └────────────────────────┘
//! ```

use log::{debug, info, warn};

use crate::config::BadgeConfig;
use crate::drivers::colour::{ColourMapper, LedMode, Rgb};
use crate::error::Result;
use crate::keying::{KeyingState, MorseSender};
use crate::sensors::dose::{self, DoseReading, DoseUnit};
use crate::sensors::geiger::PulseCounter;
use crate::sensors::rate::{RateEstimator, Rates};

use super::commands::AppCommand;
use super::events::{AppEvent, LogRecord};
use super::ports::{EventSink, KeyActuator};

/// What one tick produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BadgeSnapshot {
    pub rates: Rates,
    /// Dead-time corrected display rate.
    pub cpm: f32,
    /// Display dose in the selected unit.
    pub dose: DoseReading,
    /// Colour for the status LED.
    pub colour: Rgb,
    pub keying: KeyingState,
}

pub struct BadgeService<A> {
    config: BadgeConfig,
    rates: RateEstimator,
    mapper: ColourMapper,
    sender: MorseSender<A>,
    led_mode: LedMode,
    dose_unit: DoseUnit,
    signal_strength: f32,
    period_start_ms: u32,
    period_pulses: u32,
    tick_count: u64,
}

impl<A: KeyActuator> BadgeService<A> {
    /// Validate `config` and build the service.  `seed` feeds the random
    /// LED mode only.
    pub fn new(config: BadgeConfig, actuator: A, now_ms: u32, seed: u64) -> Result<Self> {
        config.validate()?;
        let sender = MorseSender::new(&config.beacon_message, config.wpm, actuator)?;
        Ok(Self {
            rates: RateEstimator::new(
                config.fast_window,
                config.slow_window,
                config.integration,
                now_ms,
            ),
            mapper: ColourMapper::new(&config, seed),
            sender,
            led_mode: config.led_mode,
            dose_unit: config.dose_unit,
            signal_strength: 0.0,
            period_start_ms: now_ms,
            period_pulses: 0,
            tick_count: 0,
            config,
        })
    }

    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started {
            led_mode: self.led_mode,
            unit: self.dose_unit,
        });
        info!(
            "BadgeService started: led={:?} unit={} ratio={}",
            self.led_mode,
            self.dose_unit.label(),
            self.config.dose_ratio
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Drain pulses, update the windows, pick a colour, advance the beacon
    /// and emit the periodic dose record when it is due.
    pub fn tick(
        &mut self,
        now_ms: u32,
        counter: &PulseCounter,
        sink: &mut impl EventSink,
    ) -> BadgeSnapshot {
        self.tick_count += 1;

        let drained = self.rates.poll(now_ms, counter);
        self.period_pulses = self.period_pulses.saturating_add(drained);
        let rates = self.rates.rates();

        // The slow window is the display rate unless it is free-running.
        let display = rates
            .slow
            .per_minute()
            .or(rates.fast.per_minute())
            .unwrap_or(0);
        let cpm = dose::dead_time_corrected(display, self.config.dead_time_us);
        let reading = DoseReading::new(cpm, self.config.dose_ratio, self.dose_unit);

        let led_input = match self.led_mode {
            LedMode::Rssi => self.signal_strength,
            _ => {
                let fast = rates.fast.per_minute().unwrap_or(0);
                dose::to_dose(
                    dose::dead_time_corrected(fast, self.config.dead_time_us),
                    self.config.dose_ratio,
                    DoseUnit::MicroSievertsPerHour,
                )
            }
        };
        let colour = self.mapper.sample(led_input, self.led_mode, now_ms);

        self.log_if_due(now_ms, sink);

        let was_active = self.sender.state().is_active();
        let keying = self.sender.poll(now_ms);
        if was_active && keying == KeyingState::MessageComplete {
            sink.emit(&AppEvent::MessageComplete { aborted: false });
        }

        BadgeSnapshot {
            rates,
            cpm,
            dose: reading,
            colour,
            keying,
        }
    }

    // ── Command handling ──────────────────────────────────────

    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        now_ms: u32,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        match cmd {
            AppCommand::CycleLedMode => self.set_led_mode(self.led_mode.next(), sink),
            AppCommand::SetLedMode(mode) => self.set_led_mode(mode, sink),
            AppCommand::CycleDoseUnit => self.set_dose_unit(self.dose_unit.next(), sink),
            AppCommand::SetDoseUnit(unit) => self.set_dose_unit(unit, sink),
            AppCommand::ToggleBeacon => {
                if self.sender.state().is_active() {
                    self.abort_beacon(sink);
                } else {
                    self.start_beacon(now_ms, sink);
                }
            }
            AppCommand::StartBeacon => self.start_beacon(now_ms, sink),
            AppCommand::AbortBeacon => self.abort_beacon(sink),
            AppCommand::SetSignalStrength(level) => self.signal_strength = level,
            AppCommand::UpdateConfig(config) => self.apply_config(config, now_ms, sink)?,
        }
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn led_mode(&self) -> LedMode {
        self.led_mode
    }

    pub fn dose_unit(&self) -> DoseUnit {
        self.dose_unit
    }

    pub fn keying_state(&self) -> KeyingState {
        self.sender.state()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn config(&self) -> &BadgeConfig {
        &self.config
    }

    pub fn actuator(&self) -> &A {
        self.sender.actuator()
    }

    pub fn actuator_mut(&mut self) -> &mut A {
        self.sender.actuator_mut()
    }

    // ── Internal ──────────────────────────────────────────────

    fn log_if_due(&mut self, now_ms: u32, sink: &mut impl EventSink) {
        let period_ms = self.config.logging_period_secs.saturating_mul(1000);
        let elapsed = now_ms.wrapping_sub(self.period_start_ms);
        if elapsed < period_ms {
            return;
        }
        let cpm = (u64::from(self.period_pulses) * 60_000 / u64::from(elapsed.max(1))) as u32;
        let corrected = dose::dead_time_corrected(cpm, self.config.dead_time_us);
        sink.emit(&AppEvent::DoseLogged(LogRecord {
            uptime_ms: now_ms,
            cpm,
            dose: DoseReading::new(corrected, self.config.dose_ratio, self.dose_unit),
        }));
        self.period_pulses = 0;
        self.period_start_ms = now_ms;
    }

    fn set_led_mode(&mut self, mode: LedMode, sink: &mut impl EventSink) {
        if mode != self.led_mode {
            self.led_mode = mode;
            sink.emit(&AppEvent::LedModeChanged(mode));
        }
    }

    fn set_dose_unit(&mut self, unit: DoseUnit, sink: &mut impl EventSink) {
        if unit != self.dose_unit {
            self.dose_unit = unit;
            sink.emit(&AppEvent::DoseUnitChanged(unit));
        }
    }

    fn start_beacon(&mut self, now_ms: u32, sink: &mut impl EventSink) {
        if self.sender.state() == KeyingState::MessageComplete {
            self.sender.rearm();
        }
        if self.sender.start(now_ms) {
            sink.emit(&AppEvent::MessageStarted);
        } else {
            debug!("beacon already keying");
        }
    }

    fn abort_beacon(&mut self, sink: &mut impl EventSink) {
        if self.sender.state().is_active() {
            self.sender.abort();
            sink.emit(&AppEvent::MessageComplete { aborted: true });
        }
    }

    fn apply_config(
        &mut self,
        config: BadgeConfig,
        now_ms: u32,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        if let Err(e) = config.validate() {
            warn!("config update rejected: {}", e);
            return Err(e);
        }
        self.abort_beacon(sink);
        self.sender.reconfigure(&config.beacon_message, config.wpm)?;
        self.rates = RateEstimator::new(
            config.fast_window,
            config.slow_window,
            config.integration,
            now_ms,
        );
        self.mapper.apply_config(&config);
        self.set_led_mode(config.led_mode, sink);
        self.set_dose_unit(config.dose_unit, sink);
        self.period_start_ms = now_ms;
        self.period_pulses = 0;
        self.config = config;
        info!("Configuration updated at runtime");
        Ok(())
    }
}
