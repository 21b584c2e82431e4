//! QCC badge firmware: main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                   │
//! │                                                            │
//! │  GM tube ISR      LEDC RGB LED     Keyer (RF/tone/light)   │
//! │  (PulseCounter)   (StatusLed)      (KeyActuator)           │
//! │  Buttons          LogEventSink     MonotonicClock          │
//! │                                                            │
//! │  ─────────────── Port Trait Boundary ──────────────────    │
//! │                                                            │
//! │  ┌──────────────────────────────────────────────────────┐  │
//! │  │            BadgeService (pure logic)                 │  │
//! │  │  Rates · Dose · Colour · CW beacon                   │  │
//! │  └──────────────────────────────────────────────────────┘  │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Single cooperative loop: sample buttons, tick the service, push the
//! colour to the LED, sleep one loop period.  The tube ISR is the only
//! other execution context.
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{AnyIOPin, AnyOutputPin, Input, PinDriver, Pull};
use esp_idf_hal::ledc::config::TimerConfig;
use esp_idf_hal::ledc::{LedcDriver, LedcTimerDriver, Resolution};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;
use esp_idf_svc::sys::{self, esp, EspError};
use log::{info, warn};

use qccbadge::adapters::log_sink::LogEventSink;
use qccbadge::adapters::time::MonotonicClock;
use qccbadge::app::commands::command_for;
use qccbadge::app::ports::KeyActuator;
use qccbadge::app::service::BadgeService;
use qccbadge::config::BadgeConfig;
use qccbadge::drivers::button::{Button, ButtonDriver};
use qccbadge::drivers::keyers::{KeyerKind, LightKeyer, RfKeyer, ToneKeyer};
use qccbadge::drivers::status_led::StatusLed;
use qccbadge::error::Error;
use qccbadge::pins;
use qccbadge::sensors::geiger::{gm_isr_handler, GM_PULSES};

/// Tone keyer duty, percent.  50 is the loudest square wave.
const TONE_VOLUME_PERCENT: u8 = 25;

/// LED PWM frequency.
const LED_PWM_HZ: u32 = 5_000;

// ── GM tube interrupt ─────────────────────────────────────────

unsafe extern "C" fn gm_isr(_arg: *mut core::ffi::c_void) {
    gm_isr_handler();
}

/// Configure the tube line as a pulled-up falling-edge interrupt source.
///
/// # Safety
///
/// Call once from `main()` before the loop starts.
unsafe fn install_gm_isr(pin: i32) -> Result<(), EspError> {
    let cfg = sys::gpio_config_t {
        pin_bit_mask: 1u64 << pin,
        mode: sys::gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: sys::gpio_pullup_t_GPIO_PULLUP_ENABLE,
        pull_down_en: sys::gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: sys::gpio_int_type_t_GPIO_INTR_NEGEDGE,
    };
    esp!(unsafe { sys::gpio_config(&cfg) })?;

    // Already installed is fine (another driver may have done it).
    let ret = unsafe { sys::gpio_install_isr_service(0) };
    if ret != sys::ESP_ERR_INVALID_STATE as i32 {
        esp!(ret)?;
    }
    esp!(unsafe { sys::gpio_isr_handler_add(pin, Some(gm_isr), core::ptr::null_mut()) })?;
    info!("GM tube ISR on GPIO{}", pin);
    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────

/// Widest duty resolution the 80 MHz LEDC clock allows at `hz`.
fn resolution_for(hz: u32) -> Resolution {
    match hz {
        0..=10_000 => Resolution::Bits10,
        10_001..=300_000 => Resolution::Bits8,
        _ => Resolution::Bits6,
    }
}

type ButtonPin = PinDriver<'static, AnyIOPin, Input>;

fn button(gpio: i32, which: Button, debounce_ms: u32) -> Result<ButtonDriver<ButtonPin>> {
    // SAFETY: every GPIO number in `pins` is used exactly once.
    let mut pin = PinDriver::input(unsafe { AnyIOPin::new(gpio) })?;
    pin.set_pull(Pull::Up)?;
    Ok(ButtonDriver::new(pin, which, debounce_ms))
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    sys::link_patches();
    esp_idf_logger::init()?;

    info!("QCC badge v{}", env!("CARGO_PKG_VERSION"));

    let peripherals = Peripherals::take().map_err(|_| Error::Init("peripherals already taken"))?;
    let clock = MonotonicClock::new();

    // ── 2. Configuration ──────────────────────────────────────
    let config = BadgeConfig::default();
    config.validate()?;
    match serde_json::to_string(&config) {
        Ok(json) => info!("config: {}", json),
        Err(e) => warn!("config: json encode failed: {}", e),
    }

    // ── 3. Tube interrupt ─────────────────────────────────────
    // SAFETY: single call at boot, before any pulse is consumed.
    unsafe { install_gm_isr(pins::GM_TUBE_GPIO)? };

    // ── 4. Status LED ─────────────────────────────────────────
    let led_timer = LedcTimerDriver::new(
        peripherals.ledc.timer0,
        &TimerConfig::new()
            .frequency(Hertz(LED_PWM_HZ))
            .resolution(Resolution::Bits8),
    )?;
    // SAFETY: LED pins are not used anywhere else.
    let (led_r, led_g, led_b) = unsafe {
        (
            AnyOutputPin::new(pins::LED_R_GPIO),
            AnyOutputPin::new(pins::LED_G_GPIO),
            AnyOutputPin::new(pins::LED_B_GPIO),
        )
    };
    let mut led = StatusLed::new(
        LedcDriver::new(peripherals.ledc.channel0, &led_timer, led_r)?,
        LedcDriver::new(peripherals.ledc.channel1, &led_timer, led_g)?,
        LedcDriver::new(peripherals.ledc.channel2, &led_timer, led_b)?,
    );

    // ── 5. Keyer ──────────────────────────────────────────────
    let keyer: Box<dyn KeyActuator> = match config.keyer {
        KeyerKind::Rf | KeyerKind::Tone => {
            let hz = if config.keyer == KeyerKind::Rf {
                config.rf_carrier_hz
            } else {
                config.tone_hz
            };
            let timer = LedcTimerDriver::new(
                peripherals.ledc.timer1,
                &TimerConfig::new()
                    .frequency(Hertz(hz))
                    .resolution(resolution_for(hz)),
            )?;
            // SAFETY: antenna pin is only driven by this channel.
            let pin = unsafe { AnyOutputPin::new(pins::ANTENNA_GPIO) };
            let pwm = LedcDriver::new(peripherals.ledc.channel3, timer, pin)?;
            if config.keyer == KeyerKind::Rf {
                Box::new(RfKeyer::new(pwm))
            } else {
                Box::new(ToneKeyer::new(pwm, TONE_VOLUME_PERCENT))
            }
        }
        KeyerKind::Light => {
            // SAFETY: SAO GPIO1 is only driven by the light keyer.
            let pin = PinDriver::output(unsafe { AnyOutputPin::new(pins::SAO_GPIO1) })?;
            Box::new(LightKeyer::new(pin))
        }
    };
    info!("keyer: {:?} at {} wpm", config.keyer, config.wpm);

    // ── 6. Buttons ────────────────────────────────────────────
    let mut buttons = [
        button(pins::VOL_UP_GPIO, Button::VolumeUp, config.debounce_ms)?,
        button(pins::VOL_DOWN_GPIO, Button::VolumeDown, config.debounce_ms)?,
        button(pins::SEEK_GPIO, Button::Seek, config.debounce_ms)?,
    ];

    // ── 7. App service ────────────────────────────────────────
    let mut log_sink = LogEventSink::new();
    // SAFETY: esp_random has no preconditions.
    let seed = u64::from(unsafe { sys::esp_random() });
    let mut app = BadgeService::new(config, keyer, clock.uptime_ms(), seed)?;
    app.start(&mut log_sink);

    info!("System ready. Entering main loop.");

    // ── 8. Main loop ──────────────────────────────────────────
    loop {
        let now_ms = clock.uptime_ms();

        for btn in &mut buttons {
            if let Some(event) = btn.tick(now_ms) {
                if let Err(e) = app.handle_command(command_for(event), now_ms, &mut log_sink) {
                    warn!("command from {:?} failed: {}", btn.button(), e);
                }
            }
        }

        let snapshot = app.tick(now_ms, &GM_PULSES, &mut log_sink);
        led.set_colour(snapshot.colour);

        FreeRtos::delay_ms(pins::LOOP_PERIOD_MS);
    }
}
