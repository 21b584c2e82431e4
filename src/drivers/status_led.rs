//! RGB status LED driver.
//!
//! Three PWM channels drive the discrete R/G/B dies of the badge LED.  Any
//! `embedded_hal::pwm::SetDutyCycle` works: LEDC channels on target, a
//! recording mock in tests.

use embedded_hal::pwm::SetDutyCycle;
use log::warn;

use super::colour::Rgb;

pub struct StatusLed<R, G, B> {
    red: R,
    green: G,
    blue: B,
    current: Rgb,
}

impl<R, G, B> StatusLed<R, G, B>
where
    R: SetDutyCycle,
    G: SetDutyCycle,
    B: SetDutyCycle,
{
    pub fn new(red: R, green: G, blue: B) -> Self {
        let mut led = Self {
            red,
            green,
            blue,
            current: (0, 0, 0),
        };
        led.off();
        led
    }

    pub fn set_colour(&mut self, colour: Rgb) {
        let (r, g, b) = colour;
        if self.red.set_duty_cycle_fraction(r as u16, 255).is_err()
            | self.green.set_duty_cycle_fraction(g as u16, 255).is_err()
            | self.blue.set_duty_cycle_fraction(b as u16, 255).is_err()
        {
            warn!("status LED: PWM write failed for {:?}", colour);
        }
        self.current = colour;
    }

    pub fn off(&mut self) {
        self.set_colour((0, 0, 0));
    }

    pub fn current_colour(&self) -> Rgb {
        self.current
    }

    /// Release the channels (red, green, blue).
    pub fn into_channels(self) -> (R, G, B) {
        (self.red, self.green, self.blue)
    }
}
