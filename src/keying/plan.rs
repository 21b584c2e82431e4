//! Message → timed on/off steps.
//!
//! Timing follows the PARIS convention: one unit is `1200 / wpm` ms, a dash
//! is three units, the gap inside a character one unit, between characters
//! three units and between words seven.
//!
//! The plan is a cursor over the message rather than a materialised list, so
//! a transmission costs a few words of state no matter how long the text.
//! It yields strictly alternating levels: adjacent gaps are merged, and a
//! space replaces the inter-character gap before it rather than adding to
//! it.  Leading and trailing spaces become silence; the three-unit gap after
//! the final character is not emitted.

use super::code;

pub const DOT_UNITS: u32 = 1;
pub const DASH_UNITS: u32 = 3;
pub const SYMBOL_GAP_UNITS: u32 = 1;
pub const CHAR_GAP_UNITS: u32 = 3;
pub const WORD_GAP_UNITS: u32 = 7;

/// Word-rate derived unit length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    unit_ms: u32,
}

impl Timing {
    /// `1200 / wpm` milliseconds per unit; a zero rate is treated as 1 wpm.
    pub fn from_wpm(wpm: u16) -> Self {
        Self {
            unit_ms: 1200 / u32::from(wpm.max(1)),
        }
    }

    pub fn unit_ms(self) -> u32 {
        self.unit_ms
    }

    fn ms(self, units: u32) -> u32 {
        units * self.unit_ms
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalLevel {
    On,
    Off,
}

/// One (level, duration) pair of the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyStep {
    pub level: SignalLevel,
    pub duration_ms: u32,
}

/// Resumable position within a message.
#[derive(Debug, Clone)]
pub struct KeyingPlan {
    timing: Timing,
    /// Byte offset of the next unread character.
    pos: usize,
    /// Pattern of the character being keyed.
    code: Option<&'static str>,
    /// Next element within `code`.
    element: usize,
    symbol_gap_due: bool,
    /// Silence owed before the next keyed character.
    gap_units: u32,
    /// `gap_units` includes at least one space.
    word_gap: bool,
}

impl KeyingPlan {
    pub fn new(timing: Timing) -> Self {
        Self {
            timing,
            pos: 0,
            code: None,
            element: 0,
            symbol_gap_due: false,
            gap_units: 0,
            word_gap: false,
        }
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    /// Rewind to the start of the message.
    pub fn restart(&mut self) {
        *self = Self::new(self.timing);
    }

    /// Next step of `message`.  The same message must be passed on every
    /// call until the plan is restarted.
    pub fn next_step(&mut self, message: &str) -> Option<KeyStep> {
        loop {
            if let Some(pattern) = self.code {
                if let Some(&element) = pattern.as_bytes().get(self.element) {
                    if self.symbol_gap_due {
                        self.symbol_gap_due = false;
                        return Some(self.off(SYMBOL_GAP_UNITS));
                    }
                    self.element += 1;
                    self.symbol_gap_due = true;
                    let units = if element == b'-' { DASH_UNITS } else { DOT_UNITS };
                    return Some(self.on(units));
                }
                self.code = None;
                self.gap_units = CHAR_GAP_UNITS;
                self.word_gap = false;
                continue;
            }

            let Some(c) = message.get(self.pos..).and_then(|rest| rest.chars().next()) else {
                if self.word_gap && self.gap_units > 0 {
                    return Some(self.take_gap());
                }
                return None;
            };
            self.pos += c.len_utf8();

            if c == ' ' {
                self.gap_units = if self.word_gap {
                    self.gap_units + WORD_GAP_UNITS
                } else {
                    WORD_GAP_UNITS
                };
                self.word_gap = true;
                continue;
            }

            if let Some(pattern) = code::lookup(c) {
                self.code = Some(pattern);
                self.element = 0;
                self.symbol_gap_due = false;
                if self.gap_units > 0 {
                    return Some(self.take_gap());
                }
            }
        }
    }

    fn take_gap(&mut self) -> KeyStep {
        let units = core::mem::take(&mut self.gap_units);
        self.word_gap = false;
        self.off(units)
    }

    fn on(&self, units: u32) -> KeyStep {
        KeyStep {
            level: SignalLevel::On,
            duration_ms: self.timing.ms(units),
        }
    }

    fn off(&self, units: u32) -> KeyStep {
        KeyStep {
            level: SignalLevel::Off,
            duration_ms: self.timing.ms(units),
        }
    }
}

/// Iterator over every step of a message.
pub struct Steps<'a> {
    message: &'a str,
    plan: KeyingPlan,
}

impl<'a> Steps<'a> {
    pub fn new(message: &'a str, timing: Timing) -> Self {
        Self {
            message,
            plan: KeyingPlan::new(timing),
        }
    }
}

impl Iterator for Steps<'_> {
    type Item = KeyStep;

    fn next(&mut self) -> Option<KeyStep> {
        self.plan.next_step(self.message)
    }
}
