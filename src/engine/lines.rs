//! Line bank: the 26 bidirectional letter lines.
//!
//! Each letter is bound to one physical pin. A pin is either a pulled-up
//! input (idle, reads `High` unless something pulls it down) or an output
//! driven `Low`. The bank is the only owner of the pins; the scanner borrows
//! it mutably for the duration of a scan.
//!
//! ## Invariants
//!
//! - At most one line is in `OutputLow` at any instant. `set_output_low`
//!   refuses to drive a second line while another is still driven.
//! - Every mode change is followed by the settle delay before returning, so
//!   a subsequent `read` observes the settled level.

use crate::error::{ConfigError, LineError};
use crate::letter::{LETTER_COUNT, Letter, LetterSet};
use std::time::Duration;

/// Electrical mode of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineMode {
    InputPullUp,
    OutputLow,
}

/// Level sampled from an input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    High,
    Low,
}

/// Digital I/O capability the bank drives. Implemented by real GPIO
/// backends and by [`crate::SimBoard`].
pub trait LineDriver {
    fn set_mode(&mut self, pin: u8, mode: LineMode);
    fn read(&self, pin: u8) -> Level;
}

/// Blocking wait used for settle and idle delays.
pub trait Delay {
    fn delay(&mut self, duration: Duration);
}

/// Sleeps the current thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadDelay;

impl Delay for ThreadDelay {
    fn delay(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[derive(Debug)]
pub struct LineBank<D, W> {
    driver: D,
    delay: W,
    pins: [Option<u8>; LETTER_COUNT],
    assigned: LetterSet,
    /// The single line currently driven low, if any.
    driven: Option<Letter>,
    settle: Duration,
}

impl<D: LineDriver, W: Delay> LineBank<D, W> {
    /// Bind `pins[i]` to the i-th letter. Exactly 26 distinct pins are
    /// required.
    pub fn from_pins(driver: D, delay: W, pins: &[u8], settle: Duration) -> Result<Self, ConfigError> {
        if pins.len() != LETTER_COUNT {
            return Err(ConfigError::LineCount { found: pins.len() });
        }
        Self::with_assignments(driver, delay, Letter::all().zip(pins.iter().copied()), settle)
    }

    /// Bind an arbitrary subset of letters. Letters left out have no line:
    /// they are skipped by the scanner and reported as unassigned on input.
    pub fn with_assignments(
        driver: D,
        delay: W,
        assignments: impl IntoIterator<Item = (Letter, u8)>,
        settle: Duration,
    ) -> Result<Self, ConfigError> {
        let mut pins = [None; LETTER_COUNT];
        let mut assigned = LetterSet::empty();

        for (letter, pin) in assignments {
            if let Some(first) = Letter::all().find(|l| pins[l.index()] == Some(pin) && *l != letter) {
                return Err(ConfigError::DuplicatePin { pin, first, second: letter });
            }
            pins[letter.index()] = Some(pin);
            assigned.insert_letter(letter);
        }

        let mut bank = LineBank { driver, delay, pins, assigned, driven: None, settle };
        for pin in bank.pins.iter().flatten() {
            bank.driver.set_mode(*pin, LineMode::InputPullUp);
        }
        bank.delay.delay(bank.settle);
        Ok(bank)
    }

    /// Drive `letter` low and wait for it to settle.
    pub fn set_output_low(&mut self, letter: Letter) -> Result<(), LineError> {
        let pin = self.pin_of(letter)?;
        if let Some(driven) = self.driven.filter(|d| *d != letter) {
            return Err(LineError::AlreadyDriven { driven, requested: letter });
        }
        self.driver.set_mode(pin, LineMode::OutputLow);
        self.driven = Some(letter);
        self.delay.delay(self.settle);
        Ok(())
    }

    /// Return `letter` to a pulled-up input and wait for it to settle.
    pub fn set_input_pull_up(&mut self, letter: Letter) -> Result<(), LineError> {
        let pin = self.pin_of(letter)?;
        self.driver.set_mode(pin, LineMode::InputPullUp);
        if self.driven == Some(letter) {
            self.driven = None;
        }
        self.delay.delay(self.settle);
        Ok(())
    }

    /// Sample `letter`. Only valid while the line is an input.
    pub fn read(&self, letter: Letter) -> Result<Level, LineError> {
        let pin = self.pin_of(letter)?;
        if self.driven == Some(letter) {
            return Err(LineError::NotInput(letter));
        }
        Ok(self.driver.read(pin))
    }

    pub fn pin(&self, letter: Letter) -> Option<u8> {
        self.pins[letter.index()]
    }

    /// Letters with a bound line.
    pub fn assigned(&self) -> LetterSet {
        self.assigned
    }

    pub fn is_assigned(&self, letter: Letter) -> bool {
        self.assigned.contains_letter(letter)
    }

    pub fn driven(&self) -> Option<Letter> {
        self.driven
    }

    pub fn settle(&self) -> Duration {
        self.settle
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub(crate) fn pause(&mut self, duration: Duration) {
        self.delay.delay(duration);
    }

    fn pin_of(&self, letter: Letter) -> Result<u8, LineError> {
        self.pin(letter).ok_or(LineError::Unassigned(letter))
    }
}
