//! Substitution and input classification.

use super::mapping::Mapping;
use crate::letter::Letter;

/// `letter`'s partner under `mapping`, or `letter` itself when unswapped.
pub fn substitute(mapping: &Mapping, letter: Letter) -> Letter {
    mapping.get(letter).unwrap_or(letter)
}

/// What an input character means to the plugboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputClass {
    Letter(Letter),
    /// `\n` or `\r`; silently skipped.
    LineTerminator,
    Invalid(char),
}

pub fn classify_input(c: char) -> InputClass {
    match c {
        '\n' | '\r' => InputClass::LineTerminator,
        _ => Letter::from_char(c).map_or(InputClass::Invalid(c), InputClass::Letter),
    }
}
