//! Board configuration.
//!
//! Configuration comes from an optional TOML file, then command-line
//! overrides. Every key is optional:
//!
//! ```toml
//! lines = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15,
//!          17, 18, 19, 20, 21, 22, 26, 27, 28, 25]
//! threshold_ms = 2000
//! settle_us = 100
//! idle_ms = 10
//! conflict_policy = "first-detected"
//! wires = ["A-B", "C-X"]
//! ```
//!
//! `lines[i]` is the pin wired to the i-th letter. `wires` lists jumpers for
//! the simulated board.

use crate::api::Options;
use crate::engine::ConflictPolicy;
use crate::error::ConfigError;
use crate::letter::{LETTER_COUNT, Letter, PairKey};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Pin per letter on the reference board (A..Z). GP16 is not used.
pub const DEFAULT_PINS: [u8; LETTER_COUNT] =
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 17, 18, 19, 20, 21, 22, 26, 27, 28, 25];

/// Raw contents of a config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub lines: Option<Vec<u8>>,
    pub threshold_ms: Option<u64>,
    pub settle_us: Option<u64>,
    pub idle_ms: Option<u64>,
    pub conflict_policy: Option<ConflictPolicy>,
    pub wires: Option<Vec<String>>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| {
            tracing::warn!("Failed to read config at {:?}: {}", path, source);
            ConfigError::Read { path: path.to_path_buf(), source }
        })?;

        toml::from_str(&content).map_err(|source| {
            tracing::warn!("Failed to parse config at {:?}: {}", path, source);
            ConfigError::Parse { path: path.to_path_buf(), source }
        })
    }
}

/// Validated configuration, ready to build a board from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    pub pins: Vec<u8>,
    pub options: Options,
    pub wires: Vec<PairKey>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        BoardConfig { pins: DEFAULT_PINS.to_vec(), options: Options::default(), wires: Vec::new() }
    }
}

impl BoardConfig {
    /// Apply a file on top of the defaults and validate the result.
    pub fn from_file(file: FileConfig) -> Result<Self, ConfigError> {
        let mut config = BoardConfig::default();
        if let Some(lines) = file.lines {
            config.pins = lines;
        }
        if let Some(ms) = file.threshold_ms {
            config.options.threshold = Duration::from_millis(ms);
        }
        if let Some(us) = file.settle_us {
            config.options.settle = Duration::from_micros(us);
        }
        if let Some(ms) = file.idle_ms {
            config.options.idle = Duration::from_millis(ms);
        }
        if let Some(policy) = file.conflict_policy {
            config.options.policy = policy;
        }
        for wire in file.wires.unwrap_or_default() {
            config.wires.push(parse_wire(&wire)?);
        }
        config.validate()?;
        Ok(config)
    }

    /// Check the pin table: one distinct pin per letter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pins.len() != LETTER_COUNT {
            return Err(ConfigError::LineCount { found: self.pins.len() });
        }
        let assigned: Vec<(Letter, u8)> = Letter::all().zip(self.pins.iter().copied()).collect();
        for (i, &(second, pin)) in assigned.iter().enumerate() {
            if let Some(&(first, _)) = assigned[..i].iter().find(|(_, p)| *p == pin) {
                return Err(ConfigError::DuplicatePin { pin, first, second });
            }
        }
        Ok(())
    }

    /// Pin wired to `letter`.
    pub fn pin(&self, letter: Letter) -> Option<u8> {
        self.pins.get(letter.index()).copied()
    }
}

/// Parse a jumper such as `"A-B"`, `"a=b"` or `"Q:W"`.
pub fn parse_wire(text: &str) -> Result<PairKey, ConfigError> {
    let caps = regex!(r"^\s*([A-Za-z])\s*[-=:]\s*([A-Za-z])\s*$")
        .captures(text)
        .ok_or_else(|| ConfigError::InvalidWire(text.to_string()))?;

    let letter = |i: usize| caps.get(i).and_then(|m| m.as_str().chars().next()).and_then(Letter::from_char);
    match (letter(1), letter(2)) {
        (Some(a), Some(b)) => PairKey::new(a, b).ok_or_else(|| ConfigError::InvalidWire(text.to_string())),
        _ => Err(ConfigError::InvalidWire(text.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let file: FileConfig = toml::from_str("").unwrap();
        let config = BoardConfig::from_file(file).unwrap();
        assert_eq!(config, BoardConfig::default());
        assert_eq!(config.pins[16], 17);
        assert_eq!(config.pin(letter!(Z)), Some(25));
    }

    #[test]
    fn file_overrides_defaults() {
        let toml_str = r#"
lines = [30, 31, 32, 33, 34, 35, 36, 37, 38, 39, 40, 41, 42,
         43, 44, 45, 46, 47, 48, 49, 50, 51, 52, 53, 54, 55]
threshold_ms = 500
settle_us = 20
idle_ms = 1
conflict_policy = "reject-both"
wires = ["a-b", "X = C"]
"#;
        let file: FileConfig = toml::from_str(toml_str).unwrap();
        let config = BoardConfig::from_file(file).unwrap();

        assert_eq!(config.pins[0], 30);
        assert_eq!(config.options.threshold, Duration::from_millis(500));
        assert_eq!(config.options.settle, Duration::from_micros(20));
        assert_eq!(config.options.idle, Duration::from_millis(1));
        assert_eq!(config.options.policy, ConflictPolicy::RejectBoth);
        assert_eq!(config.wires, vec![pair!(A - B), pair!(C - X)]);
    }

    #[test]
    fn twenty_seven_lines_is_fatal() {
        let file = FileConfig { lines: Some((0..27).collect()), ..FileConfig::default() };
        let err = BoardConfig::from_file(file).unwrap_err();
        assert!(matches!(err, ConfigError::LineCount { found: 27 }));
        assert_eq!(err.to_string(), "27 line assignments given, 26 expected for A-Z");
    }

    #[test]
    fn duplicate_pins_are_fatal() {
        let mut lines = DEFAULT_PINS.to_vec();
        lines[25] = 0;
        let file = FileConfig { lines: Some(lines), ..FileConfig::default() };
        let err = BoardConfig::from_file(file).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicatePin { pin: 0, .. }));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<FileConfig>("treshold_ms = 5").is_err());
        assert!(toml::from_str::<FileConfig>("conflict_policy = \"random\"").is_err());
    }

    #[test]
    fn wires_parse() {
        assert_eq!(parse_wire("B-A").unwrap(), pair!(A - B));
        assert_eq!(parse_wire(" q : w ").unwrap(), pair!(Q - W));
        assert!(matches!(parse_wire("A-A"), Err(ConfigError::InvalidWire(_))));
        assert!(matches!(parse_wire("AB"), Err(ConfigError::InvalidWire(_))));
        assert!(matches!(parse_wire("A-1"), Err(ConfigError::InvalidWire(_))));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = FileConfig::load(Path::new("/nonexistent/plugboard.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
