use crate::Letter;
use std::path::PathBuf;
use thiserror::Error;

/// Invalid startup configuration. Always fatal: there is no usable partial
/// configuration of the board.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse { path: PathBuf, source: toml::de::Error },
    #[error("{found} line assignments given, 26 expected for A-Z")]
    LineCount { found: usize },
    #[error("pin {pin} is assigned to both {first} and {second}")]
    DuplicatePin { pin: u8, first: Letter, second: Letter },
    #[error("invalid wire '{0}' (expected two different letters, e.g. \"A-B\")")]
    InvalidWire(String),
    #[error("unknown conflict policy '{0}' (expected \"first-detected\" or \"reject-both\")")]
    InvalidPolicy(String),
}

/// Misuse of the line bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LineError {
    #[error("letter {0} has no assigned line")]
    Unassigned(Letter),
    #[error("cannot drive {requested}: line {driven} is still driven low")]
    AlreadyDriven { driven: Letter, requested: Letter },
    #[error("line {0} is driven and cannot be read")]
    NotInput(Letter),
}
