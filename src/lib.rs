//! Plugboard continuity detection.
//!
//! Twenty-six bidirectional lines, one per letter, are probed pairwise for
//! electrical continuity. Connections that hold for the debounce threshold
//! become swaps in a symmetric letter mapping, and input letters are
//! substituted through that mapping.
//!
//! ```
//! use plugboard::{LineBank, ManualClock, Options, Plugboard, RecordedDelay, SimBoard};
//!
//! let board = SimBoard::new();
//! let clock = ManualClock::new(0);
//! let opts = Options::default();
//! let pins: Vec<u8> = (0..26).collect();
//! let bank = LineBank::from_pins(board.clone(), RecordedDelay::default(), &pins, opts.settle).unwrap();
//! let mut plugboard = Plugboard::new(bank, clock.clone(), &opts);
//!
//! board.connect(0, 1); // jumper A-B
//! plugboard.refresh().unwrap();
//! clock.advance(2_500);
//! let report = plugboard.refresh().unwrap();
//!
//! assert!(report.change.is_some());
//! assert_eq!(plugboard.substitute(plugboard::Letter::from_char('a').unwrap()).as_char(), 'B');
//! ```

#[macro_use]
mod macros;
mod api;
mod config;
mod engine;
mod error;
mod letter;
mod sim;

pub use api::{DEFAULT_IDLE, DEFAULT_SETTLE, InputSource, Notification, Options, Plugboard, ScanReport, Sink};
pub use config::{BoardConfig, DEFAULT_PINS, FileConfig, parse_wire};
pub use engine::{
    Clock, ConflictPolicy, DEFAULT_THRESHOLD, DebounceTracker, Delay, InputClass, Level, LineBank, LineDriver,
    LineMode, ManualClock, Mapping, MappingChange, MappingStore, MonotonicClock, ScanMetrics, ScanOutcome, StablePair,
    ThreadDelay, classify_input, probe, scan, substitute,
};
pub use error::{ConfigError, LineError};
pub use letter::{LETTER_COUNT, Letter, LetterSet, PAIR_COUNT, PairKey};
pub use sim::{RecordedDelay, SimBoard};
