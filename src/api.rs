use crate::engine::{
    self, Clock, ConflictPolicy, DEFAULT_THRESHOLD, DebounceTracker, Delay, InputClass, LineBank, LineDriver, Mapping,
    MappingChange, MappingStore, ScanMetrics, StablePair,
};
use crate::error::LineError;
use crate::letter::{Letter, PairKey};
use std::collections::BTreeSet;
use std::convert::Infallible;
use std::fmt;
use std::time::Duration;

/// Default wait after every line mode switch.
pub const DEFAULT_SETTLE: Duration = Duration::from_micros(100);

/// Default end-of-iteration sleep of the control loop.
pub const DEFAULT_IDLE: Duration = Duration::from_millis(10);

/// Timing and policy knobs for a [`Plugboard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// How long a pair must stay connected before it becomes a swap.
    pub threshold: Duration,
    /// Wait after each line mode switch before sampling.
    pub settle: Duration,
    /// Sleep at the end of every control loop iteration.
    pub idle: Duration,
    pub policy: ConflictPolicy,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            threshold: DEFAULT_THRESHOLD,
            settle: DEFAULT_SETTLE,
            idle: DEFAULT_IDLE,
            policy: ConflictPolicy::default(),
        }
    }
}

/// Non-blocking source of input characters.
pub trait InputSource {
    /// The next pending character, or `None` if nothing is waiting.
    fn poll_char(&mut self) -> Option<char>;
}

/// Receives everything the plugboard reports.
pub trait Sink {
    fn notify(&mut self, notification: &Notification);
}

impl Sink for Vec<Notification> {
    fn notify(&mut self, notification: &Notification) {
        self.push(notification.clone());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    MappingChanged(MappingChange),
    Substituted { input: Letter, output: Letter },
    Unassigned(Letter),
    InvalidInput(char),
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::MappingChanged(change) => {
                write!(f, "--- Plugboard mapping updated ---")?;
                if change.pairs.is_empty() {
                    write!(f, "\n  No swaps active.")?;
                }
                for key in &change.pairs {
                    write!(f, "\n  {} is now {}", key.lo(), key.hi())?;
                }
                Ok(())
            }
            Notification::Substituted { input, output } => write!(f, "Input: {input}, Output: {output}"),
            Notification::Unassigned(letter) => write!(f, "WARNING: letter '{letter}' has no assigned line."),
            Notification::InvalidInput(c) => {
                write!(f, "Invalid input: '{}'. Only letters A-Z are accepted.", c.escape_debug())
            }
        }
    }
}

/// Result of one refresh cycle.
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Pairs seen connected by this scan.
    pub connected: BTreeSet<PairKey>,
    /// Pairs past the debounce threshold.
    pub stable: Vec<StablePair>,
    /// Set when the mapping differs from the previous cycle.
    pub change: Option<MappingChange>,
    /// Timestamp the tracker was updated with.
    pub now_ms: u64,
    pub metrics: ScanMetrics,
}

/// The plugboard core: owns the line bank and all detection state.
///
/// ```text
/// loop {
///     refresh()            scan -> debounce -> rebuild mapping
///     poll one input char  substitute through the current mapping
///     sleep(idle)
/// }
/// ```
#[derive(Debug)]
pub struct Plugboard<D, W, C> {
    bank: LineBank<D, W>,
    tracker: DebounceTracker,
    store: MappingStore,
    clock: C,
    idle: Duration,
}

impl<D: LineDriver, W: Delay, C: Clock> Plugboard<D, W, C> {
    /// Wrap a bank. The bank's own settle delay is used for probing;
    /// `options.settle` only matters when building the bank.
    pub fn new(bank: LineBank<D, W>, clock: C, options: &Options) -> Self {
        Plugboard {
            bank,
            tracker: DebounceTracker::new(options.threshold),
            store: MappingStore::new(options.policy),
            clock,
            idle: options.idle,
        }
    }

    /// Run one scan, feed it to the debounce tracker, and rebuild the mapping.
    pub fn refresh(&mut self) -> Result<ScanReport, LineError> {
        let outcome = engine::scan(&mut self.bank)?;
        let now_ms = self.clock.now_ms();
        let stable = self.tracker.update(&outcome.connected, now_ms);
        let change = self.store.rebuild(&stable);

        tracing::trace!(
            probes = outcome.metrics.probes,
            connected = outcome.metrics.connected,
            stable = stable.len(),
            elapsed = ?outcome.metrics.elapsed,
            "scan complete"
        );

        Ok(ScanReport { connected: outcome.connected, stable, change, now_ms, metrics: outcome.metrics })
    }

    /// Substitute one input character. Line terminators produce nothing.
    pub fn process_input(&self, c: char) -> Option<Notification> {
        match engine::classify_input(c) {
            InputClass::LineTerminator => None,
            InputClass::Invalid(c) => {
                tracing::debug!(input = ?c, "invalid input character");
                Some(Notification::InvalidInput(c))
            }
            InputClass::Letter(letter) if !self.bank.is_assigned(letter) => {
                tracing::warn!(%letter, "letter has no assigned line");
                Some(Notification::Unassigned(letter))
            }
            InputClass::Letter(input) => {
                Some(Notification::Substituted { input, output: engine::substitute(self.store.mapping(), input) })
            }
        }
    }

    /// One loop iteration without the idle sleep: refresh, then handle at
    /// most one pending input character.
    pub fn step(&mut self, source: &mut impl InputSource, sink: &mut impl Sink) -> Result<ScanReport, LineError> {
        let report = self.refresh()?;
        if let Some(change) = &report.change {
            sink.notify(&Notification::MappingChanged(change.clone()));
        }
        if let Some(notification) = source.poll_char().and_then(|c| self.process_input(c)) {
            sink.notify(&notification);
        }
        Ok(report)
    }

    /// Run the control loop until a line error stops it.
    pub fn run(&mut self, source: &mut impl InputSource, sink: &mut impl Sink) -> Result<Infallible, LineError> {
        tracing::info!(threshold = ?self.tracker.threshold(), policy = %self.store.policy(), "plugboard loop started");
        loop {
            self.step(&mut *source, &mut *sink)?;
            self.bank.pause(self.idle);
        }
    }

    pub fn mapping(&self) -> &Mapping {
        self.store.mapping()
    }

    pub fn substitute(&self, letter: Letter) -> Letter {
        engine::substitute(self.store.mapping(), letter)
    }

    pub fn bank(&self) -> &LineBank<D, W> {
        &self.bank
    }

    pub fn tracker(&self) -> &DebounceTracker {
        &self.tracker
    }
}
