//! Simulated plugboard hardware.
//!
//! `SimBoard` models the pins and the jumper cables between them. It stands
//! in for GPIO when no board is attached (the CLI) and in tests.
//!
//! Electrical model: a pin reads `Low` iff it is driven low itself or it is
//! joined, through any chain of jumpers, to a pin that is driven low.
//! Otherwise its pull-up wins and it reads `High`.
//!
//! The board is a cheap cloneable handle: clones share one set of pins, so a
//! test can keep a handle to rewire the board while the `LineBank` owns
//! another.

use crate::engine::{Delay, Level, LineDriver, LineMode};
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::rc::Rc;
use std::time::Duration;

#[derive(Debug, Default)]
struct SimState {
    modes: HashMap<u8, LineMode>,
    jumpers: BTreeSet<(u8, u8)>,
    /// Pins whose next read is forced low once.
    glitches: HashSet<u8>,
    max_driven: usize,
    mode_switches: usize,
}

impl SimState {
    fn driven_count(&self) -> usize {
        self.modes.values().filter(|m| **m == LineMode::OutputLow).count()
    }

    fn net_is_driven(&self, pin: u8) -> bool {
        let mut seen = HashSet::from([pin]);
        let mut stack = vec![pin];
        while let Some(p) = stack.pop() {
            if self.modes.get(&p) == Some(&LineMode::OutputLow) {
                return true;
            }
            for &(a, b) in &self.jumpers {
                let next = if a == p {
                    b
                } else if b == p {
                    a
                } else {
                    continue;
                };
                if seen.insert(next) {
                    stack.push(next);
                }
            }
        }
        false
    }
}

#[derive(Debug, Clone, Default)]
pub struct SimBoard {
    state: Rc<RefCell<SimState>>,
}

impl SimBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plug a jumper between two pins.
    pub fn connect(&self, a: u8, b: u8) {
        if a != b {
            self.state.borrow_mut().jumpers.insert((a.min(b), a.max(b)));
        }
    }

    /// Pull the jumper between two pins, if any.
    pub fn disconnect(&self, a: u8, b: u8) {
        self.state.borrow_mut().jumpers.remove(&(a.min(b), a.max(b)));
    }

    /// Pull every jumper.
    pub fn clear(&self) {
        self.state.borrow_mut().jumpers.clear();
    }

    /// Force the next read of `pin` to `Low`, as a spike on the line would.
    pub fn glitch_once(&self, pin: u8) {
        self.state.borrow_mut().glitches.insert(pin);
    }

    /// Highest number of simultaneously driven pins seen so far.
    pub fn max_driven(&self) -> usize {
        self.state.borrow().max_driven
    }

    pub fn mode_switches(&self) -> usize {
        self.state.borrow().mode_switches
    }

    pub fn mode(&self, pin: u8) -> Option<LineMode> {
        self.state.borrow().modes.get(&pin).copied()
    }

    /// True if every known pin is in `mode`.
    pub fn modes_all(&self, mode: LineMode) -> bool {
        self.state.borrow().modes.values().all(|m| *m == mode)
    }
}

impl LineDriver for SimBoard {
    fn set_mode(&mut self, pin: u8, mode: LineMode) {
        let mut state = self.state.borrow_mut();
        state.modes.insert(pin, mode);
        state.mode_switches += 1;
        state.max_driven = state.max_driven.max(state.driven_count());
    }

    fn read(&self, pin: u8) -> Level {
        let mut state = self.state.borrow_mut();
        if state.glitches.remove(&pin) || state.net_is_driven(pin) { Level::Low } else { Level::High }
    }
}

/// A `Delay` that returns immediately and records what it was asked to wait.
#[derive(Debug, Clone, Default)]
pub struct RecordedDelay {
    calls: usize,
    last: Option<Duration>,
}

impl RecordedDelay {
    pub fn calls(&self) -> usize {
        self.calls
    }

    pub fn last(&self) -> Option<Duration> {
        self.last
    }
}

impl Delay for RecordedDelay {
    fn delay(&mut self, duration: Duration) {
        self.calls += 1;
        self.last = Some(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floating_pins_read_high() {
        let board = SimBoard::new();
        assert_eq!(board.read(3), Level::High);
    }

    #[test]
    fn jumper_chains_share_a_level() {
        let mut board = SimBoard::new();
        board.connect(0, 1);
        board.connect(1, 2);
        board.set_mode(0, LineMode::OutputLow);

        assert_eq!(board.read(1), Level::Low);
        assert_eq!(board.read(2), Level::Low);
        assert_eq!(board.read(3), Level::High);

        board.disconnect(2, 1);
        assert_eq!(board.read(2), Level::High);
    }

    #[test]
    fn clones_share_wiring() {
        let mut board = SimBoard::new();
        let handle = board.clone();
        handle.connect(7, 8);
        board.set_mode(8, LineMode::OutputLow);

        assert_eq!(board.read(7), Level::Low);
        handle.clear();
        assert_eq!(board.read(7), Level::High);
    }

    #[test]
    fn glitch_fires_once() {
        let board = SimBoard::new();
        board.glitch_once(4);
        assert_eq!(board.read(4), Level::Low);
        assert_eq!(board.read(4), Level::High);
    }

    #[test]
    fn tracks_peak_driven_lines() {
        let mut board = SimBoard::new();
        board.set_mode(0, LineMode::OutputLow);
        board.set_mode(1, LineMode::OutputLow);
        board.set_mode(0, LineMode::InputPullUp);

        assert_eq!(board.max_driven(), 2);
        assert_eq!(board.mode_switches(), 3);
        assert_eq!(board.mode(0), Some(LineMode::InputPullUp));
    }
}
