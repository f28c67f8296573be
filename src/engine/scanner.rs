//! Continuity scanner.
//!
//! Probes every unordered pair of assigned letters, one at a time:
//!
//! ```text
//! for (x, y) in pairs, x < y:
//!     x -> OutputLow      (settle)
//!     sample y            Low => connected
//!     x -> InputPullUp    (settle)
//! ```
//!
//! With 26 lines that is 325 probes and 650 settle delays per scan. The
//! scanner reports only what it saw on this pass; deciding whether a
//! connection is trustworthy is the debounce tracker's job.

use super::lines::{Delay, Level, LineBank, LineDriver};
use super::metrics::ScanMetrics;
use crate::error::LineError;
use crate::letter::{Letter, PairKey};
use std::collections::BTreeSet;
use std::time::Instant;

/// Pairs observed connected by one scan.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    pub connected: BTreeSet<PairKey>,
    pub metrics: ScanMetrics,
}

/// Scan all assigned lines for pairwise continuity.
pub fn scan<D: LineDriver, W: Delay>(bank: &mut LineBank<D, W>) -> Result<ScanOutcome, LineError> {
    let started = Instant::now();
    let letters: Vec<Letter> = bank.assigned().letters().collect();
    let mut outcome = ScanOutcome::default();

    for (i, &x) in letters.iter().enumerate() {
        for &y in &letters[i + 1..] {
            if probe(bank, x, y)? {
                if let Some(key) = PairKey::new(x, y) {
                    outcome.connected.insert(key);
                }
            }
            outcome.metrics.probes += 1;
        }
    }

    outcome.metrics.connected = outcome.connected.len();
    outcome.metrics.settle_total = bank.settle() * (2 * outcome.metrics.probes as u32);
    outcome.metrics.elapsed = started.elapsed();
    Ok(outcome)
}

/// Drive `x` low and sample `y`. `x` is back to a pulled-up input when this
/// returns, whether or not the sample succeeded.
pub fn probe<D: LineDriver, W: Delay>(bank: &mut LineBank<D, W>, x: Letter, y: Letter) -> Result<bool, LineError> {
    bank.set_output_low(x)?;
    let level = bank.read(y);
    bank.set_input_pull_up(x)?;
    Ok(level? == Level::Low)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::LineMode;
    use crate::sim::{RecordedDelay, SimBoard};
    use std::time::Duration;

    fn l(c: char) -> Letter {
        Letter::from_char(c).unwrap()
    }

    fn key(a: char, b: char) -> PairKey {
        PairKey::new(l(a), l(b)).unwrap()
    }

    fn board_and_bank() -> (SimBoard, LineBank<SimBoard, RecordedDelay>) {
        let board = SimBoard::new();
        let pins: Vec<u8> = (0..26).collect();
        let bank = LineBank::from_pins(board.clone(), RecordedDelay::default(), &pins, Duration::from_micros(100))
            .unwrap();
        (board, bank)
    }

    #[test]
    fn idle_board_has_no_connections() {
        let (board, mut bank) = board_and_bank();
        let outcome = scan(&mut bank).unwrap();

        assert!(outcome.connected.is_empty());
        assert_eq!(outcome.metrics.probes, 325);
        assert_eq!(outcome.metrics.connected, 0);
        assert_eq!(outcome.metrics.settle_total, Duration::from_micros(100) * 650);
        assert_eq!(board.max_driven(), 1);
    }

    #[test]
    fn finds_each_jumper_once() {
        let (board, mut bank) = board_and_bank();
        board.connect(0, 1);
        board.connect(25, 2);

        let outcome = scan(&mut bank).unwrap();
        let found: Vec<PairKey> = outcome.connected.into_iter().collect();
        assert_eq!(found, vec![key('A', 'B'), key('C', 'Z')]);
    }

    #[test]
    fn lines_are_restored_after_every_probe() {
        let (board, mut bank) = board_and_bank();
        board.connect(4, 5);
        scan(&mut bank).unwrap();

        assert_eq!(bank.driven(), None);
        assert!(board.modes_all(LineMode::InputPullUp));
        assert_eq!(board.max_driven(), 1);
        // 26 initial inputs, then two switches per probe.
        assert_eq!(board.mode_switches(), 26 + 650);
    }

    #[test]
    fn probe_is_symmetric_for_a_jumper() {
        let (board, mut bank) = board_and_bank();
        board.connect(0, 1);

        assert!(probe(&mut bank, l('A'), l('B')).unwrap());
        assert!(probe(&mut bank, l('B'), l('A')).unwrap());
        assert!(!probe(&mut bank, l('A'), l('C')).unwrap());
        assert_eq!(bank.driven(), None);
    }

    #[test]
    fn only_assigned_letters_are_probed() {
        let board = SimBoard::new();
        board.connect(10, 11);
        let mut bank = LineBank::with_assignments(
            board.clone(),
            RecordedDelay::default(),
            [(l('A'), 10), (l('B'), 11), (l('C'), 12)],
            Duration::ZERO,
        )
        .unwrap();

        let outcome = scan(&mut bank).unwrap();
        assert_eq!(outcome.metrics.probes, 3);
        assert_eq!(outcome.connected.into_iter().collect::<Vec<_>>(), vec![key('A', 'B')]);
    }
}
