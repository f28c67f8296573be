//! Per-pair debounce tracking.
//!
//! A pair becomes *stable* once it has been observed connected on every scan
//! for at least the threshold. The state machine per pair:
//!
//! ```text
//!            connected                      connected, held >= threshold
//! (absent) ------------> Candidate{since} ------------------------------> stable
//!    ^                        |                                             |
//!    +---- disconnected ------+-------------------- disconnected -----------+
//! ```
//!
//! A single scan that misses the connection drops the candidate; the next
//! observation starts a fresh countdown.

use crate::letter::PairKey;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

/// Debounce threshold used when none is configured.
pub const DEFAULT_THRESHOLD: Duration = Duration::from_millis(2000);

/// A pair that has held its connection for at least the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StablePair {
    pub key: PairKey,
    /// Timestamp of the first observation in the current unbroken run.
    pub since_ms: u64,
}

#[derive(Debug, Clone)]
pub struct DebounceTracker {
    threshold_ms: u64,
    candidates: BTreeMap<PairKey, u64>,
}

impl DebounceTracker {
    /// Timestamps are whole milliseconds, so a sub-millisecond remainder of
    /// `threshold` rounds up. A pair is never stable before `threshold` has passed.
    pub fn new(threshold: Duration) -> Self {
        let ms = threshold.as_millis() + u128::from(threshold.subsec_nanos() % 1_000_000 != 0);
        DebounceTracker { threshold_ms: u64::try_from(ms).unwrap_or(u64::MAX), candidates: BTreeMap::new() }
    }

    /// Feed one scan's observations taken at `now_ms`. Returns the stable
    /// pairs in canonical order.
    pub fn update(&mut self, connected: &BTreeSet<PairKey>, now_ms: u64) -> Vec<StablePair> {
        self.candidates.retain(|key, _| connected.contains(key));

        let mut stable = Vec::new();
        for &key in connected {
            match self.candidates.get(&key) {
                None => {
                    self.candidates.insert(key, now_ms);
                }
                Some(&since_ms) if now_ms.saturating_sub(since_ms) >= self.threshold_ms => {
                    stable.push(StablePair { key, since_ms });
                }
                Some(_) => {}
            }
        }
        stable
    }

    pub fn threshold(&self) -> Duration {
        Duration::from_millis(self.threshold_ms)
    }

    pub fn is_tracking(&self, key: PairKey) -> bool {
        self.candidates.contains_key(&key)
    }

    /// Current candidates and their start times.
    pub fn candidates(&self) -> impl Iterator<Item = (PairKey, u64)> + '_ {
        self.candidates.iter().map(|(k, v)| (*k, *v))
    }
}

impl Default for DebounceTracker {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::letter::Letter;

    fn key(a: char, b: char) -> PairKey {
        PairKey::new(Letter::from_char(a).unwrap(), Letter::from_char(b).unwrap()).unwrap()
    }

    fn set(keys: &[PairKey]) -> BTreeSet<PairKey> {
        keys.iter().copied().collect()
    }

    fn stable_keys(stable: &[StablePair]) -> Vec<PairKey> {
        stable.iter().map(|s| s.key).collect()
    }

    #[test]
    fn first_observation_is_never_stable() {
        let mut tracker = DebounceTracker::new(Duration::ZERO);
        let ab = set(&[key('A', 'B')]);

        assert!(tracker.update(&ab, 0).is_empty());
        assert!(tracker.is_tracking(key('A', 'B')));
        assert_eq!(stable_keys(&tracker.update(&ab, 0)), vec![key('A', 'B')]);
    }

    #[test]
    fn threshold_boundary() {
        let mut tracker = DebounceTracker::default();
        let ab = set(&[key('A', 'B')]);

        assert!(tracker.update(&ab, 1_000).is_empty());
        assert!(tracker.update(&ab, 2_999).is_empty());

        let stable = tracker.update(&ab, 3_000);
        assert_eq!(stable, vec![StablePair { key: key('A', 'B'), since_ms: 1_000 }]);
        assert_eq!(stable_keys(&tracker.update(&ab, 10_000)), vec![key('A', 'B')]);
    }

    #[test]
    fn disconnect_resets_without_partial_credit() {
        let mut tracker = DebounceTracker::default();
        let ab = set(&[key('A', 'B')]);
        let none = BTreeSet::new();

        tracker.update(&ab, 0);
        tracker.update(&ab, 1_999);
        tracker.update(&none, 2_000);
        assert!(!tracker.is_tracking(key('A', 'B')));

        assert!(tracker.update(&ab, 2_500).is_empty());
        assert!(tracker.update(&ab, 4_499).is_empty());
        assert_eq!(stable_keys(&tracker.update(&ab, 4_500)), vec![key('A', 'B')]);
    }

    #[test]
    fn stable_pair_drops_the_instant_it_disconnects() {
        let mut tracker = DebounceTracker::default();
        let ab = set(&[key('A', 'B')]);

        tracker.update(&ab, 0);
        assert_eq!(tracker.update(&ab, 2_000).len(), 1);
        assert!(tracker.update(&BTreeSet::new(), 2_010).is_empty());
        assert!(tracker.update(&ab, 2_020).is_empty());
    }

    #[test]
    fn pairs_sharing_a_letter_are_tracked_independently() {
        let mut tracker = DebounceTracker::default();

        tracker.update(&set(&[key('A', 'B')]), 0);
        tracker.update(&set(&[key('A', 'B'), key('A', 'C')]), 500);
        let stable = tracker.update(&set(&[key('A', 'B'), key('A', 'C')]), 2_600);

        assert_eq!(
            stable,
            vec![StablePair { key: key('A', 'B'), since_ms: 0 }, StablePair { key: key('A', 'C'), since_ms: 500 }]
        );
        assert_eq!(tracker.candidates().count(), 2);
    }

    #[test]
    fn sub_millisecond_threshold_rounds_up() {
        let mut tracker = DebounceTracker::new(Duration::from_micros(1500));
        assert_eq!(tracker.threshold(), Duration::from_millis(2));

        let ab = set(&[key('A', 'B')]);
        tracker.update(&ab, 0);
        assert!(tracker.update(&ab, 1).is_empty());
        assert_eq!(tracker.update(&ab, 2).len(), 1);

        assert_eq!(DebounceTracker::new(Duration::MAX).threshold(), Duration::from_millis(u64::MAX));
    }

    #[test]
    fn clock_going_backwards_is_not_stable() {
        let mut tracker = DebounceTracker::default();
        let ab = set(&[key('A', 'B')]);
        tracker.update(&ab, 5_000);
        assert!(tracker.update(&ab, 1_000).is_empty());
    }
}
