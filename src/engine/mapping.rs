//! Mapping store: the confirmed letter swaps.
//!
//! The mapping is a pure projection of the tracker's stable set. Every scan
//! builds a fresh `Mapping` from scratch and swaps it in; nothing carries over
//! from the previous cycle except the copy kept for change detection.
//!
//! ## Conflicts
//!
//! The tracker does not stop one letter from being stable with two partners
//! (A-B and A-C jumpered at once). A mapping must stay a symmetric partial
//! function, so a `ConflictPolicy` picks which stable pairs survive:
//!
//! - `FirstDetected`: claim letters in order of `since_ms` (earliest first,
//!   canonical order on ties); a pair whose letter is already claimed loses.
//! - `RejectBoth`: any pair touching a letter that appears in more than one
//!   stable pair is dropped.

use super::debounce::StablePair;
use crate::error::ConfigError;
use crate::letter::{LETTER_COUNT, Letter, LetterSet, PairKey};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictPolicy {
    #[default]
    FirstDetected,
    RejectBoth,
}

impl FromStr for ConflictPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first-detected" | "first" => Ok(ConflictPolicy::FirstDetected),
            "reject-both" | "reject" => Ok(ConflictPolicy::RejectBoth),
            _ => Err(ConfigError::InvalidPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConflictPolicy::FirstDetected => "first-detected",
            ConflictPolicy::RejectBoth => "reject-both",
        })
    }
}

/// Symmetric partial letter substitution. `get(x) == Some(y)` implies
/// `get(y) == Some(x)` and `x != y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mapping {
    partners: [Option<Letter>; LETTER_COUNT],
}

impl Default for Mapping {
    fn default() -> Self {
        Mapping { partners: [None; LETTER_COUNT] }
    }
}

impl Mapping {
    /// Build a mapping from pairs that share no letters.
    fn from_disjoint(pairs: &[PairKey]) -> Self {
        let mut mapping = Mapping::default();
        for key in pairs {
            mapping.partners[key.lo().index()] = Some(key.hi());
            mapping.partners[key.hi().index()] = Some(key.lo());
        }
        mapping
    }

    pub fn get(&self, letter: Letter) -> Option<Letter> {
        self.partners[letter.index()]
    }

    /// Each swap once, in canonical order.
    pub fn pairs(&self) -> Vec<PairKey> {
        Letter::all().filter_map(|x| self.get(x).filter(|y| x < *y).and_then(|y| PairKey::new(x, y))).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.partners.iter().all(Option::is_none)
    }

    /// Number of swapped pairs.
    pub fn len(&self) -> usize {
        self.partners.iter().flatten().count() / 2
    }
}

/// Emitted when a rebuild produced a different mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingChange {
    /// The new mapping's swaps, each once, in canonical order.
    pub pairs: Vec<PairKey>,
    /// Stable pairs the conflict policy dropped.
    pub rejected: Vec<PairKey>,
}

#[derive(Debug, Clone, Default)]
pub struct MappingStore {
    current: Mapping,
    policy: ConflictPolicy,
    rejected: Vec<PairKey>,
}

impl MappingStore {
    pub fn new(policy: ConflictPolicy) -> Self {
        MappingStore { current: Mapping::default(), policy, rejected: Vec::new() }
    }

    pub fn mapping(&self) -> &Mapping {
        &self.current
    }

    pub fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    /// Replace the mapping with one projected from `stable`. Returns the
    /// change when the result differs from the previous mapping.
    pub fn rebuild(&mut self, stable: &[StablePair]) -> Option<MappingChange> {
        let (accepted, rejected) = resolve_conflicts(stable, self.policy);

        if rejected != self.rejected {
            for key in &rejected {
                tracing::warn!(pair = %key, policy = %self.policy, "conflicting plugboard connection ignored");
            }
            self.rejected = rejected.clone();
        }

        let next = Mapping::from_disjoint(&accepted);
        if next == self.current {
            return None;
        }

        self.current = next;
        tracing::debug!(pairs = self.current.len(), "plugboard mapping rebuilt");
        Some(MappingChange { pairs: self.current.pairs(), rejected })
    }
}

/// Split `stable` into pairs that form a valid mapping and pairs dropped by
/// `policy`. Both lists are in canonical order.
fn resolve_conflicts(stable: &[StablePair], policy: ConflictPolicy) -> (Vec<PairKey>, Vec<PairKey>) {
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();

    match policy {
        ConflictPolicy::FirstDetected => {
            let mut ordered: Vec<&StablePair> = stable.iter().collect();
            ordered.sort_by_key(|p| (p.since_ms, p.key));

            let mut claimed = LetterSet::empty();
            for pair in ordered {
                let (lo, hi) = (pair.key.lo(), pair.key.hi());
                if claimed.contains_letter(lo) || claimed.contains_letter(hi) {
                    rejected.push(pair.key);
                } else {
                    claimed.insert_letter(lo);
                    claimed.insert_letter(hi);
                    accepted.push(pair.key);
                }
            }
        }
        ConflictPolicy::RejectBoth => {
            let mut uses = [0usize; LETTER_COUNT];
            for pair in stable {
                uses[pair.key.lo().index()] += 1;
                uses[pair.key.hi().index()] += 1;
            }
            for pair in stable {
                if uses[pair.key.lo().index()] == 1 && uses[pair.key.hi().index()] == 1 {
                    accepted.push(pair.key);
                } else {
                    rejected.push(pair.key);
                }
            }
        }
    }

    accepted.sort();
    rejected.sort();
    (accepted, rejected)
}
