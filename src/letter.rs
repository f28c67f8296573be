//! Letters, letter sets and canonical letter pairs.
//!
//! Every plugboard socket is identified by exactly one `Letter`. A jumper
//! between two sockets is identified by a `PairKey`, which is unordered:
//! `PairKey::new(A, B)` and `PairKey::new(B, A)` are the same key.
//!
//! ## Ordering
//!
//! `PairKey` orders by `(lo, hi)`, so iterating a `BTreeSet<PairKey>` walks
//! the pairs in the same fixed enumeration the scanner probes them in:
//!
//! ```text
//! A-B, A-C, ..., A-Z, B-C, ..., Y-Z      (325 keys)
//! ```

use std::fmt;

/// Number of letters (and therefore lines) on the board.
pub const LETTER_COUNT: usize = 26;

/// Number of distinct unordered letter pairs, `C(26, 2)`.
pub const PAIR_COUNT: usize = LETTER_COUNT * (LETTER_COUNT - 1) / 2;

/// One of the 26 letters `A`..=`Z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Letter(u8);

impl Letter {
    /// Parse an ASCII letter, case-insensitively.
    pub fn from_char(c: char) -> Option<Self> {
        if c.is_ascii_alphabetic() { Some(Letter(c.to_ascii_uppercase() as u8 - b'A')) } else { None }
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Uppercase ASCII character for this letter.
    pub fn as_char(self) -> char {
        (b'A' + self.0) as char
    }

    /// All letters, `A` first.
    pub fn all() -> impl Iterator<Item = Letter> {
        (0..LETTER_COUNT as u8).map(Letter)
    }

    pub(crate) fn bit(self) -> LetterSet {
        LetterSet::from_bits_retain(1 << self.0)
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

bitflags::bitflags! {
    /// A set of letters packed into one bit per letter.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LetterSet: u32 {
        const ALL = (1 << 26) - 1;
    }
}

impl LetterSet {
    pub fn contains_letter(&self, letter: Letter) -> bool {
        self.contains(letter.bit())
    }

    pub fn insert_letter(&mut self, letter: Letter) {
        self.insert(letter.bit());
    }

    /// Letters in the set, in alphabetical order.
    pub fn letters(&self) -> impl Iterator<Item = Letter> + '_ {
        Letter::all().filter(|l| self.contains_letter(*l))
    }
}

/// Canonical identifier of an unordered pair of distinct letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PairKey {
    lo: Letter,
    hi: Letter,
}

impl PairKey {
    /// Canonicalize `(a, b)`. Returns `None` for `a == b`: a line is never
    /// "connected" to itself.
    pub fn new(a: Letter, b: Letter) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(PairKey { lo: a, hi: b }),
            std::cmp::Ordering::Greater => Some(PairKey { lo: b, hi: a }),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// The alphabetically smaller letter.
    pub fn lo(self) -> Letter {
        self.lo
    }

    /// The alphabetically larger letter.
    pub fn hi(self) -> Letter {
        self.hi
    }

    /// Every pair in canonical order.
    pub fn all() -> impl Iterator<Item = PairKey> {
        Letter::all().flat_map(|lo| Letter::all().filter(move |hi| lo < *hi).map(move |hi| PairKey { lo, hi }))
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.lo, self.hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l(c: char) -> Letter {
        Letter::from_char(c).unwrap()
    }

    #[test]
    fn letters_normalise_to_uppercase() {
        assert_eq!(l('c'), l('C'));
        assert_eq!(l('c').as_char(), 'C');
        assert_eq!(l('z').index(), 25);
        assert_eq!(Letter::from_char('1'), None);
        assert_eq!(Letter::from_char('\n'), None);
        assert_eq!(Letter::from_char('Ä'), None);
    }

    #[test]
    fn pair_key_is_unordered() {
        assert_eq!(PairKey::new(l('A'), l('B')), PairKey::new(l('B'), l('A')));
        assert_eq!(PairKey::new(l('Q'), l('Q')), None);

        let key = PairKey::new(l('X'), l('C')).unwrap();
        assert_eq!(key.lo(), l('C'));
        assert_eq!(key.hi(), l('X'));
        assert_eq!(key.to_string(), "C-X");
    }

    #[test]
    fn all_pairs_are_enumerated_in_canonical_order() {
        let pairs: Vec<PairKey> = PairKey::all().collect();
        assert_eq!(pairs.len(), PAIR_COUNT);
        assert_eq!(pairs.len(), 325);
        assert_eq!(pairs.first().unwrap().to_string(), "A-B");
        assert_eq!(pairs.last().unwrap().to_string(), "Y-Z");
        assert!(pairs.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn letter_set_tracks_membership() {
        let mut set = LetterSet::empty();
        set.insert_letter(l('D'));
        set.insert_letter(l('a'));

        assert!(set.contains_letter(l('A')));
        assert!(!set.contains_letter(l('B')));
        assert_eq!(set.bits(), 0b1001);
        assert_eq!(set.letters().map(Letter::as_char).collect::<String>(), "AD");
        assert_eq!(LetterSet::all().letters().count(), LETTER_COUNT);
    }
}
