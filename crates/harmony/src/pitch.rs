use std::fmt;

use serde::{Deserialize, Serialize};

/// Root spellings indexed by pitch class. Flats are preferred for every
/// black key, which is the spelling the upstream chord estimator emits.
pub const ROOT_NAMES: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// A pitch class in 12-TET, 0–11 (C=0, Db=1, ..., B=11).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct PitchClass(u8);

impl PitchClass {
    pub const C: PitchClass = PitchClass(0);

    /// Build a pitch class, wrapping modulo 12.
    pub const fn new(value: u8) -> Self {
        Self(value % 12)
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub fn name(self) -> &'static str {
        ROOT_NAMES[self.index()]
    }

    /// Exact, case-sensitive lookup against [`ROOT_NAMES`].
    pub fn from_name(name: &str) -> Option<Self> {
        ROOT_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| Self(i as u8))
    }

    /// Move up by `semitones`, wrapping at the octave.
    pub const fn transpose(self, semitones: u8) -> Self {
        Self::new(self.0 + semitones % 12)
    }

    pub fn all() -> impl Iterator<Item = PitchClass> {
        (0..12u8).map(PitchClass)
    }
}

impl From<u8> for PitchClass {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl From<PitchClass> for u8 {
    fn from(pc: PitchClass) -> Self {
        pc.0
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of pitch classes as a 12-bit mask: bit i set means pitch class i is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PitchClassSet(u16);

const OCTAVE_MASK: u16 = 0x0FFF;

impl PitchClassSet {
    pub const EMPTY: PitchClassSet = PitchClassSet(0);

    /// Build from intervals above C. Intervals are reduced modulo 12.
    pub const fn from_intervals(intervals: &[u8]) -> Self {
        let mut mask = 0u16;
        let mut i = 0;
        while i < intervals.len() {
            mask |= 1 << (intervals[i] % 12);
            i += 1;
        }
        Self(mask)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn contains(self, pc: PitchClass) -> bool {
        self.0 & (1 << pc.value()) != 0
    }

    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn intersection(self, other: PitchClassSet) -> PitchClassSet {
        Self(self.0 & other.0)
    }

    pub const fn is_subset_of(self, other: PitchClassSet) -> bool {
        self.intersection(other).0 == self.0
    }

    /// Rotate every member up by `semitones`, wrapping at the octave.
    pub const fn rotate(self, semitones: u8) -> Self {
        let n = (semitones % 12) as u32;
        if n == 0 {
            return self;
        }
        Self(((self.0 << n) | (self.0 >> (12 - n))) & OCTAVE_MASK)
    }

    pub fn iter(self) -> impl Iterator<Item = PitchClass> {
        PitchClass::all().filter(move |pc| self.contains(*pc))
    }

    /// Membership as a 12-entry row, index = pitch class.
    pub fn to_array(self) -> [bool; 12] {
        let mut row = [false; 12];
        for pc in self.iter() {
            row[pc.index()] = true;
        }
        row
    }
}

impl FromIterator<PitchClass> for PitchClassSet {
    fn from_iter<I: IntoIterator<Item = PitchClass>>(iter: I) -> Self {
        Self(iter.into_iter().fold(0u16, |mask, pc| mask | (1 << pc.value())))
    }
}
