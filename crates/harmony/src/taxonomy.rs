//! The closed key and chord enumerations.
//!
//! Positions are part of the contract: keys are laid out as a major block of
//! twelve roots followed by a minor block, chords as major, minor, diminished
//! then augmented blocks. Feature code downstream refers to keys and chords by
//! these indices.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chord_in_key::ChordInKey;
use crate::error::{Error, Result};
use crate::pitch::{PitchClass, PitchClassSet};

pub const KEY_COUNT: usize = 24;
pub const CHORD_COUNT: usize = 48;

const MAJOR_SCALE: PitchClassSet = PitchClassSet::from_intervals(&[0, 2, 4, 5, 7, 9, 11]);
const MINOR_SCALE: PitchClassSet = PitchClassSet::from_intervals(&[0, 2, 3, 5, 7, 8, 10]);

const MAJOR_TRIAD: PitchClassSet = PitchClassSet::from_intervals(&[0, 4, 7]);
const MINOR_TRIAD: PitchClassSet = PitchClassSet::from_intervals(&[0, 3, 7]);
const DIMINISHED_TRIAD: PitchClassSet = PitchClassSet::from_intervals(&[0, 3, 6]);
const AUGMENTED_TRIAD: PitchClassSet = PitchClassSet::from_intervals(&[0, 4, 8]);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyMode {
    Major,
    /// Natural minor.
    Minor,
}

impl KeyMode {
    /// Enumeration order of the key blocks.
    pub const ALL: [KeyMode; 2] = [KeyMode::Major, KeyMode::Minor];

    /// Suffix used in canonical key names ("CMaj", "Amin").
    pub const fn suffix(self) -> &'static str {
        match self {
            KeyMode::Major => "Maj",
            KeyMode::Minor => "min",
        }
    }

    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.suffix() == suffix)
    }

    /// Diatonic scale with the tonic on C.
    pub const fn template(self) -> PitchClassSet {
        match self {
            KeyMode::Major => MAJOR_SCALE,
            KeyMode::Minor => MINOR_SCALE,
        }
    }

    const fn block(self) -> usize {
        match self {
            KeyMode::Major => 0,
            KeyMode::Minor => 1,
        }
    }
}

impl fmt::Display for KeyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyMode::Major => write!(f, "major"),
            KeyMode::Minor => write!(f, "minor"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChordQuality {
    Major,
    Minor,
    Diminished,
    Augmented,
}

impl ChordQuality {
    /// Enumeration order of the chord blocks.
    pub const ALL: [ChordQuality; 4] = [
        ChordQuality::Major,
        ChordQuality::Minor,
        ChordQuality::Diminished,
        ChordQuality::Augmented,
    ];

    /// Suffix used in canonical chord names ("Cmaj", "Ebmin").
    pub const fn suffix(self) -> &'static str {
        match self {
            ChordQuality::Major => "maj",
            ChordQuality::Minor => "min",
            ChordQuality::Diminished => "dim",
            ChordQuality::Augmented => "aug",
        }
    }

    /// Triad with the root on C.
    pub const fn template(self) -> PitchClassSet {
        match self {
            ChordQuality::Major => MAJOR_TRIAD,
            ChordQuality::Minor => MINOR_TRIAD,
            ChordQuality::Diminished => DIMINISHED_TRIAD,
            ChordQuality::Augmented => AUGMENTED_TRIAD,
        }
    }

    const fn block(self) -> usize {
        match self {
            ChordQuality::Major => 0,
            ChordQuality::Minor => 1,
            ChordQuality::Diminished => 2,
            ChordQuality::Augmented => 3,
        }
    }
}

/// A key as (tonic, mode).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key {
    pub root: PitchClass,
    pub mode: KeyMode,
}

impl Key {
    pub const fn new(root: PitchClass, mode: KeyMode) -> Self {
        Self { root, mode }
    }

    /// Position in the key enumeration, 0..24.
    pub const fn index(self) -> usize {
        self.mode.block() * 12 + self.root.index()
    }

    pub fn from_index(index: usize) -> Option<Self> {
        let mode = *KeyMode::ALL.get(index / 12)?;
        Some(Self::new(PitchClass::new((index % 12) as u8), mode))
    }

    /// Resolve the `(root, mode)` pair a key estimator reports, e.g. `("Eb", "min")`.
    pub fn parse(root: &str, mode: &str) -> Result<Self> {
        match (PitchClass::from_name(root), KeyMode::from_suffix(mode)) {
            (Some(root), Some(mode)) => Ok(Self::new(root, mode)),
            _ => Err(Error::UnknownKeyLabel(format!("{root}{mode}"))),
        }
    }

    pub fn name(self) -> String {
        format!("{}{}", self.root.name(), self.mode.suffix())
    }

    /// The seven scale pitch classes.
    pub const fn scale(self) -> PitchClassSet {
        self.mode.template().rotate(self.root.value())
    }

    /// All 24 keys in enumeration order.
    pub fn all() -> impl Iterator<Item = Key> {
        (0..KEY_COUNT).filter_map(Key::from_index)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.root, self.mode.suffix())
    }
}

/// A triad as (root, quality).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Chord {
    pub root: PitchClass,
    pub quality: ChordQuality,
}

impl Chord {
    pub const fn new(root: PitchClass, quality: ChordQuality) -> Self {
        Self { root, quality }
    }

    /// Position in the chord enumeration, 0..48.
    pub const fn index(self) -> usize {
        self.quality.block() * 12 + self.root.index()
    }

    pub fn from_index(index: usize) -> Option<Self> {
        let quality = *ChordQuality::ALL.get(index / 12)?;
        Some(Self::new(PitchClass::new((index % 12) as u8), quality))
    }

    pub fn name(self) -> String {
        format!("{}{}", self.root.name(), self.quality.suffix())
    }

    /// The three triad pitch classes.
    pub const fn triad(self) -> PitchClassSet {
        self.quality.template().rotate(self.root.value())
    }

    /// All 48 chords in enumeration order.
    pub fn all() -> impl Iterator<Item = Chord> {
        (0..CHORD_COUNT).filter_map(Chord::from_index)
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.root, self.quality.suffix())
    }
}

/// Names, templates and the chord-in-key relation for the closed enumerations.
///
/// Built once by [`Taxonomy::build`] and read-only afterwards; it holds no
/// interior mutability, so a shared reference can be handed to any number of
/// worker threads.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    key_names: Vec<String>,
    chord_names: Vec<String>,
    key_templates: [PitchClassSet; KEY_COUNT],
    chord_templates: [PitchClassSet; CHORD_COUNT],
    key_lookup: HashMap<String, Key>,
    chord_lookup: HashMap<String, Chord>,
    chord_in_key: ChordInKey,
}

impl Taxonomy {
    pub fn build() -> Self {
        let keys: Vec<Key> = Key::all().collect();
        let chords: Vec<Chord> = Chord::all().collect();

        let mut key_templates = [PitchClassSet::EMPTY; KEY_COUNT];
        for (slot, key) in key_templates.iter_mut().zip(&keys) {
            *slot = key.scale();
        }
        let mut chord_templates = [PitchClassSet::EMPTY; CHORD_COUNT];
        for (slot, chord) in chord_templates.iter_mut().zip(&chords) {
            *slot = chord.triad();
        }

        let key_names: Vec<String> = keys.iter().map(|k| k.name()).collect();
        let chord_names: Vec<String> = chords.iter().map(|c| c.name()).collect();

        let key_lookup = key_names.iter().cloned().zip(keys.iter().copied()).collect();
        let chord_lookup = chord_names
            .iter()
            .cloned()
            .zip(chords.iter().copied())
            .collect();

        let chord_in_key = ChordInKey::build(&chord_templates, &key_templates);

        debug!(
            keys = key_names.len(),
            chords = chord_names.len(),
            "built key/chord taxonomy"
        );

        Self {
            key_names,
            chord_names,
            key_templates,
            chord_templates,
            key_lookup,
            chord_lookup,
            chord_in_key,
        }
    }

    /// Process-wide instance, built on first use.
    pub fn global() -> &'static Taxonomy {
        static TAXONOMY: OnceLock<Taxonomy> = OnceLock::new();
        TAXONOMY.get_or_init(Taxonomy::build)
    }

    /// Canonical key names in enumeration order.
    pub fn key_names(&self) -> &[String] {
        &self.key_names
    }

    /// Canonical chord names in enumeration order.
    pub fn chord_names(&self) -> &[String] {
        &self.chord_names
    }

    pub fn key_template(&self, key: Key) -> PitchClassSet {
        self.key_templates[key.index()]
    }

    pub fn chord_template(&self, chord: Chord) -> PitchClassSet {
        self.chord_templates[chord.index()]
    }

    /// One 12-entry membership row per key, in enumeration order.
    pub fn key_matrix(&self) -> Vec<[bool; 12]> {
        self.key_templates.iter().map(|t| t.to_array()).collect()
    }

    /// One 12-entry membership row per chord, in enumeration order.
    pub fn chord_matrix(&self) -> Vec<[bool; 12]> {
        self.chord_templates.iter().map(|t| t.to_array()).collect()
    }

    pub fn key_by_name(&self, name: &str) -> Option<Key> {
        self.key_lookup.get(name).copied()
    }

    pub fn chord_by_name(&self, name: &str) -> Option<Chord> {
        self.chord_lookup.get(name).copied()
    }

    pub fn chord_in_key(&self, chord: Chord, key: Key) -> bool {
        self.chord_in_key.contains(chord, key)
    }

    pub fn chord_in_key_relation(&self) -> &ChordInKey {
        &self.chord_in_key
    }

    pub fn chord_in_key_matrix(&self) -> &[[bool; KEY_COUNT]; CHORD_COUNT] {
        self.chord_in_key.matrix()
    }

    /// Chords of the taxonomy that are diatonic to `key`, in enumeration order.
    pub fn in_key_chords(&self, key: Key) -> impl Iterator<Item = Chord> + '_ {
        Chord::all().filter(move |c| self.chord_in_key(*c, key))
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    #[test]
    fn enumeration_sizes() {
        let taxonomy = Taxonomy::build();
        assert_eq!(taxonomy.key_names().len(), KEY_COUNT);
        assert_eq!(taxonomy.chord_names().len(), CHORD_COUNT);
    }

    #[test]
    fn key_order_is_major_block_then_minor_block() {
        let taxonomy = Taxonomy::build();
        assert_eq!(taxonomy.key_names()[0], "CMaj");
        assert_eq!(taxonomy.key_names()[11], "BMaj");
        assert_eq!(taxonomy.key_names()[12], "Cmin");
        assert_eq!(taxonomy.key_names()[21], "Amin");
    }

    #[test]
    fn chord_order_is_quality_blocks() {
        let taxonomy = Taxonomy::build();
        let names = taxonomy.chord_names();
        assert_eq!(names[0], "Cmaj");
        assert_eq!(names[13], "Dbmin");
        assert_eq!(names[31], "Gdim");
        assert_eq!(names[45], "Aaug");
    }

    #[test]
    fn names_are_distinct_and_resolve_back() {
        let taxonomy = Taxonomy::build();

        let keys: HashSet<_> = taxonomy.key_names().iter().collect();
        assert_eq!(keys.len(), KEY_COUNT);
        for key in Key::all() {
            assert_eq!(taxonomy.key_by_name(&key.name()), Some(key));
        }

        let chords: HashSet<_> = taxonomy.chord_names().iter().collect();
        assert_eq!(chords.len(), CHORD_COUNT);
        for chord in Chord::all() {
            assert_eq!(taxonomy.chord_by_name(&chord.name()), Some(chord));
        }
    }

    #[test]
    fn index_round_trips_and_root_is_index_mod_12() {
        for (i, chord) in Chord::all().enumerate() {
            assert_eq!(chord.index(), i);
            assert_eq!(chord.root.index(), i % 12);
        }
        for (i, key) in Key::all().enumerate() {
            assert_eq!(Key::from_index(i), Some(key));
        }
        assert_eq!(Key::from_index(KEY_COUNT), None);
        assert_eq!(Chord::from_index(CHORD_COUNT), None);
    }

    #[test]
    fn key_templates_are_rotated_scales() {
        let taxonomy = Taxonomy::build();
        for key in Key::all() {
            let template = taxonomy.key_template(key);
            assert_eq!(template.len(), 7, "{}", key);
            assert_eq!(template, key.mode.template().rotate(key.root.value()));
            assert!(template.contains(key.root));
        }
    }

    #[test]
    fn chord_templates_are_rotated_triads() {
        let taxonomy = Taxonomy::build();
        for chord in Chord::all() {
            let template = taxonomy.chord_template(chord);
            assert_eq!(template.len(), 3, "{}", chord);
            assert_eq!(template, chord.quality.template().rotate(chord.root.value()));
        }
    }

    #[test]
    fn matrix_rows_match_templates() {
        let taxonomy = Taxonomy::build();
        let rows = taxonomy.chord_matrix();
        // Ebmin: Eb Gb Bb
        let ebmin = taxonomy.chord_by_name("Ebmin").unwrap();
        let members: Vec<usize> = (0..12).filter(|&i| rows[ebmin.index()][i]).collect();
        assert_eq!(members, vec![3, 6, 10]);
        assert!(taxonomy.key_matrix().iter().all(|r| r.iter().filter(|b| **b).count() == 7));
    }

    #[test]
    fn every_key_has_the_diatonic_triad_mix() {
        let taxonomy = Taxonomy::build();
        for key in Key::all() {
            let chords: Vec<Chord> = taxonomy.in_key_chords(key).collect();
            let count = |q: ChordQuality| chords.iter().filter(|c| c.quality == q).count();
            assert_eq!(count(ChordQuality::Major), 3, "{}", key);
            assert_eq!(count(ChordQuality::Minor), 3, "{}", key);
            assert_eq!(count(ChordQuality::Diminished), 1, "{}", key);
            assert_eq!(count(ChordQuality::Augmented), 0, "{}", key);
        }
    }

    #[test]
    fn parse_key_pair() {
        let key = Key::parse("Eb", "min").unwrap();
        assert_eq!(key.index(), 15);
        assert_eq!(key.name(), "Ebmin");
        assert_eq!(
            Key::parse("D#", "min"),
            Err(Error::UnknownKeyLabel("D#min".into()))
        );
        assert!(Key::parse("C", "major").is_err());
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let taxonomy = Taxonomy::build();
        assert_eq!(taxonomy.chord_by_name("cmaj"), None);
        assert_eq!(taxonomy.chord_by_name("CMaj"), None);
        assert!(taxonomy.key_by_name("CMaj").is_some());
    }

    #[test]
    fn global_matches_fresh_build() {
        let fresh = Taxonomy::build();
        let global = Taxonomy::global();
        assert_eq!(global.key_names(), fresh.key_names());
        assert_eq!(global.chord_in_key_matrix(), fresh.chord_in_key_matrix());
    }
}
