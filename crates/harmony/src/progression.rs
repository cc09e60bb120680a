//! Chord-progression features over root motion.
//!
//! Everything here works on the sequence of chord roots. Adjacent repeats are
//! kept as they come: a chord held across a segment boundary shows up twice.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::pitch::PitchClass;
use crate::taxonomy::{Chord, Key, Taxonomy};

pub const FUNCTIONAL_RATIO: &str = "Chords_Func";
pub const TONIC_DISTANCE: &str = "Chords_TonicDist";

/// Does moving down `half_steps` from `prev` land on `next`?
///
/// Measured on raw pitch-class values: either `prev` sits `half_steps` above
/// `next`, or `next` sits `12 - half_steps` above `prev`. Accepts 0..=12, where
/// both 0 and 12 mean "same root".
pub fn is_interval_down(prev: PitchClass, next: PitchClass, half_steps: u8) -> bool {
    let prev = i16::from(prev.value());
    let next = i16::from(next.value());
    let n = i16::from(half_steps);
    prev - next == n || next - prev == 12 - n
}

/// Named root-motion patterns, each a chain of descending intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootPattern {
    /// V → I
    AuthenticCadence,
    /// IV → V → I
    PlagalAuthenticCadence,
    /// II → V → I
    SupertonicCadence,
    /// VI → II → V → I
    CircleOfFifthsTurnaround,
    /// I → IV → I → V → IV → I
    LongTurnaround,
    /// I → V → II → IV
    SecondaryTurnaround,
}

impl RootPattern {
    pub const ALL: [RootPattern; 6] = [
        RootPattern::AuthenticCadence,
        RootPattern::PlagalAuthenticCadence,
        RootPattern::SupertonicCadence,
        RootPattern::CircleOfFifthsTurnaround,
        RootPattern::LongTurnaround,
        RootPattern::SecondaryTurnaround,
    ];

    /// Half-steps down between each adjacent pair of the window.
    pub const fn intervals(self) -> &'static [u8] {
        match self {
            RootPattern::AuthenticCadence => &[7],
            RootPattern::PlagalAuthenticCadence => &[10, 7],
            RootPattern::SupertonicCadence => &[7, 7],
            RootPattern::CircleOfFifthsTurnaround => &[7, 7, 7],
            RootPattern::LongTurnaround => &[7, 5, 5, 2, 5],
            RootPattern::SecondaryTurnaround => &[5, 5, 9],
        }
    }

    pub const fn window(self) -> usize {
        self.intervals().len() + 1
    }

    /// Stable key in the output feature record.
    pub const fn feature_name(self) -> &'static str {
        match self {
            RootPattern::AuthenticCadence => "Chords_Cad_01",
            RootPattern::PlagalAuthenticCadence => "Chords_Cad_02",
            RootPattern::SupertonicCadence => "Chords_Cad_03",
            RootPattern::CircleOfFifthsTurnaround => "Chords_Turn_01",
            RootPattern::LongTurnaround => "Chords_Turn_02",
            RootPattern::SecondaryTurnaround => "Chords_Turn_03",
        }
    }

    const fn position(self) -> usize {
        match self {
            RootPattern::AuthenticCadence => 0,
            RootPattern::PlagalAuthenticCadence => 1,
            RootPattern::SupertonicCadence => 2,
            RootPattern::CircleOfFifthsTurnaround => 3,
            RootPattern::LongTurnaround => 4,
            RootPattern::SecondaryTurnaround => 5,
        }
    }

    /// Exact match of a window of exactly [`RootPattern::window`] roots.
    pub fn matches(self, roots: &[PitchClass]) -> bool {
        roots.len() == self.window()
            && roots
                .windows(2)
                .zip(self.intervals())
                .all(|(pair, &n)| is_interval_down(pair[0], pair[1], n))
    }

    /// Matches over every overlapping window of the sequence.
    pub fn count(self, roots: &[PitchClass]) -> usize {
        roots
            .windows(self.window())
            .filter(|w| self.matches(w))
            .count()
    }
}

/// Number of adjacent pairs whose roots differ. Not clamped.
pub fn root_changes(roots: &[PitchClass]) -> usize {
    roots.windows(2).filter(|w| w[0] != w[1]).count()
}

/// Index distances between successive occurrences of `tonic`.
pub fn recurrence_gaps(roots: &[PitchClass], tonic: PitchClass) -> Vec<usize> {
    let positions: Vec<usize> = roots
        .iter()
        .enumerate()
        .filter(|(_, r)| **r == tonic)
        .map(|(i, _)| i)
        .collect();
    positions.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Most frequent root; ties go to the lowest pitch class.
pub fn most_frequent_root(roots: &[PitchClass]) -> Option<PitchClass> {
    let mut histogram = [0usize; 12];
    for root in roots {
        histogram[root.index()] += 1;
    }
    let mut best: Option<(usize, usize)> = None;
    for (pc, &count) in histogram.iter().enumerate() {
        if count > 0 && best.map_or(true, |(_, c)| count > c) {
            best = Some((pc, count));
        }
    }
    best.map(|(pc, _)| PitchClass::new(pc as u8))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TonicSource {
    /// The key's own root recurs.
    Declared,
    /// The key's root occurs fewer than twice; the most frequent root was used.
    MostFrequent,
    /// Neither recurs.
    None,
}

/// Mean distance between returns to the tonic, and which tonic was used.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TonicRecurrence {
    pub pitch_class: Option<PitchClass>,
    pub source: TonicSource,
    pub mean_gap: f64,
}

impl TonicRecurrence {
    pub fn measure(roots: &[PitchClass], declared: PitchClass) -> Self {
        let gaps = recurrence_gaps(roots, declared);
        if !gaps.is_empty() {
            return Self::from_gaps(declared, TonicSource::Declared, &gaps);
        }

        if let Some(frequent) = most_frequent_root(roots) {
            let gaps = recurrence_gaps(roots, frequent);
            if !gaps.is_empty() {
                return Self::from_gaps(frequent, TonicSource::MostFrequent, &gaps);
            }
        }

        Self {
            pitch_class: None,
            source: TonicSource::None,
            mean_gap: 0.0,
        }
    }

    fn from_gaps(pitch_class: PitchClass, source: TonicSource, gaps: &[usize]) -> Self {
        let total: usize = gaps.iter().sum();
        Self {
            pitch_class: Some(pitch_class),
            source,
            mean_gap: total as f64 / gaps.len() as f64,
        }
    }
}

/// Progression features for one chord sequence in one key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionFeatures {
    pub event_count: usize,
    pub in_key_count: usize,
    /// In-key events over all events.
    pub functional_ratio: f64,
    /// Raw count; ratios divide by `max(root_changes, 1)`.
    pub root_changes: usize,
    /// Indexed like [`RootPattern::ALL`].
    pub pattern_counts: [usize; 6],
    pub tonic: TonicRecurrence,
}

impl ProgressionFeatures {
    pub fn count(&self, pattern: RootPattern) -> usize {
        self.pattern_counts[pattern.position()]
    }

    pub fn ratio(&self, pattern: RootPattern) -> f64 {
        self.count(pattern) as f64 / self.root_changes.max(1) as f64
    }

    pub fn tonic_distance(&self) -> f64 {
        self.tonic.mean_gap
    }

    /// `(feature name, value)` pairs in a fixed order.
    pub fn entries(&self) -> Vec<(&'static str, f64)> {
        let mut entries = Vec::with_capacity(RootPattern::ALL.len() + 2);
        entries.push((FUNCTIONAL_RATIO, self.functional_ratio));
        for pattern in RootPattern::ALL {
            entries.push((pattern.feature_name(), self.ratio(pattern)));
        }
        entries.push((TONIC_DISTANCE, self.tonic_distance()));
        entries
    }
}

/// Stateless analyzer borrowing a taxonomy.
#[derive(Debug, Clone, Copy)]
pub struct ProgressionAnalyzer<'a> {
    taxonomy: &'a Taxonomy,
}

impl<'a> ProgressionAnalyzer<'a> {
    pub fn new(taxonomy: &'a Taxonomy) -> Self {
        Self { taxonomy }
    }

    /// Resolve labels to chords, failing on the first unknown one.
    pub fn resolve<S: AsRef<str>>(&self, labels: &[S]) -> Result<Vec<Chord>> {
        labels
            .iter()
            .enumerate()
            .map(|(position, label)| {
                let label = label.as_ref();
                self.taxonomy
                    .chord_by_name(label)
                    .ok_or_else(|| Error::UnknownChordLabel {
                        label: label.to_string(),
                        position,
                    })
            })
            .collect()
    }

    pub fn analyze<S: AsRef<str>>(&self, labels: &[S], key: Key) -> Result<ProgressionFeatures> {
        let chords = self.resolve(labels)?;
        self.analyze_chords(&chords, key)
    }

    pub fn analyze_chords(&self, chords: &[Chord], key: Key) -> Result<ProgressionFeatures> {
        if chords.is_empty() {
            return Err(Error::EmptySequence);
        }

        let roots: Vec<PitchClass> = chords.iter().map(|c| c.root).collect();

        let in_key_count = chords
            .iter()
            .filter(|c| self.taxonomy.chord_in_key(**c, key))
            .count();
        let functional_ratio = in_key_count as f64 / chords.len() as f64;

        let mut pattern_counts = [0usize; 6];
        for pattern in RootPattern::ALL {
            pattern_counts[pattern.position()] = pattern.count(&roots);
        }

        let root_changes = root_changes(&roots);
        let tonic = TonicRecurrence::measure(&roots, key.root);

        debug!(
            key = %key,
            events = chords.len(),
            root_changes,
            tonic_source = ?tonic.source,
            "analyzed chord progression"
        );

        Ok(ProgressionFeatures {
            event_count: chords.len(),
            in_key_count,
            functional_ratio,
            root_changes,
            pattern_counts,
            tonic,
        })
    }
}

impl Default for ProgressionAnalyzer<'static> {
    fn default() -> Self {
        Self::new(Taxonomy::global())
    }
}
