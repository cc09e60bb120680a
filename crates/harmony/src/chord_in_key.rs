use crate::pitch::PitchClassSet;
use crate::taxonomy::{Chord, Key, CHORD_COUNT, KEY_COUNT};

/// True iff every note of the triad is one of the key's scale degrees.
///
/// Exact subset only: a triad with two of three notes in the scale is out of key.
pub const fn triad_in_scale(triad: PitchClassSet, scale: PitchClassSet) -> bool {
    triad.intersection(scale).len() == triad.len()
}

/// The full chord × key membership table, indexed by taxonomy position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChordInKey {
    table: [[bool; KEY_COUNT]; CHORD_COUNT],
}

impl ChordInKey {
    pub fn build(
        chord_templates: &[PitchClassSet; CHORD_COUNT],
        key_templates: &[PitchClassSet; KEY_COUNT],
    ) -> Self {
        let mut table = [[false; KEY_COUNT]; CHORD_COUNT];
        for (row, triad) in table.iter_mut().zip(chord_templates) {
            for (cell, scale) in row.iter_mut().zip(key_templates) {
                *cell = triad_in_scale(*triad, *scale);
            }
        }
        Self { table }
    }

    pub fn contains(&self, chord: Chord, key: Key) -> bool {
        self.table[chord.index()][key.index()]
    }

    /// Index-based lookup; `None` when either index is outside the taxonomy.
    pub fn get(&self, chord_index: usize, key_index: usize) -> Option<bool> {
        self.table.get(chord_index)?.get(key_index).copied()
    }

    pub fn matrix(&self) -> &[[bool; KEY_COUNT]; CHORD_COUNT] {
        &self.table
    }
}
