//! Chord density, chord-quality balance and progression features.

use std::collections::HashSet;

use harmony::{ChordQuality, Key, ProgressionAnalyzer};

use crate::error::{FeatureError, Result};
use crate::record::FeatureRecord;
use crate::types::TrackDescription;

pub const EVENTS_PER_SEC: &str = "Chords_Num_01";
pub const DISTINCT_PER_SEC: &str = "Chords_Num_02";
pub const MINOR_SHARE: &str = "Chords_Mode_01";
pub const MAJOR_SHARE: &str = "Chords_Mode_02";
pub const MAJOR_TO_MINOR: &str = "Chords_Mode_03";

pub fn chord_features(
    track: &TrackDescription,
    key: Key,
    analyzer: &ProgressionAnalyzer<'_>,
) -> Result<FeatureRecord> {
    let labels = track.chord_labels();
    if labels.is_empty() {
        return Err(FeatureError::NoChords);
    }
    let length = track.length_secs;
    if length.is_nan() || length <= 0.0 {
        return Err(FeatureError::NonPositiveLength(length));
    }

    let chords = analyzer.resolve(&labels)?;
    let progression = analyzer.analyze_chords(&chords, key)?;

    let events = chords.len() as f64;
    let distinct = labels.iter().collect::<HashSet<_>>().len() as f64;
    let minor = chords
        .iter()
        .filter(|c| c.quality == ChordQuality::Minor)
        .count() as f64;
    let major = chords
        .iter()
        .filter(|c| c.quality == ChordQuality::Major)
        .count() as f64;

    let mut record = FeatureRecord::new();
    record.insert(EVENTS_PER_SEC, events / length);
    record.insert(DISTINCT_PER_SEC, distinct / length);
    record.insert(MINOR_SHARE, minor / events);
    record.insert(MAJOR_SHARE, major / events);
    record.insert(
        MAJOR_TO_MINOR,
        if minor > 0.0 { major / minor } else { 0.0 },
    );
    record.extend(progression.entries());

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{KeyAnnotation, RhythmDescription, Segment};
    use pretty_assertions::assert_eq;

    fn track(length_secs: f64, labels: &[&str]) -> TrackDescription {
        TrackDescription {
            length_secs,
            key: KeyAnnotation::new("C", "Maj"),
            rhythm: RhythmDescription {
                meter: "22".into(),
                bpm_mean: 100.0,
                bpm_std: 0.0,
                percussivity: 0.0,
                complexity: 0.0,
                speed_a: 0.0,
                speed_b: 0.0,
                periodicity: 0.0,
            },
            segments: labels
                .iter()
                .enumerate()
                .map(|(i, l)| Segment::chord(i as f64 * 2.0, 2.0, *l))
                .collect(),
        }
    }

    fn c_major() -> Key {
        Key::parse("C", "Maj").unwrap()
    }

    #[test]
    fn densities_and_quality_balance() {
        let analyzer = ProgressionAnalyzer::default();
        let t = track(8.0, &["Cmaj", "Amin", "Fmaj", "Gmaj"]);
        let record = chord_features(&t, c_major(), &analyzer).unwrap();

        assert_eq!(record.get(EVENTS_PER_SEC), Some(0.5));
        assert_eq!(record.get(DISTINCT_PER_SEC), Some(0.5));
        assert_eq!(record.get(MINOR_SHARE), Some(0.25));
        assert_eq!(record.get(MAJOR_SHARE), Some(0.75));
        assert_eq!(record.get(MAJOR_TO_MINOR), Some(3.0));
        assert_eq!(record.get("Chords_Func"), Some(1.0));
    }

    #[test]
    fn no_minor_chords_gives_zero_ratio() {
        let analyzer = ProgressionAnalyzer::default();
        let t = track(4.0, &["Cmaj", "Cmaj"]);
        let record = chord_features(&t, c_major(), &analyzer).unwrap();

        assert_eq!(record.get(MAJOR_TO_MINOR), Some(0.0));
        assert_eq!(record.get(DISTINCT_PER_SEC), Some(0.25));
    }

    #[test]
    fn progression_entries_are_included() {
        let analyzer = ProgressionAnalyzer::default();
        let t = track(8.0, &["Cmaj", "Fmaj", "Gmaj", "Cmaj"]);
        let record = chord_features(&t, c_major(), &analyzer).unwrap();

        for name in [
            "Chords_Func",
            "Chords_Cad_01",
            "Chords_Cad_02",
            "Chords_Cad_03",
            "Chords_Turn_01",
            "Chords_Turn_02",
            "Chords_Turn_03",
            "Chords_TonicDist",
        ] {
            assert!(record.get(name).is_some(), "missing {name}");
        }
        assert_eq!(record.len(), 13);
    }

    #[test]
    fn rejects_empty_and_zero_length() {
        let analyzer = ProgressionAnalyzer::default();
        assert_eq!(
            chord_features(&track(10.0, &[]), c_major(), &analyzer),
            Err(FeatureError::NoChords)
        );
        assert_eq!(
            chord_features(&track(0.0, &["Cmaj"]), c_major(), &analyzer),
            Err(FeatureError::NonPositiveLength(0.0))
        );
    }

    #[test]
    fn unknown_chord_label_propagates() {
        let analyzer = ProgressionAnalyzer::default();
        let err = chord_features(&track(4.0, &["Cmaj", "C7"]), c_major(), &analyzer).unwrap_err();
        assert_eq!(
            err,
            FeatureError::Harmony(harmony::Error::UnknownChordLabel {
                label: "C7".into(),
                position: 1,
            })
        );
    }
}
