use std::collections::HashSet;

use crate::record::FeatureRecord;
use crate::types::{ExtractWindow, Segment};

pub const PARTS_TOTAL: &str = "ICS_Part_Sequence_Total";
pub const PARTS_UNIQUE: &str = "ICS_Part_Sequence_Unique";

/// Part labels of the segments that overlap `window`, or of all part segments
/// when no window is given.
pub fn select_parts<'a>(segments: &'a [Segment], window: Option<&ExtractWindow>) -> Vec<&'a str> {
    segments
        .iter()
        .filter(|s| window.map_or(true, |w| w.overlaps(s)))
        .filter_map(|s| s.part.as_deref())
        .collect()
}

pub fn structure_features(segments: &[Segment], window: Option<&ExtractWindow>) -> FeatureRecord {
    let parts = select_parts(segments, window);
    let unique = parts.iter().collect::<HashSet<_>>().len();

    let mut record = FeatureRecord::new();
    record.insert(PARTS_TOTAL, parts.len() as f64);
    record.insert(PARTS_UNIQUE, unique as f64);
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn song() -> Vec<Segment> {
        vec![
            Segment::part(0.0, 10.0, "intro"),
            Segment::chord(0.0, 5.0, "Cmaj"),
            Segment::part(10.0, 30.0, "verse"),
            Segment::part(40.0, 20.0, "chorus"),
            Segment::part(60.0, 30.0, "verse"),
            Segment::part(90.0, 20.0, "chorus"),
        ]
    }

    #[test]
    fn whole_track() {
        let record = structure_features(&song(), None);
        assert_eq!(record.get(PARTS_TOTAL), Some(5.0));
        assert_eq!(record.get(PARTS_UNIQUE), Some(3.0));
    }

    #[test]
    fn window_selects_overlapping_parts() {
        let window = ExtractWindow::new(35.0, 65.0);
        assert_eq!(
            select_parts(&song(), Some(&window)),
            vec!["verse", "chorus", "verse"]
        );
    }

    #[test]
    fn window_inside_one_part() {
        let window = ExtractWindow::new(15.0, 25.0);
        let record = structure_features(&song(), Some(&window));
        assert_eq!(record.get(PARTS_TOTAL), Some(1.0));
        assert_eq!(record.get(PARTS_UNIQUE), Some(1.0));
    }

    #[test]
    fn no_parts() {
        let segments = vec![Segment::chord(0.0, 2.0, "Cmaj")];
        let record = structure_features(&segments, None);
        assert_eq!(record.get(PARTS_TOTAL), Some(0.0));
        assert_eq!(record.get(PARTS_UNIQUE), Some(0.0));
    }
}
