use serde::{Deserialize, Serialize};

/// Decoded description of one track, as produced by an upstream music
/// description decoder.
///
/// Segments are in temporal order. A segment may carry a chord label, a
/// structural part label, both, or neither.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackDescription {
    /// Duration of the analysed audio, in seconds.
    pub length_secs: f64,
    pub key: KeyAnnotation,
    pub rhythm: RhythmDescription,
    #[serde(default)]
    pub segments: Vec<Segment>,
}

impl TrackDescription {
    /// Chord labels of all chord-annotated segments, duplicates kept.
    pub fn chord_labels(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|s| s.chord.as_deref())
            .collect()
    }
}

/// Estimated key as the `(root, mode)` pair the decoder reports, e.g. `("Eb", "min")`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyAnnotation {
    pub root: String,
    pub mode: String,
}

impl KeyAnnotation {
    pub fn new(root: impl Into<String>, mode: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            mode: mode.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RhythmDescription {
    /// Decoder meter code: "22", "23", "32", ...
    pub meter: String,
    pub bpm_mean: f64,
    pub bpm_std: f64,
    /// Normalised percussivity.
    pub percussivity: f64,
    /// Normalised rhythmic complexity.
    pub complexity: f64,
    pub speed_a: f64,
    pub speed_b: f64,
    pub periodicity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub time_secs: f64,
    pub length_secs: f64,
    #[serde(default)]
    pub chord: Option<String>,
    #[serde(default)]
    pub part: Option<String>,
}

impl Segment {
    pub fn chord(time_secs: f64, length_secs: f64, label: impl Into<String>) -> Self {
        Self {
            time_secs,
            length_secs,
            chord: Some(label.into()),
            part: None,
        }
    }

    pub fn part(time_secs: f64, length_secs: f64, label: impl Into<String>) -> Self {
        Self {
            time_secs,
            length_secs,
            chord: None,
            part: Some(label.into()),
        }
    }

    pub fn end_secs(&self) -> f64 {
        self.time_secs + self.length_secs
    }
}

/// Excerpt boundaries within a full track, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtractWindow {
    pub start_secs: f64,
    pub stop_secs: f64,
}

impl ExtractWindow {
    pub fn new(start_secs: f64, stop_secs: f64) -> Self {
        Self {
            start_secs,
            stop_secs,
        }
    }

    /// Whether the window holds `t`, bounds inclusive.
    pub fn contains(&self, t: f64) -> bool {
        self.start_secs <= t && t <= self.stop_secs
    }

    /// Stable text form, used to key cached excerpt features.
    pub fn cache_tag(&self) -> String {
        format!("{:?}-{:?}", self.start_secs, self.stop_secs)
    }

    /// A segment overlaps when it starts inside, stops inside, or strictly spans the window.
    pub fn overlaps(&self, segment: &Segment) -> bool {
        let end = segment.end_secs();
        self.contains(segment.time_secs)
            || self.contains(end)
            || (segment.time_secs < self.start_secs && self.stop_secs < end)
    }
}
