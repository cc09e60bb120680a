use harmony::{Key, ProgressionAnalyzer, Taxonomy};

use crate::chords::chord_features;
use crate::error::Result;
use crate::key::{key_features, resolve_key};
use crate::record::FeatureRecord;
use crate::rhythm::rhythm_features;
use crate::structure::structure_features;
use crate::types::{ExtractWindow, KeyAnnotation, RhythmDescription, Segment, TrackDescription};

/// Trait for track feature backends.
///
/// Each method covers one feature family; the engine composes them into a
/// single [`FeatureRecord`].
pub trait TrackAnalyzer: Send + Sync {
    /// Resolve the annotated key and describe it.
    fn key_features(&self, key: &KeyAnnotation) -> Result<(Key, FeatureRecord)>;

    fn chord_features(&self, track: &TrackDescription, key: Key) -> Result<FeatureRecord>;

    fn rhythm_features(&self, rhythm: &RhythmDescription) -> FeatureRecord;

    fn structure_features(
        &self,
        segments: &[Segment],
        window: Option<&ExtractWindow>,
    ) -> FeatureRecord;
}

/// Analyzer reading features straight off the decoded description, using
/// the shared harmony taxonomy for chord analysis.
pub struct DescriptorAnalyzer {
    taxonomy: &'static Taxonomy,
}

impl DescriptorAnalyzer {
    pub fn new() -> Self {
        Self {
            taxonomy: Taxonomy::global(),
        }
    }
}

impl Default for DescriptorAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackAnalyzer for DescriptorAnalyzer {
    fn key_features(&self, key: &KeyAnnotation) -> Result<(Key, FeatureRecord)> {
        let key = resolve_key(key)?;
        Ok((key, key_features(key)))
    }

    fn chord_features(&self, track: &TrackDescription, key: Key) -> Result<FeatureRecord> {
        chord_features(track, key, &ProgressionAnalyzer::new(self.taxonomy))
    }

    fn rhythm_features(&self, rhythm: &RhythmDescription) -> FeatureRecord {
        rhythm_features(rhythm)
    }

    fn structure_features(
        &self,
        segments: &[Segment],
        window: Option<&ExtractWindow>,
    ) -> FeatureRecord {
        structure_features(segments, window)
    }
}
