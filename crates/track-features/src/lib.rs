//! Track-level music features computed from decoded music descriptions.
//!
//! A [`FeatureEngine`] turns a [`TrackDescription`] (estimated key, chord
//! segments, rhythm descriptors, structural parts) into a flat
//! [`FeatureRecord`] of named numbers, optionally caching results in SQLite
//! by `(content_hash, version)`.

pub mod analyzer;
pub mod cache;
pub mod chords;
pub mod error;
pub mod key;
pub mod record;
pub mod rhythm;
pub mod structure;
pub mod types;

pub use analyzer::{DescriptorAnalyzer, TrackAnalyzer};
pub use cache::FeatureCache;
pub use error::FeatureError;
pub use record::FeatureRecord;
pub use types::{ExtractWindow, KeyAnnotation, RhythmDescription, Segment, TrackDescription};

use std::fmt;
use std::sync::Arc;

use anyhow::{Context, Result};
use featconf::FeaturesConfig;
use rayon::prelude::*;
use tracing::{debug, info, warn};

/// Current feature version; bump to invalidate cache.
pub const FEATURES_VERSION: u32 = 1;

/// Composes key, chord, rhythm and structure features into one record.
///
/// Structure features are only part of the record when an [`ExtractWindow`]
/// is supplied.
pub struct FeatureEngine {
    analyzer: Arc<dyn TrackAnalyzer>,
    cache: Option<FeatureCache>,
}

impl FeatureEngine {
    /// Create with the default descriptor analyzer.
    pub fn new(config: &FeaturesConfig) -> Result<Self> {
        Self::with_analyzer(Arc::new(DescriptorAnalyzer::new()), config)
    }

    /// Create with a custom analyzer.
    pub fn with_analyzer(analyzer: Arc<dyn TrackAnalyzer>, config: &FeaturesConfig) -> Result<Self> {
        let cache = if config.cache.enabled {
            let cache = FeatureCache::open(&config.paths.cache_db)
                .context("opening feature cache")?;
            Some(cache)
        } else {
            None
        };

        Ok(Self { analyzer, cache })
    }

    /// Compute features for `track`, returning cached results when available.
    pub fn extract(
        &self,
        content_hash: &str,
        track: &TrackDescription,
        window: Option<&ExtractWindow>,
    ) -> Result<FeatureRecord> {
        let Some(cache) = &self.cache else {
            return self.compute(track, window);
        };

        let key = cache_key(content_hash, window);
        if let Some(cached) = cache.get(&key, FEATURES_VERSION)? {
            info!(key = %key, "feature cache hit");
            return Ok(cached);
        }

        info!(key = %key, "feature cache miss, computing");

        let record = self.compute(track, window)?;
        cache.put(&key, FEATURES_VERSION, &record)?;

        Ok(record)
    }

    /// Compute features with no cache interaction.
    pub fn compute(
        &self,
        track: &TrackDescription,
        window: Option<&ExtractWindow>,
    ) -> Result<FeatureRecord> {
        let (key, mut record) = self.analyzer.key_features(&track.key)?;
        record.merge(self.analyzer.chord_features(track, key)?);
        record.merge(self.analyzer.rhythm_features(&track.rhythm));

        if let Some(window) = window {
            record.merge(
                self.analyzer
                    .structure_features(&track.segments, Some(window)),
            );
        }

        debug!(key = %key, features = record.len(), "computed track features");
        Ok(record)
    }

    /// Compute many tracks in parallel. Results keep input order and fail independently.
    pub fn compute_batch<I>(&self, tracks: &[(I, TrackDescription)]) -> Vec<(I, Result<FeatureRecord>)>
    where
        I: Clone + Send + Sync + fmt::Debug,
    {
        tracks
            .par_iter()
            .map(|(id, track)| {
                let result = self.compute(track, None);
                if let Err(e) = &result {
                    warn!(id = ?id, error = %e, "feature extraction failed");
                }
                (id.clone(), result)
            })
            .collect()
    }
}

/// Full-track records live under the bare hash; excerpts add their window.
fn cache_key(content_hash: &str, window: Option<&ExtractWindow>) -> String {
    match window {
        Some(window) => format!("{content_hash}@{}", window.cache_tag()),
        None => content_hash.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn uncached() -> FeaturesConfig {
        let mut config = FeaturesConfig::default();
        config.cache.enabled = false;
        config.paths.cache_db = PathBuf::from("/nonexistent/never-opened.db");
        config
    }

    fn ballad() -> TrackDescription {
        TrackDescription {
            length_secs: 16.0,
            key: KeyAnnotation::new("A", "min"),
            rhythm: RhythmDescription {
                meter: "22".into(),
                bpm_mean: 72.0,
                bpm_std: 1.5,
                percussivity: 0.2,
                complexity: 0.1,
                speed_a: 0.3,
                speed_b: 0.25,
                periodicity: 0.9,
            },
            segments: vec![
                Segment::part(0.0, 8.0, "verse"),
                Segment::chord(0.0, 4.0, "Amin"),
                Segment::chord(4.0, 4.0, "Dmin"),
                Segment::part(8.0, 8.0, "chorus"),
                Segment::chord(8.0, 4.0, "Emin"),
                Segment::chord(12.0, 4.0, "Amin"),
            ],
        }
    }

    #[test]
    fn disabled_cache_is_never_opened() {
        let engine = FeatureEngine::new(&uncached()).unwrap();
        assert!(engine.cache.is_none());
        assert!(engine.extract("h", &ballad(), None).is_ok());
    }

    #[test]
    fn full_track_omits_structure() {
        let engine = FeatureEngine::new(&uncached()).unwrap();
        let record = engine.compute(&ballad(), None).unwrap();

        assert_eq!(record.get("ICK_Key_Pcminor"), Some(1.0));
        assert_eq!(record.get("ICK_Key_PC10"), Some(1.0));
        assert_eq!(record.get("Chords_Num_01"), Some(0.25));
        assert_eq!(record.get("Chords_Mode_02"), Some(0.0));
        assert_eq!(record.get("ICB_BPM_Mean"), Some(72.0));
        assert_eq!(record.get(structure::PARTS_TOTAL), None);
        // 12 key + 13 chord + 9 rhythm
        assert_eq!(record.len(), 34);
    }

    #[test]
    fn window_adds_structure() {
        let engine = FeatureEngine::new(&uncached()).unwrap();
        let record = engine
            .compute(&ballad(), Some(&ExtractWindow::new(2.0, 6.0)))
            .unwrap();

        assert_eq!(record.get(structure::PARTS_TOTAL), Some(1.0));
        assert_eq!(record.get(structure::PARTS_UNIQUE), Some(1.0));
    }

    #[test]
    fn cache_keys_separate_windows() {
        let window = ExtractWindow::new(12.5, 42.0);
        assert_eq!(cache_key("abc", None), "abc");
        assert_eq!(cache_key("abc", Some(&window)), "abc@12.5-42.0");
    }

    #[test]
    fn domain_errors_downcast() {
        let engine = FeatureEngine::new(&uncached()).unwrap();
        let mut track = ballad();
        track.segments.retain(|s| s.chord.is_none());

        let err = engine.compute(&track, None).unwrap_err();
        assert_eq!(err.downcast_ref::<FeatureError>(), Some(&FeatureError::NoChords));
    }
}
