//! Harmonic analysis over estimated chord sequences.
//!
//! Builds the closed taxonomy of 24 keys and 48 triads, the chord-in-key
//! relation between them, and the progression features (functional ratio,
//! cadence and turnaround frequencies, tonic recurrence) computed from a chord
//! sequence in a known key.
//!
//! ```
//! use harmony::{Key, ProgressionAnalyzer, RootPattern};
//!
//! let key = Key::parse("C", "Maj").unwrap();
//! let features = ProgressionAnalyzer::default()
//!     .analyze(&["Dmin", "Gmaj", "Cmaj"], key)
//!     .unwrap();
//!
//! assert_eq!(features.count(RootPattern::SupertonicCadence), 1);
//! assert_eq!(features.functional_ratio, 1.0);
//! ```

pub mod chord_in_key;
pub mod error;
pub mod pitch;
pub mod progression;
pub mod taxonomy;

pub use chord_in_key::ChordInKey;
pub use error::{Error, Result};
pub use pitch::{PitchClass, PitchClassSet, ROOT_NAMES};
pub use progression::{
    is_interval_down, ProgressionAnalyzer, ProgressionFeatures, RootPattern, TonicRecurrence,
    TonicSource,
};
pub use taxonomy::{Chord, ChordQuality, Key, KeyMode, Taxonomy, CHORD_COUNT, KEY_COUNT};
