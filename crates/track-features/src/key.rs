use harmony::{Key, KeyMode};

use crate::error::Result;
use crate::record::FeatureRecord;
use crate::types::KeyAnnotation;

pub const KEY_MINOR: &str = "ICK_Key_Pcminor";

/// Roots with an indicator column; B (11) is the all-zero baseline.
const INDICATED_ROOTS: u8 = 11;

pub fn resolve_key(annotation: &KeyAnnotation) -> Result<Key> {
    Ok(Key::parse(&annotation.root, &annotation.mode)?)
}

/// Mode flag plus one-hot root indicators `ICK_Key_PC1` ..= `ICK_Key_PC11`.
pub fn key_features(key: Key) -> FeatureRecord {
    let mut record = FeatureRecord::new();
    record.insert_flag(KEY_MINOR, key.mode == KeyMode::Minor);
    for root in 0..INDICATED_ROOTS {
        record.insert_flag(
            format!("ICK_Key_PC{}", root + 1),
            key.root.value() == root,
        );
    }
    record
}
