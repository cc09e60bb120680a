use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Named numeric features for one track, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureRecord {
    values: BTreeMap<String, f64>,
}

impl FeatureRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    /// Store a flag as 1.0 / 0.0.
    pub fn insert_flag(&mut self, name: impl Into<String>, flag: bool) {
        self.insert(name, if flag { 1.0 } else { 0.0 });
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Whether every value survives a JSON round trip (no NaN or infinity).
    pub fn is_finite(&self) -> bool {
        self.values.values().all(|v| v.is_finite())
    }

    /// Fold another record in; its values win on name clashes.
    pub fn merge(&mut self, other: FeatureRecord) {
        self.values.extend(other.values);
    }
}

impl<K: Into<String>> Extend<(K, f64)> for FeatureRecord {
    fn extend<I: IntoIterator<Item = (K, f64)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for FeatureRecord {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut record = FeatureRecord::new();
        record.extend(iter);
        record
    }
}
