//! Features - named metric series reported by the bot (CPU Usage, Response Time, ...).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::series::{wire_timestamp, TimeSeriesPoint};

/// One sample of a named feature, as sent by `GET /api/features`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturePoint {
    pub name: String,
    pub value: f64,
    #[serde(with = "wire_timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl From<&FeaturePoint> for TimeSeriesPoint {
    fn from(p: &FeaturePoint) -> Self {
        TimeSeriesPoint::new(p.timestamp, p.value)
    }
}

/// Feature name → chronological samples. Ordered by name so rendering is stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSet(pub BTreeMap<String, Vec<FeaturePoint>>);

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, points: Vec<FeaturePoint>) {
        self.0.insert(name.into(), points);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<&[FeaturePoint]> {
        self.0.get(name).map(Vec::as_slice)
    }

    /// The named feature as a generic series, or empty if unknown.
    pub fn series(&self, name: &str) -> Vec<TimeSeriesPoint> {
        self.get(name)
            .map(|pts| pts.iter().map(TimeSeriesPoint::from).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Content hash used to detect that a refresh actually changed the data.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for (name, points) in &self.0 {
            hasher.update(name.as_bytes());
            for p in points {
                hasher.update(&p.value.to_le_bytes());
                hasher.update(&p.timestamp.timestamp_millis().to_le_bytes());
            }
        }
        hasher.finalize().to_hex().to_string()
    }

    /// Per-feature fingerprints, for flashing only the cards that changed.
    pub fn feature_fingerprints(&self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .map(|(name, points)| {
                let mut hasher = blake3::Hasher::new();
                for p in points {
                    hasher.update(&p.value.to_le_bytes());
                    hasher.update(&p.timestamp.timestamp_millis().to_le_bytes());
                }
                (name.clone(), hasher.finalize().to_hex().to_string())
            })
            .collect()
    }
}
