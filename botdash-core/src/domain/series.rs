//! TimeSeriesPoint - the unit every chart and statistic consumes.
//!
//! Backends send timestamps either as epoch milliseconds or as ISO-8601
//! strings. Both are normalised to `DateTime<Utc>` on the way in and written
//! back out as RFC 3339.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A single observation in a chronological series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    #[serde(with = "wire_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    /// Any additional fields the backend attached (e.g. `volume`).
    #[serde(flatten, default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl TimeSeriesPoint {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self {
            timestamp,
            value,
            extra: BTreeMap::new(),
        }
    }

    /// Numeric extra field, if present.
    pub fn extra_f64(&self, key: &str) -> Option<f64> {
        self.extra.get(key).and_then(|v| v.as_f64())
    }
}

/// Project a series onto its values.
pub fn values(points: &[TimeSeriesPoint]) -> Vec<f64> {
    points.iter().map(|p| p.value).collect()
}

/// Parse an ISO-8601 timestamp. Strings without an offset are taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

/// Serde adapter accepting epoch-millisecond integers or ISO strings.
pub mod wire_timestamp {
    use super::*;
    use serde::de::Error as _;
    use serde::{Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Millis(i64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        match Raw::deserialize(d)? {
            Raw::Millis(ms) => Utc
                .timestamp_millis_opt(ms)
                .single()
                .ok_or_else(|| D::Error::custom(format!("timestamp out of range: {ms}"))),
            Raw::Text(s) => {
                parse_timestamp(&s).ok_or_else(|| D::Error::custom(format!("invalid timestamp: {s}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_millis_and_iso() {
        let a: TimeSeriesPoint =
            serde_json::from_str(r#"{"timestamp":1700000000000,"value":1.5}"#).unwrap();
        let b: TimeSeriesPoint =
            serde_json::from_str(r#"{"timestamp":"2023-11-14T22:13:20.000Z","value":1.5}"#)
                .unwrap();
        assert_eq!(a.timestamp, b.timestamp);
        assert_eq!(a.value, 1.5);
    }

    #[test]
    fn keeps_extra_fields() {
        let p: TimeSeriesPoint = serde_json::from_str(
            r#"{"timestamp":"2024-01-01T00:00:00Z","value":10.0,"volume":250.0}"#,
        )
        .unwrap();
        assert_eq!(p.extra_f64("volume"), Some(250.0));
    }

    #[test]
    fn naive_strings_are_utc() {
        let ts = parse_timestamp("2024-03-04T05:06:07").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-03-04T05:06:07+00:00");
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn rejects_garbage_timestamp() {
        let r: Result<TimeSeriesPoint, _> =
            serde_json::from_str(r#"{"timestamp":"not a date","value":1.0}"#);
        assert!(r.is_err());
    }
}
