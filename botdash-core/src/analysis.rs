//! Statistical analysis - pure functions over a chronological series.
//!
//! Every function takes a slice and returns owned results. Empty input yields
//! `None` or an empty vector rather than a NaN-filled structure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::TimeSeriesPoint;
use crate::format::format_value;

/// Number of histogram buckets in the distribution view.
pub const BUCKET_COUNT: usize = 10;

/// Moving-average windows shown in the statistics tab.
pub const MOVING_AVERAGE_WINDOWS: [usize; 3] = [5, 10, 20];

/// Summary statistics of a non-empty series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub sum: f64,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation.
    pub std_dev: f64,
}

impl SummaryStats {
    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionBucket {
    pub range_label: String,
    pub count: usize,
    pub midpoint: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativePoint {
    pub range_label: String,
    pub midpoint: f64,
    pub cumulative_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingAveragePoint {
    pub timestamp: DateTime<Utc>,
    /// `None` until the window has filled.
    pub ma: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentChangePoint {
    pub timestamp: DateTime<Utc>,
    /// `None` when the previous value is zero.
    pub percent_change: Option<f64>,
}

// ─── Summary ────────────────────────────────────────────────────────

pub fn summarize(values: &[f64]) -> Option<SummaryStats> {
    if values.is_empty() {
        return None;
    }
    let count = values.len();
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let sum: f64 = values.iter().sum();
    let mean = sum / count as f64;

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let median = if count % 2 == 0 {
        (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
    } else {
        sorted[count / 2]
    };

    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;

    Some(SummaryStats {
        count,
        min,
        max,
        sum,
        mean,
        median,
        std_dev: variance.sqrt(),
    })
}

// ─── Distribution ───────────────────────────────────────────────────

/// Ten equal-width buckets over `[min, max]`. The maximum lands in the last
/// bucket; a constant series lands entirely in the first.
pub fn distribution(values: &[f64], feature: &str) -> Vec<DistributionBucket> {
    let Some(stats) = summarize(values) else {
        return Vec::new();
    };
    let width = stats.range() / BUCKET_COUNT as f64;

    let mut buckets: Vec<DistributionBucket> = (0..BUCKET_COUNT)
        .map(|i| {
            let lo = stats.min + i as f64 * width;
            let hi = stats.min + (i + 1) as f64 * width;
            DistributionBucket {
                range_label: format!(
                    "{}-{}",
                    format_value(feature, lo),
                    format_value(feature, hi)
                ),
                count: 0,
                midpoint: stats.min + (i as f64 + 0.5) * width,
            }
        })
        .collect();

    for &v in values {
        buckets[bucket_index(v, stats.min, width)].count += 1;
    }
    buckets
}

fn bucket_index(value: f64, min: f64, width: f64) -> usize {
    if width <= 0.0 || !width.is_finite() {
        return 0;
    }
    let raw = ((value - min) / width).floor();
    if raw <= 0.0 {
        0
    } else {
        (raw as usize).min(BUCKET_COUNT - 1)
    }
}

/// Running share of samples at or below each bucket, in percent.
pub fn cumulative(buckets: &[DistributionBucket]) -> Vec<CumulativePoint> {
    let total: usize = buckets.iter().map(|b| b.count).sum();
    if total == 0 {
        return Vec::new();
    }
    let mut running = 0usize;
    buckets
        .iter()
        .map(|b| {
            running += b.count;
            CumulativePoint {
                range_label: b.range_label.clone(),
                midpoint: b.midpoint,
                cumulative_pct: running as f64 / total as f64 * 100.0,
            }
        })
        .collect()
}

// ─── Time-indexed transforms ────────────────────────────────────────

/// Simple moving average over `window` samples ending at each index.
pub fn moving_average(points: &[TimeSeriesPoint], window: usize) -> Vec<MovingAveragePoint> {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let ma = (window > 0 && i + 1 >= window).then(|| {
                points[i + 1 - window..=i].iter().map(|q| q.value).sum::<f64>() / window as f64
            });
            MovingAveragePoint {
                timestamp: p.timestamp,
                ma,
            }
        })
        .collect()
}

/// Period-over-period change in percent; the first point is 0.
pub fn percent_change(points: &[TimeSeriesPoint]) -> Vec<PercentChangePoint> {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let percent_change = if i == 0 {
                Some(0.0)
            } else {
                let prev = points[i - 1].value;
                (prev != 0.0).then(|| (p.value - prev) / prev * 100.0)
            };
            PercentChangePoint {
                timestamp: p.timestamp,
                percent_change,
            }
        })
        .collect()
}

// ─── Bundles ────────────────────────────────────────────────────────

/// Everything the statistics tab shows for one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesAnalysis {
    pub summary: SummaryStats,
    pub distribution: Vec<DistributionBucket>,
    pub cumulative: Vec<CumulativePoint>,
    /// One entry per window in [`MOVING_AVERAGE_WINDOWS`].
    pub moving_averages: Vec<(usize, Vec<MovingAveragePoint>)>,
    pub percent_change: Vec<PercentChangePoint>,
}

impl SeriesAnalysis {
    pub fn compute(points: &[TimeSeriesPoint], feature: &str) -> Option<Self> {
        let values: Vec<f64> = points.iter().map(|p| p.value).collect();
        let summary = summarize(&values)?;
        let distribution = distribution(&values, feature);
        let cumulative = cumulative(&distribution);
        let moving_averages = MOVING_AVERAGE_WINDOWS
            .iter()
            .map(|&w| (w, moving_average(points, w)))
            .collect();
        Some(Self {
            summary,
            distribution,
            cumulative,
            moving_averages,
            percent_change: percent_change(points),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Up,
    Down,
    Flat,
}

/// Change between the last two samples, as shown on a feature card.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatestChange {
    pub current: f64,
    pub previous: f64,
    pub change: f64,
    pub change_pct: f64,
    pub trend: Trend,
}

impl LatestChange {
    /// `None` for an empty series. A single sample compares against itself.
    pub fn of(points: &[TimeSeriesPoint]) -> Option<Self> {
        let current = points.last()?.value;
        let previous = points
            .len()
            .checked_sub(2)
            .map(|i| points[i].value)
            .unwrap_or(current);
        let change = current - previous;
        let change_pct = if previous != 0.0 {
            change / previous * 100.0
        } else {
            0.0
        };
        let trend = if change > 0.0 {
            Trend::Up
        } else if change < 0.0 {
            Trend::Down
        } else {
            Trend::Flat
        };
        Some(Self {
            current,
            previous,
            change,
            change_pct,
            trend,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn series(values: &[f64]) -> Vec<TimeSeriesPoint> {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| TimeSeriesPoint::new(base + Duration::seconds(30 * i as i64), v))
            .collect()
    }

    #[test]
    fn summary_of_one_to_five() {
        let s = summarize(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(s.count, 5);
        assert_eq!(s.mean, 3.0);
        assert_eq!(s.median, 3.0);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 5.0);
        assert!((s.std_dev - 2f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn even_median_averages_middle() {
        let s = summarize(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(s.median, 2.5);
    }

    #[test]
    fn empty_input() {
        assert!(summarize(&[]).is_none());
        assert!(distribution(&[], "CPU Usage").is_empty());
        assert!(SeriesAnalysis::compute(&[], "CPU Usage").is_none());
        assert!(LatestChange::of(&[]).is_none());
    }

    #[test]
    fn constant_series_in_first_bucket() {
        let values = [10.0, 10.0, 10.0];
        let s = summarize(&values).unwrap();
        assert_eq!(s.std_dev, 0.0);

        let buckets = distribution(&values, "CPU Usage");
        assert_eq!(buckets.len(), BUCKET_COUNT);
        assert_eq!(buckets[0].count, 3);
        assert!(buckets[1..].iter().all(|b| b.count == 0));

        let cum = cumulative(&buckets);
        assert_eq!(cum[0].cumulative_pct, 100.0);
        assert_eq!(cum.last().unwrap().cumulative_pct, 100.0);
    }

    #[test]
    fn maximum_goes_to_last_bucket() {
        let values: Vec<f64> = (0..=100).map(f64::from).collect();
        let buckets = distribution(&values, "Response Time");
        assert_eq!(buckets[9].count, 11);
        assert_eq!(buckets[0].range_label, "0ms-10ms");
        assert_eq!(buckets.iter().map(|b| b.count).sum::<usize>(), 101);
        assert!((buckets[0].midpoint - 5.0).abs() < 1e-9);
    }

    #[test]
    fn moving_average_windows() {
        let pts = series(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let ma = moving_average(&pts, 5);
        assert!(ma[..4].iter().all(|p| p.ma.is_none()));
        assert_eq!(ma[4].ma, Some(3.0));
        assert_eq!(ma[5].ma, Some(4.0));

        assert!(moving_average(&pts, 0).iter().all(|p| p.ma.is_none()));
        assert!(moving_average(&pts, 20).iter().all(|p| p.ma.is_none()));
    }

    #[test]
    fn percent_change_handles_zero() {
        let pts = series(&[100.0, 110.0, 0.0, 5.0]);
        let pc = percent_change(&pts);
        assert_eq!(pc[0].percent_change, Some(0.0));
        assert!((pc[1].percent_change.unwrap() - 10.0).abs() < 1e-9);
        assert_eq!(pc[2].percent_change, Some(-100.0));
        assert_eq!(pc[3].percent_change, None);
    }

    #[test]
    fn bundle_has_every_window() {
        let pts = series(&(0..25).map(f64::from).collect::<Vec<_>>());
        let a = SeriesAnalysis::compute(&pts, "Disk I/O").unwrap();
        let windows: Vec<usize> = a.moving_averages.iter().map(|(w, _)| *w).collect();
        assert_eq!(windows, vec![5, 10, 20]);
        assert_eq!(a.percent_change.len(), 25);
        assert_eq!(a.cumulative.len(), BUCKET_COUNT);
    }

    #[test]
    fn latest_change_trend() {
        let up = LatestChange::of(&series(&[50.0, 55.0])).unwrap();
        assert_eq!(up.trend, Trend::Up);
        assert!((up.change_pct - 10.0).abs() < 1e-9);

        let flat = LatestChange::of(&series(&[7.0])).unwrap();
        assert_eq!(flat.trend, Trend::Flat);

        let from_zero = LatestChange::of(&series(&[0.0, 3.0])).unwrap();
        assert_eq!(from_zero.change_pct, 0.0);
        assert_eq!(from_zero.trend, Trend::Up);
    }
}
