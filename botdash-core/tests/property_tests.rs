//! Property tests for statistics and chart-window invariants.
//!
//! Uses proptest to verify:
//! 1. Summary stats - mean and median lie within [min, max], std-dev ≥ 0
//! 2. Distribution - bucket counts sum to the series length
//! 3. Cumulative - non-decreasing, ends at 100
//! 4. Moving averages - defined exactly when the window is full
//! 5. Percentage change - first is 0, the rest follow the formula
//! 6. View range - zoom and pan stay inside the series

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use botdash_core::analysis::{cumulative, distribution, moving_average, percent_change, summarize};
use botdash_core::chart::ViewRange;
use botdash_core::domain::TimeSeriesPoint;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_values() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1_000.0..1_000.0_f64, 1..80)
}

fn arb_series() -> impl Strategy<Value = Vec<TimeSeriesPoint>> {
    arb_values().prop_map(|values| {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        values
            .into_iter()
            .enumerate()
            .map(|(i, v)| TimeSeriesPoint::new(base + Duration::seconds(30 * i as i64), v))
            .collect()
    })
}

fn arb_range() -> impl Strategy<Value = (ViewRange, usize)> {
    (1usize..300).prop_flat_map(|len| {
        (0..len).prop_flat_map(move |a| {
            (a..len).prop_map(move |b| (ViewRange { start: a, end: b }, len))
        })
    })
}

// ── 1-3. Summary and distribution ────────────────────────────────────

proptest! {
    #[test]
    fn mean_within_bounds(values in arb_values()) {
        let s = summarize(&values).unwrap();
        prop_assert!(s.mean >= s.min - 1e-9 && s.mean <= s.max + 1e-9);
        prop_assert!(s.median >= s.min && s.median <= s.max);
        prop_assert!(s.std_dev >= 0.0);
        prop_assert_eq!(s.count, values.len());
    }

    #[test]
    fn buckets_cover_every_value(values in arb_values()) {
        let buckets = distribution(&values, "CPU Usage");
        prop_assert_eq!(buckets.len(), 10);
        prop_assert_eq!(buckets.iter().map(|b| b.count).sum::<usize>(), values.len());
    }

    #[test]
    fn constant_series_single_bucket(v in -1_000.0..1_000.0_f64, n in 1usize..50) {
        let values = vec![v; n];
        let buckets = distribution(&values, "Disk I/O");
        prop_assert_eq!(buckets[0].count, n);
    }

    #[test]
    fn cumulative_ends_at_hundred(values in arb_values()) {
        let cum = cumulative(&distribution(&values, "Response Time"));
        for w in cum.windows(2) {
            prop_assert!(w[1].cumulative_pct >= w[0].cumulative_pct);
        }
        let last = cum.last().unwrap().cumulative_pct;
        prop_assert!((last - 100.0).abs() < 1e-9);
    }
}

// ── 4-5. Time-indexed transforms ─────────────────────────────────────

proptest! {
    #[test]
    fn moving_average_matches_window_mean(points in arb_series(), window in 1usize..25) {
        let ma = moving_average(&points, window);
        prop_assert_eq!(ma.len(), points.len());
        for (i, p) in ma.iter().enumerate() {
            if i + 1 < window {
                prop_assert!(p.ma.is_none());
            } else {
                let expected: f64 =
                    points[i + 1 - window..=i].iter().map(|q| q.value).sum::<f64>() / window as f64;
                prop_assert!((p.ma.unwrap() - expected).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn percent_change_formula(points in arb_series()) {
        let pc = percent_change(&points);
        prop_assert_eq!(pc[0].percent_change, Some(0.0));
        for i in 1..points.len() {
            let prev = points[i - 1].value;
            if prev != 0.0 {
                let expected = (points[i].value - prev) / prev * 100.0;
                prop_assert_eq!(pc[i].percent_change, Some(expected));
            } else {
                prop_assert!(pc[i].percent_change.is_none());
            }
        }
    }
}

// ── 6. View range ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn zoom_in_keeps_min_span((range, len) in arb_range()) {
        let z = range.zoom_in(len);
        prop_assert!(z.start <= z.end && z.end < len);
        if range.span() > 2 {
            prop_assert!(z.span() >= 2);
            prop_assert!(z.span() < range.span());
        } else {
            prop_assert_eq!(z, range);
        }
    }

    #[test]
    fn zoom_out_stays_in_bounds((range, len) in arb_range()) {
        let z = range.zoom_out(len);
        prop_assert!(z.start <= z.end && z.end < len);
        prop_assert!(z.span() >= range.span());
        if range.span() < len - 1 {
            prop_assert!(z.span() > range.span());
        }
    }

    #[test]
    fn pan_preserves_span((range, len) in arb_range(), delta in -500isize..500) {
        let p = range.pan(delta, len);
        prop_assert!(p.end < len);
        prop_assert_eq!(p.span(), range.span());
    }

    #[test]
    fn slider_within_series(lo in -10.0..110.0_f64, hi in -10.0..110.0_f64, len in 1usize..500) {
        let r = ViewRange::from_percentages(lo, hi, len);
        prop_assert!(r.start <= r.end && r.end < len);
    }
}
