//! Criterion benchmarks for the statistics tab and chart interaction.
//!
//! Benchmarks:
//! 1. Full series analysis (summary, histogram, cumulative, moving averages, % change)
//! 2. Moving average alone at each window size
//! 3. Zoom in/out sweep over a long series

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use botdash_core::analysis::{moving_average, SeriesAnalysis, MOVING_AVERAGE_WINDOWS};
use botdash_core::chart::ViewRange;
use botdash_core::domain::TimeSeriesPoint;

// ── Helpers ──────────────────────────────────────────────────────────

fn make_series(n: usize) -> Vec<TimeSeriesPoint> {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (0..n)
        .map(|i| {
            let value = 50.0 + (i as f64 * 0.1).sin() * 25.0;
            TimeSeriesPoint::new(base + Duration::seconds(30 * i as i64), value)
        })
        .collect()
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("series_analysis");
    for n in [20usize, 1_000, 10_000] {
        let series = make_series(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &series, |b, s| {
            b.iter(|| SeriesAnalysis::compute(black_box(s), "CPU Usage"))
        });
    }
    group.finish();
}

fn bench_moving_average(c: &mut Criterion) {
    let series = make_series(10_000);
    let mut group = c.benchmark_group("moving_average");
    for w in MOVING_AVERAGE_WINDOWS {
        group.bench_with_input(BenchmarkId::from_parameter(w), &w, |b, &w| {
            b.iter(|| moving_average(black_box(&series), w))
        });
    }
    group.finish();
}

fn bench_zoom(c: &mut Criterion) {
    let len = 100_000;
    c.bench_function("zoom_sweep", |b| {
        b.iter(|| {
            let mut r = ViewRange::full(len);
            for _ in 0..30 {
                r = r.zoom_in(len);
            }
            for _ in 0..30 {
                r = r.zoom_out(len);
            }
            black_box(r)
        })
    });
}

criterion_group!(benches, bench_analysis, bench_moving_average, bench_zoom);
criterion_main!(benches);
