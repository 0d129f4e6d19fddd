//! Shared helpers for drawing series with the ratatui `Chart` widget.

use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::widgets::{Dataset, GraphType};

use botdash_core::chart::ChartType;
use botdash_core::domain::TimeSeriesPoint;

/// `(x, y)` pairs with `x` the index into the full series.
pub fn indexed(points: &[TimeSeriesPoint], first_index: usize) -> Vec<(f64, f64)> {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| ((first_index + i) as f64, p.value))
        .collect()
}

/// Datasets that draw `data` as a line, a filled area or bars.
pub fn series_datasets(data: &[(f64, f64)], chart_type: ChartType, color: Color) -> Vec<Dataset<'_>> {
    let line = Dataset::default()
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(data);
    match chart_type {
        ChartType::Line => vec![line],
        ChartType::Area => vec![
            Dataset::default()
                .marker(Marker::Braille)
                .graph_type(GraphType::Bar)
                .style(Style::default().fg(color).add_modifier(Modifier::DIM))
                .data(data),
            line,
        ],
        ChartType::Bar => vec![Dataset::default()
            .marker(Marker::HalfBlock)
            .graph_type(GraphType::Bar)
            .style(Style::default().fg(color))
            .data(data)],
    }
}

/// X bounds for indices `start..=end`; a single point still gets width.
pub fn x_bounds(start: usize, end: usize) -> [f64; 2] {
    if end > start {
        [start as f64, end as f64]
    } else {
        [start as f64, start as f64 + 1.0]
    }
}

/// Y bounds with a flat series padded so it stays visible.
pub fn y_bounds(min: f64, max: f64) -> [f64; 2] {
    if max > min {
        [min, max]
    } else {
        [min - 1.0, max + 1.0]
    }
}

/// Scale values onto `0..=100` for the sparkline widget; a flat series sits mid-height.
pub fn percent_scale(values: &[f64]) -> Vec<u64> {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let span = max - min;
    values
        .iter()
        .map(|&v| {
            if span > 0.0 {
                (((v - min) / span) * 100.0).round() as u64
            } else {
                50
            }
        })
        .collect()
}
