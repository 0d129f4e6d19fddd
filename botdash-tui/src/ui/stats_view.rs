//! Statistics tab: summary, histogram, cumulative distribution, moving
//! averages and percentage change for one feature.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row,
    Table,
};
use ratatui::Frame;

use botdash_core::analysis::SeriesAnalysis;
use botdash_core::domain::TimeSeriesPoint;
use botdash_core::format::{format_signed_pct, format_value};

use crate::theme;
use crate::ui::plot;

const MA_COLORS: [ratatui::style::Color; 3] = [theme::POSITIVE, theme::WARNING, theme::NEUTRAL];

pub fn render(
    f: &mut Frame,
    area: Rect,
    feature: &str,
    series: &[TimeSeriesPoint],
    analysis: &SeriesAnalysis,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(28),
            Constraint::Percentage(40),
            Constraint::Percentage(32),
        ])
        .split(rows[0]);
    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[1]);

    render_summary(f, top[0], feature, analysis);
    render_histogram(f, top[1], analysis);
    render_cumulative(f, top[2], analysis);
    render_moving_averages(f, bottom[0], series, analysis);
    render_percent_change(f, bottom[1], analysis);
}

fn titled(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(theme::muted())
        .title(format!(" {title} "))
        .title_style(theme::accent_bold())
}

fn render_summary(f: &mut Frame, area: Rect, feature: &str, analysis: &SeriesAnalysis) {
    let s = &analysis.summary;
    let row = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{label:>9}: "), theme::muted()),
            Span::styled(value, theme::accent()),
        ])
    };
    let mut lines = vec![
        row("Samples", s.count.to_string()),
        row("Mean", format_value(feature, s.mean)),
        row("Median", format_value(feature, s.median)),
        row("Std dev", format!("{:.3}", s.std_dev)),
        row("Min", format_value(feature, s.min)),
        row("Max", format_value(feature, s.max)),
        row("Range", format_value(feature, s.range())),
    ];
    for (window, points) in &analysis.moving_averages {
        let latest = points.last().and_then(|p| p.ma);
        let text = latest.map_or_else(|| "n/a".to_string(), |v| format_value(feature, v));
        lines.push(row(&format!("MA({window})"), text));
    }
    f.render_widget(Paragraph::new(lines).block(titled("Summary")), area);
}

fn render_histogram(f: &mut Frame, area: Rect, analysis: &SeriesAnalysis) {
    let bars: Vec<Bar> = analysis
        .distribution
        .iter()
        .enumerate()
        .map(|(i, b)| {
            Bar::default()
                .value(b.count as u64)
                .label(Line::from((i + 1).to_string()))
        })
        .collect();
    let inner_width = area.width.saturating_sub(2);
    let slots = analysis.distribution.len().max(1) as u16;
    let bar_width = (inner_width / slots).saturating_sub(1).max(1);
    let chart = BarChart::default()
        .block(titled("Distribution"))
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(1)
        .bar_style(theme::accent())
        .value_style(theme::selected());
    f.render_widget(chart, area);
}

fn render_cumulative(f: &mut Frame, area: Rect, analysis: &SeriesAnalysis) {
    let rows: Vec<Row> = analysis
        .distribution
        .iter()
        .zip(&analysis.cumulative)
        .enumerate()
        .map(|(i, (bucket, cum))| {
            Row::new(vec![
                Cell::from(format!("{:>2}", i + 1)).style(theme::muted()),
                Cell::from(bucket.range_label.clone()).style(theme::text()),
                Cell::from(bucket.count.to_string()).style(theme::accent()),
                Cell::from(format!("{:.0}%", cum.cumulative_pct)).style(theme::neutral()),
            ])
        })
        .collect();
    let table = Table::new(
        rows,
        [
            Constraint::Length(2),
            Constraint::Min(10),
            Constraint::Length(5),
            Constraint::Length(5),
        ],
    )
    .header(Row::new(vec!["#", "Range", "Count", "Cum"]).style(theme::accent_bold()))
    .block(titled("Cumulative"));
    f.render_widget(table, area);
}

fn render_moving_averages(
    f: &mut Frame,
    area: Rect,
    series: &[TimeSeriesPoint],
    analysis: &SeriesAnalysis,
) {
    let raw = plot::indexed(series, 0);
    let averages: Vec<(usize, Vec<(f64, f64)>)> = analysis
        .moving_averages
        .iter()
        .map(|(window, points)| {
            let data = points
                .iter()
                .enumerate()
                .filter_map(|(i, p)| p.ma.map(|v| (i as f64, v)))
                .collect();
            (*window, data)
        })
        .collect();

    let mut datasets = vec![Dataset::default()
        .name("value")
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(theme::muted())
        .data(&raw)];
    for ((window, data), color) in averages.iter().zip(MA_COLORS) {
        datasets.push(
            Dataset::default()
                .name(format!("MA{window}"))
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(color))
                .data(data),
        );
    }

    let s = &analysis.summary;
    let chart = Chart::new(datasets)
        .block(titled("Moving averages"))
        .x_axis(Axis::default().bounds(plot::x_bounds(0, series.len().saturating_sub(1))))
        .y_axis(
            Axis::default()
                .bounds(plot::y_bounds(s.min, s.max))
                .labels(vec![
                    Span::styled(format!("{:.1}", s.min), theme::muted()),
                    Span::styled(format!("{:.1}", s.max), theme::muted()),
                ]),
        );
    f.render_widget(chart, area);
}

fn render_percent_change(f: &mut Frame, area: Rect, analysis: &SeriesAnalysis) {
    let data: Vec<(f64, f64)> = analysis
        .percent_change
        .iter()
        .enumerate()
        .filter_map(|(i, p)| p.percent_change.map(|v| (i as f64, v)))
        .collect();
    let (lo, hi) = data
        .iter()
        .fold((0.0_f64, 0.0_f64), |(lo, hi), &(_, v)| (lo.min(v), hi.max(v)));
    let latest = analysis
        .percent_change
        .last()
        .and_then(|p| p.percent_change)
        .map_or_else(|| "n/a".to_string(), format_signed_pct);

    let dataset = Dataset::default()
        .marker(Marker::HalfBlock)
        .graph_type(GraphType::Bar)
        .style(theme::warning())
        .data(&data);
    let chart = Chart::new(vec![dataset])
        .block(titled(&format!("% change (last {latest})")))
        .x_axis(Axis::default().bounds(plot::x_bounds(0, analysis.percent_change.len().saturating_sub(1))))
        .y_axis(
            Axis::default()
                .bounds(plot::y_bounds(lo, hi))
                .labels(vec![
                    Span::styled(format_signed_pct(lo), theme::muted()),
                    Span::styled(format_signed_pct(hi), theme::muted()),
                ]),
        );
    f.render_widget(chart, area);
}
