//! Panel 4 - Market: price chart with timeframe selector and volume.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Borders, Chart, Paragraph, Sparkline, Tabs};
use ratatui::Frame;

use botdash_core::analysis::LatestChange;
use botdash_core::domain::TimeSeriesPoint;
use botdash_core::format::{format_compact_currency, format_currency, format_signed_pct, format_timestamp, Timeframe};

use crate::app::AppState;
use crate::theme;
use crate::ui::plot;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(6),
            Constraint::Length(4),
        ])
        .split(area);

    let timeframe = app.market.timeframe;
    let selected = Timeframe::ALL.iter().position(|t| *t == timeframe).unwrap_or(0);
    let tabs = Tabs::new(Timeframe::ALL.iter().map(|t| t.label()).collect::<Vec<_>>())
        .select(selected)
        .style(theme::muted())
        .highlight_style(theme::selected());
    f.render_widget(tabs, chunks[0]);

    let all: Vec<TimeSeriesPoint> = app
        .snapshot
        .as_ref()
        .map(|s| s.market.iter().map(TimeSeriesPoint::from).collect())
        .unwrap_or_default();
    let points = timeframe.filter(&all);

    let Some(change) = LatestChange::of(points) else {
        f.render_widget(
            Paragraph::new(Span::styled("No market data.", theme::muted())),
            chunks[2],
        );
        return;
    };

    let first_value = points.first().map_or(change.current, |p| p.value);
    let period_pct = if first_value != 0.0 {
        (change.current - first_value) / first_value * 100.0
    } else {
        0.0
    };
    let summary = Line::from(vec![
        Span::styled(format_currency(change.current), theme::accent_bold()),
        Span::raw("  "),
        Span::styled(
            format!("{} over {}", format_signed_pct(period_pct), timeframe.label()),
            theme::metric_color(period_pct),
        ),
        Span::styled(
            format!("  [h/l]timeframe [c]hart type: {}", app.chart_type.label()),
            theme::muted(),
        ),
    ]);
    f.render_widget(Paragraph::new(summary), chunks[1]);

    render_price(f, chunks[2], points, app, timeframe);
    render_volume(f, chunks[3], points);
}

fn render_price(
    f: &mut Frame,
    area: Rect,
    points: &[TimeSeriesPoint],
    app: &AppState,
    timeframe: Timeframe,
) {
    let data = plot::indexed(points, 0);
    let (min, max) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p.value), hi.max(p.value)));
    let bounds = plot::y_bounds(min, max);

    let first = points.first().map(|p| format_timestamp(p.timestamp, timeframe)).unwrap_or_default();
    let last = points.last().map(|p| format_timestamp(p.timestamp, timeframe)).unwrap_or_default();

    let chart = Chart::new(plot::series_datasets(&data, app.chart_type, theme::ACCENT))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme::muted())
                .title(" Price ")
                .title_style(theme::accent_bold()),
        )
        .x_axis(
            Axis::default()
                .style(theme::muted())
                .bounds(plot::x_bounds(0, points.len().saturating_sub(1)))
                .labels(vec![Span::styled(first, theme::muted()), Span::styled(last, theme::muted())]),
        )
        .y_axis(
            Axis::default()
                .style(theme::muted())
                .bounds(bounds)
                .labels(vec![
                    Span::styled(format_compact_currency(bounds[0]), theme::muted()),
                    Span::styled(format_compact_currency(bounds[1]), theme::muted()),
                ]),
        );
    f.render_widget(chart, area);
}

fn render_volume(f: &mut Frame, area: Rect, points: &[TimeSeriesPoint]) {
    let volumes: Vec<f64> = points
        .iter()
        .map(|p| p.extra_f64("volume").unwrap_or(0.0).max(0.0))
        .collect();
    let bars = plot::percent_scale(&volumes);
    let spark = Sparkline::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme::muted())
                .title(" Volume ")
                .title_style(theme::accent_bold()),
        )
        .data(&bars)
        .style(theme::neutral());
    f.render_widget(spark, area);
}
