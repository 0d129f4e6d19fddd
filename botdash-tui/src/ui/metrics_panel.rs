//! Panel 1 - Metrics: a grid of feature cards with sparkline and latest change.

use std::time::Instant;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Sparkline};
use ratatui::Frame;

use botdash_core::analysis::{LatestChange, Trend};
use botdash_core::domain::TimeSeriesPoint;
use botdash_core::format::{format_clock, format_value};

use crate::app::{AppState, METRIC_COLUMNS};
use crate::theme;
use crate::ui::plot;

pub fn render(f: &mut Frame, area: Rect, app: &AppState, now: Instant) {
    let Some(snapshot) = &app.snapshot else {
        let text = Paragraph::new(Span::styled("Waiting for the first snapshot...", theme::muted()));
        f.render_widget(text, area);
        return;
    };
    if snapshot.features.is_empty() {
        let text = Paragraph::new(Span::styled("The bot reported no features.", theme::muted()));
        f.render_widget(text, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(4)])
        .split(area);
    let hint = Line::from(vec![
        Span::styled(format!("{} features  ", snapshot.features.len()), theme::accent()),
        Span::styled("[h/j/k/l]select [Enter]chart [r]efresh", theme::muted()),
    ]);
    f.render_widget(Paragraph::new(hint), chunks[0]);

    let names: Vec<&str> = snapshot.features.names().collect();
    let row_count = names.len().div_ceil(METRIC_COLUMNS);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, row_count as u32); row_count])
        .split(chunks[1]);

    for (row_idx, row_area) in rows.iter().enumerate() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, METRIC_COLUMNS as u32); METRIC_COLUMNS])
            .split(*row_area);
        for (col_idx, card_area) in cols.iter().enumerate() {
            let idx = row_idx * METRIC_COLUMNS + col_idx;
            let Some(name) = names.get(idx) else { break };
            let series = snapshot.features.series(name);
            let card = Card {
                name,
                series: &series,
                selected: idx == app.metrics.cursor,
                flashing: app.metrics.is_flashing(name, now),
            };
            card.render(f, *card_area);
        }
    }
}

struct Card<'a> {
    name: &'a str,
    series: &'a [TimeSeriesPoint],
    selected: bool,
    flashing: bool,
}

impl Card<'_> {
    fn render(&self, f: &mut Frame, area: Rect) {
        let border = if self.selected {
            theme::accent_bold()
        } else if self.flashing {
            theme::warning()
        } else {
            theme::muted()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(format!(" {} ", self.name))
            .title_style(if self.selected { theme::accent_bold() } else { theme::text() });
        let inner = block.inner(area);
        f.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(1)])
            .split(inner);

        let Some(change) = LatestChange::of(self.series) else {
            f.render_widget(Paragraph::new(Span::styled("no samples", theme::muted())), chunks[0]);
            return;
        };
        let (arrow, style) = match change.trend {
            Trend::Up => ("▲", theme::positive()),
            Trend::Down => ("▼", theme::negative()),
            Trend::Flat => ("■", theme::muted()),
        };
        let updated = self
            .series
            .last()
            .map(|p| format_clock(p.timestamp))
            .unwrap_or_default();
        let lines = vec![
            Line::from(vec![
                Span::styled(format_value(self.name, change.current), theme::accent_bold()),
                Span::raw("  "),
                Span::styled(format!("{arrow} {:+.2} ({:+.1}%)", change.change, change.change_pct), style),
            ]),
            Line::from(Span::styled(format!("updated {updated}"), theme::muted())),
        ];
        f.render_widget(Paragraph::new(lines), chunks[0]);

        let values: Vec<f64> = self.series.iter().map(|p| p.value).collect();
        let data = plot::percent_scale(&values);
        let spark = Sparkline::default().data(&data).style(theme::accent());
        f.render_widget(spark, chunks[1]);
    }
}
