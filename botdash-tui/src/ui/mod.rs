//! Top-level UI layout - one panel at a time with a status bar.

pub mod chart_view;
pub mod help_panel;
pub mod market_panel;
pub mod metrics_panel;
pub mod overlays;
pub mod plot;
pub mod stats_view;
pub mod status_bar;
pub mod strategy_panel;
pub mod trading_panel;

use std::time::Instant;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;

use crate::app::{AppState, Overlay, Panel};
use crate::theme;

/// Draw the entire UI.
pub fn draw(f: &mut Frame, app: &AppState) {
    let now = Instant::now();
    let (main_area, status_area) = split_screen(f.area());

    draw_panel(f, main_area, app, now);
    status_bar::render(f, status_area, app, now);

    match &app.overlay {
        Overlay::Chart => {
            if let Some(chart) = &app.chart {
                chart_view::render(f, f.area(), chart);
            }
        }
        Overlay::ErrorHistory => overlays::render_error_history(f, main_area, app),
        Overlay::EditParam(name) => overlays::render_edit_param(f, main_area, name, &app.edit_input),
        Overlay::None => {}
    }
}

/// Main area plus the one-line status bar beneath it.
pub fn split_screen(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);
    (chunks[0], chunks[1])
}

fn draw_panel(f: &mut Frame, area: Rect, app: &AppState, now: Instant) {
    let panel = app.active_panel;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(true))
        .title(format!(" {} [{}] ", panel.label(), panel.index() + 1))
        .title_style(theme::panel_title(true));

    let inner = block.inner(area);
    f.render_widget(block, area);

    match panel {
        Panel::Metrics => metrics_panel::render(f, inner, app, now),
        Panel::Trading => trading_panel::render(f, inner, app),
        Panel::Strategy => strategy_panel::render(f, inner, app),
        Panel::Market => market_panel::render(f, inner, app),
        Panel::Help => help_panel::render(f, inner, app),
    }
}

/// Compute a centered rect for overlays.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
