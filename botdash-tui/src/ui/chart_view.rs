//! Advanced chart overlay - chart tab with annotations, statistics tab.
//!
//! The plot area is computed by [`layout`] from the screen size alone so that
//! mouse input can map cells to data coordinates without a draw pass.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Borders, Chart, Clear, Dataset, GraphType, Paragraph, Tabs};
use ratatui::Frame;

use botdash_core::chart::{ChartMode, ChartView, DrawTool, Orientation, PlotRect};
use botdash_core::format::{format_clock, format_value};

use crate::app::{ChartOverlay, ChartTab};
use crate::theme;
use crate::ui::{centered_rect, plot, split_screen, stats_view};

const Y_AXIS_WIDTH: u16 = 10;

/// Regions of the chart overlay.
#[derive(Debug, Clone, Copy)]
pub struct ChartLayout {
    pub popup: Rect,
    pub tabs: Rect,
    pub toolbar: Rect,
    /// Whole body (plot plus axes); the statistics tab draws here.
    pub body: Rect,
    pub y_axis: Rect,
    pub plot: Rect,
    pub x_axis: Rect,
    pub footer: Rect,
}

pub fn layout(screen: Rect) -> ChartLayout {
    let (main, _) = split_screen(screen);
    let popup = centered_rect(92, 92, main);
    let inner = Block::default().borders(Borders::ALL).inner(popup);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);
    let body = Rect::new(rows[2].x, rows[2].y, rows[2].width, rows[2].height + rows[3].height);
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(Y_AXIS_WIDTH), Constraint::Min(2)])
        .split(rows[2]);

    ChartLayout {
        popup,
        tabs: rows[0],
        toolbar: rows[1],
        body,
        y_axis: cols[0],
        plot: cols[1],
        x_axis: Rect::new(cols[1].x, rows[3].y, cols[1].width, rows[3].height),
        footer: rows[4],
    }
}

/// Plot area in cell coordinates; the last column and row map to the window's end and the domain minimum.
pub fn plot_rect(screen: Rect) -> PlotRect {
    let p = layout(screen).plot;
    PlotRect::new(
        f64::from(p.x),
        f64::from(p.y),
        f64::from(p.width.saturating_sub(1)),
        f64::from(p.height.saturating_sub(1)),
    )
}

pub fn render(f: &mut Frame, screen: Rect, chart: &ChartOverlay) {
    let l = layout(screen);
    f.render_widget(Clear, l.popup);

    let view = &chart.view;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::accent())
        .title(format!(" {} [Tab]switch [Esc]close ", view.feature()))
        .title_style(theme::accent_bold());
    f.render_widget(block, l.popup);

    let selected = match chart.tab {
        ChartTab::Chart => 0,
        ChartTab::Stats => 1,
    };
    let tabs = Tabs::new(vec!["Chart", "Statistics"])
        .select(selected)
        .style(theme::muted())
        .highlight_style(theme::accent_bold());
    f.render_widget(tabs, l.tabs);

    match chart.tab {
        ChartTab::Chart => {
            render_toolbar(f, l.toolbar, view);
            render_plot(f, &l, view);
            render_footer(f, l.footer, view);
        }
        ChartTab::Stats => match &chart.analysis {
            Some(analysis) => stats_view::render(f, l.body, view.feature(), view.series(), analysis),
            None => f.render_widget(
                Paragraph::new(Span::styled("No data to analyse.", theme::muted())),
                l.body,
            ),
        },
    }
}

fn render_toolbar(f: &mut Frame, area: Rect, view: &ChartView) {
    let mut spans = Vec::new();
    for (key, mode) in [
        ('v', ChartMode::View),
        ('p', ChartMode::Pan),
        ('z', ChartMode::Zoom),
        ('d', ChartMode::Draw),
    ] {
        let style = if view.mode() == mode {
            theme::selected()
        } else {
            theme::muted()
        };
        spans.push(Span::styled(format!("[{key}]{}", mode.label()), style));
        spans.push(Span::raw(" "));
    }
    spans.push(Span::styled(" | ", theme::muted()));
    let tool_style = if view.mode() == ChartMode::Draw {
        theme::accent()
    } else {
        theme::muted()
    };
    spans.push(Span::styled(format!("[t]{}", view.tool().label()), tool_style));
    spans.push(Span::styled(" | ", theme::muted()));
    spans.push(Span::styled(format!("[c]{}", view.chart_type().label()), theme::accent()));
    spans.push(Span::styled(" | ", theme::muted()));
    let range = view.range();
    spans.push(Span::styled(
        format!("{}-{} of {}", range.start + 1, range.end + 1, view.series().len()),
        theme::neutral(),
    ));
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_plot(f: &mut Frame, l: &ChartLayout, view: &ChartView) {
    let series = view.series();
    let Some(domain) = view.domain() else {
        f.render_widget(
            Paragraph::new(Span::styled("No data for this feature yet.", theme::muted())),
            l.plot,
        );
        return;
    };
    let range = view.range();
    let data = plot::indexed(view.visible(), range.start);
    let value_at = |i: usize| series.get(i).map_or(domain.min, |p| p.value);

    // Annotation geometry first; datasets borrow it.
    let mut annotations: Vec<(Vec<(f64, f64)>, String)> = view
        .trend_lines()
        .iter()
        .map(|t| {
            let (s, e) = t.bounds();
            (vec![(s as f64, value_at(s)), (e as f64, value_at(e))], t.color.clone())
        })
        .collect();
    for r in view.reference_lines() {
        let points = match r.orientation {
            Orientation::Horizontal => vec![(range.start as f64, r.value), (range.end as f64, r.value)],
            Orientation::Vertical if range.contains(r.index) => {
                vec![(r.index as f64, domain.min), (r.index as f64, domain.max)]
            }
            Orientation::Vertical => continue,
        };
        annotations.push((points, r.color.clone()));
    }
    let draft: Option<Vec<(f64, f64)>> = view
        .draft()
        .map(|(s, e)| vec![(s as f64, value_at(s)), (e as f64, value_at(e))]);

    let mut datasets = plot::series_datasets(&data, view.chart_type(), theme::ACCENT);
    for (points, color) in &annotations {
        datasets.push(line_dataset(points, Style::default().fg(theme::annotation_color(color))));
    }
    if let Some(points) = &draft {
        datasets.push(line_dataset(points, theme::warning()));
    }

    let chart = Chart::new(datasets)
        .x_axis(Axis::default().bounds(plot::x_bounds(range.start, range.end)))
        .y_axis(Axis::default().bounds(plot::y_bounds(domain.min, domain.max)));
    f.render_widget(chart, l.plot);

    // Axis labels drawn outside the plot so the plot keeps its exact cells.
    let feature = view.feature();
    let mut y_lines = vec![Line::from(Span::styled(format_value(feature, domain.max), theme::muted()))];
    let gap = l.y_axis.height.saturating_sub(2) as usize;
    y_lines.extend(std::iter::repeat(Line::from("")).take(gap));
    y_lines.push(Line::from(Span::styled(format_value(feature, domain.min), theme::muted())));
    f.render_widget(Paragraph::new(y_lines), l.y_axis);

    let first = series.get(range.start).map(|p| format_clock(p.timestamp)).unwrap_or_default();
    let last = series.get(range.end).map(|p| format_clock(p.timestamp)).unwrap_or_default();
    let pad = (l.x_axis.width as usize).saturating_sub(first.len() + last.len());
    let x_line = Line::from(vec![
        Span::styled(first, theme::muted()),
        Span::raw(" ".repeat(pad)),
        Span::styled(last, theme::muted()),
    ]);
    f.render_widget(Paragraph::new(x_line), l.x_axis);
}

fn line_dataset(points: &[(f64, f64)], style: Style) -> Dataset<'_> {
    Dataset::default()
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(style)
        .data(points)
}

fn render_footer(f: &mut Frame, area: Rect, view: &ChartView) {
    let hint = match view.mode() {
        ChartMode::View => "wheel/[+/-] zoom  [←/→] pan",
        ChartMode::Pan => "drag to pan",
        ChartMode::Zoom => "click to zoom in",
        ChartMode::Draw => match view.tool() {
            DrawTool::TrendLine => "drag to draw a trend line",
            DrawTool::Horizontal => "click to add a horizontal line",
            DrawTool::Vertical => "click to add a vertical line",
        },
    };
    let line = Line::from(vec![
        Span::styled(
            format!(
                "Trend lines: {}  Reference lines: {}  ",
                view.trend_lines().len(),
                view.reference_lines().len()
            ),
            theme::neutral(),
        ),
        Span::styled(hint, theme::accent()),
        Span::styled("  [0]reset [x]clear [ ]start { }end", theme::muted()),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plot_sits_inside_popup() {
        let screen = Rect::new(0, 0, 120, 40);
        let l = layout(screen);
        assert!(l.popup.contains(l.plot.as_position()));
        assert_eq!(l.plot.x, l.y_axis.x + Y_AXIS_WIDTH);
        assert_eq!(l.x_axis.y, l.plot.y + l.plot.height);
        assert!(l.plot.width > 50 && l.plot.height > 10);
    }

    #[test]
    fn plot_rect_matches_layout() {
        let screen = Rect::new(0, 0, 100, 30);
        let p = layout(screen).plot;
        let r = plot_rect(screen);
        assert_eq!(r.x, f64::from(p.x));
        assert_eq!(r.width, f64::from(p.width - 1));
        assert!(r.contains(f64::from(p.x + p.width - 1), f64::from(p.y)));
    }
}
