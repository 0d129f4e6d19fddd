//! Panel 5 - Help: keyboard and mouse reference.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let mut lines: Vec<Line> = Vec::new();

    section(&mut lines, "Global");
    key(&mut lines, "1-5", "Switch to panel by number");
    key(&mut lines, "Tab / Shift+Tab", "Cycle panels forward / back");
    key(&mut lines, "r", "Refresh now");
    key(&mut lines, "e", "Error history");
    key(&mut lines, "q", "Quit");
    lines.push(Line::from(""));

    section(&mut lines, "Metrics");
    key(&mut lines, "h / j / k / l", "Move between feature cards");
    key(&mut lines, "Enter", "Open the advanced chart for the feature");
    lines.push(Line::from(""));

    section(&mut lines, "Trading");
    key(&mut lines, "j / k", "Scroll orders");
    lines.push(Line::from(""));

    section(&mut lines, "Strategy");
    key(&mut lines, "j / k", "Select row");
    key(&mut lines, "h / l", "Step a number down / up, flip a switch");
    key(&mut lines, "Space", "Toggle enabled or a boolean parameter");
    key(&mut lines, "Enter", "Type a new value");
    key(&mut lines, "s", "Save to the bot");
    key(&mut lines, "u", "Discard unsaved edits");
    lines.push(Line::from(""));

    section(&mut lines, "Market");
    key(&mut lines, "h / l", "Previous / next timeframe (1H 1D 1W 1M All)");
    key(&mut lines, "c", "Cycle chart type (line, area, bar)");
    lines.push(Line::from(""));

    section(&mut lines, "Advanced chart");
    key(&mut lines, "v / p / z / d", "View, pan, zoom, draw mode");
    key(&mut lines, "t", "Cycle drawing tool (trend, horizontal, vertical)");
    key(&mut lines, "+ / - / wheel", "Zoom in / out");
    key(&mut lines, "← / →", "Pan the window");
    key(&mut lines, "[ / ]  { / }", "Move window start / end (range slider)");
    key(&mut lines, "0 / x", "Reset window and drawings / clear drawings");
    key(&mut lines, "c", "Cycle chart type");
    key(&mut lines, "Tab", "Chart / statistics tab");
    key(&mut lines, "Esc", "Close");
    key(&mut lines, "mouse", "Drag to pan or draw, click to zoom or add a line");
    lines.push(Line::from(""));

    lines.push(Line::from(vec![
        Span::styled("Source: ", theme::muted()),
        Span::styled(app.source.label(), theme::accent()),
        Span::styled(
            format!("   refresh every {}s", app.interval.as_secs()),
            theme::muted(),
        ),
    ]));

    f.render_widget(Paragraph::new(lines), area);
}

fn section(lines: &mut Vec<Line<'_>>, title: &str) {
    lines.push(Line::from(Span::styled(title.to_string(), theme::accent_bold())));
}

fn key(lines: &mut Vec<Line<'_>>, keys: &str, desc: &str) {
    lines.push(Line::from(vec![
        Span::styled(format!("  {keys:>16}  "), theme::accent()),
        Span::styled(desc.to_string(), theme::muted()),
    ]));
}
