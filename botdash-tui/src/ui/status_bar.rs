//! Bottom status bar - source, refresh countdown, last message.

use std::time::Instant;

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use botdash_core::source::SourceKind;

use crate::app::{AppState, StatusLevel};
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState, now: Instant) {
    let mut spans: Vec<Span> = Vec::new();

    let source_style = match app.source {
        SourceKind::Live => theme::positive(),
        SourceKind::Simulated => theme::warning(),
    };
    spans.push(Span::styled(format!(" {} ", app.source.label()), source_style));
    spans.push(Span::raw("| "));

    if app.updates_stopped {
        spans.push(Span::styled("updates stopped", theme::negative()));
    } else if app.refreshing {
        spans.push(Span::styled("refreshing...", theme::accent()));
    } else {
        let secs = app.refresh_countdown(now).as_secs_f64().ceil() as u64;
        spans.push(Span::styled(format!("next refresh {secs}s"), theme::muted()));
    }
    spans.push(Span::raw(" | "));

    spans.push(Span::styled(
        "1:Metrics 2:Trading 3:Strategy 4:Market 5:Help",
        theme::muted(),
    ));

    if let Some((msg, level)) = &app.status_message {
        spans.push(Span::raw(" | "));
        let style = match level {
            StatusLevel::Info => theme::accent(),
            StatusLevel::Warning => theme::warning(),
            StatusLevel::Error => theme::negative(),
        };
        spans.push(Span::styled(msg.as_str(), style));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
