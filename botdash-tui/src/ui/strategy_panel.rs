//! Panel 3 - Strategy: view and edit the bot's strategy parameters.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use botdash_core::domain::{ParamValue, StrategyParameter};
use botdash_core::format::format_date;

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let s = &app.strategy;
    let Some(draft) = &s.draft else {
        f.render_widget(
            Paragraph::new(Span::styled("Strategy configuration not loaded yet.", theme::muted())),
            area,
        );
        return;
    };

    let mut lines: Vec<Line> = Vec::new();

    let mut header = vec![
        Span::styled(draft.name.clone(), theme::accent_bold()),
        Span::raw("  "),
    ];
    if s.saving {
        header.push(Span::styled("saving...", theme::warning()));
    } else if s.dirty {
        header.push(Span::styled("● unsaved changes", theme::warning()));
    } else {
        header.push(Span::styled(
            format!("updated {}", format_date(draft.last_updated)),
            theme::muted(),
        ));
    }
    lines.push(Line::from(header));
    if !draft.description.is_empty() {
        lines.push(Line::from(Span::styled(draft.description.clone(), theme::muted())));
    }
    lines.push(Line::from(Span::styled(
        "[j/k]select [h/l]adjust [Space]toggle [Enter]edit [s]ave [u]ndo",
        theme::muted(),
    )));
    lines.push(Line::from(""));

    let enabled = if draft.enabled { "ENABLED" } else { "DISABLED" };
    let enabled_style = if s.cursor == 0 {
        theme::selected()
    } else if draft.enabled {
        theme::positive()
    } else {
        theme::negative()
    };
    lines.push(Line::from(vec![
        Span::styled(format!("{:<20}", "Status"), theme::muted()),
        Span::styled(format!("{enabled:>12}"), enabled_style),
    ]));
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled(
        format!("{:<20}{:>12}  {:<18}{}", "Parameter", "Value", "Range", "Description"),
        theme::accent_bold(),
    )));
    for (i, (name, param)) in draft.parameters.iter().enumerate() {
        let is_cursor = s.cursor == i + 1;
        let value_style = if is_cursor {
            theme::selected()
        } else {
            param_style(&param.value)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{name:<20}"), if is_cursor { theme::accent() } else { theme::text() }),
            Span::styled(format!("{:>12}", param.value.to_string()), value_style),
            Span::styled(format!("  {:<18}", range_label(param)), theme::muted()),
            Span::styled(param.description.clone(), theme::muted()),
        ]));
    }

    f.render_widget(Paragraph::new(lines), area);
}

fn param_style(value: &ParamValue) -> ratatui::style::Style {
    match value {
        ParamValue::Number(_) => theme::accent(),
        ParamValue::Boolean(true) => theme::positive(),
        ParamValue::Boolean(false) => theme::negative(),
        ParamValue::String(_) => theme::neutral(),
    }
}

fn range_label(param: &StrategyParameter) -> String {
    match (param.min, param.max) {
        (Some(lo), Some(hi)) => format!("[{lo} .. {hi}]"),
        (Some(lo), None) => format!("[{lo} ..]"),
        (None, Some(hi)) => format!("[.. {hi}]"),
        (None, None) => format!("({})", param.kind()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_labels() {
        assert_eq!(range_label(&StrategyParameter::number(14.0, 2.0, 50.0, "")), "[2 .. 50]");
        assert_eq!(range_label(&StrategyParameter::boolean(true, "")), "(boolean)");
    }
}
