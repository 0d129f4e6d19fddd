//! Parrot/neon palette and the styles every panel draws with.
//!
//! - **Accent**: electric cyan (focus, highlights)
//! - **Positive**: neon green (gains, up-ticks, filled orders)
//! - **Negative**: hot pink (losses, down-ticks, errors)
//! - **Warning**: neon orange (alerts, pending work)
//! - **Neutral**: cool purple (secondary info)
//! - **Muted**: steel blue (labels, hints, disabled)

use std::str::FromStr;

use ratatui::style::{Color, Modifier, Style};

pub const ACCENT: Color = Color::Rgb(0, 255, 255);
pub const POSITIVE: Color = Color::Rgb(0, 255, 128);
pub const NEGATIVE: Color = Color::Rgb(255, 20, 147);
pub const WARNING: Color = Color::Rgb(255, 140, 0);
pub const NEUTRAL: Color = Color::Rgb(147, 112, 219);
pub const MUTED: Color = Color::Rgb(100, 149, 237);
pub const TEXT: Color = Color::White;

pub fn accent() -> Style {
    Style::default().fg(ACCENT)
}

pub fn accent_bold() -> Style {
    accent().add_modifier(Modifier::BOLD)
}

pub fn positive() -> Style {
    Style::default().fg(POSITIVE)
}

pub fn negative() -> Style {
    Style::default().fg(NEGATIVE)
}

pub fn warning() -> Style {
    Style::default().fg(WARNING)
}

pub fn neutral() -> Style {
    Style::default().fg(NEUTRAL)
}

pub fn muted() -> Style {
    Style::default().fg(MUTED)
}

pub fn text() -> Style {
    Style::default().fg(TEXT)
}

/// Highlighted row under the cursor.
pub fn selected() -> Style {
    accent().add_modifier(Modifier::REVERSED)
}

pub fn panel_border(active: bool) -> Style {
    if active {
        accent()
    } else {
        muted()
    }
}

pub fn panel_title(active: bool) -> Style {
    if active {
        accent_bold()
    } else {
        muted()
    }
}

/// Green for gains (and zero), pink for losses.
pub fn metric_color(value: f64) -> Style {
    if value >= 0.0 {
        positive()
    } else {
        negative()
    }
}

/// Parse an annotation colour like `#ff0000`; unknown strings fall back to red.
pub fn annotation_color(raw: &str) -> Color {
    Color::from_str(raw).unwrap_or(Color::Red)
}
