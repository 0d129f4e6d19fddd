//! Pointer interaction as a pure state machine.
//!
//! The chart is always in exactly one [`ChartMode`]. Pointer events are fed
//! through [`transition`] together with the drag in progress and the event's
//! position in data space; the result is the next drag state and an
//! [`Effect`] for the view to apply.

use serde::{Deserialize, Serialize};

use super::range::DataPoint;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartMode {
    #[default]
    View,
    Pan,
    Zoom,
    Draw,
}

impl ChartMode {
    pub fn label(self) -> &'static str {
        match self {
            ChartMode::View => "View",
            ChartMode::Pan => "Pan",
            ChartMode::Zoom => "Zoom",
            ChartMode::Draw => "Draw",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawTool {
    #[default]
    TrendLine,
    Horizontal,
    Vertical,
}

impl DrawTool {
    pub fn label(self) -> &'static str {
        match self {
            DrawTool::TrendLine => "Trend line",
            DrawTool::Horizontal => "Horizontal line",
            DrawTool::Vertical => "Vertical line",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Line,
    Area,
    Bar,
}

impl ChartType {
    pub const ALL: [ChartType; 3] = [ChartType::Line, ChartType::Area, ChartType::Bar];

    pub fn label(self) -> &'static str {
        match self {
            ChartType::Line => "Line",
            ChartType::Area => "Area",
            ChartType::Bar => "Bar",
        }
    }

    pub fn next(self) -> Self {
        match self {
            ChartType::Line => ChartType::Area,
            ChartType::Area => ChartType::Bar,
            ChartType::Bar => ChartType::Line,
        }
    }
}

/// Drag in progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    /// A trend-line draft from `start` to `end`.
    Drawing { start: usize, end: usize },
    /// Grabbed the series at data index `anchor`.
    Panning { anchor: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Down,
    Move,
    Up,
    Leave,
}

/// What the view should do in response to a pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    None,
    CommitTrendLine { start: usize, end: usize },
    AddHorizontal { value: f64 },
    AddVertical { index: usize },
    Pan { delta: isize },
    ZoomIn,
}

/// Next drag state and effect for one pointer event.
///
/// `point` is `None` when the pointer is not over the plot area.
pub fn transition(
    mode: ChartMode,
    tool: DrawTool,
    drag: DragState,
    event: PointerEvent,
    point: Option<DataPoint>,
) -> (DragState, Effect) {
    match (mode, event) {
        (ChartMode::View, _) => (DragState::Idle, Effect::None),

        (ChartMode::Zoom, PointerEvent::Down) if point.is_some() => (DragState::Idle, Effect::ZoomIn),
        (ChartMode::Zoom, _) => (DragState::Idle, Effect::None),

        (ChartMode::Pan, PointerEvent::Down) => match point {
            Some(p) => (DragState::Panning { anchor: p.index }, Effect::None),
            None => (DragState::Idle, Effect::None),
        },
        (ChartMode::Pan, PointerEvent::Move) => match (drag, point) {
            (DragState::Panning { anchor }, Some(p)) => (
                drag,
                Effect::Pan {
                    delta: anchor as isize - p.index as isize,
                },
            ),
            _ => (drag, Effect::None),
        },
        (ChartMode::Pan, PointerEvent::Up | PointerEvent::Leave) => (DragState::Idle, Effect::None),

        (ChartMode::Draw, PointerEvent::Down) => match (tool, point) {
            (_, None) => (drag, Effect::None),
            (DrawTool::TrendLine, Some(p)) => (
                DragState::Drawing {
                    start: p.index,
                    end: p.index,
                },
                Effect::None,
            ),
            (DrawTool::Horizontal, Some(p)) => {
                (DragState::Idle, Effect::AddHorizontal { value: p.value })
            }
            (DrawTool::Vertical, Some(p)) => (DragState::Idle, Effect::AddVertical { index: p.index }),
        },
        (ChartMode::Draw, PointerEvent::Move) => match (drag, point) {
            (DragState::Drawing { start, .. }, Some(p)) => (
                DragState::Drawing {
                    start,
                    end: p.index,
                },
                Effect::None,
            ),
            _ => (drag, Effect::None),
        },
        (ChartMode::Draw, PointerEvent::Up | PointerEvent::Leave) => match drag {
            DragState::Drawing { start, end } if start != end => {
                (DragState::Idle, Effect::CommitTrendLine { start, end })
            }
            _ => (DragState::Idle, Effect::None),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(index: usize, value: f64) -> Option<DataPoint> {
        Some(DataPoint { index, value })
    }

    #[test]
    fn view_mode_ignores_pointer() {
        let (d, e) = transition(
            ChartMode::View,
            DrawTool::TrendLine,
            DragState::Idle,
            PointerEvent::Down,
            at(3, 1.0),
        );
        assert_eq!(d, DragState::Idle);
        assert_eq!(e, Effect::None);
    }

    #[test]
    fn trend_line_draw_and_commit() {
        let tool = DrawTool::TrendLine;
        let (d, _) = transition(ChartMode::Draw, tool, DragState::Idle, PointerEvent::Down, at(4, 0.0));
        assert_eq!(d, DragState::Drawing { start: 4, end: 4 });
        let (d, _) = transition(ChartMode::Draw, tool, d, PointerEvent::Move, at(9, 0.0));
        assert_eq!(d, DragState::Drawing { start: 4, end: 9 });
        // Moving off the plot keeps the draft as is.
        let (d, _) = transition(ChartMode::Draw, tool, d, PointerEvent::Move, None);
        assert_eq!(d, DragState::Drawing { start: 4, end: 9 });
        let (d, e) = transition(ChartMode::Draw, tool, d, PointerEvent::Up, None);
        assert_eq!(d, DragState::Idle);
        assert_eq!(e, Effect::CommitTrendLine { start: 4, end: 9 });
    }

    #[test]
    fn zero_length_trend_line_is_discarded() {
        let tool = DrawTool::TrendLine;
        let (d, _) = transition(ChartMode::Draw, tool, DragState::Idle, PointerEvent::Down, at(4, 0.0));
        let (d, e) = transition(ChartMode::Draw, tool, d, PointerEvent::Up, at(4, 0.0));
        assert_eq!(d, DragState::Idle);
        assert_eq!(e, Effect::None);
    }

    #[test]
    fn leave_acts_as_up() {
        let drag = DragState::Drawing { start: 1, end: 5 };
        let (_, e) = transition(ChartMode::Draw, DrawTool::TrendLine, drag, PointerEvent::Leave, None);
        assert_eq!(e, Effect::CommitTrendLine { start: 1, end: 5 });
    }

    #[test]
    fn reference_lines_on_single_press() {
        let (_, e) = transition(
            ChartMode::Draw,
            DrawTool::Horizontal,
            DragState::Idle,
            PointerEvent::Down,
            at(2, 42.5),
        );
        assert_eq!(e, Effect::AddHorizontal { value: 42.5 });
        let (_, e) = transition(
            ChartMode::Draw,
            DrawTool::Vertical,
            DragState::Idle,
            PointerEvent::Down,
            at(7, 42.5),
        );
        assert_eq!(e, Effect::AddVertical { index: 7 });
    }

    #[test]
    fn pan_drag_reports_delta_from_anchor() {
        let (d, _) = transition(ChartMode::Pan, DrawTool::TrendLine, DragState::Idle, PointerEvent::Down, at(10, 0.0));
        assert_eq!(d, DragState::Panning { anchor: 10 });
        let (d, e) = transition(ChartMode::Pan, DrawTool::TrendLine, d, PointerEvent::Move, at(6, 0.0));
        assert_eq!(e, Effect::Pan { delta: 4 });
        let (d, _) = transition(ChartMode::Pan, DrawTool::TrendLine, d, PointerEvent::Up, None);
        assert_eq!(d, DragState::Idle);
    }

    #[test]
    fn zoom_click() {
        let (_, e) = transition(ChartMode::Zoom, DrawTool::TrendLine, DragState::Idle, PointerEvent::Down, at(0, 0.0));
        assert_eq!(e, Effect::ZoomIn);
        let (_, e) = transition(ChartMode::Zoom, DrawTool::TrendLine, DragState::Idle, PointerEvent::Down, None);
        assert_eq!(e, Effect::None);
    }
}
