//! ChartView - state of one advanced chart dialog.

use crate::domain::TimeSeriesPoint;
use crate::format::{format_clock, format_value};

use super::annotation::{
    IdAllocator, Orientation, ReferenceLine, TrendLine, ANNOTATION_COLOR,
};
use super::interaction::{transition, ChartMode, ChartType, DragState, DrawTool, Effect, PointerEvent};
use super::range::{DataPoint, PlotRect, ValueDomain, ViewRange};

/// Series, visible window, mode and annotations of an open chart.
///
/// Annotations and the window are transient: replacing the series or
/// dropping the view discards them.
#[derive(Debug, Clone)]
pub struct ChartView {
    feature: String,
    series: Vec<TimeSeriesPoint>,
    range: ViewRange,
    mode: ChartMode,
    tool: DrawTool,
    chart_type: ChartType,
    drag: DragState,
    trend_lines: Vec<TrendLine>,
    reference_lines: Vec<ReferenceLine>,
    ids: IdAllocator,
}

impl ChartView {
    pub fn new(feature: impl Into<String>, series: Vec<TimeSeriesPoint>) -> Self {
        let range = ViewRange::full(series.len());
        Self {
            feature: feature.into(),
            series,
            range,
            mode: ChartMode::default(),
            tool: DrawTool::default(),
            chart_type: ChartType::default(),
            drag: DragState::Idle,
            trend_lines: Vec::new(),
            reference_lines: Vec::new(),
            ids: IdAllocator::default(),
        }
    }

    pub fn feature(&self) -> &str {
        &self.feature
    }

    pub fn series(&self) -> &[TimeSeriesPoint] {
        &self.series
    }

    pub fn range(&self) -> ViewRange {
        self.range
    }

    pub fn mode(&self) -> ChartMode {
        self.mode
    }

    pub fn tool(&self) -> DrawTool {
        self.tool
    }

    pub fn chart_type(&self) -> ChartType {
        self.chart_type
    }

    pub fn trend_lines(&self) -> &[TrendLine] {
        &self.trend_lines
    }

    pub fn reference_lines(&self) -> &[ReferenceLine] {
        &self.reference_lines
    }

    /// Points inside the visible window.
    pub fn visible(&self) -> &[TimeSeriesPoint] {
        if self.series.is_empty() {
            return &[];
        }
        &self.series[self.range.start..=self.range.end]
    }

    pub fn domain(&self) -> Option<ValueDomain> {
        ValueDomain::of(self.visible().iter().map(|p| p.value))
    }

    /// The trend line being drawn, if any.
    pub fn draft(&self) -> Option<(usize, usize)> {
        match self.drag {
            DragState::Drawing { start, end } => Some((start, end)),
            _ => None,
        }
    }

    /// Swap in fresh data; the window resets and annotations are dropped.
    pub fn replace_series(&mut self, series: Vec<TimeSeriesPoint>) {
        self.series = series;
        self.reset();
    }

    pub fn set_mode(&mut self, mode: ChartMode) {
        if mode != self.mode {
            self.drag = DragState::Idle;
        }
        self.mode = mode;
    }

    pub fn set_tool(&mut self, tool: DrawTool) {
        self.tool = tool;
        self.drag = DragState::Idle;
    }

    pub fn set_chart_type(&mut self, chart_type: ChartType) {
        self.chart_type = chart_type;
    }

    pub fn zoom_in(&mut self) {
        self.range = self.range.zoom_in(self.series.len());
    }

    pub fn zoom_out(&mut self) {
        self.range = self.range.zoom_out(self.series.len());
    }

    pub fn pan(&mut self, delta: isize) {
        self.range = self.range.pan(delta, self.series.len());
    }

    /// Show `range`, clamped into the series.
    pub fn set_range(&mut self, range: ViewRange) {
        self.range = range.clamp_to(self.series.len());
    }

    /// Range slider: window from two percentages of the series.
    pub fn set_range_percent(&mut self, lo: f64, hi: f64) {
        self.range = ViewRange::from_percentages(lo, hi, self.series.len());
    }

    /// Full window and no annotations.
    pub fn reset(&mut self) {
        self.range = ViewRange::full(self.series.len());
        self.drag = DragState::Idle;
        self.clear_drawings();
    }

    pub fn clear_drawings(&mut self) {
        self.trend_lines.clear();
        self.reference_lines.clear();
    }

    /// Translate a screen position into data space for the current window.
    pub fn map_pointer(&self, rect: PlotRect, x: f64, y: f64) -> Option<DataPoint> {
        if self.series.is_empty() {
            return None;
        }
        let domain = self.domain()?;
        rect.map(x, y, self.range, domain)
    }

    /// Feed a pointer event at screen position `(x, y)`.
    ///
    /// Presses outside `rect` are ignored; moves and releases outside it are
    /// still delivered so an in-progress drag can finish.
    pub fn pointer(&mut self, event: PointerEvent, rect: PlotRect, x: f64, y: f64) {
        let inside = rect.contains(x, y);
        let point = match event {
            PointerEvent::Down if !inside => None,
            PointerEvent::Leave => None,
            _ => self.map_pointer(rect, x, y),
        };
        let (drag, effect) = transition(self.mode, self.tool, self.drag, event, point);
        self.drag = drag;
        self.apply(effect);
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::None => {}
            Effect::CommitTrendLine { start, end } => {
                let id = self.ids.next_id();
                tracing::debug!(%id, start, end, "trend line added");
                self.trend_lines.push(TrendLine {
                    id,
                    start_index: start,
                    end_index: end,
                    color: ANNOTATION_COLOR.to_string(),
                });
            }
            Effect::AddHorizontal { value } => {
                let id = self.ids.next_id();
                self.reference_lines.push(ReferenceLine {
                    id,
                    orientation: Orientation::Horizontal,
                    index: 0,
                    value,
                    label: format_value(&self.feature, value),
                    color: ANNOTATION_COLOR.to_string(),
                });
            }
            Effect::AddVertical { index } => {
                let id = self.ids.next_id();
                let label = self
                    .series
                    .get(index)
                    .map(|p| format_clock(p.timestamp))
                    .unwrap_or_default();
                self.reference_lines.push(ReferenceLine {
                    id,
                    orientation: Orientation::Vertical,
                    index,
                    value: 0.0,
                    label,
                    color: ANNOTATION_COLOR.to_string(),
                });
            }
            Effect::Pan { delta } => self.pan(delta),
            Effect::ZoomIn => self.zoom_in(),
        }
    }
}
