//! Visible window and coordinate mapping for the advanced chart.

use serde::{Deserialize, Serialize};

const ZOOM_IN_FACTOR: f64 = 0.7;
const ZOOM_OUT_FACTOR: f64 = 1.5;
const MIN_SPAN: usize = 2;

/// Inclusive index window `[start, end]` into the full series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewRange {
    pub start: usize,
    pub end: usize,
}

impl ViewRange {
    /// The whole series. An empty series gets `[0, 0]`.
    pub fn full(len: usize) -> Self {
        Self {
            start: 0,
            end: len.saturating_sub(1),
        }
    }

    /// `end - start`.
    pub fn span(&self) -> usize {
        self.end - self.start
    }

    /// Number of points in view.
    pub fn len(&self) -> usize {
        self.span() + 1
    }

    pub fn is_full(&self, len: usize) -> bool {
        *self == Self::full(len)
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.start..=self.end).contains(&index)
    }

    /// Narrow the window to 70% of its span around the current midpoint.
    /// No-op once the span is 2 or less.
    pub fn zoom_in(self, len: usize) -> Self {
        if self.span() <= MIN_SPAN {
            return self;
        }
        let new_span = ((self.span() as f64 * ZOOM_IN_FACTOR).floor() as usize).max(MIN_SPAN);
        self.recentre(new_span, len)
    }

    /// Widen the window to 150% of its span, growing by at least one point,
    /// bounded by the series.
    pub fn zoom_out(self, len: usize) -> Self {
        if len == 0 {
            return self;
        }
        let grown = ((self.span() as f64 * ZOOM_OUT_FACTOR).floor() as usize).max(self.span() + 1);
        self.recentre(grown.min(len - 1), len)
    }

    /// Shift by `delta` points keeping the span; stops at either edge.
    pub fn pan(self, delta: isize, len: usize) -> Self {
        if len == 0 {
            return self;
        }
        let span = self.span().min(len - 1);
        let max_start = len - 1 - span;
        let start = (self.start as isize + delta).clamp(0, max_start as isize) as usize;
        Self {
            start,
            end: start + span,
        }
    }

    /// Window from two slider positions given as percentages of the series.
    /// Positions between two points snap down to the earlier one.
    pub fn from_percentages(lo_pct: f64, hi_pct: f64, len: usize) -> Self {
        if len == 0 {
            return Self::full(0);
        }
        let last = (len - 1) as f64;
        // The epsilon keeps exact index positions from flooring one short.
        let to_index =
            |pct: f64| (pct.clamp(0.0, 100.0) / 100.0 * last + 1e-9).floor() as usize;
        let (a, b) = (to_index(lo_pct), to_index(hi_pct));
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    /// Slider positions for this window, the inverse of [`ViewRange::from_percentages`].
    pub fn percentages(&self, len: usize) -> (f64, f64) {
        if len <= 1 {
            return (0.0, 100.0);
        }
        let last = (len - 1) as f64;
        (
            self.start as f64 / last * 100.0,
            self.end as f64 / last * 100.0,
        )
    }

    /// Clamp into a series of `len` points.
    pub fn clamp_to(self, len: usize) -> Self {
        let last = len.saturating_sub(1);
        let end = self.end.min(last);
        Self {
            start: self.start.min(end),
            end,
        }
    }

    fn recentre(self, new_span: usize, len: usize) -> Self {
        let last = len.saturating_sub(1);
        let mid = (self.start + self.end) / 2;
        let mut start = mid.saturating_sub(new_span / 2);
        let end = (start + new_span).min(last);
        if end - start < new_span {
            start = end.saturating_sub(new_span);
        }
        Self { start, end }
    }
}

/// Y-axis domain padded 5% below and above the visible values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueDomain {
    pub min: f64,
    pub max: f64,
}

impl ValueDomain {
    pub fn of(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let (lo, hi) = values
            .into_iter()
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })?;
        Some(Self {
            min: lo * 0.95,
            max: hi * 1.05,
        })
    }

    pub fn height(&self) -> f64 {
        self.max - self.min
    }

    /// Fraction of the domain from the bottom, clamped to `[0, 1]`.
    pub fn ratio(&self, value: f64) -> f64 {
        if self.height() == 0.0 {
            return 0.5;
        }
        ((value - self.min) / self.height()).clamp(0.0, 1.0)
    }
}

/// Plot area in screen units (pixels or terminal cells).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A pointer position translated to data space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub index: usize,
    pub value: f64,
}

impl PlotRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    /// Map a pointer position into the visible range and value domain.
    ///
    /// Positions outside the rectangle are clamped to its edges. A rectangle
    /// without area maps to nothing.
    pub fn map(&self, px: f64, py: f64, range: ViewRange, domain: ValueDomain) -> Option<DataPoint> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return None;
        }
        let dx = (px - self.x).clamp(0.0, self.width);
        let y_ratio = (py - self.y).clamp(0.0, self.height) / self.height;
        let offset = (dx * range.span() as f64 / self.width).floor() as usize;
        Some(DataPoint {
            index: (range.start + offset).min(range.end),
            value: domain.min + (1.0 - y_ratio) * domain.height(),
        })
    }
}
