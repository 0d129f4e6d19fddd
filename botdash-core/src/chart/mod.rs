//! Advanced chart: visible window, zoom/pan, pointer mapping and annotations.

pub mod annotation;
pub mod interaction;
pub mod range;
pub mod view;

pub use annotation::{AnnotationId, Orientation, ReferenceLine, TrendLine, ANNOTATION_COLOR};
pub use interaction::{transition, ChartMode, ChartType, DragState, DrawTool, Effect, PointerEvent};
pub use range::{DataPoint, PlotRect, ValueDomain, ViewRange};
pub use view::ChartView;
