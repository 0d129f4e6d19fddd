//! User-drawn chart annotations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Colour given to every new annotation.
pub const ANNOTATION_COLOR: &str = "#ff0000";

/// Identifier unique within one chart view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AnnotationId(pub u64);

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A segment between two data indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendLine {
    pub id: AnnotationId,
    pub start_index: usize,
    pub end_index: usize,
    pub color: String,
}

impl TrendLine {
    /// Lower and upper index regardless of drawing direction.
    pub fn bounds(&self) -> (usize, usize) {
        (
            self.start_index.min(self.end_index),
            self.start_index.max(self.end_index),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// A horizontal line at a value or a vertical line at an index.
///
/// Horizontal lines use `value` and leave `index` at 0; vertical lines use
/// `index` and leave `value` at 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLine {
    pub id: AnnotationId,
    pub orientation: Orientation,
    pub index: usize,
    pub value: f64,
    pub label: String,
    pub color: String,
}

/// Hands out ids in creation order.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn next_id(&mut self) -> AnnotationId {
        self.next += 1;
        AnnotationId(self.next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_increasing() {
        let mut ids = IdAllocator::default();
        let a = ids.next_id();
        let b = ids.next_id();
        assert!(b > a);
        assert_eq!(a.to_string(), "#1");
    }

    #[test]
    fn bounds_ignore_direction() {
        let t = TrendLine {
            id: AnnotationId(1),
            start_index: 9,
            end_index: 3,
            color: ANNOTATION_COLOR.into(),
        };
        assert_eq!(t.bounds(), (3, 9));
    }
}
