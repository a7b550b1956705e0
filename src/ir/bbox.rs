//! Axis-aligned bounding boxes in image pixel coordinates.

use serde::{Deserialize, Serialize};

use super::geometry::Point;

/// An axis-aligned bounding box `(x1, y1, x2, y2)` in image pixels.
///
/// Note: This type does NOT enforce `x1 < x2` or `y1 < y2`. Degenerate boxes
/// (zero area) are valid values and every geometric helper handles them
/// without panicking. Missing keys deserialize as `0`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    #[serde(default)]
    pub x1: f64,
    #[serde(default)]
    pub y1: f64,
    #[serde(default)]
    pub x2: f64,
    #[serde(default)]
    pub y2: f64,
}

impl BoundingBox {
    /// Creates a new bounding box from explicit coordinates.
    #[inline]
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Creates the tightest box around a set of points.
    ///
    /// Returns the zero box for an empty slice.
    pub fn enclosing(points: &[Point]) -> Self {
        let Some(first) = points.first() else {
            return Self::default();
        };
        points.iter().skip(1).fold(
            Self::new(first.x, first.y, first.x, first.y),
            |acc, p| Self::new(acc.x1.min(p.x), acc.y1.min(p.y), acc.x2.max(p.x), acc.y2.max(p.y)),
        )
    }

    /// Returns the width of the box, clamped at zero.
    #[inline]
    pub fn width(&self) -> f64 {
        (self.x2 - self.x1).max(0.0)
    }

    /// Returns the height of the box, clamped at zero.
    #[inline]
    pub fn height(&self) -> f64 {
        (self.y2 - self.y1).max(0.0)
    }

    /// Returns the area of the box. Zero for degenerate or inverted boxes.
    #[inline]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Returns the center point.
    #[inline]
    pub fn center(&self) -> Point {
        Point::new((self.x1 + self.x2) * 0.5, (self.y1 + self.y2) * 0.5)
    }

    /// Returns true if all coordinates are finite (not NaN or infinite).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x1.is_finite() && self.y1.is_finite() && self.x2.is_finite() && self.y2.is_finite()
    }

    /// True when the text in this box reads horizontally (wider than tall).
    #[inline]
    pub fn is_horizontal(&self) -> bool {
        self.width() > self.height()
    }

    /// Intersection-over-union with another box.
    ///
    /// Returns `0.0` when the union has no area, so degenerate boxes never
    /// count as overlapping anything (including themselves).
    pub fn iou(&self, other: &Self) -> f64 {
        let inter = Self::new(
            self.x1.max(other.x1),
            self.y1.max(other.y1),
            self.x2.min(other.x2),
            self.y2.min(other.y2),
        )
        .area();
        let union = self.area() + other.area() - inter;
        if union <= 0.0 {
            0.0
        } else {
            inter / union
        }
    }

    /// Builds a new box shifted by `(dx, dy)`.
    #[inline]
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x1 + dx, self.y1 + dy, self.x2 + dx, self.y2 + dy)
    }

    /// Builds a new box grown by `margin` on every side.
    #[inline]
    pub fn expanded(&self, margin: f64) -> Self {
        Self::new(
            self.x1 - margin,
            self.y1 - margin,
            self.x2 + margin,
            self.y2 + margin,
        )
    }

    /// Builds the horizontal slice of this box covering the fraction
    /// `[start, end)` of its width. Fractions are clamped into `[0, 1]`.
    pub fn horizontal_slice(&self, start: f64, end: f64) -> Self {
        let start = start.clamp(0.0, 1.0);
        let end = end.clamp(start, 1.0);
        let w = self.x2 - self.x1;
        Self::new(self.x1 + w * start, self.y1, self.x1 + w * end, self.y2)
    }

    /// Euclidean distance from a point to this box; zero when inside.
    pub fn distance_to_point(&self, p: Point) -> f64 {
        let dx = (self.x1 - p.x).max(0.0).max(p.x - self.x2);
        let dy = (self.y1 - p.y).max(0.0).max(p.y - self.y2);
        dx.hypot(dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_dimensions() {
        let bbox = BoundingBox::new(10.0, 20.0, 100.0, 80.0);
        assert_eq!(bbox.width(), 90.0);
        assert_eq!(bbox.height(), 60.0);
        assert_eq!(bbox.area(), 5400.0);
        assert_eq!(bbox.center(), Point::new(55.0, 50.0));
        assert!(bbox.is_horizontal());
    }

    #[test]
    fn test_iou_identity_and_disjoint() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(20.0, 20.0, 30.0, 30.0);
        assert_eq!(a.iou(&a), 1.0);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn test_iou_partial_overlap() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(5.0, 5.0, 15.0, 15.0);
        assert_eq!(a.iou(&b), 25.0 / 175.0);
        assert_eq!(a.iou(&b), b.iou(&a));
    }

    #[test]
    fn test_degenerate_box_has_zero_iou() {
        let zero = BoundingBox::default();
        assert_eq!(zero.area(), 0.0);
        assert_eq!(zero.iou(&zero), 0.0);
    }

    #[test]
    fn test_translated_leaves_original_untouched() {
        let original = BoundingBox::new(1.0, 2.0, 3.0, 4.0);
        let moved = original.translated(10.0, 20.0);
        assert_eq!(moved, BoundingBox::new(11.0, 22.0, 13.0, 24.0));
        assert_eq!(original, BoundingBox::new(1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    fn test_enclosing_polygon() {
        let pts = [
            Point::new(5.0, 1.0),
            Point::new(9.0, 2.0),
            Point::new(8.0, 7.0),
            Point::new(4.0, 6.0),
        ];
        assert_eq!(
            BoundingBox::enclosing(&pts),
            BoundingBox::new(4.0, 1.0, 9.0, 7.0)
        );
        assert_eq!(BoundingBox::enclosing(&[]), BoundingBox::default());
    }

    #[test]
    fn test_distance_to_point() {
        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(bbox.distance_to_point(Point::new(5.0, 5.0)), 0.0);
        assert_eq!(bbox.distance_to_point(Point::new(13.0, 14.0)), 5.0);
    }

    #[test]
    fn test_horizontal_slice() {
        let bbox = BoundingBox::new(0.0, 0.0, 100.0, 10.0);
        assert_eq!(
            bbox.horizontal_slice(0.25, 0.5),
            BoundingBox::new(25.0, 0.0, 50.0, 10.0)
        );
    }

    #[test]
    fn test_missing_keys_default_to_zero() {
        let bbox: BoundingBox = serde_json::from_str(r#"{"x1": 5.0, "x2": 9.0}"#).unwrap();
        assert_eq!(bbox, BoundingBox::new(5.0, 0.0, 9.0, 0.0));
    }
}
