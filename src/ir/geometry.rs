//! Points and line segments extracted from the drawing.

use serde::{Deserialize, Serialize};

use super::ids::LineId;

/// A 2D point in image pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

impl Point {
    /// Creates a new point.
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Returns true if both coordinates are finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Axis a line (or a dimension's text) runs along.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    /// The other axis.
    #[inline]
    pub fn perpendicular(self) -> Self {
        match self {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }

    /// Lowercase name used in relation `direction` fields.
    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Horizontal => "horizontal",
            Orientation::Vertical => "vertical",
        }
    }
}

/// A straight line segment detected on the drawing. Read-only input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeometryLine {
    pub id: LineId,
    pub start: Point,
    pub end: Point,
}

impl GeometryLine {
    /// Creates a new line segment.
    pub fn new(id: impl Into<LineId>, start: Point, end: Point) -> Self {
        Self {
            id: id.into(),
            start,
            end,
        }
    }

    /// Segment length.
    #[inline]
    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    /// Midpoint of the segment.
    #[inline]
    pub fn midpoint(&self) -> Point {
        Point::new(
            (self.start.x + self.end.x) * 0.5,
            (self.start.y + self.end.y) * 0.5,
        )
    }

    /// Undirected angle in degrees, in `[0, 180)`.
    pub fn angle_degrees(&self) -> f64 {
        let dx = self.end.x - self.start.x;
        let dy = self.end.y - self.start.y;
        let deg = dy.atan2(dx).to_degrees();
        deg.rem_euclid(180.0)
    }

    /// Classifies the segment as horizontal or vertical when its angle is
    /// within `tolerance_deg` of 0°/180° or 90° respectively.
    pub fn orientation(&self, tolerance_deg: f64) -> Option<Orientation> {
        let angle = self.angle_degrees();
        if angle <= tolerance_deg || angle >= 180.0 - tolerance_deg {
            Some(Orientation::Horizontal)
        } else if (angle - 90.0).abs() <= tolerance_deg {
            Some(Orientation::Vertical)
        } else {
            None
        }
    }

    /// Axis of the dominant endpoint delta.
    pub fn dominant_axis(&self) -> Orientation {
        let dx = (self.end.x - self.start.x).abs();
        let dy = (self.end.y - self.start.y).abs();
        if dx >= dy {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        }
    }

    /// Shortest distance from `p` to any point on the segment.
    pub fn distance_to_point(&self, p: Point) -> f64 {
        let dx = self.end.x - self.start.x;
        let dy = self.end.y - self.start.y;
        let len_sq = dx * dx + dy * dy;
        if len_sq <= f64::EPSILON {
            return self.start.distance(p);
        }
        let t = (((p.x - self.start.x) * dx + (p.y - self.start.y) * dy) / len_sq).clamp(0.0, 1.0);
        Point::new(self.start.x + t * dx, self.start.y + t * dy).distance(p)
    }

    /// Both endpoints, start first.
    #[inline]
    pub fn endpoints(&self) -> [Point; 2] {
        [self.start, self.end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> GeometryLine {
        GeometryLine::new("l", Point::new(x1, y1), Point::new(x2, y2))
    }

    #[test]
    fn test_orientation_within_tolerance() {
        assert_eq!(
            line(0.0, 0.0, 100.0, 5.0).orientation(15.0),
            Some(Orientation::Horizontal)
        );
        assert_eq!(
            line(100.0, 5.0, 0.0, 0.0).orientation(15.0),
            Some(Orientation::Horizontal)
        );
        assert_eq!(
            line(0.0, 0.0, 3.0, 100.0).orientation(15.0),
            Some(Orientation::Vertical)
        );
        assert_eq!(line(0.0, 0.0, 100.0, 100.0).orientation(15.0), None);
    }

    #[test]
    fn test_distance_to_point_clamps_to_segment() {
        let l = line(0.0, 0.0, 10.0, 0.0);
        assert_eq!(l.distance_to_point(Point::new(5.0, 3.0)), 3.0);
        assert_eq!(l.distance_to_point(Point::new(13.0, 4.0)), 5.0);
    }

    #[test]
    fn test_zero_length_line() {
        let l = line(2.0, 2.0, 2.0, 2.0);
        assert_eq!(l.length(), 0.0);
        assert_eq!(l.distance_to_point(Point::new(5.0, 6.0)), 5.0);
    }
}
