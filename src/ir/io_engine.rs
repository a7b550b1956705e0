//! Adapter for raw engine detections.
//!
//! Each recognition engine reports boxes in its own shape. This module
//! accepts the three shapes seen in practice and normalizes them into a
//! [`BoundingBox`]:
//!
//! - 4-point polygon: `[[x, y], [x, y], [x, y], [x, y]]`
//! - object: `{"x1": .., "y1": .., "x2": .., "y2": ..}` (missing keys are `0`)
//! - flat list: `[x1, y1, x2, y2]` (short lists are padded with `0`)

use serde::{Deserialize, Serialize};

use super::bbox::BoundingBox;
use super::geometry::Point;
use super::model::clamp_confidence;

/// Engine name used when a detection does not say where it came from.
pub const UNKNOWN_ENGINE: &str = "unknown";

/// A box in any of the engine-specific shapes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawBBox {
    Polygon(Vec<[f64; 2]>),
    Flat(Vec<f64>),
    Object(BoundingBox),
}

impl Default for RawBBox {
    fn default() -> Self {
        RawBBox::Object(BoundingBox::default())
    }
}

impl RawBBox {
    /// Normalizes into an axis-aligned box.
    pub fn to_bbox(&self) -> BoundingBox {
        match self {
            RawBBox::Polygon(points) => {
                let points: Vec<Point> = points.iter().map(|[x, y]| Point::new(*x, *y)).collect();
                BoundingBox::enclosing(&points)
            }
            RawBBox::Flat(values) => {
                let at = |i: usize| values.get(i).copied().unwrap_or(0.0);
                BoundingBox::new(at(0), at(1), at(2), at(3))
            }
            RawBBox::Object(bbox) => *bbox,
        }
    }
}

/// One text detection as reported by an engine adapter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    /// Optional engine-assigned id; the pipeline mints one when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub text: String,

    #[serde(default)]
    pub bbox: RawBBox,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    #[serde(default = "default_engine")]
    pub engine: String,

    /// Tile origin when the engine ran on a crop of the drawing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<Point>,
}

fn default_engine() -> String {
    UNKNOWN_ENGINE.to_string()
}

impl RawDetection {
    /// Creates a detection with an object-shaped box.
    pub fn new(engine: impl Into<String>, text: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            id: None,
            text: text.into(),
            bbox: RawBBox::Object(bbox),
            confidence: None,
            engine: engine.into(),
            offset: None,
        }
    }

    /// Sets the confidence.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Sets the detection id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the tile offset.
    pub fn with_offset(mut self, dx: f64, dy: f64) -> Self {
        self.offset = Some(Point::new(dx, dy));
        self
    }

    /// Box in full-drawing coordinates (tile offset applied).
    pub fn page_bbox(&self) -> BoundingBox {
        let bbox = self.bbox.to_bbox();
        match self.offset {
            Some(offset) => bbox.translated(offset.x, offset.y),
            None => bbox,
        }
    }

    /// Confidence clamped into `[0, 1]`; absent means fully confident.
    pub fn normalized_confidence(&self) -> f64 {
        self.confidence.map(clamp_confidence).unwrap_or(1.0)
    }
}
