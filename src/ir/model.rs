//! Core record types flowing through the dimension pipeline.
//!
//! A [`Dimension`] is created by the parser from one raw engine detection,
//! replaced (never mutated) by the consolidator, and finally paired with
//! exactly one [`DimensionRelation`] by the linker.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::bbox::BoundingBox;
use super::ids::{DimensionId, RelationId, SymbolId};

/// Semantic kind of a dimension callout.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DimensionType {
    #[default]
    Unknown,
    Length,
    Diameter,
    Radius,
    Angle,
    Thread,
    Chamfer,
    Tolerance,
    SurfaceFinish,
}

impl DimensionType {
    /// Stable snake_case name, identical to the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            DimensionType::Unknown => "unknown",
            DimensionType::Length => "length",
            DimensionType::Diameter => "diameter",
            DimensionType::Radius => "radius",
            DimensionType::Angle => "angle",
            DimensionType::Thread => "thread",
            DimensionType::Chamfer => "chamfer",
            DimensionType::Tolerance => "tolerance",
            DimensionType::SurfaceFinish => "surface_finish",
        }
    }

    /// Types that never carry an ISO fit tolerance (`H7`, `h6`, ...).
    pub fn excludes_fit_tolerance(self) -> bool {
        matches!(
            self,
            DimensionType::Radius
                | DimensionType::Chamfer
                | DimensionType::Thread
                | DimensionType::Angle
                | DimensionType::SurfaceFinish
        )
    }
}

impl fmt::Display for DimensionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Human verification state. This crate only ever writes `Pending`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Modified,
}

/// A single dimension callout read from the drawing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    pub id: DimensionId,

    #[serde(default)]
    pub bbox: BoundingBox,

    /// Normalized, human-readable token (e.g. `Ø25±0.1`, `M8x1.25`).
    pub value: String,

    /// Text exactly as the engine produced it.
    #[serde(default)]
    pub raw_text: String,

    #[serde(default)]
    pub unit: Option<String>,

    #[serde(default)]
    pub tolerance: Option<String>,

    #[serde(default)]
    pub dimension_type: DimensionType,

    /// Detection confidence in `[0, 1]`.
    #[serde(default = "default_confidence")]
    pub confidence: f64,

    /// Engine name, or the sorted `+`-joined engine set of a merged record.
    #[serde(default)]
    pub source_engine: String,

    #[serde(default)]
    pub verification_status: VerificationStatus,

    /// Human correction overlay; never written by this crate.
    #[serde(default)]
    pub modified_value: Option<String>,

    /// Human correction overlay; never written by this crate.
    #[serde(default)]
    pub modified_bbox: Option<BoundingBox>,

    #[serde(default)]
    pub linked_to: Option<RelationId>,
}

fn default_confidence() -> f64 {
    1.0
}

impl Dimension {
    /// Creates an untyped dimension whose value is its raw text.
    pub fn new(id: impl Into<DimensionId>, bbox: BoundingBox, raw_text: impl Into<String>) -> Self {
        let raw_text = raw_text.into();
        Self {
            id: id.into(),
            bbox,
            value: raw_text.clone(),
            raw_text,
            unit: None,
            tolerance: None,
            dimension_type: DimensionType::Unknown,
            confidence: 1.0,
            source_engine: String::new(),
            verification_status: VerificationStatus::Pending,
            modified_value: None,
            modified_bbox: None,
            linked_to: None,
        }
    }

    /// Sets the parsed type and value.
    pub fn with_parsed(mut self, dimension_type: DimensionType, value: impl Into<String>) -> Self {
        self.dimension_type = dimension_type;
        self.value = value.into();
        self
    }

    /// Sets the tolerance string.
    pub fn with_tolerance(mut self, tolerance: impl Into<String>) -> Self {
        self.tolerance = Some(tolerance.into());
        self
    }

    /// Sets the unit.
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Sets the confidence, clamped into `[0, 1]` (NaN becomes `0`).
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = clamp_confidence(confidence);
        self
    }

    /// Sets the source engine.
    pub fn with_engine(mut self, engine: impl Into<String>) -> Self {
        self.source_engine = engine.into();
        self
    }
}

/// Clamps a confidence into `[0, 1]`, mapping NaN to `0`.
pub fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}

/// A detected drawing feature (hole, boss, edge group, ...). Read-only input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SymbolNode {
    pub id: SymbolId,
    pub class_name: String,
    #[serde(default)]
    pub bbox: BoundingBox,
    #[serde(default)]
    pub tag: Option<String>,
}

impl SymbolNode {
    /// Creates a new symbol without a tag.
    pub fn new(id: impl Into<SymbolId>, class_name: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            id: id.into(),
            class_name: class_name.into(),
            bbox,
            tag: None,
        }
    }
}

/// What a relation points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    Symbol,
    Edge,
    Region,
    None,
}

/// What the dimension measures on its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    Distance,
    Diameter,
    Radius,
    Angle,
    Tolerance,
    SurfaceFinish,
}

impl From<DimensionType> for RelationType {
    fn from(dimension_type: DimensionType) -> Self {
        match dimension_type {
            DimensionType::Diameter => RelationType::Diameter,
            DimensionType::Radius => RelationType::Radius,
            DimensionType::Angle => RelationType::Angle,
            DimensionType::Tolerance => RelationType::Tolerance,
            DimensionType::SurfaceFinish => RelationType::SurfaceFinish,
            DimensionType::Length
            | DimensionType::Thread
            | DimensionType::Chamfer
            | DimensionType::Unknown => RelationType::Distance,
        }
    }
}

/// How a relation was established.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkMethod {
    DimensionLine,
    ExtensionLine,
    Proximity,
    Manual,
}

impl LinkMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            LinkMethod::DimensionLine => "dimension_line",
            LinkMethod::ExtensionLine => "extension_line",
            LinkMethod::Proximity => "proximity",
            LinkMethod::Manual => "manual",
        }
    }
}

/// The link between one dimension and the feature it measures.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DimensionRelation {
    pub id: RelationId,
    pub dimension_id: DimensionId,
    pub target_type: TargetType,
    #[serde(default)]
    pub target_id: Option<SymbolId>,
    #[serde(default)]
    pub target_bbox: Option<BoundingBox>,
    pub relation_type: RelationType,
    pub method: LinkMethod,
    pub confidence: f64,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl DimensionRelation {
    /// True when the relation points at an actual target.
    pub fn has_target(&self) -> bool {
        self.target_type != TargetType::None && self.target_id.is_some()
    }
}
