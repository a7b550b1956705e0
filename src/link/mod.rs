//! Geometric relation linking.
//!
//! Attaches every dimension to the drawing feature it measures through a
//! confidence-ordered cascade:
//!
//! 1. **Dimension line** - a line parallel to the text, close to it, whose
//!    far side lines up with a symbol
//! 2. **Extension line** - a perpendicular line with an endpoint touching a
//!    symbol's box
//! 3. **Proximity** - the nearest symbol within reach, or an explicit
//!    no-target relation
//!
//! Exactly one relation is produced per dimension, in input order.

mod tiers;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::DimfuseError;
use crate::ir::{
    Dimension, DimensionRelation, GeometryLine, LinkMethod, RelationId, RelationType,
    SymbolNode, TargetType,
};
use crate::validation::ensure_unique_dimension_ids;

use tiers::TierHit;

/// Tier 1 settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionLineTier {
    /// Lines farther than this from the text center are ignored.
    pub search_radius: f64,
    pub min_line_length: f64,
    /// Max deviation from 0°/90° for a line to count as axis-aligned.
    pub angle_tolerance_deg: f64,
    /// Max cross-axis distance between the line and the text center.
    pub line_offset_tolerance: f64,
    /// Width of the band a symbol must fall into to be lined up.
    pub symbol_alignment_tolerance: f64,
    /// Symbols farther than this from the text center are ignored.
    pub symbol_search_radius: f64,
    pub confidence: f64,
}

impl Default for DimensionLineTier {
    fn default() -> Self {
        Self {
            search_radius: 200.0,
            min_line_length: 20.0,
            angle_tolerance_deg: 15.0,
            line_offset_tolerance: 30.0,
            symbol_alignment_tolerance: 50.0,
            symbol_search_radius: 500.0,
            confidence: 0.95,
        }
    }
}

/// Tier 2 settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionLineTier {
    pub search_radius: f64,
    pub angle_tolerance_deg: f64,
    /// Symbol boxes are grown by this margin before endpoint checks.
    pub symbol_margin: f64,
    /// Max gap between a line endpoint and the grown symbol box.
    pub endpoint_distance: f64,
    pub confidence: f64,
}

impl Default for ExtensionLineTier {
    fn default() -> Self {
        Self {
            search_radius: 300.0,
            angle_tolerance_deg: 15.0,
            symbol_margin: 10.0,
            endpoint_distance: 15.0,
            confidence: 0.85,
        }
    }
}

/// Tier 3 settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityTier {
    pub max_distance: f64,
    /// Confidence at zero distance.
    pub max_confidence: f64,
    /// Confidence floor for any accepted proximity link.
    pub min_confidence: f64,
    /// Distance over which confidence drops by `decay`.
    pub distance_scale: f64,
    pub decay: f64,
}

impl Default for ProximityTier {
    fn default() -> Self {
        Self {
            max_distance: 300.0,
            max_confidence: 0.60,
            min_confidence: 0.30,
            distance_scale: 300.0,
            decay: 0.30,
        }
    }
}

impl ProximityTier {
    /// `max(min_confidence, max_confidence - distance / distance_scale * decay)`.
    pub fn confidence_at(&self, distance: f64) -> f64 {
        let scale = if self.distance_scale > 0.0 {
            self.distance_scale
        } else {
            1.0
        };
        (self.max_confidence - distance / scale * self.decay).max(self.min_confidence)
    }
}

/// All linker thresholds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkerConfig {
    pub dimension_line: DimensionLineTier,
    pub extension_line: ExtensionLineTier,
    pub proximity: ProximityTier,
    /// Dimension count above which linking fans out across threads.
    pub parallel_threshold: usize,
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            dimension_line: DimensionLineTier::default(),
            extension_line: ExtensionLineTier::default(),
            proximity: ProximityTier::default(),
            parallel_threshold: 64,
        }
    }
}

/// Links every dimension to a target, returning one relation per dimension
/// in the same order.
///
/// Fails only when `dimensions` repeats an id.
pub fn link(
    dimensions: &[Dimension],
    symbols: &[SymbolNode],
    lines: &[GeometryLine],
    config: &LinkerConfig,
) -> Result<Vec<DimensionRelation>, DimfuseError> {
    ensure_unique_dimension_ids(dimensions)?;

    let relations = if dimensions.len() > config.parallel_threshold {
        debug!("Linking {} dimensions in parallel", dimensions.len());
        dimensions
            .par_iter()
            .map(|dim| link_one(dim, symbols, lines, config))
            .collect()
    } else {
        dimensions
            .iter()
            .map(|dim| link_one(dim, symbols, lines, config))
            .collect()
    };
    Ok(relations)
}

/// Runs the tier cascade for a single dimension.
pub fn link_one(
    dimension: &Dimension,
    symbols: &[SymbolNode],
    lines: &[GeometryLine],
    config: &LinkerConfig,
) -> DimensionRelation {
    let bbox = &dimension.bbox;
    let hit = tiers::dimension_line(bbox, symbols, lines, &config.dimension_line)
        .or_else(|| tiers::extension_line(bbox, symbols, lines, &config.extension_line))
        .map(Ok)
        .unwrap_or_else(|| tiers::proximity(bbox, symbols, &config.proximity));

    match hit {
        Ok(hit) => relation_to(dimension, hit),
        Err(reason) => no_target(dimension, reason),
    }
}

fn relation_to(dimension: &Dimension, hit: TierHit<'_>) -> DimensionRelation {
    DimensionRelation {
        id: relation_id(dimension),
        dimension_id: dimension.id.clone(),
        target_type: TargetType::Symbol,
        target_id: Some(hit.symbol.id.clone()),
        target_bbox: Some(hit.symbol.bbox),
        relation_type: RelationType::from(dimension.dimension_type),
        method: hit.method,
        confidence: hit.confidence,
        direction: hit.direction.map(|d| d.as_str().to_string()),
        notes: Some(hit.notes),
    }
}

fn no_target(dimension: &Dimension, reason: String) -> DimensionRelation {
    DimensionRelation {
        id: relation_id(dimension),
        dimension_id: dimension.id.clone(),
        target_type: TargetType::None,
        target_id: None,
        target_bbox: None,
        relation_type: RelationType::from(dimension.dimension_type),
        method: LinkMethod::Proximity,
        confidence: 0.0,
        direction: None,
        notes: Some(format!("no target: {reason}")),
    }
}

fn relation_id(dimension: &Dimension) -> RelationId {
    RelationId::new(format!("rel-{}", dimension.id))
}
