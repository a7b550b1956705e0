//! Per-drawing input and output envelopes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::geometry::GeometryLine;
use super::io_engine::RawDetection;
use super::model::{Dimension, DimensionRelation, SymbolNode};

/// Everything the pipeline needs for one drawing: pooled engine detections
/// plus the symbol and line geometry extracted elsewhere.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawingInput {
    #[serde(default)]
    pub detections: Vec<RawDetection>,

    #[serde(default)]
    pub symbols: Vec<SymbolNode>,

    #[serde(default)]
    pub lines: Vec<GeometryLine>,
}

/// Consolidated dimensions and one relation per dimension.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawingResult {
    pub dimensions: Vec<Dimension>,
    pub relations: Vec<DimensionRelation>,
    #[serde(default)]
    pub summary: PipelineSummary,
}

/// Counts collected while a drawing moves through the pipeline.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Raw detections received.
    pub detections: usize,
    /// Candidate dimensions produced by the parser (before the quality gate).
    pub parsed: usize,
    /// Candidates that came out of compound-text decomposition.
    pub decomposed: usize,
    /// Candidates dropped by the quality gate.
    pub rejected: usize,
    /// Dimensions left after per-engine deduplication.
    pub after_dedupe: usize,
    /// Dimensions left after cross-engine merging.
    pub after_merge: usize,
    /// Relation count per link method.
    #[serde(default)]
    pub by_method: BTreeMap<String, usize>,
}
