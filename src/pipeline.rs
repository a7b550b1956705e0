//! End-to-end processing of one drawing.
//!
//! detections → parsed candidates → quality gate → per-engine dedupe →
//! cross-engine merge → relation linking.

use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

use crate::config::Config;
use crate::consolidate::{dedupe_per_engine, merge_ensemble};
use crate::error::DimfuseError;
use crate::ir::{
    DimensionId, DrawingInput, DrawingResult, PipelineSummary, RawDetection,
};
use crate::link::link;
use crate::parse::parse_detection;

/// Hands out dimension ids for one drawing.
///
/// Ids supplied by the caller are reserved up front and used as-is, so a
/// caller-side duplicate still surfaces as a contract violation. Minted ids
/// (`<engine>-<index>` for anonymous detections, `<parent>-<n>` for
/// decomposed children) get a `-<k>` suffix until they clash with nothing.
#[derive(Debug, Default)]
pub struct IdMinter {
    taken: HashSet<String>,
}

fn explicit_id(detection: &RawDetection) -> Option<&str> {
    detection.id.as_deref().filter(|id| !id.trim().is_empty())
}

impl IdMinter {
    /// Reserves every explicit detection id in `detections`.
    pub fn new(detections: &[RawDetection]) -> Self {
        Self {
            taken: detections
                .iter()
                .filter_map(explicit_id)
                .map(str::to_string)
                .collect(),
        }
    }

    /// Id of the detection at `index`: its own id, else a minted one.
    pub fn detection_id(&mut self, detection: &RawDetection, index: usize) -> DimensionId {
        match explicit_id(detection) {
            Some(id) => DimensionId::new(id),
            None => self.mint(&format!("{}-{}", detection.engine, index)),
        }
    }

    /// Returns `base`, or `base-<k>` for the first `k` not already taken.
    pub fn mint(&mut self, base: &str) -> DimensionId {
        let mut candidate = base.to_string();
        let mut k = 1;
        while self.taken.contains(&candidate) {
            candidate = format!("{base}-{k}");
            k += 1;
        }
        self.taken.insert(candidate.clone());
        DimensionId::new(candidate)
    }
}

/// Runs the whole pipeline over one drawing.
///
/// Noise is filtered silently. Fails only on caller-contract violations
/// such as two detections sharing an id.
pub fn process_drawing(input: &DrawingInput, config: &Config) -> Result<DrawingResult, DimfuseError> {
    let mut summary = PipelineSummary {
        detections: input.detections.len(),
        ..PipelineSummary::default()
    };

    let mut ids = IdMinter::new(&input.detections);
    let mut candidates = Vec::new();
    for (index, detection) in input.detections.iter().enumerate() {
        let id = ids.detection_id(detection, index);
        let mut parsed = parse_detection(detection, id, &config.parser);
        summary.parsed += parsed.dimensions.len();
        if parsed.decomposed {
            summary.decomposed += parsed.dimensions.len();
            for dim in &mut parsed.dimensions {
                dim.id = ids.mint(dim.id.as_str());
            }
        }
        for dim in parsed.dimensions {
            match config.parser.quality.rejection(&dim) {
                Some(reason) => {
                    debug!("Rejected '{}' from {}: {}", dim.raw_text, dim.source_engine, reason);
                    summary.rejected += 1;
                }
                None => candidates.push(dim),
            }
        }
    }

    let deduped = dedupe_per_engine(&candidates, config.consolidation.dedupe_iou_threshold)?;
    summary.after_dedupe = deduped.len();

    let merged = merge_ensemble(&deduped, &config.consolidation)?;
    summary.after_merge = merged.len();

    let relations = link(&merged, &input.symbols, &input.lines, &config.linker)?;

    let mut by_method: BTreeMap<String, usize> = BTreeMap::new();
    for rel in &relations {
        let key = if rel.has_target() {
            rel.method.as_str()
        } else {
            "no_target"
        };
        *by_method.entry(key.to_string()).or_default() += 1;
    }
    summary.by_method = by_method;

    let dimensions = merged
        .into_iter()
        .zip(&relations)
        .map(|(mut dim, rel)| {
            dim.linked_to = rel.has_target().then(|| rel.id.clone());
            dim
        })
        .collect();

    info!(
        "Processed {} detection(s) into {} dimension(s) ({} rejected, {} decomposed)",
        summary.detections, summary.after_merge, summary.rejected, summary.decomposed
    );

    Ok(DrawingResult {
        dimensions,
        relations,
        summary,
    })
}
