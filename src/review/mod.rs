//! Human-review queue.
//!
//! Picks out the dimensions a reviewer should check first: weak
//! recognitions, unclassified text and relations that only reached the
//! proximity fallback or no target at all.

mod report;

pub use report::{ReviewItem, ReviewReason, ReviewReport};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ir::{Dimension, DimensionId, DimensionRelation, DimensionType, LinkMethod};

/// Options for building the review queue.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewOptions {
    /// Dimensions and relations below this confidence are flagged.
    pub confidence_threshold: f64,
}

impl Default for ReviewOptions {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.7,
        }
    }
}

/// Builds the review queue, ordered by ascending priority score.
///
/// The score is the lower of the dimension and relation confidences;
/// ties keep input order.
pub fn build_review_queue(
    dimensions: &[Dimension],
    relations: &[DimensionRelation],
    opts: &ReviewOptions,
) -> ReviewReport {
    let by_dimension: HashMap<&DimensionId, &DimensionRelation> = relations
        .iter()
        .map(|rel| (&rel.dimension_id, rel))
        .collect();

    let mut items: Vec<ReviewItem> = dimensions
        .iter()
        .filter_map(|dim| review_item(dim, by_dimension.get(&dim.id).copied(), opts))
        .collect();
    items.sort_by(|a, b| a.priority.total_cmp(&b.priority));

    ReviewReport {
        total_dimensions: dimensions.len(),
        threshold: opts.confidence_threshold,
        items,
    }
}

fn review_item(
    dim: &Dimension,
    relation: Option<&DimensionRelation>,
    opts: &ReviewOptions,
) -> Option<ReviewItem> {
    let threshold = opts.confidence_threshold;
    let mut reasons = Vec::new();

    if dim.confidence < threshold {
        reasons.push(ReviewReason::LowConfidence);
    }
    if dim.dimension_type == DimensionType::Unknown {
        reasons.push(ReviewReason::UnknownType);
    }

    let mut priority = dim.confidence;
    match relation {
        Some(rel) if !rel.has_target() => {
            reasons.push(ReviewReason::NoTarget);
            priority = priority.min(rel.confidence);
        }
        Some(rel) => {
            if rel.method == LinkMethod::Proximity {
                reasons.push(ReviewReason::ProximityLink);
            }
            if rel.confidence < threshold {
                reasons.push(ReviewReason::LowLinkConfidence);
            }
            priority = priority.min(rel.confidence);
        }
        None => {
            reasons.push(ReviewReason::NoTarget);
            priority = 0.0;
        }
    }

    if reasons.is_empty() {
        return None;
    }

    Some(ReviewItem {
        dimension_id: dim.id.clone(),
        value: dim.value.clone(),
        dimension_type: dim.dimension_type,
        confidence: dim.confidence,
        method: relation.map(|r| r.method),
        link_confidence: relation.map(|r| r.confidence),
        reasons,
        priority,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{BoundingBox, RelationId, RelationType, SymbolId, TargetType};

    fn dim(id: &str, ty: DimensionType, confidence: f64) -> Dimension {
        Dimension::new(id, BoundingBox::new(0.0, 0.0, 30.0, 10.0), "x")
            .with_parsed(ty, "x")
            .with_confidence(confidence)
    }

    fn rel(dim_id: &str, method: LinkMethod, confidence: f64, target: bool) -> DimensionRelation {
        DimensionRelation {
            id: RelationId::new(format!("rel-{dim_id}")),
            dimension_id: dim_id.into(),
            target_type: if target { TargetType::Symbol } else { TargetType::None },
            target_id: target.then(|| SymbolId::new("s1")),
            target_bbox: None,
            relation_type: RelationType::Distance,
            method,
            confidence,
            direction: None,
            notes: None,
        }
    }

    #[test]
    fn confident_dimension_line_is_not_flagged() {
        let dims = [dim("a", DimensionType::Length, 0.9)];
        let rels = [rel("a", LinkMethod::DimensionLine, 0.95, true)];
        let report = build_review_queue(&dims, &rels, &ReviewOptions::default());
        assert!(report.is_empty());
        assert!(report.to_string().contains("Review queue empty"));
    }

    #[test]
    fn flags_and_orders_by_priority() {
        let dims = [
            dim("a", DimensionType::Length, 0.9),
            dim("b", DimensionType::Unknown, 0.5),
            dim("c", DimensionType::Diameter, 0.95),
        ];
        let rels = [
            rel("a", LinkMethod::Proximity, 0.55, true),
            rel("b", LinkMethod::DimensionLine, 0.95, true),
            rel("c", LinkMethod::Proximity, 0.0, false),
        ];
        let report = build_review_queue(&dims, &rels, &ReviewOptions::default());

        let order: Vec<_> = report.items.iter().map(|i| i.dimension_id.as_str()).collect();
        assert_eq!(order, vec!["c", "b", "a"]);
        assert_eq!(report.items[0].reasons, vec![ReviewReason::NoTarget]);
        assert_eq!(
            report.items[1].reasons,
            vec![ReviewReason::LowConfidence, ReviewReason::UnknownType]
        );
        assert_eq!(
            report.items[2].reasons,
            vec![ReviewReason::ProximityLink, ReviewReason::LowLinkConfidence]
        );
        assert_eq!(report.count(ReviewReason::ProximityLink), 1);
    }

    #[test]
    fn missing_relation_counts_as_no_target() {
        let dims = [dim("a", DimensionType::Length, 0.9)];
        let report = build_review_queue(&dims, &[], &ReviewOptions::default());
        assert_eq!(report.items[0].reasons, vec![ReviewReason::NoTarget]);
        assert_eq!(report.items[0].priority, 0.0);
    }
}
