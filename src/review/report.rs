//! Review queue types and terminal formatting.

use serde::Serialize;
use std::fmt;

use crate::ir::{DimensionId, DimensionType, LinkMethod};

/// Why a dimension needs a human look.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewReason {
    /// Recognition confidence below the threshold.
    LowConfidence,
    /// The text matched no known dimension pattern.
    UnknownType,
    /// Linked only by nearest-symbol fallback.
    ProximityLink,
    /// No target could be found.
    NoTarget,
    /// The relation confidence is below the threshold.
    LowLinkConfidence,
}

impl ReviewReason {
    pub fn as_str(self) -> &'static str {
        match self {
            ReviewReason::LowConfidence => "low confidence",
            ReviewReason::UnknownType => "unknown type",
            ReviewReason::ProximityLink => "proximity link",
            ReviewReason::NoTarget => "no target",
            ReviewReason::LowLinkConfidence => "low link confidence",
        }
    }
}

/// One dimension flagged for review.
#[derive(Clone, Debug, Serialize)]
pub struct ReviewItem {
    pub dimension_id: DimensionId,
    pub value: String,
    pub dimension_type: DimensionType,
    pub confidence: f64,
    /// Method of the dimension's relation, if it has one.
    pub method: Option<LinkMethod>,
    pub link_confidence: Option<f64>,
    pub reasons: Vec<ReviewReason>,
    /// Lower is more urgent.
    pub priority: f64,
}

/// The review queue for one drawing, most urgent first.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ReviewReport {
    pub total_dimensions: usize,
    pub threshold: f64,
    pub items: Vec<ReviewItem>,
}

impl ReviewReport {
    /// True when nothing needs review.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of flagged items carrying `reason`.
    pub fn count(&self, reason: ReviewReason) -> usize {
        self.items
            .iter()
            .filter(|item| item.reasons.contains(&reason))
            .count()
    }
}

impl fmt::Display for ReviewReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.items.is_empty() {
            return writeln!(
                f,
                "Review queue empty: all {} dimension(s) above {:.2}",
                self.total_dimensions, self.threshold
            );
        }

        writeln!(
            f,
            "{} of {} dimension(s) need review (threshold {:.2}):",
            self.items.len(),
            self.total_dimensions,
            self.threshold
        )?;
        writeln!(f)?;

        for item in &self.items {
            let reasons: Vec<&str> = item.reasons.iter().map(|r| r.as_str()).collect();
            let link = match (item.method, item.link_confidence) {
                (Some(method), Some(conf)) => format!("{} {:.2}", method.as_str(), conf),
                _ => "unlinked".to_string(),
            };
            writeln!(
                f,
                "  [{:.2}] {} {:<14} {:<16} conf {:.2}, link {}: {}",
                item.priority,
                item.dimension_id,
                item.dimension_type,
                item.value,
                item.confidence,
                link,
                reasons.join(", ")
            )?;
        }

        Ok(())
    }
}
