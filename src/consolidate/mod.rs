//! Multi-engine consolidation of parsed dimensions.
//!
//! Two operations:
//!
//! - [`dedupe`]: greedy non-max suppression over one engine's detections.
//! - [`merge_ensemble`]: weighted-vote merging of detections pooled across
//!   engines that read the same physical callout differently.
//!
//! Both return new records and leave their input untouched.

mod weights;

pub use weights::{EngineProfile, EngineWeights};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::error::DimfuseError;
use crate::ir::{clamp_confidence, Dimension, VerificationStatus};
use crate::parse::{classify_and_parse, compact, is_diameter_glyph};
use crate::validation::ensure_unique_dimension_ids;

/// Consolidator settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsolidationConfig {
    /// IoU above which two detections of one engine are duplicates.
    pub dedupe_iou_threshold: f64,
    /// IoU above which detections of different engines share a cluster.
    pub merge_iou_threshold: f64,
    pub weights: EngineWeights,
    /// Confidence bonus per agreeing engine.
    pub agreement_bonus_step: f64,
    /// Upper bound of the agreement bonus.
    pub max_agreement_bonus: f64,
}

impl Default for ConsolidationConfig {
    fn default() -> Self {
        Self {
            dedupe_iou_threshold: 0.5,
            merge_iou_threshold: 0.5,
            weights: EngineWeights::default(),
            agreement_bonus_step: 0.05,
            max_agreement_bonus: 0.15,
        }
    }
}

impl ConsolidationConfig {
    /// Bonus for `engines` distinct engines agreeing on one value.
    ///
    /// A lone engine earns nothing.
    pub fn agreement_bonus(&self, engines: usize) -> f64 {
        if engines < 2 {
            0.0
        } else {
            (self.agreement_bonus_step * engines as f64).min(self.max_agreement_bonus)
        }
    }
}

/// Greedy non-max suppression.
///
/// Candidates are visited by descending confidence (ties keep input order);
/// a candidate survives when its IoU with every survivor is at most
/// `iou_threshold`. The output is in visiting order, which makes the
/// operation idempotent.
///
/// # Errors
/// Returns [`DimfuseError::ContractViolation`] on duplicate dimension ids.
pub fn dedupe(dimensions: &[Dimension], iou_threshold: f64) -> Result<Vec<Dimension>, DimfuseError> {
    ensure_unique_dimension_ids(dimensions)?;

    let mut order: Vec<&Dimension> = dimensions.iter().collect();
    order.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<&Dimension> = Vec::new();
    for candidate in order {
        if kept
            .iter()
            .all(|k| k.bbox.iou(&candidate.bbox) <= iou_threshold)
        {
            kept.push(candidate);
        }
    }

    debug!(
        "Dedupe kept {} of {} dimension(s)",
        kept.len(),
        dimensions.len()
    );
    Ok(kept.into_iter().cloned().collect())
}

/// Runs [`dedupe`] separately for each source engine.
///
/// Engines are processed in name order; each engine's survivors stay in
/// [`dedupe`] order.
pub fn dedupe_per_engine(
    dimensions: &[Dimension],
    iou_threshold: f64,
) -> Result<Vec<Dimension>, DimfuseError> {
    ensure_unique_dimension_ids(dimensions)?;

    let mut by_engine: BTreeMap<&str, Vec<Dimension>> = BTreeMap::new();
    for dim in dimensions {
        by_engine
            .entry(dim.source_engine.as_str())
            .or_default()
            .push(dim.clone());
    }

    let mut out = Vec::with_capacity(dimensions.len());
    for (_, group) in by_engine {
        out.extend(dedupe(&group, iou_threshold)?);
    }
    Ok(out)
}

/// Normalizes text for vote comparison: glyph repair, lowercase, one
/// diameter glyph, no whitespace.
pub fn vote_key(text: &str) -> String {
    compact(text)
        .to_lowercase()
        .chars()
        .map(|c| if is_diameter_glyph(c) { 'ø' } else { c })
        .collect()
}

/// Greedy single-pass clustering.
///
/// Each dimension joins the first cluster whose seed (first member) it
/// overlaps above `iou_threshold`; otherwise it seeds a new cluster. Two
/// clusters are never joined through a later member.
pub fn cluster(dimensions: &[Dimension], iou_threshold: f64) -> Vec<Vec<usize>> {
    let mut clusters: Vec<Vec<usize>> = Vec::new();
    for (idx, dim) in dimensions.iter().enumerate() {
        let home = clusters
            .iter_mut()
            .find(|members| dimensions[members[0]].bbox.iou(&dim.bbox) > iou_threshold);
        match home {
            Some(members) => members.push(idx),
            None => clusters.push(vec![idx]),
        }
    }
    clusters
}

/// Merges detections pooled across engines.
///
/// Singleton clusters pass through unchanged. Larger clusters vote: every
/// member adds `(base_weight + specialty_bonus) * confidence` to its
/// normalized text. The winning text is re-parsed, the most confident
/// matching member supplies id and box, and its confidence grows by the
/// agreement bonus (capped at 1.0). The engine id becomes the sorted
/// `+`-joined set of all contributing engines.
///
/// Input from at most one engine is handed to [`dedupe`] instead.
///
/// # Errors
/// Returns [`DimfuseError::ContractViolation`] on duplicate dimension ids.
pub fn merge_ensemble(
    dimensions: &[Dimension],
    config: &ConsolidationConfig,
) -> Result<Vec<Dimension>, DimfuseError> {
    ensure_unique_dimension_ids(dimensions)?;

    let engines: BTreeSet<&str> = dimensions
        .iter()
        .map(|d| d.source_engine.as_str())
        .collect();
    if engines.len() <= 1 {
        debug!("Single-engine input; merge falls back to dedupe");
        return dedupe(dimensions, config.merge_iou_threshold);
    }

    let clusters = cluster(dimensions, config.merge_iou_threshold);
    debug!(
        "Clustered {} dimension(s) from {} engine(s) into {} group(s)",
        dimensions.len(),
        engines.len(),
        clusters.len()
    );

    Ok(clusters
        .into_iter()
        .filter_map(|indices| {
            let members: Vec<&Dimension> = indices.iter().map(|&i| &dimensions[i]).collect();
            match members.as_slice() {
                [single] => Some((*single).clone()),
                _ => merge_cluster(&members, config),
            }
        })
        .collect())
}

struct Ballot<'a> {
    key: String,
    weight: f64,
    members: Vec<&'a Dimension>,
}

fn source_text(dim: &Dimension) -> &str {
    if dim.raw_text.trim().is_empty() {
        &dim.value
    } else {
        &dim.raw_text
    }
}

fn most_confident<'a>(members: impl IntoIterator<Item = &'a Dimension>) -> Option<&'a Dimension> {
    members
        .into_iter()
        .reduce(|best, d| if d.confidence > best.confidence { d } else { best })
}

fn merge_cluster(members: &[&Dimension], config: &ConsolidationConfig) -> Option<Dimension> {
    let weights = &config.weights;
    let member_weight =
        |d: &Dimension| weights.vote_weight(&d.source_engine, d.dimension_type) * d.confidence;

    let mut ballots: Vec<Ballot<'_>> = Vec::new();
    for &member in members {
        let key = vote_key(source_text(member));
        let weight = member_weight(member);
        match ballots.iter_mut().find(|b| b.key == key) {
            Some(ballot) => {
                ballot.weight += weight;
                ballot.members.push(member);
            }
            None => ballots.push(Ballot {
                key,
                weight,
                members: vec![member],
            }),
        }
    }

    // Strictly greater: on a tie the earliest ballot wins.
    let winner = ballots
        .iter()
        .reduce(|best, b| if b.weight > best.weight { b } else { best })?;

    let representative = most_confident(winner.members.iter().copied())?;

    // Prefer a reading that carries the diameter glyph over one that lost it.
    let display = most_confident(
        winner
            .members
            .iter()
            .copied()
            .filter(|d| source_text(d).chars().any(is_diameter_glyph)),
    )
    .map(source_text)
    .unwrap_or_else(|| source_text(representative))
    .to_string();

    let (dimension_type, value, tolerance) = classify_and_parse(&display);
    let tolerance = tolerance.or_else(|| {
        let mut by_weight = winner.members.clone();
        by_weight.sort_by(|a, b| member_weight(b).total_cmp(&member_weight(a)));
        by_weight.into_iter().find_map(|d| d.tolerance.clone())
    });

    let agreeing: BTreeSet<&str> = winner
        .members
        .iter()
        .flat_map(|d| d.source_engine.split('+'))
        .collect();
    let bonus = config.agreement_bonus(agreeing.len());

    let contributing: BTreeSet<&str> = members
        .iter()
        .flat_map(|d| d.source_engine.split('+'))
        .filter(|e| !e.is_empty())
        .collect();
    let source_engine = contributing.into_iter().collect::<Vec<_>>().join("+");

    let unit = representative
        .unit
        .clone()
        .or_else(|| winner.members.iter().find_map(|d| d.unit.clone()));

    debug!(
        "Merged {} reading(s) into '{}' from {} (bonus {:.2})",
        members.len(),
        value,
        source_engine,
        bonus
    );

    Some(Dimension {
        id: representative.id.clone(),
        bbox: representative.bbox,
        value,
        raw_text: display,
        unit,
        tolerance,
        dimension_type,
        confidence: clamp_confidence(representative.confidence + bonus),
        source_engine,
        verification_status: VerificationStatus::Pending,
        modified_value: None,
        modified_bbox: None,
        linked_to: None,
    })
}
