//! Pipeline configuration.
//!
//! Every section defaults independently, so a YAML file only needs to name
//! the thresholds it changes:
//!
//! ```yaml
//! consolidation:
//!   merge_iou_threshold: 0.4
//! linker:
//!   proximity:
//!     max_distance: 450
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::consolidate::ConsolidationConfig;
use crate::error::DimfuseError;
use crate::link::LinkerConfig;
use crate::parse::ParserConfig;
use crate::review::ReviewOptions;

/// All tunable settings of the pipeline.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub parser: ParserConfig,
    pub consolidation: ConsolidationConfig,
    pub linker: LinkerConfig,
    pub review: ReviewOptions,
}

impl Config {
    /// Reads and validates a YAML config file.
    pub fn load(path: &Path) -> Result<Self, DimfuseError> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&text).map_err(|source| DimfuseError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parses YAML without validating it.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
    }

    /// Rejects thresholds no drawing could sensibly use.
    pub fn validate(&self) -> Result<(), DimfuseError> {
        let gate = &self.parser.quality;
        check_fraction("parser.quality.max_garbage_ratio", gate.max_garbage_ratio)?;
        check_fraction("parser.quality.min_digit_density", gate.min_digit_density)?;
        check_non_negative("parser.quality.max_bbox_width", gate.max_bbox_width)?;
        check_non_negative("parser.quality.max_value", gate.max_value)?;
        check_non_negative("parser.quality.hatch_max_area", gate.hatch_max_area)?;

        let c = &self.consolidation;
        check_fraction("consolidation.dedupe_iou_threshold", c.dedupe_iou_threshold)?;
        check_fraction("consolidation.merge_iou_threshold", c.merge_iou_threshold)?;
        check_non_negative("consolidation.agreement_bonus_step", c.agreement_bonus_step)?;
        check_fraction("consolidation.max_agreement_bonus", c.max_agreement_bonus)?;
        check_non_negative("consolidation.weights.default_weight", c.weights.default_weight)?;
        for (engine, profile) in &c.weights.engines {
            check_non_negative(
                &format!("consolidation.weights.engines.{engine}.base_weight"),
                profile.base_weight,
            )?;
            for (ty, bonus) in &profile.specialties {
                check_finite(
                    &format!("consolidation.weights.engines.{engine}.specialties.{ty}"),
                    *bonus,
                )?;
            }
        }

        let t1 = &self.linker.dimension_line;
        check_non_negative("linker.dimension_line.search_radius", t1.search_radius)?;
        check_non_negative("linker.dimension_line.min_line_length", t1.min_line_length)?;
        check_angle("linker.dimension_line.angle_tolerance_deg", t1.angle_tolerance_deg)?;
        check_non_negative(
            "linker.dimension_line.line_offset_tolerance",
            t1.line_offset_tolerance,
        )?;
        check_non_negative(
            "linker.dimension_line.symbol_alignment_tolerance",
            t1.symbol_alignment_tolerance,
        )?;
        check_non_negative(
            "linker.dimension_line.symbol_search_radius",
            t1.symbol_search_radius,
        )?;
        check_fraction("linker.dimension_line.confidence", t1.confidence)?;

        let t2 = &self.linker.extension_line;
        check_non_negative("linker.extension_line.search_radius", t2.search_radius)?;
        check_angle("linker.extension_line.angle_tolerance_deg", t2.angle_tolerance_deg)?;
        check_non_negative("linker.extension_line.symbol_margin", t2.symbol_margin)?;
        check_non_negative("linker.extension_line.endpoint_distance", t2.endpoint_distance)?;
        check_fraction("linker.extension_line.confidence", t2.confidence)?;

        let t3 = &self.linker.proximity;
        check_non_negative("linker.proximity.max_distance", t3.max_distance)?;
        check_fraction("linker.proximity.max_confidence", t3.max_confidence)?;
        check_fraction("linker.proximity.min_confidence", t3.min_confidence)?;
        if t3.min_confidence > t3.max_confidence {
            return Err(DimfuseError::InvalidConfig(format!(
                "linker.proximity.min_confidence ({}) exceeds max_confidence ({})",
                t3.min_confidence, t3.max_confidence
            )));
        }
        if !(t3.distance_scale.is_finite() && t3.distance_scale > 0.0) {
            return Err(DimfuseError::InvalidConfig(format!(
                "linker.proximity.distance_scale must be positive, got {}",
                t3.distance_scale
            )));
        }
        check_non_negative("linker.proximity.decay", t3.decay)?;

        check_fraction("review.confidence_threshold", self.review.confidence_threshold)?;
        Ok(())
    }
}

fn check_finite(name: &str, value: f64) -> Result<(), DimfuseError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(DimfuseError::InvalidConfig(format!(
            "{name} must be finite, got {value}"
        )))
    }
}

fn check_non_negative(name: &str, value: f64) -> Result<(), DimfuseError> {
    check_finite(name, value)?;
    if value < 0.0 {
        return Err(DimfuseError::InvalidConfig(format!(
            "{name} must not be negative, got {value}"
        )));
    }
    Ok(())
}

fn check_fraction(name: &str, value: f64) -> Result<(), DimfuseError> {
    check_finite(name, value)?;
    if !(0.0..=1.0).contains(&value) {
        return Err(DimfuseError::InvalidConfig(format!(
            "{name} must lie in [0, 1], got {value}"
        )));
    }
    Ok(())
}

fn check_angle(name: &str, value: f64) -> Result<(), DimfuseError> {
    check_finite(name, value)?;
    if !(0.0..45.0).contains(&value) {
        return Err(DimfuseError::InvalidConfig(format!(
            "{name} must lie in [0, 45), got {value}"
        )));
    }
    Ok(())
}
