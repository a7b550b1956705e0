//! Caller-contract validation for drawing inputs.
//!
//! Noise in engine output is never a validation error: the parser filters
//! it. Validation flags the things the pipeline cannot repair silently:
//! - Structural integrity (unique ids for detections, symbols and lines)
//! - Geometric validity (finite boxes, non-degenerate lines)
//! - Detection metadata (text present, confidence in range, known engine)

mod report;

pub use report::{IssueCode, IssueContext, Severity, ValidationIssue, ValidationReport};

use std::collections::HashMap;

use crate::consolidate::EngineWeights;
use crate::error::DimfuseError;
use crate::ir::{Dimension, DimensionId, DrawingInput};

/// Options for validation behavior.
#[derive(Clone, Debug, Default)]
pub struct ValidateOptions {
    /// If true, treat warnings as errors.
    pub strict: bool,
    /// Engines without a profile here are reported as unknown.
    pub weights: EngineWeights,
}

/// Validates a drawing input and returns a report of all issues found.
pub fn validate_input(input: &DrawingInput, opts: &ValidateOptions) -> ValidationReport {
    let mut report = ValidationReport::new();

    validate_detections(input, opts, &mut report);
    validate_symbols(input, &mut report);
    validate_lines(input, &mut report);

    report
}

/// Fails with [`DimfuseError::ContractViolation`] naming the first repeated id.
pub fn ensure_unique_dimension_ids(dimensions: &[Dimension]) -> Result<(), DimfuseError> {
    let mut seen: HashMap<&DimensionId, usize> = HashMap::with_capacity(dimensions.len());
    for (idx, dim) in dimensions.iter().enumerate() {
        if let Some(first_idx) = seen.insert(&dim.id, idx) {
            return Err(DimfuseError::ContractViolation {
                message: format!(
                    "duplicate dimension id '{}' at positions {} and {}",
                    dim.id, first_idx, idx
                ),
            });
        }
    }
    Ok(())
}

fn validate_detections(input: &DrawingInput, opts: &ValidateOptions, report: &mut ValidationReport) {
    let mut seen_ids: HashMap<&str, usize> = HashMap::new();
    let mut reported_engines: Vec<&str> = Vec::new();

    for (index, det) in input.detections.iter().enumerate() {
        let context = || IssueContext::Detection { index };

        if let Some(id) = det.id.as_deref() {
            if let Some(first_idx) = seen_ids.get(id) {
                report.add(ValidationIssue::error(
                    IssueCode::DuplicateDetectionId,
                    format!(
                        "Duplicate detection ID '{}' (first seen at index {})",
                        id, first_idx
                    ),
                    context(),
                ));
            } else {
                seen_ids.insert(id, index);
            }
        }

        if det.text.trim().is_empty() {
            report.add(ValidationIssue::warning(
                IssueCode::EmptyText,
                "Empty detection text",
                context(),
            ));
        }

        if let Some(confidence) = det.confidence {
            if !(0.0..=1.0).contains(&confidence) {
                report.add(ValidationIssue::warning(
                    IssueCode::ConfidenceOutOfRange,
                    format!("Confidence {} outside [0, 1]; it will be clamped", confidence),
                    context(),
                ));
            }
        }

        let bbox = det.page_bbox();
        if !bbox.is_finite() {
            report.add(ValidationIssue::error(
                IssueCode::NonFiniteBBox,
                format!(
                    "Non-finite coordinates ({}, {}, {}, {})",
                    bbox.x1, bbox.y1, bbox.x2, bbox.y2
                ),
                context(),
            ));
        }

        if !opts.weights.is_known(&det.engine) && !reported_engines.contains(&det.engine.as_str()) {
            reported_engines.push(&det.engine);
            report.add(ValidationIssue::warning(
                IssueCode::UnknownEngine,
                format!(
                    "Engine '{}' has no weight profile; default weight {} applies",
                    det.engine, opts.weights.default_weight
                ),
                IssueContext::Drawing,
            ));
        }
    }
}

fn validate_symbols(input: &DrawingInput, report: &mut ValidationReport) {
    let mut seen_ids: HashMap<&str, usize> = HashMap::new();

    for (idx, symbol) in input.symbols.iter().enumerate() {
        let id = symbol.id.as_str();

        if let Some(first_idx) = seen_ids.get(id) {
            report.add(ValidationIssue::error(
                IssueCode::DuplicateSymbolId,
                format!(
                    "Duplicate symbol ID {} (first seen at index {})",
                    id, first_idx
                ),
                IssueContext::Symbol { id: id.to_string() },
            ));
        } else {
            seen_ids.insert(id, idx);
        }

        if !symbol.bbox.is_finite() {
            report.add(ValidationIssue::error(
                IssueCode::NonFiniteBBox,
                "Non-finite symbol bounding box",
                IssueContext::Symbol { id: id.to_string() },
            ));
        }
    }
}

fn validate_lines(input: &DrawingInput, report: &mut ValidationReport) {
    let mut seen_ids: HashMap<&str, usize> = HashMap::new();

    for (idx, line) in input.lines.iter().enumerate() {
        let id = line.id.as_str();

        if let Some(first_idx) = seen_ids.get(id) {
            report.add(ValidationIssue::warning(
                IssueCode::DuplicateLineId,
                format!("Duplicate line ID {} (first seen at index {})", id, first_idx),
                IssueContext::Line { id: id.to_string() },
            ));
        } else {
            seen_ids.insert(id, idx);
        }

        if !(line.start.is_finite() && line.end.is_finite()) {
            report.add(ValidationIssue::error(
                IssueCode::NonFiniteBBox,
                "Non-finite line endpoint",
                IssueContext::Line { id: id.to_string() },
            ));
            continue;
        }

        if line.length() <= f64::EPSILON {
            report.add(ValidationIssue::warning(
                IssueCode::ZeroLengthLine,
                "Zero-length line",
                IssueContext::Line { id: id.to_string() },
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{BoundingBox, GeometryLine, Point, RawDetection, SymbolNode};

    fn valid_input() -> DrawingInput {
        DrawingInput {
            detections: vec![RawDetection::new(
                "edocr2",
                "Ø25",
                BoundingBox::new(10.0, 10.0, 50.0, 25.0),
            )
            .with_id("d1")
            .with_confidence(0.9)],
            symbols: vec![SymbolNode::new(
                "s1",
                "hole",
                BoundingBox::new(100.0, 0.0, 140.0, 40.0),
            )],
            lines: vec![GeometryLine::new(
                "l1",
                Point::new(0.0, 0.0),
                Point::new(100.0, 0.0),
            )],
        }
    }

    #[test]
    fn test_valid_input() {
        let report = validate_input(&valid_input(), &ValidateOptions::default());
        assert!(
            report.is_clean(),
            "Expected no issues, got: {:?}",
            report.issues
        );
    }

    #[test]
    fn test_duplicate_detection_and_symbol_ids() {
        let mut input = valid_input();
        input.detections.push(input.detections[0].clone());
        input.symbols.push(input.symbols[0].clone());

        let report = validate_input(&input, &ValidateOptions::default());
        assert_eq!(report.error_count(), 2);
        assert!(report
            .issues
            .iter()
            .any(|i| i.code == IssueCode::DuplicateDetectionId));
        assert!(report
            .issues
            .iter()
            .any(|i| i.code == IssueCode::DuplicateSymbolId));
    }

    #[test]
    fn test_warnings() {
        let mut input = valid_input();
        input.detections.push(
            RawDetection::new("mystery", " ", BoundingBox::default()).with_confidence(1.5),
        );
        input.lines.push(GeometryLine::new(
            "l2",
            Point::new(5.0, 5.0),
            Point::new(5.0, 5.0),
        ));

        let report = validate_input(&input, &ValidateOptions::default());
        assert!(report.is_ok());
        let codes: Vec<IssueCode> = report.issues.iter().map(|i| i.code).collect();
        assert!(codes.contains(&IssueCode::EmptyText));
        assert!(codes.contains(&IssueCode::ConfidenceOutOfRange));
        assert!(codes.contains(&IssueCode::UnknownEngine));
        assert!(codes.contains(&IssueCode::ZeroLengthLine));
    }

    #[test]
    fn test_unknown_engine_reported_once_for_drawing() {
        let mut input = valid_input();
        for _ in 0..3 {
            input.detections.push(RawDetection::new(
                "vendor_x",
                "R5",
                BoundingBox::new(0.0, 0.0, 30.0, 12.0),
            ));
        }
        let report = validate_input(&input, &ValidateOptions::default());
        let unknown: Vec<_> = report
            .issues
            .iter()
            .filter(|i| i.code == IssueCode::UnknownEngine)
            .collect();
        assert_eq!(unknown.len(), 1);
        assert!(matches!(unknown[0].context, IssueContext::Drawing));
        assert_eq!(unknown[0].context.to_string(), "drawing");
    }

    #[test]
    fn test_non_finite_bbox_is_error() {
        let mut input = valid_input();
        input.detections[0] =
            RawDetection::new("edocr2", "Ø25", BoundingBox::new(f64::NAN, 0.0, 1.0, 1.0));
        let report = validate_input(&input, &ValidateOptions::default());
        assert_eq!(report.error_count(), 1);
    }

    #[test]
    fn test_ensure_unique_dimension_ids() {
        let a = Dimension::new("x", BoundingBox::default(), "1");
        let b = Dimension::new("y", BoundingBox::default(), "2");
        assert!(ensure_unique_dimension_ids(&[a.clone(), b]).is_ok());
        let err = ensure_unique_dimension_ids(&[a.clone(), a]).unwrap_err();
        assert!(err.to_string().contains("duplicate dimension id 'x'"));
    }
}
