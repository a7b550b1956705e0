//! Quality gate for parsed candidates.
//!
//! Rejections are silent filtering: callers simply receive fewer
//! dimensions. [`QualityGate::rejection`] exposes the reason for logging.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::rules::{parse_number, NUM};
use crate::ir::Dimension;

static LEADING_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(NUM).unwrap_or_else(|e| panic!("Invalid leading number regex: {e}"))
});

/// Thresholds of the quality gate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityGate {
    /// Maximum share of bracket/pipe/punctuation characters.
    pub max_garbage_ratio: f64,
    /// Maximum text length in characters.
    pub max_text_len: usize,
    /// Minimum share of digit characters.
    pub min_digit_density: f64,
    /// Wider boxes are mis-detected text regions, not one dimension.
    pub max_bbox_width: f64,
    /// Leading values at or above this are implausible.
    pub max_value: f64,
    /// Boxes below this area (px²) are checked for hatching artifacts.
    pub hatch_max_area: f64,
    /// Minimum run length of `0`/`1`/`4` characters treated as hatching.
    pub hatch_min_len: usize,
}

impl Default for QualityGate {
    fn default() -> Self {
        Self {
            max_garbage_ratio: 0.30,
            max_text_len: 30,
            min_digit_density: 0.30,
            max_bbox_width: 500.0,
            max_value: 5000.0,
            hatch_max_area: 200.0,
            hatch_min_len: 3,
        }
    }
}

/// Why a candidate was dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    TooShort,
    NoDigits,
    Garbage,
    Multiline,
    TooLong,
    LowDigitDensity,
    OversizedBox,
    ImplausibleValue,
    HatchingArtifact,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Rejection::TooShort => "text too short",
            Rejection::NoDigits => "no digits",
            Rejection::Garbage => "too many bracket/punctuation characters",
            Rejection::Multiline => "multi-line text",
            Rejection::TooLong => "text too long",
            Rejection::LowDigitDensity => "digit density too low",
            Rejection::OversizedBox => "bounding box too wide",
            Rejection::ImplausibleValue => "value implausibly large",
            Rejection::HatchingArtifact => "section hatching misread as digits",
        };
        f.write_str(reason)
    }
}

fn is_garbage(c: char) -> bool {
    matches!(
        c,
        '(' | ')' | '[' | ']' | '{' | '}' | '|' | '\\' | '!' | '?' | ';' | ':' | '\'' | '`' | '_'
            | '~'
    )
}

impl QualityGate {
    /// Returns true when the candidate passes every check.
    pub fn is_valid(&self, dimension: &Dimension) -> bool {
        self.rejection(dimension).is_none()
    }

    /// Returns the first failed check, or `None` for a valid candidate.
    pub fn rejection(&self, dimension: &Dimension) -> Option<Rejection> {
        let text = if dimension.raw_text.trim().is_empty() {
            dimension.value.trim()
        } else {
            dimension.raw_text.trim()
        };
        let len = text.chars().count();

        if len <= 1 {
            return Some(Rejection::TooShort);
        }
        let digits = text.chars().filter(|c| c.is_ascii_digit()).count();
        if digits == 0 {
            return Some(Rejection::NoDigits);
        }
        let garbage = text.chars().filter(|c| is_garbage(*c)).count();
        if garbage as f64 / len as f64 > self.max_garbage_ratio {
            return Some(Rejection::Garbage);
        }
        if text.contains('\n') {
            return Some(Rejection::Multiline);
        }
        if len > self.max_text_len {
            return Some(Rejection::TooLong);
        }
        let visible = text.chars().filter(|c| !c.is_whitespace()).count().max(1);
        if (digits as f64 / visible as f64) < self.min_digit_density {
            return Some(Rejection::LowDigitDensity);
        }
        if dimension.bbox.width() > self.max_bbox_width {
            return Some(Rejection::OversizedBox);
        }
        let leading = LEADING_NUMBER
            .find(&dimension.value)
            .and_then(|m| parse_number(m.as_str()));
        if leading.is_some_and(|v| v >= self.max_value) {
            return Some(Rejection::ImplausibleValue);
        }
        if dimension.bbox.area() < self.hatch_max_area && self.looks_like_hatching(text) {
            return Some(Rejection::HatchingArtifact);
        }
        None
    }

    fn looks_like_hatching(&self, text: &str) -> bool {
        let compact: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
        compact.len() >= self.hatch_min_len && compact.iter().all(|c| matches!(c, '0' | '1' | '4'))
    }
}

/// Quality gate with the default thresholds.
pub fn is_valid(dimension: &Dimension) -> bool {
    QualityGate::default().is_valid(dimension)
}
