//! Text classification and parsing of dimension callouts.
//!
//! Turns one engine detection into zero or more typed [`Dimension`]
//! records:
//!
//! 1. repair the diameter glyph misread as `0` ([`fix_diameter_glyph`])
//! 2. run the ordered rule cascade ([`rules::RULES`])
//! 3. extract a tolerance if the matching rule did not capture one
//! 4. decompose long unmatched blocks into embedded tokens ([`compound`])
//!
//! The quality gate ([`QualityGate`]) is applied separately so callers can
//! count rejections.

pub mod compound;
mod glyph;
mod quality;
pub mod rules;
mod tolerance;
mod unit;

pub use glyph::{canonicalize_diameter, fix_diameter_glyph, is_diameter_glyph, DIAMETER};
pub use quality::{is_valid, QualityGate, Rejection};
pub use tolerance::extract_tolerance;
pub use unit::extract_unit;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ir::{Dimension, DimensionId, DimensionType, RawDetection};

/// Parser settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub quality: QualityGate,
    /// Unmatched blocks shorter than this are not decomposed.
    pub min_compound_len: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            quality: QualityGate::default(),
            min_compound_len: 5,
        }
    }
}

/// Prepares text for the cascade: trims, canonicalizes the diameter glyph,
/// repairs `0`-for-`Ø`, spells `+/-` as `±` and drops all whitespace.
pub fn compact(raw_text: &str) -> String {
    let repaired = fix_diameter_glyph(&canonicalize_diameter(raw_text.trim()));
    repaired
        .replace("+/-", "±")
        .replace("+-", "±")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// Classifies a raw token and returns `(type, normalized value, tolerance)`.
///
/// Text that matches no rule yields `Unknown`; a token that is nothing but
/// a tolerance yields `Tolerance`.
///
/// ```
/// use dimfuse::ir::DimensionType;
/// use dimfuse::parse::classify_and_parse;
///
/// assert_eq!(
///     classify_and_parse("Ø25±0.1"),
///     (DimensionType::Diameter, "Ø25±0.1".to_string(), Some("±0.1".to_string()))
/// );
/// assert_eq!(classify_and_parse("0.8").0, DimensionType::SurfaceFinish);
/// assert_eq!(classify_and_parse("1.0").0, DimensionType::Length);
/// ```
pub fn classify_and_parse(raw_text: &str) -> (DimensionType, String, Option<String>) {
    let parsed = parse_token(raw_text);
    (parsed.dimension_type, parsed.value, parsed.tolerance)
}

/// Cascade outcome together with the rule that produced it.
struct ParsedToken {
    rule: Option<&'static str>,
    dimension_type: DimensionType,
    value: String,
    tolerance: Option<String>,
}

fn parse_token(raw_text: &str) -> ParsedToken {
    let token = compact(raw_text);
    if token.is_empty() {
        return ParsedToken {
            rule: None,
            dimension_type: DimensionType::Unknown,
            value: token,
            tolerance: None,
        };
    }

    let (rule, dimension_type, tolerance) = match rules::classify(&token) {
        Some((name, classified)) => (Some(name), classified.dimension_type, classified.tolerance),
        None => (None, DimensionType::Unknown, None),
    };
    let tolerance = tolerance.or_else(|| extract_tolerance(&token, dimension_type));

    let dimension_type = match (dimension_type, &tolerance) {
        (DimensionType::Unknown, Some(_)) => DimensionType::Tolerance,
        (t, _) => t,
    };

    ParsedToken {
        rule,
        dimension_type,
        value: token,
        tolerance,
    }
}

/// True when a multi-word block only matched a numeric fallback because
/// compaction glued its words together, e.g. `4X Ø12 THRU`.
fn is_glued_block(raw_text: &str, rule: Option<&'static str>) -> bool {
    rule.is_some_and(|name| rules::NUMERIC_FALLBACKS.contains(&name))
        && raw_text.trim().contains(char::is_whitespace)
}

/// Candidates produced from one detection, before the quality gate.
#[derive(Clone, Debug, Default)]
pub struct Candidates {
    pub dimensions: Vec<Dimension>,
    /// True when the dimensions came from compound decomposition.
    pub decomposed: bool,
}

/// Parses one engine detection into candidate dimensions.
///
/// A detection whose text matches the cascade yields one dimension. A block
/// of at least `min_compound_len` characters is decomposed when it matches
/// no rule, or when it is several words that only matched a numeric
/// fallback. In the second case the decomposition is kept only if it finds
/// something besides bare tolerances, so `120 ±0.5` stays one length. Each
/// embedded token gets a horizontal slice of the parent box and the id
/// `<id>-<n>`.
pub fn parse_detection(detection: &RawDetection, id: DimensionId, config: &ParserConfig) -> Candidates {
    let bbox = detection.page_bbox();
    let confidence = detection.normalized_confidence();
    let unit = extract_unit(&detection.text);
    let parsed = parse_token(&detection.text);
    let unmatched = parsed.dimension_type == DimensionType::Unknown;

    let base = |id: DimensionId, bbox, raw: &str| {
        let dim = Dimension::new(id, bbox, raw)
            .with_confidence(confidence)
            .with_engine(detection.engine.clone());
        match unit {
            Some(unit) => dim.with_unit(unit),
            None => dim,
        }
    };

    if (unmatched || is_glued_block(&detection.text, parsed.rule))
        && parsed.value.chars().count() >= config.min_compound_len
    {
        let scanned = fix_diameter_glyph(&canonicalize_diameter(detection.text.trim()));
        let total = scanned.chars().count().max(1) as f64;
        let tokens = compound::decompose(&scanned);
        let usable = if unmatched {
            !tokens.is_empty()
        } else {
            tokens
                .iter()
                .any(|t| t.dimension_type != DimensionType::Tolerance)
        };
        if usable {
            debug!(
                "Decomposed '{}' from {} into {} token(s)",
                detection.text,
                detection.engine,
                tokens.len()
            );
            let dimensions = tokens
                .into_iter()
                .enumerate()
                .map(|(n, t)| {
                    let sub_bbox =
                        bbox.horizontal_slice(t.start as f64 / total, t.end as f64 / total);
                    let (_, _, sub_tolerance) = classify_and_parse(&t.token);
                    let mut dim = base(DimensionId::new(format!("{id}-{n}")), sub_bbox, &t.token)
                        .with_parsed(t.dimension_type, t.token.clone());
                    dim.tolerance = sub_tolerance;
                    dim
                })
                .collect();
            return Candidates {
                dimensions,
                decomposed: true,
            };
        }
    }

    let mut dim = base(id, bbox, &detection.text).with_parsed(parsed.dimension_type, parsed.value);
    dim.tolerance = parsed.tolerance;
    Candidates {
        dimensions: vec![dim],
        decomposed: false,
    }
}

/// Runs one text through the whole parser, quality gate included.
///
/// Exposed for fuzz targets only.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_text(text: &str) -> usize {
    let detection = RawDetection::new(
        crate::ir::io_engine::UNKNOWN_ENGINE,
        text,
        crate::ir::BoundingBox::new(0.0, 0.0, 200.0, 20.0),
    );
    let config = ParserConfig::default();
    parse_detection(&detection, DimensionId::new("fuzz"), &config)
        .dimensions
        .iter()
        .filter(|d| config.quality.is_valid(d))
        .count()
}
