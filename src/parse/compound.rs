//! Decomposition of long text blocks into embedded dimension tokens.
//!
//! Engines frequently return a whole callout such as
//! `(4)M20 Tap, & Ø17.5 Drill, thru.` as one block. Sub-patterns are tried
//! from most to least specific; once a span is claimed, later patterns do
//! not reconsider any overlapping text.

use once_cell::sync::Lazy;
use regex::Regex;

use super::rules::NUM;
use crate::ir::DimensionType;

struct SubPattern {
    name: &'static str,
    pattern: Regex,
    dimension_type: DimensionType,
    /// Prepended when the token does not already start with it.
    prefix: Option<&'static str>,
}

impl SubPattern {
    fn new(
        name: &'static str,
        pattern: &str,
        dimension_type: DimensionType,
        prefix: Option<&'static str>,
    ) -> Self {
        Self {
            name,
            pattern: Regex::new(&pattern.replace("NUM", NUM))
                .unwrap_or_else(|e| panic!("Invalid sub-pattern regex {name}: {e}")),
            dimension_type,
            prefix,
        }
    }
}

/// Ordered sub-patterns. Group 1 is the token; the whole match is claimed.
static SUB_PATTERNS: Lazy<Vec<SubPattern>> = Lazy::new(|| {
    vec![
        SubPattern::new(
            "quantity_diameter",
            r"\(\d+\)\s*(Ø\s*NUM(?:\s*±\s*NUM|(?:JS|js|[A-Za-z])\d{1,2}\b)?)",
            DimensionType::Diameter,
            None,
        ),
        SubPattern::new(
            "quantity_thread",
            r"\(\d+\)\s*(M\d+(?:[.,]\d+)?(?:\s*[x×X]\s*NUM)?)",
            DimensionType::Thread,
            None,
        ),
        SubPattern::new(
            "quantity_angle",
            r"\(\d+\)\s*(NUM\s*°)",
            DimensionType::Angle,
            None,
        ),
        SubPattern::new(
            "diameter",
            r"(Ø\s*NUM(?:\s*±\s*NUM)?)",
            DimensionType::Diameter,
            None,
        ),
        SubPattern::new(
            "thread",
            r"\b(M\d+(?:[.,]\d+)?(?:\s*[x×X]\s*NUM)?)",
            DimensionType::Thread,
            None,
        ),
        SubPattern::new("radius", r"\b(R\s*NUM)", DimensionType::Radius, None),
        SubPattern::new(
            "pcd",
            r"(?i)\b(PCD\s*Ø?\s*NUM)",
            DimensionType::Diameter,
            None,
        ),
        SubPattern::new(
            "tolerance",
            r"(±\s*NUM|\+\s*NUM\s*/?\s*-\s*NUM)",
            DimensionType::Tolerance,
            None,
        ),
        SubPattern::new(
            "drill_callout",
            r"(?i)\b(?:drill|hole)\s*Ø?\s*(NUM)",
            DimensionType::Diameter,
            Some("Ø"),
        ),
        SubPattern::new(
            "tap_callout",
            r"(?i)\btap\s*M?\s*(NUM)",
            DimensionType::Thread,
            Some("M"),
        ),
    ]
});

/// One dimension token found inside a longer text block.
#[derive(Clone, Debug, PartialEq)]
pub struct CompoundToken {
    /// Name of the sub-pattern that produced it.
    pub pattern: &'static str,
    /// Whitespace-free token, e.g. `M20` or `Ø17.5`.
    pub token: String,
    pub dimension_type: DimensionType,
    /// Character offset of the token in the scanned text.
    pub start: usize,
    /// Character offset one past the token.
    pub end: usize,
}

/// Scans `text` for embedded dimension tokens, returned in text order.
///
/// `text` is expected to be glyph-repaired and canonicalized already.
pub fn decompose(text: &str) -> Vec<CompoundToken> {
    let mut claimed: Vec<(usize, usize)> = Vec::new();
    let mut tokens: Vec<CompoundToken> = Vec::new();

    for sub in SUB_PATTERNS.iter() {
        for caps in sub.pattern.captures_iter(text) {
            let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let overlaps = claimed
                .iter()
                .any(|&(s, e)| whole.start() < e && s < whole.end());
            if overlaps {
                continue;
            }
            claimed.push((whole.start(), whole.end()));

            let mut token: String = inner.as_str().chars().filter(|c| !c.is_whitespace()).collect();
            if let Some(prefix) = sub.prefix {
                if !token.starts_with(prefix) {
                    token.insert_str(0, prefix);
                }
            }
            tokens.push(CompoundToken {
                pattern: sub.name,
                token,
                dimension_type: sub.dimension_type,
                start: text[..inner.start()].chars().count(),
                end: text[..inner.end()].chars().count(),
            });
        }
    }

    tokens.sort_by_key(|t| t.start);
    tokens
}
