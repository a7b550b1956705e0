//! The ordered classification cascade.
//!
//! Rules are evaluated first-match-wins against the compacted token.
//! Compound rules (diameter with tolerance) are strict superstrings of the
//! simple ones (diameter alone) and therefore must stay ahead of them. Do
//! not reorder this table.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::ir::DimensionType;

/// A number with an optional decimal part; decimal commas are accepted.
pub(crate) const NUM: &str = r"\d+(?:[.,]\d+)?";

/// Single-token fallbacks that accept any leading number.
pub(crate) const NUMERIC_FALLBACKS: [&str; 2] = ["bare_number", "leading_digit"];

/// ISO 4287 standard roughness values, in micrometres.
pub const ISO_ROUGHNESS_VALUES: [f64; 12] = [
    0.025, 0.05, 0.1, 0.2, 0.4, 0.8, 1.6, 3.2, 6.3, 12.5, 25.0, 50.0,
];

/// Output of one matching rule.
#[derive(Clone, Debug, PartialEq)]
pub struct Classified {
    pub dimension_type: DimensionType,
    pub tolerance: Option<String>,
}

impl Classified {
    fn plain(dimension_type: DimensionType) -> Self {
        Self {
            dimension_type,
            tolerance: None,
        }
    }

    fn toleranced(dimension_type: DimensionType, tolerance: String) -> Self {
        Self {
            dimension_type,
            tolerance: Some(tolerance),
        }
    }
}

/// One `(predicate, handler)` pair of the cascade.
pub struct Rule {
    pub name: &'static str,
    pub pattern: Regex,
    pub handler: fn(&Captures<'_>) -> Classified,
}

impl Rule {
    fn new(name: &'static str, pattern: &str, handler: fn(&Captures<'_>) -> Classified) -> Self {
        let pattern = pattern.replace("NUM", NUM);
        Self {
            name,
            pattern: Regex::new(&pattern)
                .unwrap_or_else(|e| panic!("Invalid classification regex {name}: {e}")),
            handler,
        }
    }
}

fn group<'t>(caps: &Captures<'t>, i: usize) -> &'t str {
    caps.get(i).map(|m| m.as_str()).unwrap_or_default()
}

/// Parses a captured number, accepting a decimal comma.
pub(crate) fn parse_number(text: &str) -> Option<f64> {
    text.replace(',', ".").parse().ok()
}

/// True when `value` is one of the ISO 4287 roughness grades.
pub fn is_iso_roughness(value: f64) -> bool {
    ISO_ROUGHNESS_VALUES
        .iter()
        .any(|standard| (standard - value).abs() < 1e-9)
}

/// The cascade, in evaluation order.
pub static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        // 1. Ø25±0.1
        Rule::new("diameter_symmetric_tolerance", r"^Ø(NUM)±(NUM)$", |c| {
            Classified::toleranced(DimensionType::Diameter, format!("±{}", group(c, 2)))
        }),
        // 2a. Ø25+0.1/-0.2
        Rule::new(
            "diameter_asymmetric_tolerance",
            r"^Ø(NUM)\+(NUM)/?-(NUM)$",
            |c| {
                Classified::toleranced(
                    DimensionType::Diameter,
                    format!("+{}/-{}", group(c, 2), group(c, 3)),
                )
            },
        ),
        // 2b. Ø25-0.2/+0.1, read bottom-up by the engine
        Rule::new(
            "diameter_asymmetric_tolerance_reordered",
            r"^Ø(NUM)-(NUM)/?\+(NUM)$",
            |c| {
                Classified::toleranced(
                    DimensionType::Diameter,
                    format!("+{}/-{}", group(c, 3), group(c, 2)),
                )
            },
        ),
        // 3. Ø25H7
        Rule::new("diameter_fit", r"^Ø(NUM)((?:JS|js|[A-Za-z])\d{1,2})$", |c| {
            Classified::toleranced(DimensionType::Diameter, group(c, 2).to_string())
        }),
        // 4. M8, M8x1.25, M10x1.5-6g
        Rule::new(
            "thread",
            r"^M(NUM)(?:[x×X*](NUM))?(?:-?\d[A-Za-z]{1,2})?$",
            |_| Classified::plain(DimensionType::Thread),
        ),
        // 5. C1, C0.5x45°
        Rule::new("chamfer", r"^C(NUM)(?:[x×X*](NUM)°?)?$", |_| {
            Classified::plain(DimensionType::Chamfer)
        }),
        // 6. Single-token fallbacks.
        Rule::new("diameter", r"^Ø(NUM)", |_| {
            Classified::plain(DimensionType::Diameter)
        }),
        Rule::new("radius", r"^[Rr](NUM)", |_| {
            Classified::plain(DimensionType::Radius)
        }),
        Rule::new("angle", r"^(NUM)(?:°|(?i:deg))", |_| {
            Classified::plain(DimensionType::Angle)
        }),
        Rule::new("surface_finish", r"^(?i:ra)(NUM)", |_| {
            Classified::plain(DimensionType::SurfaceFinish)
        }),
        Rule::new("bare_number", r"^(NUM)$", |c| {
            let is_roughness = parse_number(group(c, 1)).is_some_and(is_iso_roughness);
            if is_roughness {
                Classified::plain(DimensionType::SurfaceFinish)
            } else {
                Classified::plain(DimensionType::Length)
            }
        }),
        Rule::new("leading_digit", r"^\d", |_| {
            Classified::plain(DimensionType::Length)
        }),
    ]
});

/// Runs the cascade. Returns the matching rule's name with its result, or
/// `None` when no rule applies.
pub fn classify(token: &str) -> Option<(&'static str, Classified)> {
    RULES.iter().find_map(|rule| {
        rule.pattern
            .captures(token)
            .map(|caps| (rule.name, (rule.handler)(&caps)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_name(token: &str) -> Option<&'static str> {
        classify(token).map(|(name, _)| name)
    }

    #[test]
    fn compound_diameter_rules_win_over_plain_diameter() {
        assert_eq!(rule_name("Ø25±0.1"), Some("diameter_symmetric_tolerance"));
        assert_eq!(rule_name("Ø25+0.1/-0.2"), Some("diameter_asymmetric_tolerance"));
        assert_eq!(
            rule_name("Ø25-0.2/+0.1"),
            Some("diameter_asymmetric_tolerance_reordered")
        );
        assert_eq!(rule_name("Ø25H7"), Some("diameter_fit"));
        assert_eq!(rule_name("Ø25"), Some("diameter"));
        assert_eq!(rule_name("Ø25THRU"), Some("diameter"));
    }

    #[test]
    fn reordered_tolerance_is_canonicalized() {
        let (_, result) = classify("Ø25-0.2/+0.1").unwrap();
        assert_eq!(result.tolerance.as_deref(), Some("+0.1/-0.2"));
    }

    #[test]
    fn radius_does_not_swallow_roughness() {
        assert_eq!(rule_name("R5"), Some("radius"));
        assert_eq!(rule_name("Ra3.2"), Some("surface_finish"));
        assert_eq!(rule_name("RA0.8"), Some("surface_finish"));
    }

    #[test]
    fn angle_wins_over_bare_number() {
        assert_eq!(rule_name("45°"), Some("angle"));
        assert_eq!(rule_name("30deg"), Some("angle"));
        assert_eq!(rule_name("45"), Some("bare_number"));
    }

    #[test]
    fn thread_and_chamfer_are_strict() {
        assert_eq!(rule_name("M8x1.25"), Some("thread"));
        assert_eq!(rule_name("M10x1.5-6g"), Some("thread"));
        assert_eq!(rule_name("C0.5x45°"), Some("chamfer"));
        assert_eq!(rule_name("M8 BOLT"), None);
    }

    #[test]
    fn iso_roughness_membership() {
        assert!(is_iso_roughness(0.8));
        assert!(is_iso_roughness(12.5));
        assert!(!is_iso_roughness(1.0));
        assert_eq!(parse_number("12,5"), Some(12.5));
    }

    #[test]
    fn unmatched_tokens() {
        assert_eq!(rule_name("±0.1"), None);
        assert_eq!(rule_name("SECTION"), None);
    }
}
