//! Secondary tolerance extraction.
//!
//! Runs only when the primary rule did not already capture a tolerance, and
//! independently of which type the primary rule chose. Forms are tried in
//! order; all results use the canonical `+a/-b`, `±a` or fit-code spelling.

use once_cell::sync::Lazy;
use regex::Regex;

use super::rules::NUM;
use crate::ir::DimensionType;

fn compile(name: &str, pattern: &str) -> Regex {
    Regex::new(&pattern.replace("NUM", NUM))
        .unwrap_or_else(|e| panic!("Invalid tolerance regex {name}: {e}"))
}

/// `25-0.1+0.2` → `+0.2/-0.1`
static LOWER_THEN_UPPER: Lazy<Regex> =
    Lazy::new(|| compile("lower_then_upper", r"NUM-(NUM)\+(NUM)"));

/// `25+0.1/0` → `+0.1/0`
static UPPER_OVER_ZERO: Lazy<Regex> =
    Lazy::new(|| compile("upper_over_zero", r"\d\+(NUM)/0(?:[.,]0+)?$"));

/// `250/-0.1` → `0/-0.1`
static ZERO_OVER_LOWER: Lazy<Regex> =
    Lazy::new(|| compile("zero_over_lower", r"^[^+]*0/-(NUM)$"));

/// `+0.1/-0.2` (the slash is optional)
static UPPER_LOWER: Lazy<Regex> = Lazy::new(|| compile("upper_lower", r"\+(NUM)/?-(NUM)"));

/// `±0.05`
static SYMMETRIC: Lazy<Regex> = Lazy::new(|| compile("symmetric", r"±(NUM)"));

/// `25H7`, `40h6`, `12js9`. `x`/`X` is left out so `2x45` is not read as a fit.
static FIT_CODE: Lazy<Regex> = Lazy::new(|| {
    compile(
        "fit_code",
        r"\d((?:JS|js|[A-HJKMNPR-WYZa-hjkmnpr-wyz])\d{1,2})$",
    )
});

/// Extracts a tolerance from a compacted token.
///
/// The fit-code form is skipped for types that never carry ISO fits.
pub fn extract_tolerance(token: &str, dimension_type: DimensionType) -> Option<String> {
    if let Some(c) = LOWER_THEN_UPPER.captures(token) {
        return Some(format!("+{}/-{}", &c[2], &c[1]));
    }
    if let Some(c) = UPPER_OVER_ZERO.captures(token) {
        return Some(format!("+{}/0", &c[1]));
    }
    if let Some(c) = ZERO_OVER_LOWER.captures(token) {
        return Some(format!("0/-{}", &c[1]));
    }
    if let Some(c) = UPPER_LOWER.captures(token) {
        return Some(format!("+{}/-{}", &c[1], &c[2]));
    }
    if let Some(c) = SYMMETRIC.captures(token) {
        return Some(format!("±{}", &c[1]));
    }
    if !dimension_type.excludes_fit_tolerance() {
        if let Some(c) = FIT_CODE.captures(token) {
            return Some(c[1].to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lower_then_upper_is_reordered() {
        assert_eq!(
            extract_tolerance("25-0.1+0.2", DimensionType::Length).as_deref(),
            Some("+0.2/-0.1")
        );
    }

    #[test]
    fn one_sided_forms() {
        assert_eq!(
            extract_tolerance("25+0.1/0", DimensionType::Length).as_deref(),
            Some("+0.1/0")
        );
        assert_eq!(
            extract_tolerance("250/-0.1", DimensionType::Length).as_deref(),
            Some("0/-0.1")
        );
    }

    #[test]
    fn plus_minus_forms() {
        assert_eq!(
            extract_tolerance("40+0.05/-0.02", DimensionType::Length).as_deref(),
            Some("+0.05/-0.02")
        );
        assert_eq!(
            extract_tolerance("+0.10/-0.2", DimensionType::Unknown).as_deref(),
            Some("+0.10/-0.2")
        );
        assert_eq!(
            extract_tolerance("120±0.5", DimensionType::Length).as_deref(),
            Some("±0.5")
        );
    }

    #[test]
    fn fit_code_is_suppressed_for_non_fit_types() {
        assert_eq!(
            extract_tolerance("25H7", DimensionType::Length).as_deref(),
            Some("H7")
        );
        assert_eq!(extract_tolerance("R5H7", DimensionType::Radius), None);
        assert_eq!(extract_tolerance("M8-6H", DimensionType::Thread), None);
    }

    #[test]
    fn multiplier_is_not_a_fit() {
        assert_eq!(extract_tolerance("2x45", DimensionType::Length), None);
    }
}
