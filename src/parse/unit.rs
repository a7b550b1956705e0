//! Unit detection from raw callout text.

use once_cell::sync::Lazy;
use regex::Regex;

static INCH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\d\s*(?:in(?:ch(?:es)?)?\b|")"#)
        .unwrap_or_else(|e| panic!("Invalid inch regex: {e}"))
});

static METRE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\d\s*m\b").unwrap_or_else(|e| panic!("Invalid metre regex: {e}"))
});

/// Returns the unit named in `raw_text`, if any.
///
/// Checked in order: `mm`, `cm`, `inch` (from `in` or `"`), `degree` (from
/// `°` or `deg`), then a bare `m`.
pub fn extract_unit(raw_text: &str) -> Option<&'static str> {
    let lower = raw_text.to_lowercase();
    if lower.contains("mm") {
        Some("mm")
    } else if lower.contains("cm") {
        Some("cm")
    } else if INCH.is_match(raw_text) {
        Some("inch")
    } else if lower.contains('°') || lower.contains("deg") {
        Some("degree")
    } else if METRE.is_match(raw_text) {
        Some("m")
    } else {
        None
    }
}
