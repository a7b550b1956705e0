//! Diameter glyph handling.
//!
//! OCR engines render the diameter sign in several code points, and often
//! misread it as the digit `0`. Everything downstream works with the single
//! canonical glyph [`DIAMETER`].

/// Canonical diameter glyph.
pub const DIAMETER: char = 'Ø';

/// Returns true for any of the diameter glyph variants engines produce.
#[inline]
pub fn is_diameter_glyph(c: char) -> bool {
    matches!(c, 'Ø' | 'ø' | 'φ' | 'Φ' | '⌀')
}

/// Rewrites every diameter glyph variant to [`DIAMETER`].
pub fn canonicalize_diameter(text: &str) -> String {
    text.chars()
        .map(|c| if is_diameter_glyph(c) { DIAMETER } else { c })
        .collect()
}

/// Repairs a diameter glyph that was read as `0`.
///
/// A `0` is rewritten when it starts a number (not preceded by a digit, a
/// decimal separator, another diameter glyph or a hyphen joining two digit
/// runs such as `2023-0415`) and is followed by at least two more digits. Legitimate decimals such as `0.5` never qualify because
/// the `0` is followed by the separator.
///
/// ```
/// use dimfuse::parse::fix_diameter_glyph;
///
/// assert_eq!(fix_diameter_glyph("0392"), "Ø392");
/// assert_eq!(fix_diameter_glyph("0.5"), "0.5");
/// assert_eq!(fix_diameter_glyph("PCD0430"), "PCDØ430");
/// ```
pub fn fix_diameter_glyph(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 1);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let starts_number = i == 0 || {
            let prev = chars[i - 1];
            let joins_digit_runs = prev == '-' && i >= 2 && chars[i - 2].is_ascii_digit();
            !(prev.is_ascii_digit()
                || prev == '.'
                || prev == ','
                || is_diameter_glyph(prev)
                || joins_digit_runs)
        };
        let digits_after = chars[i + 1..]
            .iter()
            .take_while(|c| c.is_ascii_digit())
            .count();

        if c == '0' && starts_number && digits_after >= 2 {
            out.push(DIAMETER);
            // Copy the rest of the run so inner zeros are left alone.
            out.extend(&chars[i + 1..i + 1 + digits_after]);
            i += 1 + digits_after;
        } else {
            out.push(c);
            i += 1;
        }
    }

    out
}
