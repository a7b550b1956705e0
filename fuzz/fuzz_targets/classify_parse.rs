//! Fuzz target for dimension text classification.
//!
//! This fuzzer feeds arbitrary UTF-8 text through glyph repair, the rule
//! cascade, compound decomposition and the quality gate, checking for
//! panics or hangs.

#![no_main]

use libfuzzer_sys::fuzz_target;
use dimfuse::parse::{classify_and_parse, extract_unit, fuzz_parse_text};

fuzz_target!(|data: &[u8]| {
    if data.len() > 64 * 1024 {
        return;
    }

    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let _ = classify_and_parse(text);
    let _ = extract_unit(text);
    let _ = fuzz_parse_text(text);
});
