//! Fuzz target for drawing input JSON parsing.
//!
//! This fuzzer feeds arbitrary byte sequences to the engine-detection JSON
//! adapter, checking for panics, crashes, or hangs.

#![no_main]

use libfuzzer_sys::fuzz_target;
use dimfuse::ir::io_json::input_from_json_slice;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    if let Ok(input) = input_from_json_slice(data) {
        for det in &input.detections {
            let _ = det.page_bbox();
            let _ = det.normalized_confidence();
        }
    }
});
