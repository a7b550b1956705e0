//! Fuzz target for the end-to-end pipeline.
//!
//! Any input that parses must either process or fail with a contract
//! violation; noise must never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use dimfuse::ir::io_json::input_from_json_slice;
use dimfuse::{process_drawing, Config};

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 * 1024 {
        return;
    }

    let Ok(input) = input_from_json_slice(data) else {
        return;
    };

    let _ = process_drawing(&input, &Config::default());
});
