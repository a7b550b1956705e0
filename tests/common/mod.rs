#![allow(dead_code)]

use std::path::{Path, PathBuf};

use dimfuse::ir::{io_json, DrawingInput, DrawingResult};

pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn load_input(name: &str) -> DrawingInput {
    io_json::read_drawing_input(&fixture_path(name)).expect("read drawing input fixture")
}

pub fn load_result(name: &str) -> DrawingResult {
    io_json::read_drawing_result(&fixture_path(name)).expect("read drawing result fixture")
}
