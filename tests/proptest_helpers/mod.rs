#![allow(dead_code)]

use dimfuse::ir::{
    BoundingBox, Dimension, DimensionRelation, DimensionType, DrawingResult, LinkMethod,
    PipelineSummary, RelationId, RelationType, SymbolId, SymbolNode, TargetType,
};
use dimfuse::parse::classify_and_parse;
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub const ENGINES: [&str; 4] = ["edocr2", "paddleocr", "easyocr", "tesseract"];

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Coordinates on a quarter-pixel grid so JSON round-trips are exact.
fn coord(max: u32) -> BoxedStrategy<f64> {
    (0..=max * 4).prop_map(|v| v as f64 / 4.0).boxed()
}

pub fn arb_confidence() -> BoxedStrategy<f64> {
    (0u32..=100).prop_map(|v| v as f64 / 100.0).boxed()
}

/// A box with positive width and height inside a 2000x2000 page.
pub fn arb_bbox() -> BoxedStrategy<BoundingBox> {
    (coord(1900), coord(1900), 1u32..100, 1u32..100)
        .prop_map(|(x, y, w, h)| BoundingBox::new(x, y, x + w as f64, y + h as f64))
        .boxed()
}

pub fn arb_engine() -> BoxedStrategy<String> {
    prop::sample::select(ENGINES.to_vec())
        .prop_map(str::to_string)
        .boxed()
}

/// Dimension-like text: mostly well-formed callouts, some noise.
pub fn arb_dimension_text() -> BoxedStrategy<String> {
    prop_oneof![
        (1u32..500).prop_map(|v| format!("Ø{v}")),
        (1u32..500).prop_map(|v| format!("0{v}")),
        (1u32..100, 1u32..9).prop_map(|(v, t)| format!("{v}±0.{t}")),
        (3u32..48).prop_map(|v| format!("M{v}")),
        (1u32..50).prop_map(|v| format!("R{v}")),
        (1u32..180).prop_map(|v| format!("{v}°")),
        (1u32..2000).prop_map(|v| v.to_string()),
        "[A-Z]{2,6}",
    ]
    .boxed()
}

/// A parsed dimension as the pipeline would produce it.
pub fn arb_dimension(id: String) -> BoxedStrategy<Dimension> {
    (arb_bbox(), arb_dimension_text(), arb_confidence(), arb_engine())
        .prop_map(move |(bbox, text, confidence, engine)| {
            let (dimension_type, value, tolerance) = classify_and_parse(&text);
            let mut dim = Dimension::new(id.as_str(), bbox, text)
                .with_parsed(dimension_type, value)
                .with_confidence(confidence)
                .with_engine(engine);
            dim.tolerance = tolerance;
            dim
        })
        .boxed()
}

/// Dimensions with unique ids `d0`, `d1`, ...
pub fn arb_dimensions(max_len: usize) -> BoxedStrategy<Vec<Dimension>> {
    (0..=max_len)
        .prop_flat_map(|n| {
            (0..n)
                .map(|i| arb_dimension(format!("d{i}")))
                .collect::<Vec<_>>()
        })
        .boxed()
}

/// Dimensions that all come from one engine.
pub fn arb_single_engine_dimensions(max_len: usize) -> BoxedStrategy<Vec<Dimension>> {
    (arb_dimensions(max_len), arb_engine())
        .prop_map(|(dims, engine)| {
            dims.into_iter()
                .map(|d| d.with_engine(engine.clone()))
                .collect()
        })
        .boxed()
}

pub fn arb_symbols(max_len: usize) -> BoxedStrategy<Vec<SymbolNode>> {
    prop::collection::vec(arb_bbox(), 0..=max_len)
        .prop_map(|boxes| {
            boxes
                .into_iter()
                .enumerate()
                .map(|(i, bbox)| SymbolNode::new(format!("s{i}"), "hole", bbox))
                .collect()
        })
        .boxed()
}

fn arb_method() -> BoxedStrategy<LinkMethod> {
    prop::sample::select(vec![
        LinkMethod::DimensionLine,
        LinkMethod::ExtensionLine,
        LinkMethod::Proximity,
        LinkMethod::Manual,
    ])
    .boxed()
}

/// A result envelope whose relations point at its own dimensions.
pub fn arb_drawing_result(max_dims: usize) -> BoxedStrategy<DrawingResult> {
    arb_dimensions(max_dims)
        .prop_flat_map(|dims| {
            let n = dims.len();
            (
                Just(dims),
                prop::collection::vec((arb_method(), arb_confidence(), any::<bool>()), n),
            )
        })
        .prop_map(|(dims, links)| {
            let relations: Vec<DimensionRelation> = dims
                .iter()
                .zip(links)
                .map(|(dim, (method, confidence, has_target))| DimensionRelation {
                    id: RelationId::new(format!("rel-{}", dim.id)),
                    dimension_id: dim.id.clone(),
                    target_type: if has_target {
                        TargetType::Symbol
                    } else {
                        TargetType::None
                    },
                    target_id: has_target.then(|| SymbolId::new("s0")),
                    target_bbox: has_target.then(|| BoundingBox::new(0.0, 0.0, 10.0, 10.0)),
                    relation_type: RelationType::from(dim.dimension_type),
                    method,
                    confidence: if has_target { confidence } else { 0.0 },
                    direction: None,
                    notes: None,
                })
                .collect();
            DrawingResult {
                summary: PipelineSummary {
                    detections: dims.len(),
                    after_merge: dims.len(),
                    ..PipelineSummary::default()
                },
                dimensions: dims,
                relations,
            }
        })
        .boxed()
}

pub fn is_known_type(t: DimensionType) -> bool {
    t != DimensionType::Unknown
}
