//! JSON reading and writing for drawing inputs and results.
//!
//! The on-disk shape is the snake_case serde form of [`DrawingInput`] and
//! [`DrawingResult`]; every dimension and relation round-trips losslessly.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use super::drawing::{DrawingInput, DrawingResult};
use crate::error::DimfuseError;

/// Reads a drawing input from a JSON file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn read_drawing_input(path: &Path) -> Result<DrawingInput, DimfuseError> {
    let file = File::open(path).map_err(DimfuseError::Io)?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| DimfuseError::JsonParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a pipeline result from a JSON file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn read_drawing_result(path: &Path) -> Result<DrawingResult, DimfuseError> {
    let file = File::open(path).map_err(DimfuseError::Io)?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| DimfuseError::JsonParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes a pipeline result to a JSON file.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn write_drawing_result(path: &Path, result: &DrawingResult) -> Result<(), DimfuseError> {
    let file = File::create(path).map_err(DimfuseError::Io)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, result).map_err(|source| DimfuseError::JsonWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses a drawing input from a JSON string.
pub fn input_from_json_str(json: &str) -> Result<DrawingInput, serde_json::Error> {
    serde_json::from_str(json)
}

/// Parses a drawing input from raw bytes.
///
/// Useful for fuzzing without UTF-8 validation up front.
pub fn input_from_json_slice(bytes: &[u8]) -> Result<DrawingInput, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Parses a pipeline result from a JSON string.
pub fn result_from_json_str(json: &str) -> Result<DrawingResult, serde_json::Error> {
    serde_json::from_str(json)
}

/// Serializes a pipeline result to a pretty JSON string.
pub fn result_to_json_string(result: &DrawingResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{
        BoundingBox, Dimension, DimensionRelation, DimensionType, LinkMethod, RelationType,
        TargetType,
    };

    fn sample_result() -> DrawingResult {
        DrawingResult {
            dimensions: vec![Dimension::new(
                "d1",
                BoundingBox::new(10.0, 20.0, 60.0, 35.0),
                "Ø25±0.1",
            )
            .with_parsed(DimensionType::Diameter, "Ø25±0.1")
            .with_tolerance("±0.1")
            .with_confidence(0.9)
            .with_engine("easyocr+edocr2")],
            relations: vec![DimensionRelation {
                id: "rel-d1".into(),
                dimension_id: "d1".into(),
                target_type: TargetType::None,
                target_id: None,
                target_bbox: None,
                relation_type: RelationType::Diameter,
                method: LinkMethod::Proximity,
                confidence: 0.0,
                direction: None,
                notes: Some("no symbols supplied".into()),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_json_roundtrip() {
        let original = sample_result();
        let json = result_to_json_string(&original).expect("serialization failed");
        let restored = result_from_json_str(&json).expect("deserialization failed");
        assert_eq!(original, restored);
    }

    #[test]
    fn test_json_format() {
        let json = result_to_json_string(&sample_result()).expect("serialization failed");
        assert!(json.contains("\"dimension_type\": \"diameter\""));
        assert!(json.contains("\"unit\": null"));
        assert!(json.contains("\"method\": \"proximity\""));
        assert!(json.contains("\"target_type\": \"none\""));
    }

    #[test]
    fn test_input_defaults() {
        let input = input_from_json_str(r#"{"detections": [{"text": "R5"}]}"#).unwrap();
        assert_eq!(input.detections.len(), 1);
        assert!(input.symbols.is_empty());
        assert!(input.lines.is_empty());
    }
}
