//! Data model shared by every pipeline stage.
//!
//! # Design Principles
//!
//! 1. **Permissive Construction**: geometry types allow degenerate or
//!    inverted boxes so that noisy engine output can be represented and
//!    filtered rather than rejected during parsing.
//!
//! 2. **Newtype IDs**: dimensions, symbols, lines and relations each have
//!    their own id type.
//!
//! 3. **Pure Values**: every stage consumes borrowed collections and returns
//!    new ones. Nothing here is mutated in place across stages.
//!
//! # Example
//!
//! ```
//! use dimfuse::ir::{BoundingBox, Dimension, DimensionType};
//!
//! let dim = Dimension::new("d1", BoundingBox::new(10.0, 20.0, 60.0, 35.0), "R5")
//!     .with_parsed(DimensionType::Radius, "R5")
//!     .with_engine("paddleocr");
//! assert_eq!(dim.bbox.width(), 50.0);
//! ```

mod bbox;
mod drawing;
mod geometry;
mod ids;
pub mod io_engine;
pub mod io_json;
mod model;

// Re-export core types for convenient access
pub use bbox::BoundingBox;
pub use drawing::{DrawingInput, DrawingResult, PipelineSummary};
pub use geometry::{GeometryLine, Orientation, Point};
pub use ids::{DimensionId, LineId, RelationId, SymbolId};
pub use io_engine::{RawBBox, RawDetection};
pub use model::{
    clamp_confidence, Dimension, DimensionRelation, DimensionType, LinkMethod, RelationType,
    SymbolNode, TargetType, VerificationStatus,
};
