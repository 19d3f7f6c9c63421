//! Data model shared by the engine boundary, the renderers, and the writers.
//!
//! Geometry and text types describe one page at a time; the summary types
//! describe the whole document after every page has been seen.

mod document;
pub mod geometry;
mod summary;
mod text;

pub use document::{DocumentFacts, Metadata, Outline, OutlineItem};
pub use geometry::{BoundingBox, Matrix, Viewport};
pub use summary::{
    DimensionBucket, Dimensions, DocumentDimensions, DocumentSummary, FontRecord, GENERATOR,
};
pub use text::{is_all_whitespace, TextContent, TextDirection, TextItem, TextStyle};
