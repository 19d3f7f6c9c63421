//! # pdfextractor
//!
//! Export PDF pages to images, HTML text layers, and plain text, with a
//! JSON summary of the whole document.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfextractor::extract_file;
//!
//! fn main() -> pdfextractor::Result<()> {
//!     let summary = extract_file("document.pdf", "./out")?;
//!     println!(
//!         "{} pages, canonical size {}x{}",
//!         summary.page_count, summary.dimensions.width, summary.dimensions.height
//!     );
//!     Ok(())
//! }
//! ```
//!
//! Each run writes into one directory:
//!
//! - `page-N.png`, `page-N.jpg`, `page-N.svg`: page images
//! - `text-N.html`: positioned HTML text layer
//! - `text-N.txt`: reconstructed plain text
//! - `stylesheet.css`: font classes used by the HTML layers
//! - `info.json`: canonical page size, size exceptions, and font roster
//!
//! ## Features
//!
//! - **Sequential pipeline**: one page decoded at a time, renderers and
//!   writers run in registration order
//! - **Text-flow reconstruction**: word and line boundaries recovered from
//!   run geometry
//! - **Dimension consensus**: the most common page size wins, ties go to the
//!   first size seen
//! - **Pluggable engine**: the pipeline talks to [`engine::PdfDocument`] and
//!   [`engine::PdfPage`]; a `lopdf` backend is built in

pub mod detect;
pub mod engine;
pub mod error;
pub mod metadata;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod text_flow;

pub use detect::{detect_format, detect_format_from_path, is_pdf, PdfFormat};
pub use engine::{load_document, load_file, PdfDocument, PdfFile, PdfPage};
pub use error::{Error, Result};
pub use metadata::MetadataAggregator;
pub use model::{
    DocumentDimensions, DocumentFacts, DocumentSummary, FontRecord, Metadata, Outline, TextContent,
    TextItem, TextStyle, Viewport,
};
pub use pipeline::{Extractor, PipelineEvent};
pub use render::{
    CanvasRenderer, ExtractOptions, JsonFormat, JsonRenderer, PageRange, Renderer, ScalePolicy,
    SvgRenderer, Writer,
};
pub use text_flow::{LineBreakMode, PageLayout, TextLayerOptions, TextRun};

use std::path::{Path, PathBuf};

/// Crate version recorded in `info.json`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Export a PDF file into `output_dir` with default options.
///
/// # Example
///
/// ```no_run
/// let summary = pdfextractor::extract_file("document.pdf", "./out").unwrap();
/// println!("Fonts: {}", summary.fonts.len());
/// ```
pub fn extract_file<P: AsRef<Path>, O: Into<PathBuf>>(
    path: P,
    output_dir: O,
) -> Result<DocumentSummary> {
    Extractor::new(output_dir, ExtractOptions::default()).extract_file(path)
}

/// Export a PDF file into `output_dir` with custom options.
///
/// # Example
///
/// ```no_run
/// use pdfextractor::{extract_file_with_options, ExtractOptions, PageRange};
///
/// let options = ExtractOptions::new()
///     .with_svg(false)
///     .with_pages(PageRange::first(10));
/// let summary = extract_file_with_options("document.pdf", "./out", options).unwrap();
/// ```
pub fn extract_file_with_options<P: AsRef<Path>, O: Into<PathBuf>>(
    path: P,
    output_dir: O,
    options: ExtractOptions,
) -> Result<DocumentSummary> {
    Extractor::new(output_dir, options).extract_file(path)
}

/// Export a PDF held in memory into `output_dir` with default options.
pub fn extract_bytes<O: Into<PathBuf>>(data: &[u8], output_dir: O) -> Result<DocumentSummary> {
    Extractor::new(output_dir, ExtractOptions::default()).extract_bytes(data)
}

/// Reconstruct the plain text of every page, without writing files.
///
/// Pages are laid out at scale 1 and joined with a form feed.
///
/// # Example
///
/// ```no_run
/// let text = pdfextractor::extract_text("document.pdf").unwrap();
/// println!("{}", text);
/// ```
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let doc = load_file(path)?;
    let mut pages = Vec::new();
    for number in 1..=doc.num_pages() {
        let page = doc.get_page(number)?;
        let layout = PageLayout::build(page.as_ref(), &page.viewport(1.0))?;
        pages.push(layout.to_text(LineBreakMode::Newline));
    }
    Ok(pages.join("\u{c}"))
}
