//! Renderers and writers.
//!
//! A [`Renderer`] chooses a viewport for a page, asks the engine for one kind
//! of artifact (pixels, vectors, or text), and hands it to its [`Writer`]s in
//! order. Writers turn the artifact into files. Both run strictly
//! sequentially: one page, one renderer, one writer at a time.

mod bitmap;
mod canvas;
mod json;
mod options;
mod output;
mod svg;
mod text;

pub use bitmap::{JpegWriter, PngWriter};
pub use canvas::CanvasRenderer;
pub use json::{JsonRenderer, JsonWriter};
pub use options::{ExtractOptions, JsonFormat, PageRange, ScalePolicy};
pub use output::OutputDir;
pub use svg::{SvgRenderer, SvgWriter};
pub use text::{HtmlWriter, TextWriter};

use crate::engine::{FontRegistry, PdfPage, RenderTarget, StyleSheet, VectorTarget};
use crate::error::Result;
use crate::metadata::MetadataAggregator;
use crate::model::{DocumentSummary, Viewport};
use crate::text_flow::PageLayout;

/// Outcome of rendering one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    /// Artifacts were produced
    Rendered,
    /// The renderer had nothing to do
    Skipped,
}

/// State available to renderers and writers while one page is processed.
pub struct PageContext<'a> {
    /// 1-indexed page number
    pub page_number: u32,
    /// Where files go
    pub output: &'a OutputDir,
    /// Font substitutions registered for this page only
    pub fonts: &'a mut FontRegistry,
    /// Document-wide accumulator
    pub metadata: &'a mut MetadataAggregator,
}

/// State available to the document pass after the last page.
pub struct DocumentContext<'a> {
    /// Where files go
    pub output: &'a OutputDir,
    /// Style rules collected from every page
    pub stylesheet: &'a StyleSheet,
    /// Finalized summary
    pub summary: &'a DocumentSummary,
}

/// What a renderer produced for one page.
#[derive(Debug)]
pub struct PageArtifact {
    /// Viewport the artifact was produced at
    pub viewport: Viewport,
    /// Painted pixels, if any writer needs them
    pub raster: Option<RenderTarget>,
    /// Vector drawing, for vector renderers
    pub vector: Option<VectorTarget>,
    /// Laid-out text, if any writer needs it
    pub layout: Option<PageLayout>,
}

impl PageArtifact {
    /// An artifact with nothing but a viewport.
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            raster: None,
            vector: None,
            layout: None,
        }
    }
}

/// Serializes one kind of artifact to files.
pub trait Writer {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Whether this writer needs the page painted into pixels.
    fn requires_raster(&self) -> bool {
        false
    }

    /// Whether this writer needs the page's text laid out.
    fn requires_layout(&self) -> bool {
        false
    }

    /// Write one page's files.
    fn write_page(&mut self, _artifact: &PageArtifact, _ctx: &mut PageContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Write document-wide files once, after the last page.
    fn write_document(&mut self, _ctx: &DocumentContext<'_>) -> Result<()> {
        Ok(())
    }
}

/// Produces one kind of page artifact and distributes it to writers.
pub trait Renderer {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Render one page.
    fn render_page(&mut self, page: &dyn PdfPage, ctx: &mut PageContext<'_>) -> Result<RenderStatus>;

    /// Final pass after the last page.
    fn render_document(&mut self, _ctx: &DocumentContext<'_>) -> Result<()> {
        Ok(())
    }
}

/// Run each writer on an artifact, in order.
pub(crate) fn write_all(
    writers: &mut [Box<dyn Writer>],
    artifact: &PageArtifact,
    ctx: &mut PageContext<'_>,
) -> Result<()> {
    for writer in writers.iter_mut() {
        log::debug!("Page {}: writer {}", ctx.page_number, writer.name());
        writer.write_page(artifact, ctx)?;
    }
    Ok(())
}

/// Run each writer's document pass, in order.
pub(crate) fn finish_all(writers: &mut [Box<dyn Writer>], ctx: &DocumentContext<'_>) -> Result<()> {
    for writer in writers.iter_mut() {
        writer.write_document(ctx)?;
    }
    Ok(())
}

/// Renderers for a set of options, in processing order. The metadata
/// renderer is not included; the pipeline always runs it last.
pub fn default_renderers(options: &ExtractOptions) -> Vec<Box<dyn Renderer>> {
    let mut renderers: Vec<Box<dyn Renderer>> = Vec::new();
    let policy = options.canvas_policy();

    let mut canvas_writers: Vec<Box<dyn Writer>> = Vec::new();
    if options.render_png && options.hi_res.is_none() {
        canvas_writers.push(Box::new(PngWriter::new()));
    }
    if options.render_jpeg {
        canvas_writers.push(Box::new(JpegWriter::new()));
    }
    if options.render_html {
        canvas_writers.push(Box::new(HtmlWriter::new(options.html)));
    }
    if options.render_text {
        canvas_writers.push(Box::new(TextWriter::new(options.line_breaks)));
    }
    renderers.push(Box::new(CanvasRenderer::with_writers(policy.clone(), canvas_writers)));

    if options.render_svg {
        renderers.push(Box::new(SvgRenderer::new(ScalePolicy::Fixed(options.svg_zoom))));
    }

    if let (true, Some(upscale)) = (options.render_png, options.hi_res) {
        renderers.push(Box::new(CanvasRenderer::hi_res(policy).with_upscale(upscale)));
    }

    renderers
}
