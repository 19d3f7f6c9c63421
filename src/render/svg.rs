//! Vector renderer.

use super::{
    finish_all, write_all, DocumentContext, PageArtifact, PageContext, RenderStatus, Renderer,
    ScalePolicy, Writer,
};
use crate::engine::svg::SvgGraphics;
use crate::engine::PdfPage;
use crate::error::{Error, Result};

/// Replays the page's paint operations and text into an SVG drawing.
pub struct SvgRenderer {
    scale: ScalePolicy,
    graphics: SvgGraphics,
    writers: Vec<Box<dyn Writer>>,
}

impl SvgRenderer {
    /// Renderer with the SVG file writer.
    pub fn new(scale: ScalePolicy) -> Self {
        Self::with_writers(scale, vec![Box::new(SvgWriter)])
    }

    /// Renderer with a custom writer list.
    pub fn with_writers(scale: ScalePolicy, writers: Vec<Box<dyn Writer>>) -> Self {
        Self {
            scale,
            graphics: SvgGraphics::new(),
            writers,
        }
    }

    /// Draw paths only.
    pub fn without_text(mut self) -> Self {
        self.graphics.include_text = false;
        self
    }
}

impl Renderer for SvgRenderer {
    fn name(&self) -> &str {
        "svg"
    }

    fn render_page(&mut self, page: &dyn PdfPage, ctx: &mut PageContext<'_>) -> Result<RenderStatus> {
        if self.writers.is_empty() {
            return Ok(RenderStatus::Skipped);
        }

        let (width, height) = page.natural_size();
        let viewport = page.viewport(self.scale.scale_for(width, height));

        let operators = page.operator_list()?;
        let text = page.text_content()?;
        let mut artifact = PageArtifact::new(viewport);
        artifact.vector = Some(self.graphics.build(&operators, &text, &viewport));

        write_all(&mut self.writers, &artifact, ctx)?;
        Ok(RenderStatus::Rendered)
    }

    fn render_document(&mut self, ctx: &DocumentContext<'_>) -> Result<()> {
        finish_all(&mut self.writers, ctx)
    }
}

/// Writes `page-N.svg`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgWriter;

impl Writer for SvgWriter {
    fn name(&self) -> &str {
        "svg"
    }

    fn write_page(&mut self, artifact: &PageArtifact, ctx: &mut PageContext<'_>) -> Result<()> {
        let vector = artifact
            .vector
            .as_ref()
            .ok_or_else(|| Error::Render("svg writer received no vector drawing".to_string()))?;
        ctx.output
            .write(&ctx.output.page_file(ctx.page_number, "svg"), vector.finish())
    }
}
