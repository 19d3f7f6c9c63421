//! Canvas renderer: paints the page into pixels and lays out its text.

use log::debug;

use super::{
    write_all, DocumentContext, HtmlWriter, PageArtifact, PageContext, PngWriter, RenderStatus,
    Renderer, ScalePolicy, TextWriter, Writer,
};
use crate::engine::{PdfPage, RenderTarget};
use crate::error::Result;
use crate::text_flow::{LineBreakMode, PageLayout, TextLayerOptions};

/// Default upscale factor for the hi-resolution variant.
pub const HI_RES_UPSCALE: f64 = 2.0;

/// Renders pages onto a pixel surface and feeds the surface and the page's
/// laid-out text to its writers.
pub struct CanvasRenderer {
    name: &'static str,
    scale: ScalePolicy,
    upscale: f64,
    writers: Vec<Box<dyn Writer>>,
}

impl CanvasRenderer {
    /// Renderer with the PNG, HTML, and text writers.
    pub fn new(scale: ScalePolicy) -> Self {
        Self::with_writers(
            scale,
            vec![
                Box::new(PngWriter::new()),
                Box::new(HtmlWriter::new(TextLayerOptions::default())),
                Box::new(TextWriter::new(LineBreakMode::Space)),
            ],
        )
    }

    /// Renderer with a custom writer list.
    pub fn with_writers(scale: ScalePolicy, writers: Vec<Box<dyn Writer>>) -> Self {
        Self {
            name: "canvas",
            scale,
            upscale: 1.0,
            writers,
        }
    }

    /// Hi-resolution variant: a single minified PNG writer at twice the scale.
    pub fn hi_res(scale: ScalePolicy) -> Self {
        Self {
            name: "canvas-hires",
            scale,
            upscale: HI_RES_UPSCALE,
            writers: vec![Box::new(PngWriter::minified())],
        }
    }

    /// Multiply the policy's scale by `factor`.
    pub fn with_upscale(mut self, factor: f64) -> Self {
        self.upscale = factor;
        self
    }

    /// Scale used for a page of the given natural size.
    pub fn scale_for(&self, width: f64, height: f64) -> f64 {
        self.scale.scale_for(width, height) * self.upscale
    }
}

impl Renderer for CanvasRenderer {
    fn name(&self) -> &str {
        self.name
    }

    fn render_page(&mut self, page: &dyn PdfPage, ctx: &mut PageContext<'_>) -> Result<RenderStatus> {
        if self.writers.is_empty() {
            return Ok(RenderStatus::Skipped);
        }

        let (width, height) = page.natural_size();
        let viewport = page.viewport(self.scale_for(width, height));
        let mut artifact = PageArtifact::new(viewport);

        if self.writers.iter().any(|w| w.requires_raster()) {
            let mut target = RenderTarget::for_viewport(&viewport)?;
            page.render(&mut target, &viewport)?;
            debug!(
                "Page {}: painted {}x{} at scale {:.3}",
                ctx.page_number,
                target.width(),
                target.height(),
                viewport.scale
            );
            artifact.raster = Some(target);
        }

        if self.writers.iter().any(|w| w.requires_layout()) {
            artifact.layout = Some(PageLayout::build(page, &viewport)?);
        }

        write_all(&mut self.writers, &artifact, ctx)?;
        Ok(RenderStatus::Rendered)
    }

    fn render_document(&mut self, ctx: &DocumentContext<'_>) -> Result<()> {
        super::finish_all(&mut self.writers, ctx)
    }
}

impl std::fmt::Debug for CanvasRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let writers: Vec<&str> = self.writers.iter().map(|w| w.name()).collect();
        f.debug_struct("CanvasRenderer")
            .field("name", &self.name)
            .field("scale", &self.scale)
            .field("upscale", &self.upscale)
            .field("writers", &writers)
            .finish()
    }
}
