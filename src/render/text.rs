//! Text writers: HTML text layers and plain text.

use super::{DocumentContext, PageArtifact, PageContext, Writer};
use crate::error::{Error, Result};
use crate::text_flow::{LineBreakMode, PageLayout, TextLayerOptions};

/// File the HTML writer emits once per document.
pub const STYLESHEET_FILE: &str = "stylesheet.css";

fn layout<'a>(artifact: &'a PageArtifact, writer: &str) -> Result<&'a PageLayout> {
    artifact
        .layout
        .as_ref()
        .ok_or_else(|| Error::Render(format!("{} writer received no text layout", writer)))
}

/// Writes `text-N.html` per page and `stylesheet.css` for the document.
#[derive(Debug, Clone, Default)]
pub struct HtmlWriter {
    options: TextLayerOptions,
}

impl HtmlWriter {
    /// Create a writer.
    pub fn new(options: TextLayerOptions) -> Self {
        Self { options }
    }
}

impl Writer for HtmlWriter {
    fn name(&self) -> &str {
        "html"
    }

    fn requires_layout(&self) -> bool {
        true
    }

    fn write_page(&mut self, artifact: &PageArtifact, ctx: &mut PageContext<'_>) -> Result<()> {
        let layout = layout(artifact, "html")?;
        let html = layout.to_html(ctx.fonts, &self.options);

        for family in layout.font_families() {
            let display = ctx.fonts.register(family).display_family.clone();
            ctx.metadata
                .observe_font(family, Some(display.as_str()), ctx.page_number);
        }

        ctx.output
            .write(&ctx.output.text_file(ctx.page_number, "html"), html)
    }

    fn write_document(&mut self, ctx: &DocumentContext<'_>) -> Result<()> {
        ctx.output
            .write(&ctx.output.file(STYLESHEET_FILE), ctx.stylesheet.to_css())
    }
}

/// Writes `text-N.txt`.
#[derive(Debug, Clone, Default)]
pub struct TextWriter {
    mode: LineBreakMode,
}

impl TextWriter {
    /// Create a writer.
    pub fn new(mode: LineBreakMode) -> Self {
        Self { mode }
    }
}

impl Writer for TextWriter {
    fn name(&self) -> &str {
        "text"
    }

    fn requires_layout(&self) -> bool {
        true
    }

    fn write_page(&mut self, artifact: &PageArtifact, ctx: &mut PageContext<'_>) -> Result<()> {
        let layout = layout(artifact, "text")?;
        for family in layout.font_families() {
            ctx.metadata.observe_font(family, None, ctx.page_number);
        }
        ctx.output.write(
            &ctx.output.text_file(ctx.page_number, "txt"),
            layout.to_text(self.mode),
        )
    }
}
