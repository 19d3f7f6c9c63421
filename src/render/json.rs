//! Document summary renderer and its `info.json` writer.

use super::{
    finish_all, DocumentContext, JsonFormat, PageContext, RenderStatus, Renderer, ScalePolicy,
    Writer,
};
use crate::engine::PdfPage;
use crate::error::Result;
use crate::model::DocumentSummary;

/// File the summary is written to.
pub const SUMMARY_FILE: &str = "info.json";

/// Serialize a summary.
pub fn to_json(summary: &DocumentSummary, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Compact => serde_json::to_string(summary)?,
        JsonFormat::Pretty => serde_json::to_string_pretty(summary)?,
    };
    Ok(json)
}

/// Records each page's dimensions at the canvas scale, and writes the
/// document summary after the last page.
pub struct JsonRenderer {
    scale: ScalePolicy,
    writers: Vec<Box<dyn Writer>>,
}

impl JsonRenderer {
    /// Renderer observing pages at `scale`, writing `info.json` in `format`.
    pub fn new(scale: ScalePolicy, format: JsonFormat) -> Self {
        Self {
            scale,
            writers: vec![Box::new(JsonWriter::new(format))],
        }
    }
}

impl Renderer for JsonRenderer {
    fn name(&self) -> &str {
        "json"
    }

    fn render_page(&mut self, page: &dyn PdfPage, ctx: &mut PageContext<'_>) -> Result<RenderStatus> {
        let (width, height) = page.natural_size();
        let scale = self.scale.scale_for(width, height);
        let viewport = page.viewport(scale);
        ctx.metadata
            .observe_page(ctx.page_number, viewport.width, viewport.height, scale);
        Ok(RenderStatus::Rendered)
    }

    fn render_document(&mut self, ctx: &DocumentContext<'_>) -> Result<()> {
        finish_all(&mut self.writers, ctx)
    }
}

/// Writes the finalized summary to `info.json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonWriter {
    format: JsonFormat,
}

impl JsonWriter {
    /// Create a writer.
    pub fn new(format: JsonFormat) -> Self {
        Self { format }
    }
}

impl Writer for JsonWriter {
    fn name(&self) -> &str {
        "json"
    }

    fn write_document(&mut self, ctx: &DocumentContext<'_>) -> Result<()> {
        let json = to_json(ctx.summary, self.format)?;
        ctx.output.write(&ctx.output.file(SUMMARY_FILE), json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_json_compact_is_single_line() {
        let summary = DocumentSummary::empty();
        let json = to_json(&summary, JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
        assert!(json.starts_with(r#"{"generator":"pdf-extractor","version":""#));

        let pretty = to_json(&summary, JsonFormat::Pretty).unwrap();
        assert!(pretty.contains('\n'));
    }
}
