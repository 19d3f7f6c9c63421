//! The export pipeline.
//!
//! [`Extractor`] owns the page loop. Pages are processed one at a time in
//! ascending order: the page is decoded, every renderer runs against it in
//! registration order, the page's font registrations are folded into the
//! document stylesheet, and the page is released before the next one is
//! decoded. After the last page the engine's document facts are fetched,
//! the summary is finalized, and document-level writers run, with
//! `info.json` always last.
//!
//! # Example
//!
//! ```no_run
//! use pdfextractor::{ExtractOptions, Extractor, PageRange};
//!
//! fn main() -> pdfextractor::Result<()> {
//!     let options = ExtractOptions::new().with_pages(PageRange::new(1, 3));
//!     let summary = Extractor::new("./out", options).extract_file("document.pdf")?;
//!     println!("{} pages, {} fonts", summary.page_count, summary.fonts.len());
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::engine::{self, FontRegistry, PdfDocument, StyleSheet};
use crate::error::Result;
use crate::metadata::MetadataAggregator;
use crate::model::{DocumentFacts, DocumentSummary};
use crate::render::{
    default_renderers, DocumentContext, ExtractOptions, JsonRenderer, OutputDir, PageContext,
    RenderStatus, Renderer,
};

/// Progress notifications emitted while a document is processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    /// Page processing is about to begin.
    Started {
        /// Pages in the document
        total_pages: u32,
        /// Pages that will be processed
        selected: u32,
    },

    /// A page is about to be decoded.
    PageStart {
        /// 1-indexed page number
        number: u32,
    },

    /// Every renderer has finished with a page.
    PageEnd {
        /// 1-indexed page number
        number: u32,
    },

    /// Document facts are being fetched and the summary written.
    Finalizing,

    /// The run completed.
    Finished,
}

type Observer = Box<dyn FnMut(&PipelineEvent)>;

/// Exports a document's pages into an output directory.
pub struct Extractor {
    output: OutputDir,
    options: ExtractOptions,
    renderers: Option<Vec<Box<dyn Renderer>>>,
    observer: Option<Observer>,
}

impl Extractor {
    /// Create an extractor writing into `output_dir`, which must exist.
    pub fn new(output_dir: impl Into<PathBuf>, options: ExtractOptions) -> Self {
        Self {
            output: OutputDir::new(output_dir),
            options,
            renderers: None,
            observer: None,
        }
    }

    /// Replace the renderers built from the options. The metadata renderer
    /// still runs after them.
    pub fn with_renderers(mut self, renderers: Vec<Box<dyn Renderer>>) -> Self {
        self.renderers = Some(renderers);
        self
    }

    /// Receive progress events.
    pub fn on_event<F>(mut self, observer: F) -> Self
    where
        F: FnMut(&PipelineEvent) + 'static,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    /// The options in use.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// The output directory.
    pub fn output_dir(&self) -> &Path {
        self.output.path()
    }

    /// Open and export a PDF file.
    pub fn extract_file<P: AsRef<Path>>(&mut self, path: P) -> Result<DocumentSummary> {
        self.output.ensure_writable()?;
        let data = std::fs::read(path.as_ref())?;
        info!("Extracting {}", path.as_ref().display());
        let doc = engine::load_document(&data)?;
        self.process(&doc)
    }

    /// Open and export a PDF held in memory.
    pub fn extract_bytes(&mut self, data: &[u8]) -> Result<DocumentSummary> {
        self.output.ensure_writable()?;
        let doc = engine::load_document(data)?;
        self.process(&doc)
    }

    /// Export an already opened document.
    pub fn run(&mut self, doc: &dyn PdfDocument) -> Result<DocumentSummary> {
        self.output.ensure_writable()?;
        self.process(doc)
    }

    fn process(&mut self, doc: &dyn PdfDocument) -> Result<DocumentSummary> {
        let mut renderers = match self.renderers.take() {
            Some(renderers) => renderers,
            None => default_renderers(&self.options),
        };
        let result = self.process_with(doc, &mut renderers);
        self.renderers = Some(renderers);
        result
    }

    fn process_with(
        &mut self,
        doc: &dyn PdfDocument,
        renderers: &mut [Box<dyn Renderer>],
    ) -> Result<DocumentSummary> {
        let total = doc.num_pages();
        let range = self.options.page_range.effective(total);
        let selected = if range.is_empty() {
            0
        } else {
            range.end() - range.start() + 1
        };
        info!(
            "Processing {} of {} pages into {}",
            selected,
            total,
            self.output.path().display()
        );
        self.emit(PipelineEvent::Started {
            total_pages: total,
            selected,
        });

        let mut metadata = MetadataAggregator::new();
        metadata.set_page_count(total);
        let mut stylesheet = StyleSheet::new();
        let mut json = JsonRenderer::new(self.options.canvas_policy(), self.options.json_format);

        for number in range {
            self.emit(PipelineEvent::PageStart { number });

            let page = doc.get_page(number)?;
            let mut fonts = FontRegistry::new();
            {
                let mut ctx = PageContext {
                    page_number: number,
                    output: &self.output,
                    fonts: &mut fonts,
                    metadata: &mut metadata,
                };
                for renderer in renderers.iter_mut() {
                    let status = renderer.render_page(page.as_ref(), &mut ctx)?;
                    if status == RenderStatus::Skipped {
                        debug!("Page {}: {} skipped", number, renderer.name());
                    }
                }
                json.render_page(page.as_ref(), &mut ctx)?;
            }
            let added = stylesheet.absorb(&mut fonts);
            debug!("Page {}: done, {} new style rules", number, added);
            drop(page);

            self.emit(PipelineEvent::PageEnd { number });
        }

        self.emit(PipelineEvent::Finalizing);
        let facts = DocumentFacts {
            metadata: doc.metadata()?,
            outline: doc.outline()?,
            page_labels: doc.page_labels()?,
            destinations: doc.destinations()?,
        };

        let mut summary = metadata.finalize();
        summary.facts = facts;

        let ctx = DocumentContext {
            output: &self.output,
            stylesheet: &stylesheet,
            summary: &summary,
        };
        for renderer in renderers.iter_mut() {
            renderer.render_document(&ctx)?;
        }
        json.render_document(&ctx)?;

        info!(
            "Finished: {} pages, {} fonts, {} style rules",
            summary.page_count,
            summary.fonts.len(),
            stylesheet.len()
        );
        self.emit(PipelineEvent::Finished);
        Ok(summary)
    }

    fn emit(&mut self, event: PipelineEvent) {
        if let Some(observer) = self.observer.as_mut() {
            observer(&event);
        }
    }
}

impl fmt::Debug for Extractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extractor")
            .field("output", &self.output)
            .field("options", &self.options)
            .field(
                "renderers",
                &self
                    .renderers
                    .as_ref()
                    .map(|r| r.iter().map(|r| r.name().to_string()).collect::<Vec<_>>()),
            )
            .finish()
    }
}
