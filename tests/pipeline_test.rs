//! Integration tests for the export pipeline, driven by an in-memory engine.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::rc::Rc;

use pdfextractor::engine::OperatorList;
use pdfextractor::error::Result;
use pdfextractor::model::TextDirection;
use pdfextractor::render::{PageContext, RenderStatus};
use pdfextractor::{
    CanvasRenderer, Error, ExtractOptions, Extractor, Metadata, Outline, PageRange, PdfDocument,
    PdfPage, PipelineEvent, Renderer, ScalePolicy, TextContent, TextItem, TextStyle,
};
use tempfile::TempDir;

type CallLog = Rc<RefCell<Vec<String>>>;

struct MockPage {
    number: u32,
    size: (f64, f64),
    text: TextContent,
}

impl PdfPage for MockPage {
    fn number(&self) -> u32 {
        self.number
    }

    fn view_box(&self) -> [f64; 4] {
        [0.0, 0.0, self.size.0, self.size.1]
    }

    fn text_content(&self) -> Result<TextContent> {
        Ok(self.text.clone())
    }

    fn operator_list(&self) -> Result<OperatorList> {
        Ok(OperatorList::default())
    }
}

struct MockDocument {
    sizes: Vec<(f64, f64)>,
    log: CallLog,
}

impl MockDocument {
    fn new(sizes: Vec<(f64, f64)>) -> Self {
        Self {
            sizes,
            log: Rc::new(RefCell::new(Vec::new())),
        }
    }

    fn uniform(pages: usize) -> Self {
        Self::new(vec![(600.0, 800.0); pages])
    }

    fn calls(&self) -> Vec<String> {
        self.log.borrow().clone()
    }
}

fn item(text: &str, x: f64, y: f64, width: f64) -> TextItem {
    TextItem {
        text: text.to_string(),
        dir: TextDirection::Ltr,
        transform: [12.0, 0.0, 0.0, 12.0, x, y],
        width,
        height: 12.0,
        font_name: "F1".to_string(),
    }
}

fn hello_world() -> TextContent {
    TextContent {
        items: vec![item("Hello", 72.0, 700.0, 30.0), item("World", 107.0, 700.0, 32.0)],
        styles: HashMap::from([(
            "F1".to_string(),
            TextStyle {
                font_family: "Helvetica".to_string(),
                ascent: Some(0.75),
                descent: Some(-0.25),
                vertical: false,
            },
        )]),
    }
}

impl PdfDocument for MockDocument {
    fn num_pages(&self) -> u32 {
        self.sizes.len() as u32
    }

    fn get_page(&self, number: u32) -> Result<Box<dyn PdfPage + '_>> {
        self.log.borrow_mut().push(format!("page {}", number));
        let size = *self
            .sizes
            .get(number as usize - 1)
            .ok_or(Error::PageOutOfRange(number, self.num_pages()))?;
        Ok(Box::new(MockPage {
            number,
            size,
            text: hello_world(),
        }))
    }

    fn metadata(&self) -> Result<Metadata> {
        self.log.borrow_mut().push("metadata".to_string());
        Ok(Metadata::with_version("1.7"))
    }

    fn outline(&self) -> Result<Outline> {
        self.log.borrow_mut().push("outline".to_string());
        Ok(Outline::new())
    }

    fn page_labels(&self) -> Result<Vec<String>> {
        self.log.borrow_mut().push("page_labels".to_string());
        Ok(Vec::new())
    }

    fn destinations(&self) -> Result<BTreeMap<String, Option<u32>>> {
        self.log.borrow_mut().push("destinations".to_string());
        Ok(BTreeMap::new())
    }
}

/// Fails on one page.
struct FailingRenderer {
    fail_on: u32,
}

impl Renderer for FailingRenderer {
    fn name(&self) -> &str {
        "failing"
    }

    fn render_page(
        &mut self,
        _page: &dyn PdfPage,
        ctx: &mut PageContext<'_>,
    ) -> Result<RenderStatus> {
        if ctx.page_number == self.fail_on {
            return Err(Error::Render("boom".to_string()));
        }
        Ok(RenderStatus::Rendered)
    }
}

fn read_json(dir: &TempDir) -> serde_json::Value {
    let text = fs::read_to_string(dir.path().join("info.json")).unwrap();
    serde_json::from_str(&text).unwrap()
}

fn file_names(dir: &TempDir) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_page_range_processes_selected_pages_in_order() {
    let dir = TempDir::new().unwrap();
    let doc = MockDocument::uniform(5);
    let options = ExtractOptions::new().with_pages(PageRange::new(2, 3));

    let summary = Extractor::new(dir.path(), options).run(&doc).unwrap();

    assert_eq!(
        doc.calls(),
        vec!["page 2", "page 3", "metadata", "outline", "page_labels", "destinations"]
    );
    assert_eq!(summary.page_count, 5);
    assert!(dir.path().join("page-2.png").exists());
    assert!(dir.path().join("page-3.svg").exists());
    assert!(dir.path().join("text-3.html").exists());
    assert!(!dir.path().join("page-1.png").exists());
    assert!(!dir.path().join("page-4.png").exists());
}

#[test]
fn test_default_run_writes_every_artifact() {
    let dir = TempDir::new().unwrap();
    let doc = MockDocument::uniform(1);

    Extractor::new(dir.path(), ExtractOptions::default())
        .run(&doc)
        .unwrap();

    assert_eq!(
        file_names(&dir),
        vec![
            "info.json",
            "page-1.png",
            "page-1.svg",
            "stylesheet.css",
            "text-1.html",
            "text-1.txt"
        ]
    );
    let text = fs::read_to_string(dir.path().join("text-1.txt")).unwrap();
    assert_eq!(text, "Hello World");

    let css = fs::read_to_string(dir.path().join("stylesheet.css")).unwrap();
    assert!(css.contains(".ff-helvetica"));
}

#[test]
fn test_unwritable_output_fails_before_any_page() {
    let dir = TempDir::new().unwrap();
    let doc = MockDocument::uniform(3);

    let err = Extractor::new(dir.path().join("missing"), ExtractOptions::default())
        .run(&doc)
        .unwrap_err();

    assert!(matches!(err, Error::OutputNotWritable { .. }));
    assert!(doc.calls().is_empty());
}

#[test]
fn test_renderer_failure_aborts_without_summary() {
    let dir = TempDir::new().unwrap();
    let doc = MockDocument::uniform(3);

    let err = Extractor::new(dir.path(), ExtractOptions::default())
        .with_renderers(vec![Box::new(FailingRenderer { fail_on: 2 })])
        .run(&doc)
        .unwrap_err();

    assert!(matches!(err, Error::Render(_)));
    assert_eq!(doc.calls(), vec!["page 1", "page 2"]);
    assert!(!dir.path().join("info.json").exists());
}

#[test]
fn test_renderer_without_writers_is_skipped() {
    let dir = TempDir::new().unwrap();
    let doc = MockDocument::uniform(2);

    let summary = Extractor::new(dir.path(), ExtractOptions::default())
        .with_renderers(vec![Box::new(CanvasRenderer::with_writers(
            ScalePolicy::Fixed(1.0),
            Vec::new(),
        ))])
        .run(&doc)
        .unwrap();

    assert_eq!(summary.page_count, 2);
    assert_eq!(file_names(&dir), vec!["info.json"]);
}

#[test]
fn test_dimension_exceptions_end_to_end() {
    let dir = TempDir::new().unwrap();
    let doc = MockDocument::new(vec![
        (600.0, 800.0),
        (600.0, 800.0),
        (300.0, 400.0),
        (600.0, 800.0),
    ]);
    let options = ExtractOptions::new()
        .with_canvas_zoom(1.0)
        .with_svg(false)
        .with_png(false);

    let summary = Extractor::new(dir.path(), options).run(&doc).unwrap();

    assert_eq!(summary.dimensions.width, 600.0);
    assert_eq!(summary.dimensions.height, 800.0);
    assert_eq!(summary.dimensions.exceptions.len(), 1);
    assert_eq!(summary.dimensions.for_page(3).width, 300.0);

    let json = read_json(&dir);
    assert_eq!(json["generator"], "pdf-extractor");
    assert_eq!(json["numpages"], 4);
    assert_eq!(json["dimensions"]["width"], 600.0);
    assert_eq!(json["dimensions"]["scale"], 1.0);
    assert_eq!(json["dimensions"]["exceptions"]["3"]["width"], 300.0);
    assert_eq!(json["dimensions"]["exceptions"]["3"]["height"], 400.0);
    assert_eq!(json["links"], serde_json::json!([]));
}

#[test]
fn test_summary_records_fonts_per_page() {
    let dir = TempDir::new().unwrap();
    let doc = MockDocument::uniform(2);

    Extractor::new(dir.path(), ExtractOptions::new().with_svg(false))
        .run(&doc)
        .unwrap();

    let json = read_json(&dir);
    let fonts = json["fonts"].as_array().unwrap();
    assert_eq!(fonts.len(), 1);
    assert_eq!(fonts[0]["sourceFamily"], "Helvetica");
    assert_eq!(fonts[0]["pages"], serde_json::json!([1, 2]));
    assert!(fonts[0]["displayFamily"]
        .as_str()
        .unwrap()
        .starts_with("'Helvetica'"));
}

#[test]
fn test_events_follow_page_loop() {
    let dir = TempDir::new().unwrap();
    let doc = MockDocument::uniform(4);
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);

    Extractor::new(dir.path(), ExtractOptions::new().with_pages(PageRange::new(3, 9)))
        .on_event(move |event| sink.borrow_mut().push(event.clone()))
        .run(&doc)
        .unwrap();

    assert_eq!(
        *events.borrow(),
        vec![
            PipelineEvent::Started {
                total_pages: 4,
                selected: 2
            },
            PipelineEvent::PageStart { number: 3 },
            PipelineEvent::PageEnd { number: 3 },
            PipelineEvent::PageStart { number: 4 },
            PipelineEvent::PageEnd { number: 4 },
            PipelineEvent::Finalizing,
            PipelineEvent::Finished,
        ]
    );
}

#[test]
fn test_empty_selection_still_writes_summary() {
    let dir = TempDir::new().unwrap();
    let doc = MockDocument::uniform(2);

    let summary = Extractor::new(dir.path(), ExtractOptions::new().with_pages(PageRange::new(5, 6)))
        .run(&doc)
        .unwrap();

    assert_eq!(summary.page_count, 2);
    assert_eq!(summary.dimensions.width, 0.0);
    assert_eq!(file_names(&dir), vec!["info.json", "stylesheet.css"]);
}
