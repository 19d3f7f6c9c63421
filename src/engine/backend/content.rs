//! Content stream interpretation.
//!
//! A single pass over the page's operators produces both the positioned text
//! items and the painted vector paths. Clipping, images, shadings, and form
//! XObjects are not interpreted.

use std::collections::{BTreeMap, HashMap};

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId};
use unicode_bidi::BidiInfo;
use unicode_normalization::UnicodeNormalization;

use super::as_number;
use super::font_info::FontMetrics;
use crate::engine::{
    Color, Fill, FillRule, LineCap, LineJoin, OperatorList, PaintedPath, PathSegment, Stroke,
};
use crate::error::{Error, Result};
use crate::model::geometry::{apply_point, transform, IDENTITY};
use crate::model::{Matrix, TextContent, TextDirection, TextItem};

/// Everything extracted from one page's content.
#[derive(Debug, Clone, Default)]
pub(super) struct PageContent {
    pub text: TextContent,
    pub operators: OperatorList,
}

/// Interpret the content streams of a page.
pub(super) fn interpret(doc: &Document, page_id: ObjectId) -> Result<PageContent> {
    let fonts = doc
        .get_page_fonts(page_id)
        .map_err(|e| Error::PdfParse(e.to_string()))?;

    let data = page_content(doc, page_id)?;
    let content = Content::decode(&data).map_err(|e| Error::PdfParse(e.to_string()))?;

    let mut interpreter = Interpreter::new(doc, fonts);
    for op in &content.operations {
        interpreter.apply(op);
    }
    log::trace!(
        "Page object {:?}: {} operations, {} text items, {} paths",
        page_id,
        content.operations.len(),
        interpreter.text.items.len(),
        interpreter.operators.paths.len()
    );
    Ok(PageContent {
        text: interpreter.text,
        operators: interpreter.operators,
    })
}

/// Concatenated, decompressed content streams. Pages without content are empty.
fn page_content(doc: &Document, page_id: ObjectId) -> Result<Vec<u8>> {
    let page_dict = doc.get_dictionary(page_id)?;

    let Ok(contents) = page_dict.get(b"Contents") else {
        return Ok(Vec::new());
    };

    let stream_data = |obj: &Object| -> Option<Vec<u8>> {
        match super::resolve(doc, obj) {
            Object::Stream(s) => s
                .decompressed_content()
                .ok()
                .or_else(|| Some(s.content.clone())),
            _ => None,
        }
    };

    match super::resolve(doc, contents) {
        Object::Array(arr) => {
            let mut content = Vec::new();
            for obj in arr {
                if let Some(data) = stream_data(obj) {
                    content.extend_from_slice(&data);
                    content.push(b' ');
                }
            }
            Ok(content)
        }
        obj @ Object::Stream(_) => Ok(stream_data(obj).unwrap_or_default()),
        _ => Err(Error::PdfParse("Invalid content stream".to_string())),
    }
}

#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    fill_color: Color,
    stroke_color: Color,
    line_width: f64,
    line_cap: LineCap,
    line_join: LineJoin,
    miter_limit: f64,
    dash: Vec<f64>,
    dash_phase: f64,
    font: Option<Vec<u8>>,
    font_size: f64,
    char_spacing: f64,
    word_spacing: f64,
    horizontal_scaling: f64,
    leading: f64,
    rise: f64,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: IDENTITY,
            fill_color: Color::BLACK,
            stroke_color: Color::BLACK,
            line_width: 1.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            miter_limit: 10.0,
            dash: Vec::new(),
            dash_phase: 0.0,
            font: None,
            font_size: 12.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scaling: 1.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

/// Path under construction, already mapped to page space.
#[derive(Debug, Default)]
struct PathBuilder {
    segments: Vec<PathSegment>,
    current: Option<(f64, f64)>,
    start: Option<(f64, f64)>,
}

impl PathBuilder {
    fn move_to(&mut self, p: (f64, f64)) {
        self.segments.push(PathSegment::MoveTo(p.0, p.1));
        self.current = Some(p);
        self.start = Some(p);
    }

    fn line_to(&mut self, p: (f64, f64)) {
        if self.current.is_none() {
            self.move_to(p);
            return;
        }
        self.segments.push(PathSegment::LineTo(p.0, p.1));
        self.current = Some(p);
    }

    fn curve_to(&mut self, c1: (f64, f64), c2: (f64, f64), p: (f64, f64)) {
        if self.current.is_none() {
            self.move_to(c1);
        }
        self.segments
            .push(PathSegment::CurveTo(c1.0, c1.1, c2.0, c2.1, p.0, p.1));
        self.current = Some(p);
    }

    fn close(&mut self) {
        if self.current.is_some() {
            self.segments.push(PathSegment::Close);
            self.current = self.start;
        }
    }

    fn take(&mut self) -> Vec<PathSegment> {
        self.current = None;
        self.start = None;
        std::mem::take(&mut self.segments)
    }
}

struct Interpreter<'a> {
    doc: &'a Document,
    fonts: BTreeMap<Vec<u8>, &'a Dictionary>,
    metrics: HashMap<Vec<u8>, FontMetrics>,
    state: GraphicsState,
    stack: Vec<GraphicsState>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    in_text: bool,
    path: PathBuilder,
    text: TextContent,
    operators: OperatorList,
}

impl<'a> Interpreter<'a> {
    fn new(doc: &'a Document, fonts: BTreeMap<Vec<u8>, &'a Dictionary>) -> Self {
        Self {
            doc,
            fonts,
            metrics: HashMap::new(),
            state: GraphicsState::default(),
            stack: Vec::new(),
            text_matrix: IDENTITY,
            line_matrix: IDENTITY,
            in_text: false,
            path: PathBuilder::default(),
            text: TextContent::new(),
            operators: OperatorList::default(),
        }
    }

    fn apply(&mut self, op: &Operation) {
        let n = |i: usize| op.operands.get(i).and_then(as_number);
        let args = || -> Vec<f64> { op.operands.iter().filter_map(as_number).collect() };

        match op.operator.as_str() {
            // Graphics state
            "q" => self.stack.push(self.state.clone()),
            "Q" => {
                if let Some(state) = self.stack.pop() {
                    self.state = state;
                }
            }
            "cm" => {
                if let Some(m) = matrix_operands(&args()) {
                    self.state.ctm = transform(&self.state.ctm, &m);
                }
            }
            "w" => {
                if let Some(w) = n(0) {
                    self.state.line_width = w;
                }
            }
            "J" => {
                if let Some(style) = n(0) {
                    self.state.line_cap = LineCap::from_pdf(style as i64);
                }
            }
            "j" => {
                if let Some(style) = n(0) {
                    self.state.line_join = LineJoin::from_pdf(style as i64);
                }
            }
            "M" => {
                if let Some(limit) = n(0) {
                    self.state.miter_limit = limit.max(1.0);
                }
            }
            "d" => {
                if let Some(array) = op.operands.first().and_then(|o| o.as_array().ok()) {
                    self.state.dash = array.iter().filter_map(as_number).collect();
                    self.state.dash_phase = n(1).unwrap_or(0.0);
                }
            }

            // Color
            "g" | "rg" | "k" | "sc" | "scn" => {
                if let Some(color) = color_operands(&args()) {
                    self.state.fill_color = color;
                }
            }
            "G" | "RG" | "K" | "SC" | "SCN" => {
                if let Some(color) = color_operands(&args()) {
                    self.state.stroke_color = color;
                }
            }
            "cs" => self.state.fill_color = Color::BLACK,
            "CS" => self.state.stroke_color = Color::BLACK,

            // Path construction
            "m" => {
                if let (Some(x), Some(y)) = (n(0), n(1)) {
                    let p = self.to_page(x, y);
                    self.path.move_to(p);
                }
            }
            "l" => {
                if let (Some(x), Some(y)) = (n(0), n(1)) {
                    let p = self.to_page(x, y);
                    self.path.line_to(p);
                }
            }
            "c" => {
                let a = args();
                if a.len() >= 6 {
                    let c1 = self.to_page(a[0], a[1]);
                    let c2 = self.to_page(a[2], a[3]);
                    let p = self.to_page(a[4], a[5]);
                    self.path.curve_to(c1, c2, p);
                }
            }
            "v" => {
                let a = args();
                if a.len() >= 4 {
                    let c2 = self.to_page(a[0], a[1]);
                    let p = self.to_page(a[2], a[3]);
                    let c1 = self.path.current.unwrap_or(c2);
                    self.path.curve_to(c1, c2, p);
                }
            }
            "y" => {
                let a = args();
                if a.len() >= 4 {
                    let c1 = self.to_page(a[0], a[1]);
                    let p = self.to_page(a[2], a[3]);
                    self.path.curve_to(c1, p, p);
                }
            }
            "h" => self.path.close(),
            "re" => {
                let a = args();
                if a.len() >= 4 {
                    let (x, y, w, h) = (a[0], a[1], a[2], a[3]);
                    let corners = [
                        self.to_page(x, y),
                        self.to_page(x + w, y),
                        self.to_page(x + w, y + h),
                        self.to_page(x, y + h),
                    ];
                    self.path.move_to(corners[0]);
                    for corner in &corners[1..] {
                        self.path.line_to(*corner);
                    }
                    self.path.close();
                }
            }

            // Path painting
            "S" => self.paint(false, None, true),
            "s" => self.paint(true, None, true),
            "f" | "F" => self.paint(false, Some(FillRule::NonZero), false),
            "f*" => self.paint(false, Some(FillRule::EvenOdd), false),
            "B" => self.paint(false, Some(FillRule::NonZero), true),
            "B*" => self.paint(false, Some(FillRule::EvenOdd), true),
            "b" => self.paint(true, Some(FillRule::NonZero), true),
            "b*" => self.paint(true, Some(FillRule::EvenOdd), true),
            "n" => {
                self.path.take();
            }
            "W" | "W*" => {}

            // Text state
            "Tc" => self.state.char_spacing = n(0).unwrap_or(0.0),
            "Tw" => self.state.word_spacing = n(0).unwrap_or(0.0),
            "Tz" => self.state.horizontal_scaling = n(0).unwrap_or(100.0) / 100.0,
            "TL" => self.state.leading = n(0).unwrap_or(0.0),
            "Ts" => self.state.rise = n(0).unwrap_or(0.0),
            "Tf" => {
                if let Some(Object::Name(font_name)) = op.operands.first() {
                    self.state.font = Some(font_name.clone());
                }
                if let Some(size) = n(1) {
                    self.state.font_size = size;
                }
            }

            // Text positioning
            "BT" => {
                self.in_text = true;
                self.text_matrix = IDENTITY;
                self.line_matrix = IDENTITY;
            }
            "ET" => self.in_text = false,
            "Td" => {
                if let (Some(tx), Some(ty)) = (n(0), n(1)) {
                    self.next_line(tx, ty);
                }
            }
            "TD" => {
                if let (Some(tx), Some(ty)) = (n(0), n(1)) {
                    self.state.leading = -ty;
                    self.next_line(tx, ty);
                }
            }
            "Tm" => {
                if let Some(m) = matrix_operands(&args()) {
                    self.text_matrix = m;
                    self.line_matrix = m;
                }
            }
            "T*" => self.next_line(0.0, -self.state.leading),

            // Text showing
            "Tj" => {
                if let Some(Object::String(bytes, _)) = op.operands.first() {
                    self.show_text(&[TextPart::Glyphs(bytes)]);
                }
            }
            "TJ" => {
                if let Some(Object::Array(arr)) = op.operands.first() {
                    let parts: Vec<TextPart<'_>> = arr
                        .iter()
                        .filter_map(|item| match item {
                            Object::String(bytes, _) => Some(TextPart::Glyphs(bytes)),
                            other => as_number(other).map(TextPart::Adjust),
                        })
                        .collect();
                    self.show_text(&parts);
                }
            }
            "'" => {
                self.next_line(0.0, -self.state.leading);
                if let Some(Object::String(bytes, _)) = op.operands.first() {
                    self.show_text(&[TextPart::Glyphs(bytes)]);
                }
            }
            "\"" => {
                if let (Some(aw), Some(ac)) = (n(0), n(1)) {
                    self.state.word_spacing = aw;
                    self.state.char_spacing = ac;
                }
                self.next_line(0.0, -self.state.leading);
                if let Some(Object::String(bytes, _)) = op.operands.get(2) {
                    self.show_text(&[TextPart::Glyphs(bytes)]);
                }
            }

            "Do" => log::trace!("XObject {:?} not interpreted", op.operands.first()),
            _ => {}
        }
    }

    fn to_page(&self, x: f64, y: f64) -> (f64, f64) {
        apply_point(&self.state.ctm, x, y)
    }

    fn next_line(&mut self, tx: f64, ty: f64) {
        self.line_matrix = transform(&self.line_matrix, &[1.0, 0.0, 0.0, 1.0, tx, ty]);
        self.text_matrix = self.line_matrix;
    }

    fn paint(&mut self, close: bool, fill: Option<FillRule>, stroke: bool) {
        if close {
            self.path.close();
        }
        let segments = self.path.take();
        if segments.is_empty() {
            return;
        }

        let ctm = &self.state.ctm;
        let scale = (ctm[0] * ctm[3] - ctm[1] * ctm[2]).abs().sqrt();
        self.operators.paths.push(PaintedPath {
            segments,
            fill: fill.map(|rule| Fill {
                color: self.state.fill_color,
                rule,
            }),
            stroke: stroke.then(|| Stroke {
                color: self.state.stroke_color,
                width: self.state.line_width * scale,
                cap: self.state.line_cap,
                join: self.state.line_join,
                miter_limit: self.state.miter_limit,
                dash: self.state.dash.iter().map(|d| d * scale).collect(),
                dash_phase: self.state.dash_phase * scale,
            }),
        });
    }

    fn font_metrics(&mut self, key: &[u8]) -> FontMetrics {
        if let Some(metrics) = self.metrics.get(key) {
            return metrics.clone();
        }
        let metrics = match self.fonts.get(key) {
            Some(dict) => FontMetrics::load(self.doc, dict),
            None => {
                log::debug!(
                    "Font /{} missing from page resources",
                    String::from_utf8_lossy(key)
                );
                FontMetrics::load(self.doc, &Dictionary::new())
            }
        };
        self.metrics.insert(key.to_vec(), metrics.clone());
        metrics
    }

    fn decode(&self, key: &[u8], bytes: &[u8]) -> String {
        let encoding = self
            .fonts
            .get(key)
            .and_then(|f| f.get_font_encoding(self.doc).ok());
        match encoding {
            Some(ref enc) => Document::decode_text(enc, bytes)
                .unwrap_or_else(|_| decode_text_simple(bytes)),
            None => decode_text_simple(bytes),
        }
    }

    /// Show glyph strings with interleaved kerning adjustments as one text item.
    fn show_text(&mut self, parts: &[TextPart<'_>]) {
        let Some(key) = self.state.font.clone() else {
            log::debug!("Text shown before any font was selected");
            return;
        };
        let metrics = self.font_metrics(&key);
        let font_size = self.state.font_size;
        let h_scale = self.state.horizontal_scaling;

        let start_matrix = self.text_matrix;
        let mut text = String::new();
        let mut advance = 0.0;

        for part in parts {
            match part {
                TextPart::Glyphs(bytes) => {
                    text.push_str(&self.decode(&key, bytes));
                    for code in metrics.codes(bytes) {
                        let mut w = metrics.glyph_width(code) * font_size + self.state.char_spacing;
                        if !metrics.two_byte && code == 32 {
                            w += self.state.word_spacing;
                        }
                        advance += if metrics.vertical { w } else { w * h_scale };
                    }
                }
                TextPart::Adjust(amount) => {
                    let shift = amount / 1000.0 * font_size;
                    advance -= if metrics.vertical { shift } else { shift * h_scale };
                    // Wide negative kerning stands in for a word space
                    if *amount < -WORD_GAP_THRESHOLD
                        && !text.is_empty()
                        && !text.ends_with(char::is_whitespace)
                        && !text.chars().last().is_some_and(is_spaceless_script_char)
                    {
                        text.push(' ');
                    }
                }
            }
        }

        let step = if metrics.vertical {
            [1.0, 0.0, 0.0, 1.0, 0.0, -advance]
        } else {
            [1.0, 0.0, 0.0, 1.0, advance, 0.0]
        };
        self.text_matrix = transform(&self.text_matrix, &step);

        if !self.in_text || text.is_empty() {
            return;
        }

        let base = transform(&self.state.ctm, &start_matrix);
        let text_rendering = transform(
            &base,
            &[font_size * h_scale, 0.0, 0.0, font_size, 0.0, self.state.rise],
        );
        let width = if metrics.vertical {
            advance * base[2].hypot(base[3])
        } else {
            advance * base[0].hypot(base[1])
        };

        let font_name = String::from_utf8_lossy(&key).to_string();
        self.text
            .styles
            .entry(font_name.clone())
            .or_insert_with(|| metrics.style());

        let text = normalize_ligatures(&text);
        let dir = if metrics.vertical {
            TextDirection::Ttb
        } else {
            text_direction(&text)
        };

        self.text.items.push(TextItem {
            text,
            dir,
            transform: text_rendering,
            width: width.abs(),
            height: text_rendering[2].hypot(text_rendering[3]),
            font_name,
        });
    }
}

/// Kerning (in thousandths of an em) wide enough to read as a word break.
const WORD_GAP_THRESHOLD: f64 = 200.0;

enum TextPart<'o> {
    Glyphs(&'o [u8]),
    Adjust(f64),
}

fn matrix_operands(values: &[f64]) -> Option<Matrix> {
    (values.len() >= 6).then(|| {
        [
            values[0], values[1], values[2], values[3], values[4], values[5],
        ]
    })
}

/// Interpret color operands by component count: gray, RGB, or CMYK.
fn color_operands(values: &[f64]) -> Option<Color> {
    match *values {
        [gray] => Some(Color::from_unit(gray, gray, gray)),
        [r, g, b] => Some(Color::from_unit(r, g, b)),
        [c, m, y, k] => Some(Color::from_unit(
            (1.0 - c) * (1.0 - k),
            (1.0 - m) * (1.0 - k),
            (1.0 - y) * (1.0 - k),
        )),
        _ => None,
    }
}

fn text_direction(text: &str) -> TextDirection {
    let info = BidiInfo::new(text, None);
    match info.paragraphs.first() {
        Some(para) if para.level.is_rtl() => TextDirection::Rtl,
        _ => TextDirection::Ltr,
    }
}

/// Expand presentation-form ligatures (U+FB00..U+FB06) to plain letters.
fn normalize_ligatures(text: &str) -> String {
    if !text.chars().any(is_ligature) {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + 4);
    for c in text.chars() {
        if is_ligature(c) {
            out.extend(c.to_string().nfkc());
        } else {
            out.push(c);
        }
    }
    out
}

fn is_ligature(c: char) -> bool {
    ('\u{FB00}'..='\u{FB06}').contains(&c)
}

/// Scripts that do not separate words with spaces.
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and extensions
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana, Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}

/// Decoding fallback when the font has no usable encoding.
fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Stream};

    /// One-page document using Helvetica as /F1.
    fn document_with_content(ops: Vec<Operation>) -> (Document, ObjectId) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content = Content { operations: ops };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().unwrap_or_default(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 200.into(), 100.into()],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        (doc, page_id)
    }

    #[test]
    fn test_text_items_carry_rendering_matrix() {
        let (doc, page_id) = document_with_content(vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 10.into()]),
            Operation::new("Td", vec![20.into(), 50.into()]),
            Operation::new("Tj", vec![Object::string_literal("Hello")]),
            Operation::new("Tj", vec![Object::string_literal("World")]),
            Operation::new("ET", vec![]),
        ]);
        let content = interpret(&doc, page_id).unwrap();
        let items = &content.text.items;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].text, "Hello");
        assert_eq!(items[0].transform, [10.0, 0.0, 0.0, 10.0, 20.0, 50.0]);
        assert_eq!(items[0].font_name, "F1");
        assert!((items[0].height - 10.0).abs() < 1e-9);
        // Five glyphs at the half-em fallback width
        assert!((items[0].width - 25.0).abs() < 1e-9);
        // The second string starts where the first one ended
        assert!((items[1].transform[4] - 45.0).abs() < 1e-9);

        let style = &content.text.styles["F1"];
        assert_eq!(style.font_family, "Helvetica");
    }

    #[test]
    fn test_tj_kerning_inserts_word_space() {
        let (doc, page_id) = document_with_content(vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 10.into()]),
            Operation::new(
                "TJ",
                vec![Object::Array(vec![
                    Object::string_literal("Hello"),
                    Object::Integer(-300),
                    Object::string_literal("World"),
                    Object::Integer(-50),
                    Object::string_literal("!"),
                ])],
            ),
            Operation::new("ET", vec![]),
        ]);
        let content = interpret(&doc, page_id).unwrap();
        assert_eq!(content.text.items.len(), 1);
        assert_eq!(content.text.items[0].text, "Hello World!");
    }

    #[test]
    fn test_paths_are_mapped_through_ctm() {
        let (doc, page_id) = document_with_content(vec![
            Operation::new("q", vec![]),
            Operation::new("cm", vec![2.into(), 0.into(), 0.into(), 2.into(), 10.into(), 10.into()]),
            Operation::new("rg", vec![1.into(), 0.into(), 0.into()]),
            Operation::new("re", vec![0.into(), 0.into(), 5.into(), 5.into()]),
            Operation::new("f", vec![]),
            Operation::new("Q", vec![]),
            Operation::new("m", vec![0.into(), 0.into()]),
            Operation::new("l", vec![10.into(), 0.into()]),
            Operation::new("S", vec![]),
        ]);
        let content = interpret(&doc, page_id).unwrap();
        let paths = &content.operators.paths;
        assert_eq!(paths.len(), 2);

        let fill = paths[0].fill.unwrap();
        assert_eq!(fill.color, Color::rgb(255, 0, 0));
        assert_eq!(paths[0].segments[0], PathSegment::MoveTo(10.0, 10.0));
        assert_eq!(paths[0].segments[2], PathSegment::LineTo(20.0, 20.0));
        assert!(paths[0].stroke.is_none());

        // Restored state: identity CTM, black stroke
        let stroke = paths[1].stroke.clone().unwrap();
        assert_eq!(stroke.color, Color::BLACK);
        assert!((stroke.width - 1.0).abs() < 1e-9);
        assert_eq!(paths[1].segments[1], PathSegment::LineTo(10.0, 0.0));
    }

    #[test]
    fn test_line_style_operators_reach_stroke() {
        let (doc, page_id) = document_with_content(vec![
            Operation::new("cm", vec![2.into(), 0.into(), 0.into(), 2.into(), 0.into(), 0.into()]),
            Operation::new("J", vec![1.into()]),
            Operation::new("j", vec![2.into()]),
            Operation::new("M", vec![4.into()]),
            Operation::new("d", vec![Object::Array(vec![3.into(), 1.into()]), 2.into()]),
            Operation::new("m", vec![0.into(), 0.into()]),
            Operation::new("l", vec![10.into(), 0.into()]),
            Operation::new("S", vec![]),
        ]);
        let content = interpret(&doc, page_id).unwrap();
        let stroke = content.operators.paths[0].stroke.clone().unwrap();

        assert_eq!(stroke.cap, LineCap::Round);
        assert_eq!(stroke.join, LineJoin::Bevel);
        assert_eq!(stroke.miter_limit, 4.0);
        assert_eq!(stroke.dash, vec![6.0, 2.0]);
        assert_eq!(stroke.dash_phase, 4.0);
        assert!((stroke.width - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_text_outside_bt_is_not_reported() {
        let (doc, page_id) = document_with_content(vec![
            Operation::new("Tf", vec!["F1".into(), 10.into()]),
            Operation::new("Tj", vec![Object::string_literal("stray")]),
        ]);
        let content = interpret(&doc, page_id).unwrap();
        assert!(content.text.items.is_empty());
    }

    #[test]
    fn test_color_operands() {
        assert_eq!(color_operands(&[0.0]), Some(Color::BLACK));
        assert_eq!(color_operands(&[0.0, 0.0, 0.0, 0.0]), Some(Color::WHITE));
        assert_eq!(color_operands(&[1.0, 1.0]), None);
    }

    #[test]
    fn test_normalize_ligatures() {
        assert_eq!(normalize_ligatures("\u{FB01}nance"), "finance");
        assert_eq!(normalize_ligatures("plain"), "plain");
    }

    #[test]
    fn test_text_direction() {
        assert_eq!(text_direction("hello"), TextDirection::Ltr);
        assert_eq!(text_direction("שלום"), TextDirection::Rtl);
    }

    #[test]
    fn test_decode_text_simple() {
        assert_eq!(decode_text_simple(b"abc"), "abc");
        assert_eq!(decode_text_simple(&[0xFE, 0xFF, 0x00, 0x41]), "A");
        assert_eq!(decode_text_simple(&[0xE9]), "é");
    }
}
