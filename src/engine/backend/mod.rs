//! Page engine backed by `lopdf`.

mod content;
mod facts;
mod font_info;

use std::cell::OnceCell;
use std::collections::BTreeMap;

use lopdf::{Dictionary, Document, Object, ObjectId};

use super::{OperatorList, PdfDocument, PdfPage};
use crate::detect::{detect_format, PdfFormat};
use crate::error::{Error, Result};
use crate::model::{Metadata, Outline, TextContent};

use content::PageContent;

/// US Letter, used when a page carries no usable MediaBox.
const DEFAULT_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

/// A PDF opened with `lopdf`.
pub struct PdfFile {
    doc: Document,
    pages: BTreeMap<u32, ObjectId>,
    format: PdfFormat,
}

impl PdfFile {
    /// Parse a PDF held in memory.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let format = detect_format(data)?;
        let doc = Document::load_mem(data)?;
        let pages = doc.get_pages();
        log::debug!(
            "Opened {} with {} pages (encrypted: {})",
            format,
            pages.len(),
            doc.is_encrypted()
        );
        Ok(Self { doc, pages, format })
    }

    /// Header information found before parsing.
    pub fn format(&self) -> &PdfFormat {
        &self.format
    }

    /// The underlying `lopdf` document.
    pub fn inner(&self) -> &Document {
        &self.doc
    }
}

impl std::fmt::Debug for PdfFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfFile")
            .field("format", &self.format)
            .field("pages", &self.pages.len())
            .finish()
    }
}

impl PdfDocument for PdfFile {
    fn num_pages(&self) -> u32 {
        self.pages.len() as u32
    }

    fn get_page(&self, number: u32) -> Result<Box<dyn PdfPage + '_>> {
        let id = *self
            .pages
            .get(&number)
            .ok_or(Error::PageOutOfRange(number, self.num_pages()))?;
        Ok(Box::new(LopdfPage::new(&self.doc, id, number)?))
    }

    fn metadata(&self) -> Result<Metadata> {
        Ok(facts::metadata(&self.doc))
    }

    fn outline(&self) -> Result<Outline> {
        Ok(facts::outline(&self.doc, &self.pages))
    }

    fn page_labels(&self) -> Result<Vec<String>> {
        Ok(facts::page_labels(&self.doc, self.num_pages()))
    }

    fn destinations(&self) -> Result<BTreeMap<String, Option<u32>>> {
        Ok(facts::destinations(&self.doc, &self.pages))
    }
}

/// One page of a [`PdfFile`]. The content stream is interpreted at most once.
struct LopdfPage<'a> {
    doc: &'a Document,
    id: ObjectId,
    number: u32,
    view_box: [f64; 4],
    rotation: i32,
    content: OnceCell<PageContent>,
}

impl<'a> LopdfPage<'a> {
    fn new(doc: &'a Document, id: ObjectId, number: u32) -> Result<Self> {
        let dict = doc.get_dictionary(id)?;

        let media_box = inherited(doc, dict, b"MediaBox")
            .and_then(as_rect)
            .unwrap_or(DEFAULT_MEDIA_BOX);
        let view_box = match inherited(doc, dict, b"CropBox").and_then(as_rect) {
            Some(crop) => intersect(crop, media_box).unwrap_or(media_box),
            None => media_box,
        };

        let rotation = inherited(doc, dict, b"Rotate")
            .and_then(as_number)
            .map(|r| r as i32)
            .filter(|r| r % 90 == 0)
            .unwrap_or(0)
            .rem_euclid(360);

        Ok(Self {
            doc,
            id,
            number,
            view_box,
            rotation,
            content: OnceCell::new(),
        })
    }

    fn content(&self) -> Result<&PageContent> {
        if let Some(content) = self.content.get() {
            return Ok(content);
        }
        let parsed = content::interpret(self.doc, self.id)?;
        Ok(self.content.get_or_init(|| parsed))
    }
}

impl PdfPage for LopdfPage<'_> {
    fn number(&self) -> u32 {
        self.number
    }

    fn view_box(&self) -> [f64; 4] {
        self.view_box
    }

    fn rotation(&self) -> i32 {
        self.rotation
    }

    fn text_content(&self) -> Result<TextContent> {
        Ok(self.content()?.text.clone())
    }

    fn operator_list(&self) -> Result<OperatorList> {
        Ok(self.content()?.operators.clone())
    }
}

/// Follow indirect references to the object they point at.
pub(super) fn resolve<'a>(doc: &'a Document, mut obj: &'a Object) -> &'a Object {
    for _ in 0..16 {
        match obj {
            Object::Reference(id) => match doc.get_object(*id) {
                Ok(target) => obj = target,
                Err(_) => break,
            },
            _ => break,
        }
    }
    obj
}

/// Resolve a dictionary entry that may be stored directly or by reference.
pub(super) fn get_dict<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Dictionary> {
    let obj = resolve(doc, dict.get(key).ok()?);
    match obj {
        Object::Dictionary(d) => Some(d),
        Object::Stream(s) => Some(&s.dict),
        _ => None,
    }
}

/// Numeric value of an integer or real object.
pub(super) fn as_number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

/// Normalized `[x0, y0, x1, y1]` rectangle.
fn as_rect(obj: &Object) -> Option<[f64; 4]> {
    let array = obj.as_array().ok()?;
    if array.len() < 4 {
        return None;
    }
    let mut values = [0.0; 4];
    for (slot, item) in values.iter_mut().zip(array) {
        *slot = as_number(item)?;
    }
    let rect = [
        values[0].min(values[2]),
        values[1].min(values[3]),
        values[0].max(values[2]),
        values[1].max(values[3]),
    ];
    (rect[2] > rect[0] && rect[3] > rect[1]).then_some(rect)
}

fn intersect(a: [f64; 4], b: [f64; 4]) -> Option<[f64; 4]> {
    let rect = [a[0].max(b[0]), a[1].max(b[1]), a[2].min(b[2]), a[3].min(b[3])];
    (rect[2] > rect[0] && rect[3] > rect[1]).then_some(rect)
}

/// Look up a page attribute, walking up the page tree when it is inherited.
fn inherited<'a>(doc: &'a Document, page: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    let mut dict = page;
    for _ in 0..32 {
        if let Ok(obj) = dict.get(key) {
            return Some(resolve(doc, obj));
        }
        let parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
        dict = doc.get_dictionary(parent).ok()?;
    }
    None
}
