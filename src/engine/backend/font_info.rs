//! Font resource metrics: glyph widths, vertical metrics, family names.

use lopdf::{Dictionary, Document, Object};

use super::{as_number, get_dict, resolve};
use crate::model::TextStyle;

/// Metrics of one font resource, as much as the PDF declares.
#[derive(Debug, Clone)]
pub(super) struct FontMetrics {
    /// BaseFont without a subset tag
    pub family: String,
    first_char: u32,
    /// Declared widths in glyph space (1/1000 em), starting at `first_char`
    widths: Vec<f64>,
    /// CID ranges from a Type0 `/W` array
    cid_widths: Vec<(u32, u32, f64)>,
    default_width: f64,
    /// Composite font with two-byte codes
    pub two_byte: bool,
    /// Vertical writing mode
    pub vertical: bool,
    ascent: Option<f64>,
    descent: Option<f64>,
}

impl FontMetrics {
    pub fn load(doc: &Document, font: &Dictionary) -> Self {
        let family = font
            .get(b"BaseFont")
            .ok()
            .and_then(|o| o.as_name().ok())
            .map(|n| strip_subset_tag(&String::from_utf8_lossy(n)).to_string())
            .unwrap_or_else(|| "Unknown".to_string());

        let subtype = font
            .get(b"Subtype")
            .ok()
            .and_then(|o| o.as_name().ok())
            .unwrap_or(&b"Type1"[..]);
        let two_byte = subtype == b"Type0";

        let encoding_name = font
            .get(b"Encoding")
            .ok()
            .and_then(|o| o.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).to_string())
            .unwrap_or_default();
        let vertical = two_byte && encoding_name.ends_with("-V");

        // Composite fonts keep their widths and descriptor on the descendant
        let descendant = if two_byte {
            font.get(b"DescendantFonts")
                .ok()
                .map(|o| resolve(doc, o))
                .and_then(|o| o.as_array().ok())
                .and_then(|a| a.first())
                .map(|o| resolve(doc, o))
                .and_then(|o| o.as_dict().ok())
        } else {
            None
        };

        let monospace = family.to_ascii_lowercase().contains("courier")
            || family.to_ascii_lowercase().contains("mono");

        let mut metrics = Self {
            family,
            first_char: 0,
            widths: Vec::new(),
            cid_widths: Vec::new(),
            default_width: if monospace { 600.0 } else { 500.0 },
            two_byte,
            vertical,
            ascent: None,
            descent: None,
        };

        match descendant {
            Some(cid_font) => {
                metrics.default_width = cid_font
                    .get(b"DW")
                    .ok()
                    .and_then(as_number)
                    .unwrap_or(1000.0);
                if let Ok(w) = cid_font.get(b"W") {
                    metrics.cid_widths = parse_cid_widths(doc, resolve(doc, w));
                }
                metrics.read_descriptor(doc, cid_font);
            }
            None => {
                metrics.first_char = font
                    .get(b"FirstChar")
                    .ok()
                    .and_then(as_number)
                    .map(|v| v.max(0.0) as u32)
                    .unwrap_or(0);
                if let Ok(w) = font.get(b"Widths") {
                    if let Ok(array) = resolve(doc, w).as_array() {
                        metrics.widths = array
                            .iter()
                            .map(|o| as_number(resolve(doc, o)).unwrap_or(0.0))
                            .collect();
                    }
                }
                metrics.read_descriptor(doc, font);
            }
        }

        metrics
    }

    fn read_descriptor(&mut self, doc: &Document, font: &Dictionary) {
        let Some(descriptor) = get_dict(doc, font, b"FontDescriptor") else {
            return;
        };
        self.ascent = descriptor
            .get(b"Ascent")
            .ok()
            .and_then(as_number)
            .filter(|v| *v != 0.0)
            .map(|v| v / 1000.0);
        self.descent = descriptor
            .get(b"Descent")
            .ok()
            .and_then(as_number)
            .filter(|v| *v != 0.0)
            .map(|v| v / 1000.0);
        if let Some(missing) = descriptor.get(b"MissingWidth").ok().and_then(as_number) {
            if missing > 0.0 && !self.two_byte {
                self.default_width = missing;
            }
        }
    }

    /// Split a shown string into character codes.
    pub fn codes(&self, bytes: &[u8]) -> Vec<u32> {
        if self.two_byte {
            bytes
                .chunks(2)
                .map(|c| match c {
                    [hi, lo] => (u32::from(*hi) << 8) | u32::from(*lo),
                    [single] => u32::from(*single),
                    _ => 0,
                })
                .collect()
        } else {
            bytes.iter().map(|b| u32::from(*b)).collect()
        }
    }

    /// Advance of one code as a fraction of the em.
    pub fn glyph_width(&self, code: u32) -> f64 {
        let width = if self.two_byte {
            self.cid_widths
                .iter()
                .find(|(first, last, _)| (*first..=*last).contains(&code))
                .map(|(_, _, w)| *w)
        } else {
            code.checked_sub(self.first_char)
                .and_then(|i| self.widths.get(i as usize))
                .copied()
                .filter(|w| *w > 0.0)
        };
        width.unwrap_or(self.default_width) / 1000.0
    }

    /// Style entry reported alongside text items.
    pub fn style(&self) -> TextStyle {
        TextStyle {
            font_family: self.family.clone(),
            ascent: self.ascent,
            descent: self.descent,
            vertical: self.vertical,
        }
    }
}

/// Remove a `ABCDEF+` subset tag from a font name.
pub(super) fn strip_subset_tag(name: &str) -> &str {
    match name.split_once('+') {
        Some((tag, rest)) if tag.len() == 6 && tag.bytes().all(|b| b.is_ascii_uppercase()) => rest,
        _ => name,
    }
}

/// Parse a CID `/W` array: `c [w1 w2 ...]` or `c_first c_last w`.
fn parse_cid_widths(doc: &Document, obj: &Object) -> Vec<(u32, u32, f64)> {
    let Ok(items) = obj.as_array() else {
        return Vec::new();
    };
    let mut ranges = Vec::new();
    let mut i = 0;
    while i < items.len() {
        let Some(first) = as_number(resolve(doc, &items[i])) else {
            break;
        };
        let first = first.max(0.0) as u32;
        match items.get(i + 1).map(|o| resolve(doc, o)) {
            Some(Object::Array(widths)) => {
                for (offset, w) in widths.iter().enumerate() {
                    if let Some(w) = as_number(resolve(doc, w)) {
                        let cid = first + offset as u32;
                        ranges.push((cid, cid, w));
                    }
                }
                i += 2;
            }
            Some(last) => {
                let last = as_number(last).unwrap_or(0.0).max(0.0) as u32;
                let width = items
                    .get(i + 2)
                    .and_then(|o| as_number(resolve(doc, o)))
                    .unwrap_or(0.0);
                ranges.push((first, last, width));
                i += 3;
            }
            None => break,
        }
    }
    ranges
}
