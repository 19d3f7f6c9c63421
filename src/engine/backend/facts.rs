//! Document-level facts: Info dictionary, outline, page labels, named destinations.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use lopdf::{Dictionary, Document, Object, ObjectId};

use super::{as_number, get_dict, resolve};
use crate::model::{Metadata, Outline, OutlineItem};

/// Guard against malformed trees that never terminate.
const MAX_TREE_DEPTH: usize = 64;

pub(super) fn metadata(doc: &Document) -> Metadata {
    let mut metadata = Metadata::with_version(doc.version.to_string());

    if let Some(info) = get_dict(doc, &doc.trailer, b"Info") {
        metadata.title = get_string_from_dict(info, b"Title");
        metadata.author = get_string_from_dict(info, b"Author");
        metadata.subject = get_string_from_dict(info, b"Subject");
        metadata.keywords = get_string_from_dict(info, b"Keywords");
        metadata.creator = get_string_from_dict(info, b"Creator");
        metadata.producer = get_string_from_dict(info, b"Producer");
        metadata.created =
            get_string_from_dict(info, b"CreationDate").and_then(|d| parse_pdf_date(&d));
        metadata.modified = get_string_from_dict(info, b"ModDate").and_then(|d| parse_pdf_date(&d));
    }

    metadata
}

pub(super) fn outline(doc: &Document, pages: &BTreeMap<u32, ObjectId>) -> Outline {
    let mut outline = Outline::new();
    let Ok(catalog) = doc.catalog() else {
        return outline;
    };
    let Some(root) = get_dict(doc, catalog, b"Outlines") else {
        return outline;
    };

    let resolver = DestinationResolver::new(doc, pages);
    let mut visited = HashSet::new();
    if let Ok(first) = root.get(b"First").and_then(Object::as_reference) {
        outline_items(doc, &resolver, first, 0, &mut visited, &mut outline.items);
    }
    outline
}

fn outline_items(
    doc: &Document,
    resolver: &DestinationResolver<'_>,
    first: ObjectId,
    level: u8,
    visited: &mut HashSet<ObjectId>,
    items: &mut Vec<OutlineItem>,
) {
    if usize::from(level) >= MAX_TREE_DEPTH {
        return;
    }

    // Siblings are walked iteratively; only children recurse
    let mut next = Some(first);
    while let Some(id) = next {
        if !visited.insert(id) {
            log::debug!("Outline cycle at object {:?}", id);
            break;
        }
        let Ok(dict) = doc.get_dictionary(id) else {
            break;
        };

        let title = get_string_from_dict(dict, b"Title").unwrap_or_default();
        let page = outline_target(doc, resolver, dict);
        let mut item = OutlineItem::new(title, page, level);

        if let Ok(child) = dict.get(b"First").and_then(Object::as_reference) {
            outline_items(doc, resolver, child, level + 1, visited, &mut item.children);
        }
        items.push(item);

        next = dict.get(b"Next").and_then(Object::as_reference).ok();
    }
}

fn outline_target(doc: &Document, resolver: &DestinationResolver<'_>, item: &Dictionary) -> Option<u32> {
    if let Ok(dest) = item.get(b"Dest") {
        return resolver.resolve(dest);
    }
    let action = get_dict(doc, item, b"A")?;
    resolver.resolve(action.get(b"D").ok()?)
}

/// Maps destination objects (explicit arrays or names) to page numbers.
struct DestinationResolver<'a> {
    doc: &'a Document,
    page_numbers: HashMap<ObjectId, u32>,
    named: BTreeMap<String, &'a Object>,
}

impl<'a> DestinationResolver<'a> {
    fn new(doc: &'a Document, pages: &BTreeMap<u32, ObjectId>) -> Self {
        Self {
            doc,
            page_numbers: pages.iter().map(|(num, id)| (*id, *num)).collect(),
            named: named_destinations(doc),
        }
    }

    fn resolve(&self, dest: &Object) -> Option<u32> {
        match resolve(self.doc, dest) {
            Object::Array(array) => match array.first()? {
                Object::Reference(id) => self.page_numbers.get(id).copied(),
                // Remote-style destinations carry a 0-based page index
                other => as_number(other)
                    .and_then(|i| u32::try_from(i as i64).ok())
                    .and_then(|i| i.checked_add(1)),
            },
            Object::Dictionary(dict) => self.resolve(dict.get(b"D").ok()?),
            Object::Name(name) | Object::String(name, _) => {
                let key = String::from_utf8_lossy(name);
                let target = self.named.get(&*key)?;
                // Named entries point at arrays or `<< /D [...] >>`, never at other names
                match resolve(self.doc, target) {
                    Object::Name(_) | Object::String(..) => None,
                    _ => self.resolve(target),
                }
            }
            _ => None,
        }
    }
}

pub(super) fn destinations(
    doc: &Document,
    pages: &BTreeMap<u32, ObjectId>,
) -> BTreeMap<String, Option<u32>> {
    let resolver = DestinationResolver::new(doc, pages);
    resolver
        .named
        .iter()
        .map(|(name, dest)| (name.clone(), resolver.resolve(dest)))
        .collect()
}

/// Collect `/Dests` from the catalog and the `/Names` name tree.
fn named_destinations(doc: &Document) -> BTreeMap<String, &Object> {
    let mut named = BTreeMap::new();
    let Ok(catalog) = doc.catalog() else {
        return named;
    };

    if let Some(dests) = get_dict(doc, catalog, b"Dests") {
        for (name, dest) in dests.iter() {
            named.insert(String::from_utf8_lossy(name).to_string(), dest);
        }
    }

    if let Some(tree) = get_dict(doc, catalog, b"Names").and_then(|n| get_dict(doc, n, b"Dests")) {
        walk_name_tree(doc, tree, 0, &mut named);
    }
    named
}

fn walk_name_tree<'a>(
    doc: &'a Document,
    node: &'a Dictionary,
    depth: usize,
    out: &mut BTreeMap<String, &'a Object>,
) {
    if depth >= MAX_TREE_DEPTH {
        return;
    }
    if let Ok(names) = node.get(b"Names").map(|o| resolve(doc, o)).and_then(Object::as_array) {
        for pair in names.chunks_exact(2) {
            if let Object::String(key, _) = resolve(doc, &pair[0]) {
                out.insert(decode_pdf_string(key), &pair[1]);
            }
        }
    }
    if let Ok(kids) = node.get(b"Kids").map(|o| resolve(doc, o)).and_then(Object::as_array) {
        for kid in kids {
            if let Object::Dictionary(kid) = resolve(doc, kid) {
                walk_name_tree(doc, kid, depth + 1, out);
            }
        }
    }
}

/// Numbering style of a page label range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LabelStyle {
    Decimal,
    UpperRoman,
    LowerRoman,
    UpperLetters,
    LowerLetters,
    None,
}

#[derive(Debug, Clone)]
struct LabelRange {
    start_index: u32,
    style: LabelStyle,
    prefix: String,
    first_value: u32,
}

pub(super) fn page_labels(doc: &Document, page_count: u32) -> Vec<String> {
    let Ok(catalog) = doc.catalog() else {
        return Vec::new();
    };
    let Some(tree) = get_dict(doc, catalog, b"PageLabels") else {
        return Vec::new();
    };

    let mut ranges = Vec::new();
    collect_label_ranges(doc, tree, 0, &mut ranges);
    if ranges.is_empty() {
        return Vec::new();
    }
    ranges.sort_by_key(|r| r.start_index);

    (0..page_count)
        .map(|index| {
            match ranges.iter().rev().find(|r| r.start_index <= index) {
                Some(range) => format_label(range, index),
                // Pages before the first range have no label of their own
                None => (index + 1).to_string(),
            }
        })
        .collect()
}

fn collect_label_ranges(doc: &Document, node: &Dictionary, depth: usize, out: &mut Vec<LabelRange>) {
    if depth >= MAX_TREE_DEPTH {
        return;
    }
    if let Ok(nums) = node.get(b"Nums").map(|o| resolve(doc, o)).and_then(Object::as_array) {
        for pair in nums.chunks_exact(2) {
            let Some(start_index) = as_number(resolve(doc, &pair[0]))
                .and_then(|n| u32::try_from(n as i64).ok())
            else {
                continue;
            };
            let Object::Dictionary(label) = resolve(doc, &pair[1]) else {
                continue;
            };
            let style = match label.get(b"S").ok().and_then(|s| s.as_name().ok()) {
                Some(b"D") => LabelStyle::Decimal,
                Some(b"R") => LabelStyle::UpperRoman,
                Some(b"r") => LabelStyle::LowerRoman,
                Some(b"A") => LabelStyle::UpperLetters,
                Some(b"a") => LabelStyle::LowerLetters,
                _ => LabelStyle::None,
            };
            out.push(LabelRange {
                start_index,
                style,
                prefix: get_string_from_dict(label, b"P").unwrap_or_default(),
                first_value: label
                    .get(b"St")
                    .ok()
                    .and_then(as_number)
                    .and_then(|v| u32::try_from(v as i64).ok())
                    .map(|v| v.max(1))
                    .unwrap_or(1),
            });
        }
    }
    if let Ok(kids) = node.get(b"Kids").map(|o| resolve(doc, o)).and_then(Object::as_array) {
        for kid in kids {
            if let Object::Dictionary(kid) = resolve(doc, kid) {
                collect_label_ranges(doc, kid, depth + 1, out);
            }
        }
    }
}

fn format_label(range: &LabelRange, index: u32) -> String {
    let Some(value) = range
        .first_value
        .checked_add(index.saturating_sub(range.start_index))
    else {
        // Past the largest label value; fall back to the page number
        return (index + 1).to_string();
    };
    let number = match range.style {
        LabelStyle::Decimal => value.to_string(),
        LabelStyle::UpperRoman => to_roman(value),
        LabelStyle::LowerRoman => to_roman(value).to_lowercase(),
        LabelStyle::UpperLetters => to_letters(value),
        LabelStyle::LowerLetters => to_letters(value).to_lowercase(),
        LabelStyle::None => String::new(),
    };
    format!("{}{}", range.prefix, number)
}

fn to_roman(mut value: u32) -> String {
    const NUMERALS: [(u32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let mut out = String::new();
    for (amount, numeral) in NUMERALS {
        while value >= amount {
            out.push_str(numeral);
            value -= amount;
        }
    }
    out
}

/// A..Z, then AA..ZZ, AAA..., repeating one letter.
fn to_letters(value: u32) -> String {
    if value == 0 {
        return String::new();
    }
    let letter = char::from(b'A' + ((value - 1) % 26) as u8);
    let count = ((value - 1) / 26 + 1) as usize;
    std::iter::repeat(letter).take(count).collect()
}

/// Decode a PDF text string (UTF-16BE with BOM, UTF-8, or Latin-1).
fn decode_pdf_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Helper to get a string from a PDF dictionary.
fn get_string_from_dict(dict: &Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key).ok()? {
        Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
        Object::Name(bytes) => String::from_utf8(bytes.clone()).ok(),
        _ => None,
    }
}

/// Parse a PDF date string (D:YYYYMMDDHHmmSSOHH'mm').
fn parse_pdf_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    let s = s.strip_prefix("D:").unwrap_or(s);

    if s.len() < 4 {
        return None;
    }

    let field = |range: std::ops::Range<usize>, default: u32| -> u32 {
        s.get(range).and_then(|v| v.parse().ok()).unwrap_or(default)
    };
    let year: i32 = s.get(0..4)?.parse().ok()?;
    let naive = NaiveDate::from_ymd_opt(year, field(4..6, 1), field(6..8, 1))?.and_hms_opt(
        field(8..10, 0),
        field(10..12, 0),
        field(12..14, 0),
    )?;

    // Offset: Z, or +HH'mm' / -HH'mm'
    let offset_seconds = match s.get(14..15) {
        Some(sign @ ("+" | "-")) => {
            let digits: String = s[15..].chars().filter(char::is_ascii_digit).collect();
            let hours: i32 = digits.get(0..2).and_then(|h| h.parse().ok()).unwrap_or(0);
            let minutes: i32 = digits.get(2..4).and_then(|m| m.parse().ok()).unwrap_or(0);
            let total = hours * 3600 + minutes * 60;
            if sign == "-" {
                -total
            } else {
                total
            }
        }
        _ => 0,
    };

    let offset = FixedOffset::east_opt(offset_seconds)?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}
