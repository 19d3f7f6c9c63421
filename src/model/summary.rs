//! Document summary types persisted as `info.json`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::DocumentFacts;

/// Generator name recorded in every summary.
pub const GENERATOR: &str = "pdf-extractor";

/// Width, height, and optional render scale of a page.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in device units, rounded to 2 decimals
    pub width: f64,
    /// Height in device units, rounded to 2 decimals
    pub height: f64,
    /// Scale the page was observed at
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub scale: Option<f64>,
}

impl Dimensions {
    /// Create dimensions with a known scale.
    pub fn new(width: f64, height: f64, scale: Option<f64>) -> Self {
        Self {
            width,
            height,
            scale,
        }
    }

    /// Whether two dimensions share the same width and height.
    pub fn same_size(&self, other: &Dimensions) -> bool {
        self.width == other.width && self.height == other.height
    }
}

/// Canonical page size plus pages that deviate from it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentDimensions {
    /// Canonical width
    pub width: f64,
    /// Canonical height
    pub height: f64,
    /// Canonical scale
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub scale: Option<f64>,
    /// Page number to its own dimensions, for pages not matching the canonical size
    pub exceptions: BTreeMap<u32, Dimensions>,
}

impl DocumentDimensions {
    /// The canonical dimensions without the exception table.
    pub fn canonical(&self) -> Dimensions {
        Dimensions::new(self.width, self.height, self.scale)
    }

    /// Dimensions that apply to a given page.
    pub fn for_page(&self, page: u32) -> Dimensions {
        self.exceptions
            .get(&page)
            .copied()
            .unwrap_or_else(|| self.canonical())
    }
}

/// Pages sharing one distinct (width, height) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionBucket {
    /// Rounded width
    pub width: f64,
    /// Rounded height
    pub height: f64,
    /// Scale of the first page observed in this bucket
    pub scale: Option<f64>,
    /// Pages in observation order
    pub pages: Vec<u32>,
}

impl DimensionBucket {
    /// Size and scale shared by the bucket's pages.
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height, self.scale)
    }
}

/// A font family used somewhere in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontRecord {
    /// Family name reported by the engine
    pub source_family: String,

    /// Replacement family used in HTML output
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub display_family: Option<String>,

    /// Pages the font appears on, without duplicates
    pub pages: Vec<u32>,
}

impl FontRecord {
    /// Create a record for a newly seen family.
    pub fn new(source_family: impl Into<String>) -> Self {
        Self {
            source_family: source_family.into(),
            display_family: None,
            pages: Vec::new(),
        }
    }

    /// The family to use when rendering: the override if set, else the source.
    pub fn font_family(&self) -> &str {
        self.display_family
            .as_deref()
            .unwrap_or(&self.source_family)
    }
}

/// Consensus description of the whole document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    /// Tool that produced the summary
    pub generator: String,

    /// Tool version
    pub version: String,

    /// Total pages in the document
    #[serde(rename = "numpages")]
    pub page_count: u32,

    /// Canonical page size and exceptions
    pub dimensions: DocumentDimensions,

    /// Fonts in first-seen order
    pub fonts: Vec<FontRecord>,

    /// Link annotations (reserved, currently always empty)
    pub links: Vec<String>,

    /// Engine facts gathered after the last page
    #[serde(skip)]
    pub facts: DocumentFacts,
}

impl DocumentSummary {
    /// An empty summary for the current crate version.
    pub fn empty() -> Self {
        Self {
            generator: GENERATOR.to_string(),
            version: crate::VERSION.to_string(),
            page_count: 0,
            dimensions: DocumentDimensions::default(),
            fonts: Vec::new(),
            links: Vec::new(),
            facts: DocumentFacts::default(),
        }
    }
}
