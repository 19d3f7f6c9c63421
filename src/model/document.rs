//! Document-level facts reported by the engine once all pages are processed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything the engine knows about the document as a whole.
///
/// Fetched after the last page, in the fixed order metadata, outline,
/// page labels, destinations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentFacts {
    /// Info dictionary contents
    pub metadata: Metadata,

    /// Bookmarks
    pub outline: Outline,

    /// Display label for each page, in page order (empty if the document has none)
    pub page_labels: Vec<String>,

    /// Named destinations mapped to their 1-indexed target page
    pub destinations: BTreeMap<String, Option<u32>>,
}

/// Info dictionary entries plus the header version.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
    /// Application that authored the original content
    pub creator: Option<String>,
    /// Application that wrote the PDF
    pub producer: Option<String>,
    /// `/CreationDate`, normalized to UTC
    pub created: Option<DateTime<Utc>>,
    /// `/ModDate`, normalized to UTC
    pub modified: Option<DateTime<Utc>>,
    /// Header version, e.g. "1.7"
    pub pdf_version: String,
}

impl Metadata {
    /// Metadata with only the header version known.
    pub fn with_version(version: impl Into<String>) -> Self {
        Self {
            pdf_version: version.into(),
            ..Default::default()
        }
    }
}

/// Bookmark tree, top level first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    pub items: Vec<OutlineItem>,
}

impl Outline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of bookmarks at every depth.
    pub fn total_items(&self) -> usize {
        let mut stack: Vec<&OutlineItem> = self.items.iter().collect();
        let mut count = 0;
        while let Some(item) = stack.pop() {
            count += 1;
            stack.extend(item.children.iter());
        }
        count
    }
}

/// One bookmark and its nested bookmarks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineItem {
    pub title: String,
    /// 1-indexed target page, `None` when the destination does not resolve
    pub page: Option<u32>,
    /// Depth in the tree, 0 at the top
    pub level: u8,
    pub children: Vec<OutlineItem>,
}

impl OutlineItem {
    pub fn new(title: impl Into<String>, page: Option<u32>, level: u8) -> Self {
        Self {
            title: title.into(),
            page,
            level,
            children: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_items_counts_nested_bookmarks() {
        let mut chapter = OutlineItem::new("Chapter 1", Some(1), 0);
        let mut section = OutlineItem::new("1.1", Some(2), 1);
        section.children.push(OutlineItem::new("1.1.1", None, 2));
        chapter.children.push(section);
        chapter.children.push(OutlineItem::new("1.2", Some(5), 1));
        let outline = Outline {
            items: vec![chapter, OutlineItem::new("Index", Some(9), 0)],
        };

        assert_eq!(outline.total_items(), 5);
        assert!(!outline.is_empty());
        assert_eq!(Outline::new().total_items(), 0);
    }

    #[test]
    fn test_facts_default_is_empty() {
        let facts = DocumentFacts::default();
        assert!(facts.outline.is_empty());
        assert!(facts.page_labels.is_empty());
        assert!(facts.destinations.is_empty());
        assert!(facts.metadata.title.is_none());
    }
}
