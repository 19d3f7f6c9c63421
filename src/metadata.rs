//! Document-wide consensus over per-page observations.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use log::debug;

use crate::model::geometry::round2;
use crate::model::{DimensionBucket, DocumentDimensions, DocumentSummary, FontRecord};

/// Accumulates page dimensions and font usage for one document.
///
/// Pages are bucketed by their rounded size. The bucket with the most pages
/// becomes the canonical size; a later bucket only takes over on a strictly
/// larger count, so ties keep the bucket seen first.
#[derive(Debug, Default)]
pub struct MetadataAggregator {
    buckets: IndexMap<String, DimensionBucket>,
    largest: Option<String>,
    fonts: IndexMap<String, FontRecord>,
    page_count: u32,
}

impl MetadataAggregator {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the total page count reported by the document.
    pub fn set_page_count(&mut self, count: u32) {
        self.page_count = count;
    }

    /// Record a page's size at the scale it was rendered.
    ///
    /// A page already recorded is ignored.
    pub fn observe_page(&mut self, page: u32, width: f64, height: f64, scale: f64) {
        if self.buckets.values().any(|b| b.pages.contains(&page)) {
            return;
        }

        let (width, height) = (round2(width), round2(height));
        let key = format!("{}x{}", width, height);
        let bucket = self
            .buckets
            .entry(key.clone())
            .or_insert_with(|| DimensionBucket {
                width,
                height,
                scale: Some(scale),
                pages: Vec::new(),
            });
        bucket.pages.push(page);
        let count = bucket.pages.len();

        let current = self
            .largest
            .as_ref()
            .and_then(|k| self.buckets.get(k))
            .map_or(0, |b| b.pages.len());
        if count > current {
            self.largest = Some(key);
        }
    }

    /// Record that a source font family is used on a page, optionally with
    /// the family that replaces it in HTML output.
    pub fn observe_font(&mut self, source_family: &str, display_family: Option<&str>, page: u32) {
        let record = self
            .fonts
            .entry(source_family.to_string())
            .or_insert_with(|| FontRecord::new(source_family));
        if !record.pages.contains(&page) {
            record.pages.push(page);
        }
        if let Some(display) = display_family {
            record.display_family = Some(display.to_string());
        }
    }

    /// Distinct page sizes in first-seen order.
    pub fn buckets(&self) -> impl Iterator<Item = &DimensionBucket> {
        self.buckets.values()
    }

    /// Fonts in first-seen order.
    pub fn fonts(&self) -> impl Iterator<Item = &FontRecord> {
        self.fonts.values()
    }

    /// Build the document summary from everything observed so far.
    pub fn finalize(&self) -> DocumentSummary {
        let mut summary = DocumentSummary::empty();
        summary.page_count = self.page_count;
        summary.fonts = self.fonts.values().cloned().collect();

        let Some(canonical) = self.largest.as_ref().and_then(|k| self.buckets.get(k)) else {
            return summary;
        };

        let canonical_size = canonical.dimensions();
        let mut exceptions = BTreeMap::new();
        for bucket in self.buckets.values() {
            let size = bucket.dimensions();
            if size.same_size(&canonical_size) {
                continue;
            }
            for &page in &bucket.pages {
                exceptions.insert(page, size);
            }
        }

        debug!(
            "Canonical size {}x{} over {} pages, {} exceptions",
            canonical.width,
            canonical.height,
            canonical.pages.len(),
            exceptions.len()
        );

        summary.dimensions = DocumentDimensions {
            width: canonical_size.width,
            height: canonical_size.height,
            scale: canonical_size.scale,
            exceptions,
        };
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_finalize_is_valid() {
        let summary = MetadataAggregator::new().finalize();
        assert_eq!(summary.page_count, 0);
        assert_eq!(summary.dimensions.width, 0.0);
        assert_eq!(summary.dimensions.height, 0.0);
        assert!(summary.dimensions.exceptions.is_empty());
        assert!(summary.fonts.is_empty());
    }

    #[test]
    fn test_rounding_merges_buckets() {
        let mut agg = MetadataAggregator::new();
        agg.observe_page(1, 612.001, 792.0, 1.0);
        agg.observe_page(2, 611.999, 792.004, 1.0);
        assert_eq!(agg.buckets().count(), 1);
        let summary = agg.finalize();
        assert_eq!(summary.dimensions.width, 612.0);
        assert!(summary.dimensions.exceptions.is_empty());
    }

    #[test]
    fn test_duplicate_page_ignored() {
        let mut agg = MetadataAggregator::new();
        agg.observe_page(1, 100.0, 100.0, 1.0);
        agg.observe_page(1, 200.0, 200.0, 1.0);
        assert_eq!(agg.buckets().count(), 1);
    }

    #[test]
    fn test_font_display_override() {
        let mut agg = MetadataAggregator::new();
        agg.observe_font("Helvetica", None, 1);
        agg.observe_font("Helvetica", Some("'Helvetica', sans-serif"), 2);
        agg.observe_font("Helvetica", None, 2);

        let fonts: Vec<_> = agg.fonts().collect();
        assert_eq!(fonts.len(), 1);
        assert_eq!(fonts[0].pages, vec![1, 2]);
        assert_eq!(fonts[0].font_family(), "'Helvetica', sans-serif");
    }
}
