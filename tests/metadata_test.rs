//! Integration tests for dimension and font consensus.

use pdfextractor::MetadataAggregator;

#[test]
fn test_tie_keeps_first_bucket() {
    let mut agg = MetadataAggregator::new();
    agg.set_page_count(2);
    agg.observe_page(1, 100.0, 200.0, 1.0);
    agg.observe_page(2, 300.0, 400.0, 1.0);

    let summary = agg.finalize();
    assert_eq!(summary.dimensions.width, 100.0);
    assert_eq!(summary.dimensions.height, 200.0);
    assert_eq!(summary.dimensions.exceptions.keys().collect::<Vec<_>>(), vec![&2]);
}

#[test]
fn test_larger_bucket_takes_over() {
    let mut agg = MetadataAggregator::new();
    agg.observe_page(1, 100.0, 200.0, 1.5);
    agg.observe_page(2, 300.0, 400.0, 2.0);
    agg.observe_page(3, 300.0, 400.0, 2.0);

    let summary = agg.finalize();
    assert_eq!(summary.dimensions.width, 300.0);
    assert_eq!(summary.dimensions.scale, Some(2.0));
    let exception = summary.dimensions.exceptions[&1];
    assert_eq!((exception.width, exception.height), (100.0, 200.0));
    assert_eq!(exception.scale, Some(1.5));
}

#[test]
fn test_minority_size_becomes_exception() {
    // {600x800: pages 1, 2, 4}, {300x400: page 3}
    let mut agg = MetadataAggregator::new();
    agg.set_page_count(4);
    agg.observe_page(1, 600.0, 800.0, 1.0);
    agg.observe_page(2, 600.0, 800.0, 1.0);
    agg.observe_page(3, 300.0, 400.0, 1.0);
    agg.observe_page(4, 600.0, 800.0, 1.0);

    let buckets: Vec<(f64, f64, Vec<u32>)> = agg
        .buckets()
        .map(|b| (b.width, b.height, b.pages.clone()))
        .collect();
    assert_eq!(
        buckets,
        vec![(600.0, 800.0, vec![1, 2, 4]), (300.0, 400.0, vec![3])]
    );

    let summary = agg.finalize();
    assert_eq!((summary.dimensions.width, summary.dimensions.height), (600.0, 800.0));
    assert_eq!(summary.dimensions.exceptions.keys().collect::<Vec<_>>(), vec![&3]);
    let exception = summary.dimensions.exceptions[&3];
    assert_eq!((exception.width, exception.height), (300.0, 400.0));
    assert_eq!(summary.dimensions.for_page(4).width, 600.0);
}

#[test]
fn test_canonical_pages_are_not_exceptions() {
    let mut agg = MetadataAggregator::new();
    for page in 1..=4 {
        agg.observe_page(page, 612.0, 792.0, 1.0);
    }
    let summary = agg.finalize();
    assert!(summary.dimensions.exceptions.is_empty());
    assert_eq!(summary.dimensions.for_page(3).width, 612.0);
}

#[test]
fn test_font_pages_are_unique_and_ordered() {
    let mut agg = MetadataAggregator::new();
    agg.observe_font("Helvetica", None, 1);
    agg.observe_font("Times-Roman", None, 1);
    agg.observe_font("Helvetica", None, 1);
    agg.observe_font("Helvetica", Some("'Helvetica', sans-serif"), 2);

    let summary = agg.finalize();
    let families: Vec<&str> = summary
        .fonts
        .iter()
        .map(|f| f.source_family.as_str())
        .collect();
    assert_eq!(families, vec!["Helvetica", "Times-Roman"]);
    assert_eq!(summary.fonts[0].pages, vec![1, 2]);
    assert_eq!(summary.fonts[0].font_family(), "'Helvetica', sans-serif");
    assert_eq!(summary.fonts[1].font_family(), "Times-Roman");
}
