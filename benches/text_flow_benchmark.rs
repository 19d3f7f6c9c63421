//! Benchmarks for text-flow reconstruction.
//!
//! Run with: cargo bench
//!
//! Pages are synthetic: rows of word-sized runs with a mix of joined and
//! separated neighbours.

use std::collections::HashMap;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pdfextractor::engine::FontRegistry;
use pdfextractor::model::TextDirection;
use pdfextractor::{
    LineBreakMode, PageLayout, TextContent, TextItem, TextLayerOptions, TextStyle, Viewport,
};

/// A page with `rows` lines of ten runs each.
fn create_page(rows: usize) -> TextContent {
    let mut items = Vec::with_capacity(rows * 10);
    for row in 0..rows {
        let y = 780.0 - row as f64 * 14.0;
        let mut x = 36.0;
        for col in 0..10 {
            let width = 28.0 + (col % 3) as f64 * 4.0;
            items.push(TextItem {
                text: format!("w{}x{}", row, col),
                dir: TextDirection::Ltr,
                transform: [10.0, 0.0, 0.0, 10.0, x, y],
                width,
                height: 10.0,
                font_name: if col % 4 == 0 { "F2" } else { "F1" }.to_string(),
            });
            // Every third run is glued to the next one
            x += width + if col % 3 == 0 { 0.5 } else { 4.0 };
        }
    }

    let style = |family: &str| TextStyle {
        font_family: family.to_string(),
        ascent: Some(0.72),
        descent: Some(-0.21),
        vertical: false,
    };
    TextContent {
        items,
        styles: HashMap::from([
            ("F1".to_string(), style("Helvetica")),
            ("F2".to_string(), style("Times-Bold")),
        ]),
    }
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let viewport = Viewport::new([0.0, 0.0, 612.0, 792.0], 1.5, 0);

    for rows in [10, 50, 200] {
        let content = create_page(rows);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &content, |b, content| {
            b.iter(|| PageLayout::from_content(black_box(content), &viewport))
        });
    }

    group.finish();
}

fn bench_output(c: &mut Criterion) {
    let viewport = Viewport::new([0.0, 0.0, 612.0, 792.0], 1.5, 0);
    let layout = match PageLayout::from_content(&create_page(50), &viewport) {
        Ok(layout) => layout,
        Err(e) => panic!("layout failed: {}", e),
    };

    c.bench_function("to_text", |b| {
        b.iter(|| black_box(&layout).to_text(LineBreakMode::Newline))
    });

    c.bench_function("to_html", |b| {
        b.iter(|| {
            let mut fonts = FontRegistry::new();
            black_box(&layout).to_html(&mut fonts, &TextLayerOptions::default())
        })
    });
}

criterion_group!(benches, bench_layout, bench_output);
criterion_main!(benches);
