//! Rasterization of painted paths with `tiny-skia`.
//!
//! Paths stay in page space; the viewport transform is handed to the
//! rasterizer so stroke widths and dash lengths scale with the page.

use tiny_skia::{Paint, Path, PathBuilder, Transform};

use super::{Color, FillRule, LineCap, LineJoin, OperatorList, PathSegment, RenderTarget, Stroke};
use crate::model::{Matrix, Viewport};

/// Paint every path of an operator list into `target`.
pub fn rasterize(operators: &OperatorList, viewport: &Viewport, target: &mut RenderTarget) {
    let transform = skia_transform(&viewport.transform);
    let pixmap = target.pixmap_mut();

    for painted in &operators.paths {
        let Some(path) = build_path(&painted.segments) else {
            continue;
        };

        if let Some(fill) = &painted.fill {
            pixmap.fill_path(
                &path,
                &solid_paint(fill.color),
                skia_fill_rule(fill.rule),
                transform,
                None,
            );
        }

        if let Some(stroke) = &painted.stroke {
            pixmap.stroke_path(
                &path,
                &solid_paint(stroke.color),
                &skia_stroke(stroke),
                transform,
                None,
            );
        }
    }
}

/// Convert path segments to a `tiny-skia` path. Returns `None` for
/// outlines with no drawable extent.
pub fn build_path(segments: &[PathSegment]) -> Option<Path> {
    let mut pb = PathBuilder::new();
    for segment in segments {
        match *segment {
            PathSegment::MoveTo(x, y) => pb.move_to(x as f32, y as f32),
            PathSegment::LineTo(x, y) => pb.line_to(x as f32, y as f32),
            PathSegment::CurveTo(x1, y1, x2, y2, x, y) => pb.cubic_to(
                x1 as f32, y1 as f32, x2 as f32, y2 as f32, x as f32, y as f32,
            ),
            PathSegment::Close => pb.close(),
        }
    }
    pb.finish()
}

fn skia_transform(m: &Matrix) -> Transform {
    Transform::from_row(
        m[0] as f32,
        m[1] as f32,
        m[2] as f32,
        m[3] as f32,
        m[4] as f32,
        m[5] as f32,
    )
}

fn solid_paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, 255);
    paint.anti_alias = true;
    paint
}

fn skia_fill_rule(rule: FillRule) -> tiny_skia::FillRule {
    match rule {
        FillRule::NonZero => tiny_skia::FillRule::Winding,
        FillRule::EvenOdd => tiny_skia::FillRule::EvenOdd,
    }
}

fn skia_line_cap(cap: LineCap) -> tiny_skia::LineCap {
    match cap {
        LineCap::Butt => tiny_skia::LineCap::Butt,
        LineCap::Round => tiny_skia::LineCap::Round,
        LineCap::Square => tiny_skia::LineCap::Square,
    }
}

fn skia_line_join(join: LineJoin) -> tiny_skia::LineJoin {
    match join {
        LineJoin::Miter => tiny_skia::LineJoin::Miter,
        LineJoin::Round => tiny_skia::LineJoin::Round,
        LineJoin::Bevel => tiny_skia::LineJoin::Bevel,
    }
}

/// Line style in page units. A zero width is drawn as a hairline.
fn skia_stroke(stroke: &Stroke) -> tiny_skia::Stroke {
    let mut pattern: Vec<f32> = stroke.dash.iter().map(|d| *d as f32).collect();
    // An odd-length pattern repeats with dashes and gaps swapped
    if pattern.len() % 2 == 1 {
        pattern.extend_from_within(..);
    }
    // Empty or all-zero patterns draw a solid line
    let dash = if pattern.is_empty() {
        None
    } else {
        tiny_skia::StrokeDash::new(pattern, stroke.dash_phase as f32)
    };

    tiny_skia::Stroke {
        width: stroke.width.max(0.0) as f32,
        line_cap: skia_line_cap(stroke.cap),
        line_join: skia_line_join(stroke.join),
        miter_limit: stroke.miter_limit as f32,
        dash,
    }
}
