//! Drawing surfaces the engine paints into.

use std::fmt::Write as _;

use image::{Rgba, RgbaImage};
use tiny_skia::Pixmap;

use super::{Color, LineCap, LineJoin, PaintedPath, PathSegment};
use crate::error::{Error, Result};
use crate::model::{Matrix, Viewport};

/// A pixel surface, initialized to opaque white.
#[derive(Debug, Clone)]
pub struct RenderTarget {
    pixmap: Pixmap,
}

impl RenderTarget {
    /// Create a white surface of the given pixel size.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let (width, height) = (width.max(1), height.max(1));
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            Error::Render(format!("Failed to create {}x{} surface", width, height))
        })?;
        pixmap.fill(tiny_skia::Color::WHITE);
        Ok(Self { pixmap })
    }

    /// Create a surface sized for a viewport.
    pub fn for_viewport(viewport: &Viewport) -> Result<Self> {
        let (width, height) = viewport.pixel_size();
        Self::new(width, height)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Color of one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.pixmap.pixel(x, y).map(|p| {
            let c = p.demultiply();
            Color::rgb(c.red(), c.green(), c.blue())
        })
    }

    /// Borrow the underlying pixmap.
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Borrow the underlying pixmap for drawing.
    pub fn pixmap_mut(&mut self) -> &mut Pixmap {
        &mut self.pixmap
    }

    /// Copy the surface into an RGBA image for encoding.
    pub fn to_image(&self) -> RgbaImage {
        let pixels = self.pixmap.pixels();
        let width = self.width();
        RgbaImage::from_fn(width, self.height(), |x, y| {
            let c = pixels[(y * width + x) as usize].demultiply();
            Rgba([c.red(), c.green(), c.blue(), c.alpha()])
        })
    }
}

/// A vector surface that accumulates SVG markup in page space.
///
/// Paths and text are written inside a group carrying the viewport transform,
/// so coordinates stay in page units.
#[derive(Debug, Clone)]
pub struct VectorTarget {
    width: f64,
    height: f64,
    transform: Matrix,
    body: String,
}

impl VectorTarget {
    /// Create an empty surface for a viewport.
    pub fn new(viewport: &Viewport) -> Self {
        Self {
            width: viewport.width,
            height: viewport.height,
            transform: viewport.transform,
            body: String::new(),
        }
    }

    /// Append a painted path.
    pub fn push_path(&mut self, path: &PaintedPath) {
        let mut d = String::new();
        for segment in &path.segments {
            match *segment {
                PathSegment::MoveTo(x, y) => {
                    let _ = write!(d, "M{} {} ", num(x), num(y));
                }
                PathSegment::LineTo(x, y) => {
                    let _ = write!(d, "L{} {} ", num(x), num(y));
                }
                PathSegment::CurveTo(x1, y1, x2, y2, x, y) => {
                    let _ = write!(
                        d,
                        "C{} {} {} {} {} {} ",
                        num(x1),
                        num(y1),
                        num(x2),
                        num(y2),
                        num(x),
                        num(y)
                    );
                }
                PathSegment::Close => d.push_str("Z "),
            }
        }

        let fill = match path.fill {
            Some(fill) => {
                let rule = match fill.rule {
                    super::FillRule::NonZero => "nonzero",
                    super::FillRule::EvenOdd => "evenodd",
                };
                format!(r#"fill="{}" fill-rule="{}""#, fill.color.to_hex(), rule)
            }
            None => r#"fill="none""#.to_string(),
        };
        let mut stroke = String::new();
        if let Some(s) = &path.stroke {
            let _ = write!(
                stroke,
                r#" stroke="{}" stroke-width="{}""#,
                s.color.to_hex(),
                num(s.width)
            );
            match s.cap {
                LineCap::Butt => {}
                LineCap::Round => stroke.push_str(r#" stroke-linecap="round""#),
                LineCap::Square => stroke.push_str(r#" stroke-linecap="square""#),
            }
            match s.join {
                LineJoin::Miter => {}
                LineJoin::Round => stroke.push_str(r#" stroke-linejoin="round""#),
                LineJoin::Bevel => stroke.push_str(r#" stroke-linejoin="bevel""#),
            }
            if !s.dash.is_empty() {
                let dashes: Vec<String> = s.dash.iter().map(|d| num(*d)).collect();
                let _ = write!(stroke, r#" stroke-dasharray="{}""#, dashes.join(" "));
                if s.dash_phase != 0.0 {
                    let _ = write!(stroke, r#" stroke-dashoffset="{}""#, num(s.dash_phase));
                }
            }
        }

        let _ = writeln!(self.body, r#"<path d="{}" {}{}/>"#, d.trim_end(), fill, stroke);
    }

    /// Append a text run drawn with `matrix` (page space, y up) at unit font size.
    pub fn push_text(&mut self, matrix: &Matrix, font_family: &str, text: &str) {
        // Glyphs are drawn y-down, so flip the text space back
        let _ = writeln!(
            self.body,
            r#"<text transform="matrix({} {} {} {} {} {})" font-family="{}" font-size="1">{}</text>"#,
            num(matrix[0]),
            num(matrix[1]),
            num(-matrix[2]),
            num(-matrix[3]),
            num(matrix[4]),
            num(matrix[5]),
            html_escape::encode_double_quoted_attribute(font_family),
            html_escape::encode_text(text)
        );
    }

    /// Whether anything has been drawn.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Complete standalone SVG document.
    pub fn finish(&self) -> String {
        let t = &self.transform;
        format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8"?>"#,
                "\n",
                r#"<svg xmlns="http://www.w3.org/2000/svg" version="1.1" width="{w}px" height="{h}px" viewBox="0 0 {w} {h}">"#,
                "\n",
                r#"<g transform="matrix({a} {b} {c} {d} {e} {f})">"#,
                "\n{body}</g>\n</svg>\n"
            ),
            w = num(self.width),
            h = num(self.height),
            a = num(t[0]),
            b = num(t[1]),
            c = num(t[2]),
            d = num(t[3]),
            e = num(t[4]),
            f = num(t[5]),
            body = self.body,
        )
    }
}

/// Compact decimal formatting: at most 3 fractional digits, no trailing zeros.
fn num(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    let s = format!("{:.3}", rounded);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Fill, FillRule, Stroke};

    #[test]
    fn test_render_target_starts_white() {
        let target = RenderTarget::new(4, 3).unwrap();
        assert_eq!(target.width(), 4);
        assert_eq!(target.pixel(3, 2), Some(Color::WHITE));
        assert_eq!(target.pixel(4, 0), None);
    }

    #[test]
    fn test_to_image_copies_pixels() {
        let mut target = RenderTarget::new(4, 2).unwrap();
        let rect = tiny_skia::Rect::from_xywh(0.0, 1.0, 2.0, 1.0).unwrap();
        let mut paint = tiny_skia::Paint::default();
        paint.set_color_rgba8(0, 0, 255, 255);
        target
            .pixmap_mut()
            .fill_rect(rect, &paint, tiny_skia::Transform::identity(), None);

        assert_eq!(target.pixel(1, 1), Some(Color::rgb(0, 0, 255)));
        let image = target.to_image();
        assert_eq!(image.dimensions(), (4, 2));
        assert_eq!(image.get_pixel(1, 1), &Rgba([0, 0, 255, 255]));
        assert_eq!(image.get_pixel(2, 1), &Rgba([255, 255, 255, 255]));
        assert_eq!(image.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_target_for_viewport_rounds_up() {
        let vp = Viewport::new([0.0, 0.0, 100.5, 50.2], 1.0, 0);
        let target = RenderTarget::for_viewport(&vp).unwrap();
        assert_eq!((target.width(), target.height()), (101, 51));
    }

    #[test]
    fn test_num_formatting() {
        assert_eq!(num(1.0), "1");
        assert_eq!(num(1.23456), "1.235");
        assert_eq!(num(-0.0001), "0");
        assert_eq!(num(792.0), "792");
    }

    #[test]
    fn test_vector_target_markup() {
        let vp = Viewport::new([0.0, 0.0, 200.0, 100.0], 1.0, 0);
        let mut target = VectorTarget::new(&vp);
        assert!(target.is_empty());
        target.push_path(&PaintedPath {
            segments: vec![
                PathSegment::MoveTo(0.0, 0.0),
                PathSegment::LineTo(10.0, 0.0),
                PathSegment::Close,
            ],
            fill: Some(Fill {
                color: Color::rgb(255, 0, 0),
                rule: FillRule::EvenOdd,
            }),
            stroke: Some(Stroke::solid(Color::BLACK, 0.5)),
        });
        target.push_text(&[12.0, 0.0, 0.0, 12.0, 10.0, 20.0], "Helvetica", "a<b");

        let svg = target.finish();
        assert!(svg.contains(r#"width="200px" height="100px""#));
        assert!(svg.contains(r#"<g transform="matrix(1 0 0 -1 0 100)">"#));
        assert!(svg.contains(
            r##"<path d="M0 0 L10 0 Z" fill="#ff0000" fill-rule="evenodd" stroke="#000000" stroke-width="0.5"/>"##
        ));
        assert!(svg.contains(r#"matrix(12 0 0 -12 10 20)"#));
        assert!(svg.contains("a&lt;b"));
    }

    #[test]
    fn test_vector_target_line_style() {
        let vp = Viewport::new([0.0, 0.0, 20.0, 20.0], 1.0, 0);
        let mut target = VectorTarget::new(&vp);
        target.push_path(&PaintedPath {
            segments: vec![PathSegment::MoveTo(0.0, 0.0), PathSegment::LineTo(10.0, 0.0)],
            fill: None,
            stroke: Some(Stroke {
                cap: LineCap::Round,
                join: LineJoin::Bevel,
                dash: vec![3.0, 1.5],
                dash_phase: 1.0,
                ..Stroke::solid(Color::BLACK, 2.0)
            }),
        });

        assert!(target.finish().contains(concat!(
            r##"fill="none" stroke="#000000" stroke-width="2" stroke-linecap="round""##,
            r#" stroke-linejoin="bevel" stroke-dasharray="3 1.5" stroke-dashoffset="1"/>"#
        )));
    }
}
