//! Boundary to the page decoding and rendering engine.
//!
//! The pipeline only talks to the traits defined here. A document hands out
//! one page at a time; a page reports its geometry, its positioned text, and
//! its vector paint operations, and can paint itself into a [`RenderTarget`].
//!
//! [`load_document`] opens a PDF with the built-in `lopdf` backend.

mod backend;
pub mod fonts;
pub mod raster;
pub mod svg;
mod target;

pub use backend::PdfFile;
pub use fonts::{CssRule, FontFace, FontRegistry, StyleSheet};
pub use target::{RenderTarget, VectorTarget};

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::Result;
use crate::model::{Metadata, Outline, TextContent, Viewport};

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
}

impl Color {
    /// Black.
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    /// White.
    pub const WHITE: Color = Color {
        r: 255,
        g: 255,
        b: 255,
    };

    /// Create a color from 8-bit components.
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create a color from unit-range components.
    pub fn from_unit(r: f64, g: f64, b: f64) -> Self {
        let c = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::rgb(c(r), c(g), c(b))
    }

    /// CSS hex notation, e.g. `#ff0000`.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// One element of a path outline, in page space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    /// Start a new subpath
    MoveTo(f64, f64),
    /// Straight line to a point
    LineTo(f64, f64),
    /// Cubic Bézier with two control points and an end point
    CurveTo(f64, f64, f64, f64, f64, f64),
    /// Close the current subpath
    Close,
}

/// Rule deciding which regions of a self-intersecting path are inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillRule {
    /// Non-zero winding number
    #[default]
    NonZero,
    /// Even-odd crossing count
    EvenOdd,
}

/// Fill paint for a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fill {
    /// Fill color
    pub color: Color,
    /// Inside test
    pub rule: FillRule,
}

/// Shape at the open ends of stroked subpaths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    /// Squared off at the endpoint
    #[default]
    Butt,
    /// Semicircle around the endpoint
    Round,
    /// Squared off half a line width past the endpoint
    Square,
}

impl LineCap {
    /// Value of the `J` operator; unknown styles fall back to butt.
    pub fn from_pdf(style: i64) -> Self {
        match style {
            1 => LineCap::Round,
            2 => LineCap::Square,
            _ => LineCap::Butt,
        }
    }
}

/// Shape at the corners of stroked paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    /// Extended outer edges, limited by the miter limit
    #[default]
    Miter,
    /// Circular arc around the corner
    Round,
    /// Outer corner cut off
    Bevel,
}

impl LineJoin {
    /// Value of the `j` operator; unknown styles fall back to miter.
    pub fn from_pdf(style: i64) -> Self {
        match style {
            1 => LineJoin::Round,
            2 => LineJoin::Bevel,
            _ => LineJoin::Miter,
        }
    }
}

/// Stroke paint for a path.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    /// Stroke color
    pub color: Color,
    /// Line width in page units, 0 for the thinnest visible line
    pub width: f64,
    /// End caps
    pub cap: LineCap,
    /// Corner joins
    pub join: LineJoin,
    /// Miter length limit, as a multiple of the width
    pub miter_limit: f64,
    /// Alternating dash and gap lengths in page units; empty for a solid line
    pub dash: Vec<f64>,
    /// Offset into the dash pattern where the stroke starts
    pub dash_phase: f64,
}

impl Stroke {
    /// A solid line with butt caps and miter joins.
    pub fn solid(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            miter_limit: 10.0,
            dash: Vec::new(),
            dash_phase: 0.0,
        }
    }
}

/// A path together with how it is painted.
#[derive(Debug, Clone, PartialEq)]
pub struct PaintedPath {
    /// Outline in page space
    pub segments: Vec<PathSegment>,
    /// Fill, if the path is filled
    pub fill: Option<Fill>,
    /// Stroke, if the path is stroked
    pub stroke: Option<Stroke>,
}

/// Vector paint operations of one page, in painting order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperatorList {
    /// Painted paths
    pub paths: Vec<PaintedPath>,
}

impl OperatorList {
    /// Whether the page paints nothing.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// One decoded page.
///
/// A page handle is only valid for the duration of one page-processing
/// step; the pipeline drops it as soon as every renderer is done with it.
pub trait PdfPage {
    /// 1-indexed page number.
    fn number(&self) -> u32;

    /// Visible region `[x0, y0, x1, y1]` in page units.
    fn view_box(&self) -> [f64; 4];

    /// Page rotation in degrees.
    fn rotation(&self) -> i32 {
        0
    }

    /// Viewport for this page at the given scale.
    fn viewport(&self, scale: f64) -> Viewport {
        Viewport::new(self.view_box(), scale, self.rotation())
    }

    /// Width and height at scale 1, after rotation.
    fn natural_size(&self) -> (f64, f64) {
        let viewport = self.viewport(1.0);
        (viewport.width, viewport.height)
    }

    /// Positioned text runs in reading order, plus their font styles.
    fn text_content(&self) -> Result<TextContent>;

    /// Vector paint operations.
    fn operator_list(&self) -> Result<OperatorList>;

    /// Paint the page into a pixel surface.
    fn render(&self, target: &mut RenderTarget, viewport: &Viewport) -> Result<()> {
        let operators = self.operator_list()?;
        raster::rasterize(&operators, viewport, target);
        Ok(())
    }
}

/// An opened document.
pub trait PdfDocument {
    /// Total number of pages.
    fn num_pages(&self) -> u32;

    /// Decode one page (1-indexed).
    fn get_page(&self, number: u32) -> Result<Box<dyn PdfPage + '_>>;

    /// Info dictionary contents.
    fn metadata(&self) -> Result<Metadata>;

    /// Bookmarks.
    fn outline(&self) -> Result<Outline>;

    /// Display label for each page (empty if the document defines none).
    fn page_labels(&self) -> Result<Vec<String>>;

    /// Named destinations and their target pages.
    fn destinations(&self) -> Result<BTreeMap<String, Option<u32>>>;
}

/// Open a PDF from bytes.
pub fn load_document(data: &[u8]) -> Result<PdfFile> {
    PdfFile::from_bytes(data)
}

/// Open a PDF file.
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<PdfFile> {
    let data = std::fs::read(path)?;
    PdfFile::from_bytes(&data)
}
