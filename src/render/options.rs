//! Extraction options and configuration.

use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::text_flow::{LineBreakMode, TextLayerOptions};

/// How a renderer picks its viewport scale from a page's natural size.
#[derive(Clone)]
pub enum ScalePolicy {
    /// Constant multiplier
    Fixed(f64),
    /// Scale so the longer edge is exactly this many device units
    MaxEdge(f64),
    /// Arbitrary function of natural (width, height)
    Fit(Arc<dyn Fn(f64, f64) -> f64 + Send + Sync>),
}

impl ScalePolicy {
    /// Fit the long edge of every page to `px` device units.
    pub fn max_edge(px: f64) -> Self {
        ScalePolicy::MaxEdge(px)
    }

    /// Policy computed by a closure over the natural width and height.
    pub fn fit<F>(f: F) -> Self
    where
        F: Fn(f64, f64) -> f64 + Send + Sync + 'static,
    {
        ScalePolicy::Fit(Arc::new(f))
    }

    /// Scale for a page of the given natural size.
    pub fn scale_for(&self, width: f64, height: f64) -> f64 {
        match self {
            ScalePolicy::Fixed(scale) => *scale,
            ScalePolicy::MaxEdge(px) => {
                let long = width.max(height);
                if long > 0.0 {
                    px / long
                } else {
                    1.0
                }
            }
            ScalePolicy::Fit(f) => f(width, height),
        }
    }
}

impl Default for ScalePolicy {
    fn default() -> Self {
        ScalePolicy::Fixed(1.0)
    }
}

impl fmt::Debug for ScalePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalePolicy::Fixed(scale) => f.debug_tuple("Fixed").field(scale).finish(),
            ScalePolicy::MaxEdge(px) => f.debug_tuple("MaxEdge").field(px).finish(),
            ScalePolicy::Fit(_) => f.write_str("Fit(..)"),
        }
    }
}

/// Inclusive page range, 1-indexed. An open end runs to the last page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    /// First page
    pub start: u32,
    /// Last page, if bounded
    pub end: Option<u32>,
}

impl Default for PageRange {
    fn default() -> Self {
        Self::all()
    }
}

impl PageRange {
    /// Every page.
    pub fn all() -> Self {
        Self {
            start: 1,
            end: None,
        }
    }

    /// Pages `start..=end`.
    pub fn new(start: u32, end: u32) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    /// The first `count` pages.
    pub fn first(count: u32) -> Self {
        Self::new(1, count)
    }

    /// Clamp to a document: `[max(1, start), min(end, total)]`.
    pub fn effective(&self, total: u32) -> RangeInclusive<u32> {
        let start = self.start.max(1);
        let end = self.end.map_or(total, |end| end.min(total));
        start..=end
    }

    /// Parse `"all"`, `"N"`, `"A-B"`, `"A-"` or `"-B"`.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(Self::all());
        }

        let page = |p: &str| -> Result<u32> {
            p.trim()
                .parse()
                .map_err(|_| Error::InvalidPageRange(s.to_string()))
        };

        let range = match s.split_once('-') {
            None => {
                let n = page(s)?;
                Self::new(n, n)
            }
            Some((start, end)) => Self {
                start: if start.trim().is_empty() { 1 } else { page(start)? },
                end: if end.trim().is_empty() { None } else { Some(page(end)?) },
            },
        };

        if range.start == 0 || range.end.is_some_and(|end| end < range.start) {
            return Err(Error::InvalidPageRange(s.to_string()));
        }
        Ok(range)
    }
}

/// Output format for `info.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Single line, no extra whitespace
    #[default]
    Compact,
    /// Indented
    Pretty,
}

/// Options controlling which artifacts an extraction produces.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Write `page-N.png`
    pub render_png: bool,

    /// Write `page-N.svg`
    pub render_svg: bool,

    /// Write `text-N.html` and `stylesheet.css`
    pub render_html: bool,

    /// Write `text-N.txt`
    pub render_text: bool,

    /// Write `page-N.jpg`
    pub render_jpeg: bool,

    /// Scale for the canvas renderer
    pub canvas_zoom: f64,

    /// Scale for the SVG renderer
    pub svg_zoom: f64,

    /// Overrides `canvas_zoom` for the canvas and metadata renderers
    pub scale_policy: Option<ScalePolicy>,

    /// Render PNGs at this multiple of the canvas scale, minified
    pub hi_res: Option<f64>,

    /// Pages to process
    pub page_range: PageRange,

    /// HTML text layer options
    pub html: TextLayerOptions,

    /// `info.json` formatting
    pub json_format: JsonFormat,

    /// Separator between lines in `text-N.txt`
    pub line_breaks: LineBreakMode,
}

impl ExtractOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable PNG output.
    pub fn with_png(mut self, enable: bool) -> Self {
        self.render_png = enable;
        self
    }

    /// Enable or disable SVG output.
    pub fn with_svg(mut self, enable: bool) -> Self {
        self.render_svg = enable;
        self
    }

    /// Enable or disable HTML text layer output.
    pub fn with_html(mut self, enable: bool) -> Self {
        self.render_html = enable;
        self
    }

    /// Enable or disable plain text output.
    pub fn with_text(mut self, enable: bool) -> Self {
        self.render_text = enable;
        self
    }

    /// Enable or disable JPEG output.
    pub fn with_jpeg(mut self, enable: bool) -> Self {
        self.render_jpeg = enable;
        self
    }

    /// Set the canvas scale.
    pub fn with_canvas_zoom(mut self, zoom: f64) -> Self {
        self.canvas_zoom = zoom;
        self
    }

    /// Set the SVG scale.
    pub fn with_svg_zoom(mut self, zoom: f64) -> Self {
        self.svg_zoom = zoom;
        self
    }

    /// Use a scale policy instead of the fixed canvas zoom.
    pub fn with_scale_policy(mut self, policy: ScalePolicy) -> Self {
        self.scale_policy = Some(policy);
        self
    }

    /// Render PNGs at a higher resolution.
    pub fn with_hi_res(mut self, upscale: f64) -> Self {
        self.hi_res = Some(upscale);
        self
    }

    /// Set the page range.
    pub fn with_pages(mut self, range: PageRange) -> Self {
        self.page_range = range;
        self
    }

    /// Set HTML text layer options.
    pub fn with_html_options(mut self, html: TextLayerOptions) -> Self {
        self.html = html;
        self
    }

    /// Set the `info.json` format.
    pub fn with_json_format(mut self, format: JsonFormat) -> Self {
        self.json_format = format;
        self
    }

    /// Set the plain text line break mode.
    pub fn with_line_breaks(mut self, mode: LineBreakMode) -> Self {
        self.line_breaks = mode;
        self
    }

    /// Scale policy shared by the canvas and metadata renderers.
    pub fn canvas_policy(&self) -> ScalePolicy {
        self.scale_policy
            .clone()
            .unwrap_or(ScalePolicy::Fixed(self.canvas_zoom))
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            render_png: true,
            render_svg: true,
            render_html: true,
            render_text: true,
            render_jpeg: false,
            canvas_zoom: 1.5,
            svg_zoom: 1.0,
            scale_policy: None,
            hi_res: None,
            page_range: PageRange::all(),
            html: TextLayerOptions::default(),
            json_format: JsonFormat::Compact,
            line_breaks: LineBreakMode::Space,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_options_defaults() {
        let options = ExtractOptions::default();
        assert!(options.render_png && options.render_svg);
        assert!(options.render_html && options.render_text);
        assert!(!options.render_jpeg);
        assert_eq!(options.canvas_zoom, 1.5);
        assert_eq!(options.page_range, PageRange::all());
        assert!(options.html.layer_dimensions);
        assert!(!options.html.inner_html);
        assert_eq!(options.json_format, JsonFormat::Compact);
    }

    #[test]
    fn test_extract_options_builder() {
        let options = ExtractOptions::new()
            .with_svg(false)
            .with_jpeg(true)
            .with_canvas_zoom(2.0)
            .with_pages(PageRange::new(2, 3));

        assert!(!options.render_svg);
        assert!(options.render_jpeg);
        assert_eq!(options.canvas_policy().scale_for(100.0, 100.0), 2.0);
        assert_eq!(options.page_range.effective(5), 2..=3);
    }

    #[test]
    fn test_scale_policies() {
        assert_eq!(ScalePolicy::Fixed(1.5).scale_for(612.0, 792.0), 1.5);
        assert_eq!(ScalePolicy::max_edge(1100.0).scale_for(550.0, 275.0), 2.0);
        assert_eq!(ScalePolicy::max_edge(1100.0).scale_for(0.0, 0.0), 1.0);
        let policy = ScalePolicy::fit(|w, _| 300.0 / w);
        assert_eq!(policy.scale_for(150.0, 10.0), 2.0);
        assert_eq!(format!("{:?}", policy), "Fit(..)");
    }

    #[test]
    fn test_page_range_effective() {
        assert_eq!(PageRange::all().effective(5), 1..=5);
        assert_eq!(PageRange::new(2, 3).effective(5), 2..=3);
        assert_eq!(PageRange::new(3, 10).effective(5), 3..=5);
        assert_eq!(PageRange { start: 0, end: None }.effective(2), 1..=2);
        assert!(PageRange::new(7, 9).effective(5).is_empty());
    }

    #[test]
    fn test_page_range_parse() {
        assert_eq!(PageRange::parse("all").unwrap(), PageRange::all());
        assert_eq!(PageRange::parse("").unwrap(), PageRange::all());
        assert_eq!(PageRange::parse("4").unwrap(), PageRange::new(4, 4));
        assert_eq!(PageRange::parse("2-3").unwrap(), PageRange::new(2, 3));
        assert_eq!(PageRange::parse("5-").unwrap().end, None);
        assert_eq!(PageRange::parse("-3").unwrap(), PageRange::first(3));
        assert!(PageRange::parse("3-2").is_err());
        assert!(PageRange::parse("0").is_err());
        assert!(PageRange::parse("x").is_err());
    }
}
