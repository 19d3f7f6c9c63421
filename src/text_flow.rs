//! Text-flow reconstruction.
//!
//! The engine reports positioned runs in reading order. [`PageLayout`] places
//! each run in device space as a top-left anchored box, then walks
//! consecutive pairs deciding whether the boundary between them is part of a
//! word, a space between words, or a line change. The same layout feeds the
//! HTML text layer and the plain-text output.
//!
//! Runs are never re-sorted; the result depends only on the run sequence
//! and the viewport.

use std::f64::consts::FRAC_PI_2;
use std::fmt::Write as _;

use log::trace;

use crate::engine::{FontRegistry, PdfPage};
use crate::error::Result;
use crate::model::geometry::{axial_aligned_bounding_box, round2, transform};
use crate::model::{
    is_all_whitespace, BoundingBox, TextContent, TextDirection, TextItem, TextStyle, Viewport,
};

/// Horizontal gap, in multiples of the viewport scale, below which two runs
/// on the same line belong to one word.
const WORD_GAP_FACTOR: f64 = 2.0;

/// One text run placed in device space.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// Text content
    pub text: String,
    /// Writing direction
    pub dir: TextDirection,
    /// Left of the run's box origin
    pub x: f64,
    /// Top of the run's box origin (baseline shifted up by the ascent)
    pub y: f64,
    /// Advance width in device units
    pub width: f64,
    /// Font box height in device units
    pub height: f64,
    /// Rotation in degrees, 0 for upright text
    pub angle: f64,
    /// Engine font key
    pub font_name: String,
    /// Resolved font style
    pub style: TextStyle,
    /// Device-space bounds
    pub bbox: BoundingBox,
    /// Viewport scale the run was placed with
    pub scale: f64,
}

impl TextRun {
    /// Place an engine text item under a viewport.
    pub fn build(item: &TextItem, style: &TextStyle, viewport: &Viewport) -> Self {
        let tx = transform(&viewport.transform, &item.transform);

        let mut angle = tx[1].atan2(tx[0]);
        if style.vertical {
            angle += FRAC_PI_2;
        }

        let font_height = tx[2].hypot(tx[3]);
        let ascent = match (
            style.ascent.filter(|a| *a != 0.0),
            style.descent.filter(|d| *d != 0.0),
        ) {
            (Some(ascent), _) => ascent * font_height,
            (None, Some(descent)) => (1.0 + descent) * font_height,
            (None, None) => font_height / 2.0,
        };

        let (x, y) = if angle == 0.0 {
            (tx[4], tx[5] - ascent)
        } else {
            (tx[4] + ascent * angle.sin(), tx[5] - ascent * angle.cos())
        };

        let width = if style.vertical { item.height } else { item.width } * viewport.scale;

        let bbox = if angle == 0.0 {
            BoundingBox::new(x, y, x + width, y + font_height)
        } else {
            let (sin, cos) = angle.sin_cos();
            let b = axial_aligned_bounding_box(
                [0.0, 0.0, width, font_height],
                &[cos, sin, -sin, cos, x, y],
            );
            BoundingBox::new(b[0], b[1], b[2], b[3])
        };

        Self {
            text: item.text.clone(),
            dir: item.dir,
            x,
            y,
            width,
            height: font_height,
            angle: angle.to_degrees(),
            font_name: item.font_name.clone(),
            style: style.clone(),
            bbox,
            scale: viewport.scale,
        }
    }

    /// Whether the run holds only whitespace.
    pub fn is_whitespace(&self) -> bool {
        is_all_whitespace(&self.text)
    }

    /// Whether this run and `next` sit on the same visual line.
    ///
    /// Rounded baselines-plus-ascent must match exactly, or, when at least one
    /// of the pair is upright, their boxes must overlap vertically by half the
    /// smaller height. Two rotated runs never pass the overlap test.
    pub fn same_line(&self, next: &TextRun) -> bool {
        if self.y.round() == next.y.round() {
            return true;
        }
        if self.angle == 0.0 || next.angle == 0.0 {
            let overlap = self.bbox.vertical_overlap(&next.bbox);
            return overlap >= self.height.min(next.height) / 2.0;
        }
        false
    }

    /// Whether `next` continues the same word.
    pub fn joins_word(&self, next: &TextRun) -> bool {
        self.same_line(next) && next.bbox.left - self.bbox.right < WORD_GAP_FACTOR * self.scale
    }
}

/// What follows a run in reconstructed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Joint {
    /// Emitted as-is: the last run, or a pair involving whitespace
    Verbatim,
    /// Glued to the next run with no separator
    Joined,
    /// Followed by a separator
    Spaced {
        /// Whether the next run is on the same line
        same_line: bool,
    },
}

/// Separator used where the next run starts a new line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineBreakMode {
    /// A single space at every separated boundary
    #[default]
    Space,
    /// A newline when the next run is on another line
    Newline,
}

/// Options for the HTML text layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextLayerOptions {
    /// Emit only the run divs, without the wrapping `.textLayer` element
    pub inner_html: bool,
    /// Size the `.textLayer` element to the viewport
    pub layer_dimensions: bool,
}

impl Default for TextLayerOptions {
    fn default() -> Self {
        Self {
            inner_html: false,
            layer_dimensions: true,
        }
    }
}

/// Laid-out text of one page.
#[derive(Debug, Clone)]
pub struct PageLayout {
    /// Runs in engine order
    pub runs: Vec<TextRun>,
    /// One joint per run
    pub joints: Vec<Joint>,
    /// Viewport the layout was computed for
    pub viewport: Viewport,
}

impl PageLayout {
    /// Lay out a page's text under a viewport.
    pub fn build(page: &dyn PdfPage, viewport: &Viewport) -> Result<Self> {
        let content = page.text_content()?;
        Self::from_content(&content, viewport)
    }

    /// Lay out engine text content under a viewport.
    ///
    /// Fails if an item names a font the engine reported no style for.
    pub fn from_content(content: &TextContent, viewport: &Viewport) -> Result<Self> {
        let runs = content
            .items
            .iter()
            .map(|item| Ok(TextRun::build(item, content.style_for(item)?, viewport)))
            .collect::<Result<Vec<_>>>()?;

        let joints = (0..runs.len())
            .map(|i| {
                let run = &runs[i];
                let Some(next) = runs.get(i + 1) else {
                    return Joint::Verbatim;
                };
                if run.is_whitespace() || next.is_whitespace() {
                    return Joint::Verbatim;
                }
                let joint = if run.joins_word(next) {
                    Joint::Joined
                } else {
                    Joint::Spaced {
                        same_line: run.same_line(next),
                    }
                };
                trace!(
                    "{:?} -> {:?}: {:?} (y {:.2}/{:.2}, gap {:.2})",
                    run.text,
                    next.text,
                    joint,
                    run.y,
                    next.y,
                    next.bbox.left - run.bbox.right
                );
                joint
            })
            .collect();

        Ok(Self {
            runs,
            joints,
            viewport: *viewport,
        })
    }

    /// Whether the page has no text.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Source font families in first-use order, without duplicates.
    pub fn font_families(&self) -> Vec<&str> {
        let mut families: Vec<&str> = Vec::new();
        for run in &self.runs {
            let family = run.style.font_family.as_str();
            if !families.contains(&family) {
                families.push(family);
            }
        }
        families
    }

    /// Reconstructed plain text.
    pub fn to_text(&self, mode: LineBreakMode) -> String {
        let mut out = String::new();
        for (run, joint) in self.runs.iter().zip(&self.joints) {
            out.push_str(&run.text);
            match (joint, mode) {
                (Joint::Verbatim | Joint::Joined, _) => {}
                (Joint::Spaced { same_line: false }, LineBreakMode::Newline) => out.push('\n'),
                (Joint::Spaced { .. }, _) => out.push(' '),
            }
        }
        out
    }

    /// HTML text layer: one absolutely positioned div per non-blank run.
    ///
    /// Fonts are registered in `fonts` so their classes end up in the
    /// document stylesheet.
    pub fn to_html(&self, fonts: &mut FontRegistry, options: &TextLayerOptions) -> String {
        let mut html = String::new();

        if !options.inner_html {
            if options.layer_dimensions {
                let _ = writeln!(
                    html,
                    r#"<div class="textLayer" style="width:{}px; height:{}px;">"#,
                    round2(self.viewport.width),
                    round2(self.viewport.height)
                );
            } else {
                html.push_str("<div class=\"textLayer\">\n");
            }
        }

        for run in &self.runs {
            if run.is_whitespace() {
                continue;
            }
            let face = fonts.register(&run.style.font_family);

            let mut style = format!(
                "left: {}px; top: {}px; font-size: {}px; font-family: {};",
                round2(run.x),
                round2(run.y),
                round2(run.height),
                face.display_family
            );
            if run.angle != 0.0 {
                let _ = write!(style, " transform: rotate({}deg);", round2(run.angle));
            }

            let dir = match run.dir {
                TextDirection::Rtl => " dir=\"rtl\"",
                _ => "",
            };

            let _ = writeln!(
                html,
                r#"<div class="{}" style="{}" data-canvas-width="{}"{}>{}</div>"#,
                face.class_name,
                html_escape::encode_double_quoted_attribute(&style),
                round2(run.width),
                dir,
                html_escape::encode_text(&run.text)
            );
        }

        html.push_str("<div class=\"endOfContent\"></div>\n");
        if !options.inner_html {
            html.push_str("</div>\n");
        }
        html
    }
}
