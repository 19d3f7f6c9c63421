//! Positioned text as reported by the decoding engine.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::geometry::Matrix;

/// Writing direction of a text item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    /// Left to right
    #[default]
    Ltr,
    /// Right to left
    Rtl,
    /// Top to bottom (vertical writing)
    Ttb,
}

impl TextDirection {
    /// Value for an HTML `dir` attribute.
    pub fn as_str(&self) -> &'static str {
        match self {
            TextDirection::Ltr => "ltr",
            TextDirection::Rtl => "rtl",
            TextDirection::Ttb => "ttb",
        }
    }
}

/// One positioned string fragment in page space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextItem {
    /// Text content
    pub text: String,

    /// Writing direction
    pub dir: TextDirection,

    /// Text rendering matrix in page space (includes the font size)
    pub transform: Matrix,

    /// Advance width in page units
    pub width: f64,

    /// Font height in page units
    pub height: f64,

    /// Key into [`TextContent::styles`]
    pub font_name: String,
}

/// Resolved style for one font used on a page.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextStyle {
    /// Source-reported font family
    pub font_family: String,

    /// Ascent as a fraction of the em (positive)
    pub ascent: Option<f64>,

    /// Descent as a fraction of the em (negative)
    pub descent: Option<f64>,

    /// Whether the font uses vertical writing mode
    pub vertical: bool,
}

/// All text of one page, in engine reading order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextContent {
    /// Items in the order the engine reports them
    pub items: Vec<TextItem>,

    /// Font name to style
    pub styles: HashMap<String, TextStyle>,
}

impl TextContent {
    /// Create empty text content.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the style for an item, failing if the engine did not report one.
    pub fn style_for(&self, item: &TextItem) -> crate::Result<&TextStyle> {
        self.styles.get(&item.font_name).ok_or_else(|| {
            crate::Error::MalformedText(format!(
                "no style reported for font '{}'",
                item.font_name
            ))
        })
    }
}

/// Whether a string is empty or contains only whitespace.
pub fn is_all_whitespace(s: &str) -> bool {
    s.chars().all(char::is_whitespace)
}
