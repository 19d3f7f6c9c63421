//! Vector graphics backend: replays a page's operator list and text into SVG.

use super::{OperatorList, VectorTarget};
use crate::model::{TextContent, Viewport};

/// Builds an SVG surface from page content.
#[derive(Debug, Default, Clone, Copy)]
pub struct SvgGraphics {
    /// Also draw text as `<text>` elements
    pub include_text: bool,
}

impl SvgGraphics {
    /// Backend that draws paths and text.
    pub fn new() -> Self {
        Self { include_text: true }
    }

    /// Replay paths, then text, onto a new vector surface.
    pub fn build(
        &self,
        operators: &OperatorList,
        text: &TextContent,
        viewport: &Viewport,
    ) -> VectorTarget {
        let mut target = VectorTarget::new(viewport);
        for path in &operators.paths {
            target.push_path(path);
        }

        if self.include_text {
            for item in &text.items {
                if item.text.trim().is_empty() {
                    continue;
                }
                let family = text
                    .styles
                    .get(&item.font_name)
                    .map(|s| s.font_family.as_str())
                    .unwrap_or("sans-serif");
                target.push_text(&item.transform, family, &item.text);
            }
        }
        target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Color, Fill, FillRule, PaintedPath, PathSegment};
    use crate::model::{TextDirection, TextItem, TextStyle};

    #[test]
    fn test_build_paths_then_text() {
        let viewport = Viewport::new([0.0, 0.0, 100.0, 100.0], 2.0, 0);
        let operators = OperatorList {
            paths: vec![PaintedPath {
                segments: vec![PathSegment::MoveTo(0.0, 0.0), PathSegment::LineTo(1.0, 1.0)],
                fill: Some(Fill {
                    color: Color::BLACK,
                    rule: FillRule::NonZero,
                }),
                stroke: None,
            }],
        };
        let mut text = TextContent::new();
        text.styles.insert(
            "F1".to_string(),
            TextStyle {
                font_family: "Times".to_string(),
                ..Default::default()
            },
        );
        for s in ["Hi", " "] {
            text.items.push(TextItem {
                text: s.to_string(),
                dir: TextDirection::Ltr,
                transform: [10.0, 0.0, 0.0, 10.0, 5.0, 50.0],
                width: 10.0,
                height: 10.0,
                font_name: "F1".to_string(),
            });
        }

        let svg = SvgGraphics::new().build(&operators, &text, &viewport).finish();
        assert!(svg.contains(r#"width="200px""#));
        let path_at = svg.find("<path").unwrap();
        let text_at = svg.find("<text").unwrap();
        assert!(path_at < text_at);
        assert_eq!(svg.matches("<text").count(), 1);
        assert!(svg.contains(r#"font-family="Times""#));

        let paths_only = SvgGraphics::default().build(&operators, &text, &viewport).finish();
        assert!(!paths_only.contains("<text"));
    }
}
