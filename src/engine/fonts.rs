//! Font substitution for HTML output.
//!
//! A [`FontRegistry`] lives for one page session: writers register the source
//! families they meet and get back a CSS class and a display family. When the
//! page is done the pipeline drains the registry into the document-wide
//! [`StyleSheet`], which is written once as `stylesheet.css`.

use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;

fn class_sanitizer() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").unwrap())
}

fn foundry_suffix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:PS)?MT$").unwrap())
}

/// How one source font family is presented in HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontFace {
    /// Family reported by the engine
    pub source_family: String,
    /// CSS `font-family` value with a generic fallback
    pub display_family: String,
    /// CSS class applied to text divs using this font
    pub class_name: String,
    /// Bold weight inferred from the name
    pub bold: bool,
    /// Italic style inferred from the name
    pub italic: bool,
}

impl FontFace {
    /// Derive the face for a source family name.
    pub fn for_family(source_family: &str) -> Self {
        let lower = source_family.to_ascii_lowercase();

        let base = source_family
            .split(|c| c == '-' || c == ',')
            .next()
            .unwrap_or(source_family)
            .trim();
        let base = foundry_suffix().replace(base, "");
        let base = if base.is_empty() { source_family } else { &base };

        let generic = if ["courier", "mono", "consol"].iter().any(|k| lower.contains(k)) {
            "monospace"
        } else if lower.contains("sans") {
            "sans-serif"
        } else if ["times", "roman", "serif", "georgia", "garamond", "minion"]
            .iter()
            .any(|k| lower.contains(k))
        {
            "serif"
        } else {
            "sans-serif"
        };

        let slug = class_sanitizer().replace_all(&lower, "-");
        let slug = slug.trim_matches('-');

        Self {
            source_family: source_family.to_string(),
            display_family: format!("'{}', {}", base.replace('\'', ""), generic),
            class_name: if slug.is_empty() {
                "ff-unknown".to_string()
            } else {
                format!("ff-{}", slug)
            },
            bold: ["bold", "black", "heavy"].iter().any(|k| lower.contains(k)),
            italic: lower.contains("italic") || lower.contains("oblique"),
        }
    }

    /// The style rule for this face's class.
    pub fn css_rule(&self) -> CssRule {
        let mut rule = CssRule::new(format!(".{}", self.class_name))
            .declare("font-family", &self.display_family);
        if self.bold {
            rule = rule.declare("font-weight", "bold");
        }
        if self.italic {
            rule = rule.declare("font-style", "italic");
        }
        rule
    }
}

/// Font registrations made while processing one page.
#[derive(Debug, Default)]
pub struct FontRegistry {
    faces: IndexMap<String, FontFace>,
}

impl FontRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source family, returning its face. Repeated calls are cheap.
    pub fn register(&mut self, source_family: &str) -> &FontFace {
        self.faces
            .entry(source_family.to_string())
            .or_insert_with(|| FontFace::for_family(source_family))
    }

    /// Face for an already registered family.
    pub fn get(&self, source_family: &str) -> Option<&FontFace> {
        self.faces.get(source_family)
    }

    /// Number of registered families.
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Remove and return every registration, in first-registered order.
    pub fn drain(&mut self) -> Vec<FontFace> {
        self.faces.drain(..).map(|(_, face)| face).collect()
    }
}

/// One CSS rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssRule {
    /// Selector text
    pub selector: String,
    /// Property/value pairs in declaration order
    pub declarations: Vec<(String, String)>,
}

impl CssRule {
    /// Create a rule with no declarations.
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            declarations: Vec::new(),
        }
    }

    /// Add a declaration.
    pub fn declare(mut self, property: &str, value: &str) -> Self {
        self.declarations.push((property.to_string(), value.to_string()));
        self
    }

    /// Serialize as `selector { prop: value; ... }`.
    pub fn to_css(&self) -> String {
        let body: Vec<String> = self
            .declarations
            .iter()
            .map(|(p, v)| format!("{}: {};", p, v))
            .collect();
        format!("{} {{ {} }}", self.selector, body.join(" "))
    }
}

/// Document-wide style rules, deduplicated by selector.
#[derive(Debug, Clone)]
pub struct StyleSheet {
    rules: IndexMap<String, CssRule>,
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleSheet {
    /// A stylesheet holding the base text layer rules.
    pub fn new() -> Self {
        let mut sheet = Self {
            rules: IndexMap::new(),
        };
        sheet.add_rule(
            CssRule::new(".textLayer")
                .declare("position", "absolute")
                .declare("left", "0")
                .declare("top", "0")
                .declare("right", "0")
                .declare("bottom", "0")
                .declare("overflow", "hidden")
                .declare("line-height", "1.0"),
        );
        sheet.add_rule(
            CssRule::new(".textLayer > div")
                .declare("color", "transparent")
                .declare("position", "absolute")
                .declare("white-space", "pre")
                .declare("cursor", "text")
                .declare("transform-origin", "0% 0%"),
        );
        sheet.add_rule(
            CssRule::new(".textLayer .endOfContent")
                .declare("display", "block")
                .declare("position", "absolute")
                .declare("left", "0px")
                .declare("top", "100%")
                .declare("right", "0px")
                .declare("bottom", "0px")
                .declare("z-index", "-1")
                .declare("cursor", "default")
                .declare("user-select", "none"),
        );
        sheet
    }

    /// Add a rule unless one with the same selector exists. Returns whether it was added.
    pub fn add_rule(&mut self, rule: CssRule) -> bool {
        if self.rules.contains_key(&rule.selector) {
            return false;
        }
        self.rules.insert(rule.selector.clone(), rule);
        true
    }

    /// Drain a page's font registry into this stylesheet.
    pub fn absorb(&mut self, registry: &mut FontRegistry) -> usize {
        registry
            .drain()
            .into_iter()
            .filter(|face| self.add_rule(face.css_rule()))
            .count()
    }

    /// Rules in insertion order.
    pub fn rules(&self) -> impl Iterator<Item = &CssRule> {
        self.rules.values()
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the stylesheet has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// One rule per line.
    pub fn to_css(&self) -> String {
        let mut css = String::new();
        for rule in self.rules.values() {
            css.push_str(&rule.to_css());
            css.push('\n');
        }
        css
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_for_family() {
        let face = FontFace::for_family("Helvetica-Bold");
        assert_eq!(face.display_family, "'Helvetica', sans-serif");
        assert_eq!(face.class_name, "ff-helvetica-bold");
        assert!(face.bold);
        assert!(!face.italic);

        let face = FontFace::for_family("TimesNewRomanPS-ItalicMT");
        assert_eq!(face.display_family, "'TimesNewRomanPS', serif");
        assert!(face.italic);

        let face = FontFace::for_family("ArialMT");
        assert_eq!(face.display_family, "'Arial', sans-serif");

        let face = FontFace::for_family("Courier");
        assert_eq!(face.display_family, "'Courier', monospace");
    }

    #[test]
    fn test_registry_is_idempotent_and_drains() {
        let mut registry = FontRegistry::new();
        let class = registry.register("Helvetica").class_name.clone();
        registry.register("Helvetica");
        registry.register("Times-Roman");
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("Helvetica").map(|f| f.class_name.clone()), Some(class));

        let faces = registry.drain();
        assert_eq!(faces.len(), 2);
        assert_eq!(faces[0].source_family, "Helvetica");
        assert!(registry.is_empty());
    }

    #[test]
    fn test_stylesheet_dedups_across_pages() {
        let mut sheet = StyleSheet::new();
        let base = sheet.len();

        let mut page1 = FontRegistry::new();
        page1.register("Helvetica");
        assert_eq!(sheet.absorb(&mut page1), 1);

        let mut page2 = FontRegistry::new();
        page2.register("Helvetica");
        page2.register("Courier-Oblique");
        assert_eq!(sheet.absorb(&mut page2), 1);

        assert_eq!(sheet.len(), base + 2);
        let css = sheet.to_css();
        assert!(css.starts_with(".textLayer {"));
        assert!(css.contains(".ff-helvetica { font-family: 'Helvetica', sans-serif; }"));
        assert!(css.contains(
            ".ff-courier-oblique { font-family: 'Courier', monospace; font-style: italic; }"
        ));
        assert_eq!(css.lines().count(), sheet.len());
    }
}
