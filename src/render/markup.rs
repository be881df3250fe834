//! Markup tree output.

use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::OnceLock;

/// Elements that never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// A rendered markup node.
#[derive(Debug, Clone, PartialEq)]
pub enum Markup {
    /// An element with attributes and children
    Element(Element),
    /// Literal text
    Text(String),
    /// Siblings without a wrapping element
    Fragment(Vec<Markup>),
    /// Nothing
    Empty,
}

impl Markup {
    /// Create a text node.
    pub fn text(text: impl Into<String>) -> Self {
        Markup::Text(text.into())
    }

    /// Get the element, if this is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Markup::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Child nodes of an element or fragment.
    pub fn children(&self) -> &[Markup] {
        match self {
            Markup::Element(el) => &el.children,
            Markup::Fragment(children) => children,
            _ => &[],
        }
    }

    /// Concatenated text of this subtree.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Markup::Text(text) => out.push_str(text),
            Markup::Element(el) => el.children.iter().for_each(|c| c.collect_text(out)),
            Markup::Fragment(children) => children.iter().for_each(|c| c.collect_text(out)),
            Markup::Empty => {}
        }
    }

    /// Serialize to an HTML string.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    /// Append the HTML serialization to `out`.
    pub fn write_html(&self, out: &mut String) {
        match self {
            Markup::Element(el) => el.write_html(out),
            Markup::Text(text) => out.push_str(&escape_html(text)),
            Markup::Fragment(children) => children.iter().for_each(|c| c.write_html(out)),
            Markup::Empty => {}
        }
    }
}

/// A markup element.
///
/// Attribute keys use the element-tree naming (`className`, `htmlFor`,
/// `colSpan`, ...); the inline style is kept as a camelCase property map.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    /// Tag name
    pub tag: String,

    /// Attributes keyed by element-tree name
    pub attributes: BTreeMap<String, Value>,

    /// Inline style properties keyed by camelCase name
    pub style: BTreeMap<String, String>,

    /// Child nodes
    pub children: Vec<Markup>,
}

impl Element {
    /// Create an element with no attributes or children.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Set an attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Set the children.
    pub fn with_children(mut self, children: Vec<Markup>) -> Self {
        self.children = children;
        self
    }

    /// Get an attribute by element-tree name.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Get the class attribute.
    pub fn class_name(&self) -> Option<&str> {
        self.attribute("className").and_then(Value::as_str)
    }

    /// Check if this is a void element.
    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.tag.as_str())
    }

    fn write_html(&self, out: &mut String) {
        if !is_valid_name(&self.tag) {
            log::warn!("Dropping element wrapper with invalid tag {:?}", self.tag);
            for child in &self.children {
                child.write_html(out);
            }
            return;
        }

        out.push('<');
        out.push_str(&self.tag);
        for (key, value) in &self.attributes {
            let name = html_attribute_name(key);
            if !is_valid_name(name) {
                log::warn!("Skipping attribute with invalid name {:?}", name);
                continue;
            }
            match value {
                Value::Null | Value::Bool(false) => {}
                Value::Bool(true) => {
                    out.push(' ');
                    out.push_str(name);
                }
                Value::String(s) => {
                    let _ = write!(out, " {}=\"{}\"", name, escape_html(s));
                }
                other => {
                    let _ = write!(out, " {}=\"{}\"", name, escape_html(&other.to_string()));
                }
            }
        }
        if !self.style.is_empty() {
            let css = self
                .style
                .iter()
                .map(|(prop, value)| format!("{}: {}", kebab_case(prop), value))
                .collect::<Vec<_>>()
                .join("; ");
            let _ = write!(out, " style=\"{}\"", escape_html(&css));
        }
        out.push('>');

        if self.is_void() {
            return;
        }
        for child in &self.children {
            child.write_html(out);
        }
        let _ = write!(out, "</{}>", self.tag);
    }
}

/// Check if a tag or attribute name can be written into HTML as is.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name.chars().any(|c| {
            c.is_whitespace() || c.is_control() || matches!(c, '"' | '\'' | '<' | '>' | '/' | '=')
        })
}

/// Map an element-tree attribute name back to its HTML name.
pub fn html_attribute_name(key: &str) -> &str {
    match key {
        "className" => "class",
        "htmlFor" => "for",
        "colSpan" => "colspan",
        "rowSpan" => "rowspan",
        "tabIndex" => "tabindex",
        "readOnly" => "readonly",
        other => other,
    }
}

/// Convert a camelCase style property to kebab-case.
pub fn kebab_case(prop: &str) -> String {
    static UPPER: OnceLock<Regex> = OnceLock::new();
    let re = UPPER.get_or_init(|| Regex::new(r"([A-Z])").unwrap());
    re.replace_all(prop, |caps: &Captures| format!("-{}", caps[1].to_lowercase()))
        .into_owned()
}

/// Escape text for HTML content and attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_html_element() {
        let mut el = Element::new("p")
            .with_attribute("className", "lead")
            .with_attribute("hidden", true)
            .with_attribute("draggable", false)
            .with_children(vec![Markup::text("a < b")]);
        el.style.insert("fontSize".into(), "12px".into());

        assert_eq!(
            Markup::Element(el).to_html(),
            r#"<p class="lead" hidden style="font-size: 12px">a &lt; b</p>"#
        );
    }

    #[test]
    fn test_void_element() {
        let img = Element::new("img").with_attribute("src", "/a.png?x=1&y=2");
        assert_eq!(
            Markup::Element(img).to_html(),
            r#"<img src="/a.png?x=1&amp;y=2">"#
        );
    }

    #[test]
    fn test_fragment_and_empty() {
        let markup = Markup::Fragment(vec![Markup::text("a"), Markup::Empty, Markup::text("b")]);
        assert_eq!(markup.to_html(), "ab");
        assert_eq!(markup.text_content(), "ab");
    }

    #[test]
    fn test_invalid_names_not_written() {
        let el = Element::new("p")
            .with_attribute("onclick x", "a")
            .with_attribute("a\"><script>", "b")
            .with_attribute("data/x", "c")
            .with_attribute("title", "ok")
            .with_children(vec![Markup::text("x")]);
        assert_eq!(Markup::Element(el).to_html(), r#"<p title="ok">x</p>"#);

        let el = Element::new("div><script").with_children(vec![Markup::text("y")]);
        assert_eq!(Markup::Element(el).to_html(), "y");

        assert!(is_valid_name("data-id"));
        assert!(is_valid_name("xlink:href"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("a=b"));
    }

    #[test]
    fn test_kebab_case() {
        assert_eq!(kebab_case("backgroundColor"), "background-color");
        assert_eq!(kebab_case("WebkitTransition"), "-webkit-transition");
        assert_eq!(kebab_case("color"), "color");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
    }
}
