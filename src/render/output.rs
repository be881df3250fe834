//! Structural-output adapter.
//!
//! Extensions describe their output as JSON in the ProseMirror
//! `DOMOutputSpec` shape:
//!
//! - `"text"` renders literal text
//! - `["tag"]`, `["tag", {attrs}]` render an empty element
//! - `["tag", 0]`, `["tag", {attrs}, 0]` render an element around the
//!   node's children (`0` is the hole)
//! - `["tag", {attrs}, spec, ...]` render nested descriptions in order
//! - `"ns tag"` as the tag sets the `xmlns` attribute
//!
//! Anything else is an extension bug and fails with
//! [`Error::UnsupportedOutputSpec`].

use super::markup::{is_valid_name, Element, Markup};
use crate::error::{Error, Result};
use crate::model::Attrs;
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Map an HTML attribute name to its element-tree name.
pub fn attribute_name(name: &str) -> &str {
    match name {
        "class" => "className",
        "for" => "htmlFor",
        "colspan" => "colSpan",
        "rowspan" => "rowSpan",
        "tabindex" => "tabIndex",
        "readonly" => "readOnly",
        other => other,
    }
}

/// Convert a kebab-case style property to camelCase.
pub fn camel_case(prop: &str) -> String {
    static SEGMENT: OnceLock<Regex> = OnceLock::new();
    let re = SEGMENT.get_or_init(|| Regex::new(r"-([a-z])").unwrap());
    re.replace_all(prop, |caps: &Captures| caps[1].to_uppercase())
        .into_owned()
}

/// Parse an inline `"prop: value; prop: value"` style string.
///
/// Declarations without a property or value are skipped.
pub fn parse_style(style: &str) -> BTreeMap<String, String> {
    style
        .split(';')
        .filter_map(|rule| {
            let (prop, value) = rule.split_once(':')?;
            let (prop, value) = (prop.trim(), value.trim());
            if prop.is_empty() || value.is_empty() {
                return None;
            }
            Some((camel_case(prop), value.to_string()))
        })
        .collect()
}

/// Translate HTML attributes into element attributes and a style map.
pub fn map_attributes(attrs: &Attrs) -> (BTreeMap<String, Value>, BTreeMap<String, String>) {
    let mut mapped = BTreeMap::new();
    let mut style = BTreeMap::new();
    for (name, value) in attrs {
        match (name.as_str(), value) {
            (_, Value::Null) => {}
            ("style", Value::String(s)) => style.extend(parse_style(s)),
            (name, value) => {
                mapped.insert(attribute_name(name).to_string(), value.clone());
            }
        }
    }
    (mapped, style)
}

/// Check if a description contains a content hole.
pub fn has_hole(spec: &Value) -> bool {
    match spec {
        Value::Array(items) => items.iter().skip(1).any(|item| match item {
            Value::Number(n) => n.as_u64() == Some(0),
            Value::Array(_) => has_hole(item),
            _ => false,
        }),
        _ => false,
    }
}

/// Materialize a description, filling holes with `children`.
pub fn to_markup(spec: &Value, children: &[Markup]) -> Result<Markup> {
    match spec {
        Value::String(text) => Ok(Markup::Text(text.clone())),
        Value::Array(items) => {
            let tag = match items.first() {
                Some(Value::String(tag)) => tag,
                _ => return Err(unsupported(spec)),
            };
            let (namespace, tag) = match tag.split_once(' ') {
                Some((ns, tag)) => (Some(ns), tag),
                None => (None, tag.as_str()),
            };
            if !is_valid_name(tag) {
                return Err(unsupported(spec));
            }

            let (mut attrs, rest) = match items.get(1) {
                Some(Value::Object(map)) => (map.clone(), &items[2..]),
                _ => (Attrs::new(), &items[1..]),
            };
            if let Some(ns) = namespace {
                attrs.insert("xmlns".to_string(), Value::String(ns.to_string()));
            }

            let (attributes, style) = map_attributes(&attrs);
            let mut element = Element {
                tag: tag.to_string(),
                attributes,
                style,
                children: Vec::new(),
            };
            for item in rest {
                match item {
                    Value::Number(n) if n.as_u64() == Some(0) => {
                        element.children.extend(children.iter().cloned());
                    }
                    Value::String(_) | Value::Array(_) => {
                        element.children.push(to_markup(item, children)?);
                    }
                    _ => return Err(unsupported(spec)),
                }
            }
            Ok(Markup::Element(element))
        }
        _ => Err(unsupported(spec)),
    }
}

fn unsupported(spec: &Value) -> Error {
    Error::UnsupportedOutputSpec(spec.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attribute_renaming() {
        let attrs = match json!({"class": "a", "for": "x", "colspan": 2, "rowspan": 3, "title": null}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let (mapped, style) = map_attributes(&attrs);

        assert_eq!(mapped["className"], "a");
        assert_eq!(mapped["htmlFor"], "x");
        assert_eq!(mapped["colSpan"], 2);
        assert_eq!(mapped["rowSpan"], 3);
        assert!(!mapped.contains_key("title"));
        assert!(style.is_empty());
    }

    #[test]
    fn test_parse_style() {
        let style = parse_style("color: red; background-color:blue;; font-size: ; margin-top: 4px;");
        assert_eq!(style.len(), 3);
        assert_eq!(style["color"], "red");
        assert_eq!(style["backgroundColor"], "blue");
        assert_eq!(style["marginTop"], "4px");
    }

    #[test]
    fn test_style_value_with_colon() {
        let style = parse_style("background-image: url(http://x/y.png)");
        assert_eq!(style["backgroundImage"], "url(http://x/y.png)");
    }

    #[test]
    fn test_hole_and_nested() {
        let spec = json!(["pre", {"class": "code"}, ["code", {}, 0]]);
        assert!(has_hole(&spec));

        let markup = to_markup(&spec, &[Markup::text("fn main()")]).unwrap();
        assert_eq!(
            markup.to_html(),
            r#"<pre class="code"><code>fn main()</code></pre>"#
        );
    }

    #[test]
    fn test_leaf_forms() {
        assert!(!has_hole(&json!(["hr", {}])));
        assert_eq!(to_markup(&json!(["br"]), &[]).unwrap().to_html(), "<br>");
        assert_eq!(
            to_markup(&json!(["span", 0]), &[Markup::text("x")]).unwrap().to_html(),
            "<span>x</span>"
        );
        assert_eq!(to_markup(&json!("plain"), &[]).unwrap(), Markup::text("plain"));
    }

    #[test]
    fn test_namespace() {
        let markup = to_markup(&json!(["http://www.w3.org/2000/svg svg", 0]), &[]).unwrap();
        let el = markup.as_element().unwrap();
        assert_eq!(el.tag, "svg");
        assert_eq!(el.attributes["xmlns"], "http://www.w3.org/2000/svg");
    }

    #[test]
    fn test_unsupported_specs() {
        for spec in [json!(42), json!(null), json!([]), json!([1, 0]), json!({"tag": "p"}), json!(["p", 3])] {
            let err = to_markup(&spec, &[]).unwrap_err();
            assert!(matches!(err, Error::UnsupportedOutputSpec(ref v) if v == &spec));
        }
    }

    #[test]
    fn test_invalid_tag_names_rejected() {
        for spec in [json!(["p><script", 0]), json!(["svg a b", 0]), json!(["x onclick=y", 0])] {
            assert!(matches!(to_markup(&spec, &[]), Err(Error::UnsupportedOutputSpec(_))));
        }
    }
}
