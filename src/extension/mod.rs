//! Extension definitions and registry resolution.
//!
//! An [`Extension`] describes one node or mark type: its name, its options,
//! and how it renders to a structural-output description. Extensions may
//! bundle child extensions; [`ResolvedRegistry`] flattens, sorts and
//! indexes a declared list for lookup during sanitizing and rendering.
//!
//! # Example
//!
//! ```
//! use richdoc::extension::{builtin, ResolvedRegistry};
//!
//! let registry = ResolvedRegistry::resolve(&builtin::review_extensions());
//! assert!(registry.is_allowed_node("image"));
//! assert!(registry.is_allowed_mark("bold"));
//! ```

pub mod builtin;
mod cache;
mod registry;

pub use cache::{fingerprint, RegistryCache};
pub use registry::{
    find_duplicates, flatten_extensions, resolve_extensions, sort_extensions, DuplicatePolicy,
    Resolution, ResolvedRegistry,
};

use crate::model::{Attrs, Mark, Node};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Extension configuration, resolved once and passed to every render call.
pub type Options = serde_json::Map<String, Value>;

/// Priority assigned to extensions that don't declare one.
pub const DEFAULT_PRIORITY: i32 = 100;

/// Option key holding attributes merged into every rendered element.
pub const HTML_ATTRIBUTES: &str = "HTMLAttributes";

/// Renders a node or mark to a structural-output description.
pub type HtmlRenderFn = Arc<dyn Fn(HtmlContext<'_>) -> Value + Send + Sync>;

/// Kind of an extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionKind {
    /// Defines a node type
    Node,
    /// Defines a mark type
    Mark,
    /// Plain functionality or a bundle of other extensions
    Extension,
}

/// What is being rendered.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    /// A node
    Node(&'a Node),
    /// A mark
    Mark(&'a Mark),
}

impl<'a> Target<'a> {
    /// Attributes of the node or mark.
    pub fn attrs(&self) -> &'a Attrs {
        match self {
            Target::Node(node) => &node.attrs,
            Target::Mark(mark) => &mark.attrs,
        }
    }

    /// Get a single attribute.
    pub fn attr(&self, key: &str) -> Option<&'a Value> {
        self.attrs().get(key)
    }
}

/// Input to an extension's HTML renderer.
#[derive(Debug, Clone)]
pub struct HtmlContext<'a> {
    /// The node or mark being rendered
    pub target: Target<'a>,

    /// Resolved extension options
    pub options: &'a Options,

    /// `HTMLAttributes` option merged with the rendered node/mark attributes
    pub html_attributes: Attrs,
}

/// A node, mark, or bundle definition.
#[derive(Clone)]
pub struct Extension {
    name: String,
    kind: ExtensionKind,
    priority: i32,
    options: Options,
    attributes: Vec<String>,
    extensions: Vec<Extension>,
    render_html: Option<HtmlRenderFn>,
}

impl Extension {
    fn with_kind(name: impl Into<String>, kind: ExtensionKind) -> Self {
        Self {
            name: name.into(),
            kind,
            priority: DEFAULT_PRIORITY,
            options: Options::new(),
            attributes: Vec::new(),
            extensions: Vec::new(),
            render_html: None,
        }
    }

    /// Create a node extension.
    pub fn node(name: impl Into<String>) -> Self {
        Self::with_kind(name, ExtensionKind::Node)
    }

    /// Create a mark extension.
    pub fn mark(name: impl Into<String>) -> Self {
        Self::with_kind(name, ExtensionKind::Mark)
    }

    /// Create a bundle of child extensions.
    pub fn bundle(name: impl Into<String>, extensions: Vec<Extension>) -> Self {
        let mut ext = Self::with_kind(name, ExtensionKind::Extension);
        ext.extensions = extensions;
        ext
    }

    /// Set the priority (higher sorts first).
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set a single option.
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Replace all options.
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Declare node/mark attributes rendered as HTML attributes.
    pub fn with_attributes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = names.into_iter().map(Into::into).collect();
        self
    }

    /// Add a bundled child extension.
    pub fn with_extension(mut self, ext: Extension) -> Self {
        self.extensions.push(ext);
        self
    }

    /// Set the HTML renderer.
    pub fn with_render_html<F>(mut self, f: F) -> Self
    where
        F: Fn(HtmlContext<'_>) -> Value + Send + Sync + 'static,
    {
        self.render_html = Some(Arc::new(f));
        self
    }

    /// Derive an extension whose options are this one's merged with `overrides`.
    ///
    /// Keys in `overrides` replace the parent's; everything else, including
    /// the renderer, is inherited.
    pub fn extend(&self, overrides: Options) -> Self {
        let mut child = self.clone();
        for (key, value) in overrides {
            child.options.insert(key, value);
        }
        child
    }

    /// Extension name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Extension kind.
    pub fn kind(&self) -> ExtensionKind {
        self.kind
    }

    /// Extension priority.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Resolved options.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Names of attributes rendered as HTML attributes.
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Bundled child extensions.
    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    /// Check if this extension can render HTML.
    pub fn has_render_html(&self) -> bool {
        self.render_html.is_some()
    }

    /// Identity of the HTML renderer, if any.
    ///
    /// Clones of an extension share their renderer and report the same id.
    pub fn render_html_id(&self) -> Option<usize> {
        self.render_html
            .as_ref()
            .map(|f| Arc::as_ptr(f) as *const () as usize)
    }

    /// Render a node or mark to a structural-output description.
    ///
    /// Returns `None` when the extension has no HTML renderer.
    pub fn render_html(&self, target: Target<'_>) -> Option<Value> {
        let render = self.render_html.as_ref()?;
        let html_attributes = self.html_attributes(target);
        Some(render(HtmlContext {
            target,
            options: &self.options,
            html_attributes,
        }))
    }

    fn html_attributes(&self, target: Target<'_>) -> Attrs {
        let mut rendered = Attrs::new();
        for name in &self.attributes {
            match target.attr(name) {
                Some(Value::Null) | None => {}
                Some(value) => {
                    rendered.insert(name.clone(), value.clone());
                }
            }
        }
        let base = match self.options.get(HTML_ATTRIBUTES) {
            Some(Value::Object(attrs)) => attrs.clone(),
            _ => Attrs::new(),
        };
        merge_attributes(&[&base, &rendered])
    }
}

impl fmt::Debug for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extension")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("priority", &self.priority)
            .field("options", &self.options)
            .field("extensions", &self.extensions)
            .field("render_html", &self.render_html.is_some())
            .finish()
    }
}

/// Merge attribute maps left to right.
///
/// `class` values are joined with a space and `style` values with `"; "`;
/// any other key is overwritten by later maps.
pub fn merge_attributes(maps: &[&Attrs]) -> Attrs {
    let mut merged = Attrs::new();
    for map in maps {
        for (key, value) in map.iter() {
            let joined = match (key.as_str(), merged.get(key), value) {
                ("class", Some(Value::String(prev)), Value::String(next)) => {
                    let mut classes: Vec<&str> = prev.split_whitespace().collect();
                    for class in next.split_whitespace() {
                        if !classes.contains(&class) {
                            classes.push(class);
                        }
                    }
                    Some(Value::String(classes.join(" ")))
                }
                ("style", Some(Value::String(prev)), Value::String(next)) => {
                    let parts: Vec<&str> = [prev.as_str(), next.as_str()]
                        .into_iter()
                        .map(|s| s.trim().trim_end_matches(';').trim())
                        .filter(|s| !s.is_empty())
                        .collect();
                    Some(Value::String(parts.join("; ")))
                }
                _ => None,
            };
            merged.insert(key.clone(), joined.unwrap_or_else(|| value.clone()));
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(value: Value) -> Attrs {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_merge_attributes_class_and_style() {
        let a = attrs(json!({"class": "a b", "style": "color: red;", "id": "x"}));
        let b = attrs(json!({"class": "b c", "style": "margin: 0", "id": "y"}));
        let merged = merge_attributes(&[&a, &b]);

        assert_eq!(merged["class"], "a b c");
        assert_eq!(merged["style"], "color: red; margin: 0");
        assert_eq!(merged["id"], "y");
    }

    #[test]
    fn test_extend_overrides_options() {
        let base = Extension::node("image")
            .with_option("inline", false)
            .with_option("allowBase64", false);
        let child = base.extend(attrs(json!({"allowBase64": true, "HTMLAttributes": {"class": "x"}})));

        assert_eq!(child.options()["inline"], false);
        assert_eq!(child.options()["allowBase64"], true);
        assert_eq!(child.options()["HTMLAttributes"], json!({"class": "x"}));
        assert_eq!(base.options()["allowBase64"], false);
    }

    #[test]
    fn test_render_html_merges_attributes() {
        let ext = Extension::node("image")
            .with_attributes(["src", "alt"])
            .with_option(HTML_ATTRIBUTES, json!({"class": "tiptap-image"}))
            .with_render_html(|ctx| json!(["img", Value::Object(ctx.html_attributes)]));

        let node = Node::new("image")
            .with_attr("src", "/a.png")
            .with_attr("alt", Value::Null)
            .with_attr("width", 10);
        let spec = ext.render_html(Target::Node(&node)).unwrap();

        assert_eq!(spec, json!(["img", {"class": "tiptap-image", "src": "/a.png"}]));
    }

    #[test]
    fn test_render_html_absent() {
        let ext = Extension::node("doc");
        assert!(ext.render_html(Target::Node(&Node::new("doc"))).is_none());
    }
}
