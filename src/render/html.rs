//! Markup rendering driven by extension output descriptions.

use super::markup::{Element, Markup};
use super::options::{RenderOptions, UnhandledPolicy};
use super::output::{has_hole, to_markup};
use super::renderer::{MarkProps, NodeProps, StaticRenderer};
use crate::error::{Error, Result};
use crate::extension::{Extension, ExtensionKind, ResolvedRegistry, Target};
use crate::model::Node;
use crate::sanitize::sanitize_with_options;
use rayon::prelude::*;
use std::sync::Arc;

/// Build a markup renderer from a resolved registry.
///
/// Every node and mark extension with an output description gets a
/// renderer. `doc` renders as a `div` carrying the root class and `text`
/// as its literal text. The returned renderer can be customized further
/// with [`StaticRenderer::with_node`] and friends.
pub fn markup_renderer(
    registry: Arc<ResolvedRegistry>,
    options: &RenderOptions,
) -> StaticRenderer<Markup> {
    let mut renderer =
        StaticRenderer::new(Arc::clone(&registry)).with_max_depth(options.max_depth);

    for ext in registry.effective().filter(|e| e.has_render_html()) {
        let name = ext.name().to_string();
        let ext = ext.clone();
        renderer = match ext.kind() {
            ExtensionKind::Node => renderer.with_node(name, move |props| node_markup(&ext, props)),
            ExtensionKind::Mark => renderer.with_mark(name, move |props| mark_markup(&ext, props)),
            ExtensionKind::Extension => renderer,
        };
    }

    let root_class = options.root_class_name.clone();
    renderer = renderer
        .with_node("doc", move |props| {
            let root = Element::new("div")
                .with_attribute("className", root_class.as_str())
                .with_children(props.children.render()?);
            Ok(Markup::Element(root))
        })
        .with_node("text", |props| {
            Ok(Markup::Text(props.node.text.clone().unwrap_or_default()))
        });

    match options.unhandled {
        UnhandledPolicy::Fail => renderer,
        UnhandledPolicy::Omit => renderer
            .with_unhandled_node(|_| Ok(Markup::Empty))
            .with_unhandled_mark(|props| Ok(props.children)),
    }
}

fn node_markup(ext: &Extension, props: NodeProps<'_, Markup>) -> Result<Markup> {
    let spec = ext
        .render_html(Target::Node(props.node))
        .ok_or_else(|| Error::MissingNodeHandler(ext.name().to_string()))?;
    let children = if has_hole(&spec) {
        props.children.render()?
    } else {
        Vec::new()
    };
    to_markup(&spec, &children)
}

fn mark_markup(ext: &Extension, props: MarkProps<'_, Markup>) -> Result<Markup> {
    let spec = ext
        .render_html(Target::Mark(props.mark))
        .ok_or_else(|| Error::MissingMarkHandler(ext.name().to_string()))?;
    to_markup(&spec, std::slice::from_ref(&props.children))
}

/// Render a document with an already resolved registry.
///
/// The document is rendered as is; see [`render_content`] for the
/// sanitizing entry point.
pub fn render_to_markup(
    doc: &Node,
    registry: Arc<ResolvedRegistry>,
    options: &RenderOptions,
) -> Result<Markup> {
    markup_renderer(registry, options).render(doc)
}

/// Resolve extensions, sanitize and render a document.
pub fn render_content(
    doc: &Node,
    extensions: &[Extension],
    options: &RenderOptions,
) -> Result<Markup> {
    let registry = Arc::new(ResolvedRegistry::resolve_with_policy(
        extensions,
        options.duplicate_policy,
    )?);
    render_resolved(doc, registry, options)
}

/// Resolve extensions, sanitize and render a document to an HTML string.
pub fn render_html(doc: &Node, extensions: &[Extension], options: &RenderOptions) -> Result<String> {
    render_content(doc, extensions, options).map(|markup| markup.to_html())
}

/// Render many documents in parallel against one registry.
///
/// Results come back in input order; one failing document does not affect
/// the others.
pub fn render_batch(
    docs: &[Node],
    registry: Arc<ResolvedRegistry>,
    options: &RenderOptions,
) -> Vec<Result<Markup>> {
    let renderer = markup_renderer(Arc::clone(&registry), options);
    docs.par_iter()
        .map(|doc| {
            if options.sanitize {
                let clean = sanitize_with_options(doc, &registry, &options.sanitize_options());
                renderer.render(&clean)
            } else {
                renderer.render(doc)
            }
        })
        .collect()
}

pub(crate) fn render_resolved(
    doc: &Node,
    registry: Arc<ResolvedRegistry>,
    options: &RenderOptions,
) -> Result<Markup> {
    if options.sanitize {
        let clean = sanitize_with_options(doc, &registry, &options.sanitize_options());
        render_to_markup(&clean, registry, options)
    } else {
        render_to_markup(doc, registry, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::builtin;
    use crate::model::Mark;
    use serde_json::json;

    fn review_registry() -> Arc<ResolvedRegistry> {
        Arc::new(ResolvedRegistry::resolve(&builtin::review_extensions()))
    }

    #[test]
    fn test_paragraph_with_bold() {
        let doc = Node::new("doc").with_content(vec![Node::new("paragraph").with_content(vec![
            Node::text("Hi "),
            Node::text("there").with_mark(Mark::new("bold")),
        ])]);

        let markup = render_to_markup(&doc, review_registry(), &RenderOptions::default()).unwrap();
        assert_eq!(
            markup.to_html(),
            r#"<div class="tiptap-editor"><p>Hi <strong>there</strong></p></div>"#
        );
    }

    #[test]
    fn test_review_classes_applied() {
        let doc = Node::new("doc").with_content(vec![
            Node::new("horizontalRule"),
            Node::new("image").with_attr("src", "/cat.png").with_attr("alt", "cat"),
        ]);

        let html = render_to_markup(&doc, review_registry(), &RenderOptions::default())
            .unwrap()
            .to_html();
        assert!(html.contains(r#"<hr class="tiptap-horizontal-rule">"#));
        assert!(html.contains(r#"<img alt="cat" class="tiptap-image" src="/cat.png">"#));
    }

    #[test]
    fn test_text_is_escaped() {
        let doc = Node::new("doc").with_content(vec![Node::new("paragraph")
            .with_content(vec![Node::text("<script>alert(1)</script>")])]);

        let html = render_to_markup(&doc, review_registry(), &RenderOptions::default())
            .unwrap()
            .to_html();
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_leaf_spec_skips_children() {
        let registry = Arc::new(ResolvedRegistry::resolve(&[
            builtin::document(),
            builtin::text(),
            Extension::node("widget").with_render_html(|_| json!(["hr"])),
        ]));
        let doc = Node::new("doc").with_content(vec![
            Node::new("widget").with_content(vec![Node::new("unregistered")])
        ]);

        // The unregistered child would fail if it were rendered.
        let html = render_to_markup(&doc, registry, &RenderOptions::default())
            .unwrap()
            .to_html();
        assert_eq!(html, r#"<div class="tiptap-editor"><hr></div>"#);
    }

    #[test]
    fn test_unsupported_spec_is_error() {
        let registry = Arc::new(ResolvedRegistry::resolve(&[
            builtin::document(),
            Extension::node("broken").with_render_html(|_| json!({"tag": "p"})),
        ]));
        let doc = Node::new("doc").with_content(vec![Node::new("broken")]);

        let err = render_to_markup(&doc, registry, &RenderOptions::default()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedOutputSpec(_)));
    }

    #[test]
    fn test_omit_policy() {
        let doc = Node::new("doc").with_content(vec![
            Node::new("unknownWidget"),
            Node::new("paragraph")
                .with_content(vec![Node::text("x").with_mark(Mark::new("underline"))]),
        ]);
        let options = RenderOptions::new().with_unhandled(UnhandledPolicy::Omit);

        let html = render_to_markup(&doc, review_registry(), &options)
            .unwrap()
            .to_html();
        assert_eq!(html, r#"<div class="tiptap-editor"><p>x</p></div>"#);
    }

    #[test]
    fn test_render_content_sanitizes() {
        let doc = Node::new("doc").with_content(vec![
            Node::new("unknownWidget"),
            Node::new("paragraph").with_content(vec![Node::text("ok")]),
        ]);

        let html = render_html(&doc, &builtin::review_extensions(), &RenderOptions::default())
            .unwrap();
        assert_eq!(html, r#"<div class="tiptap-editor"><p>ok</p></div>"#);

        let strict = RenderOptions::new().with_sanitize(false);
        let err = render_html(&doc, &builtin::review_extensions(), &strict).unwrap_err();
        assert!(matches!(err, Error::MissingNodeHandler(ref t) if t == "unknownWidget"));
    }

    #[test]
    fn test_render_batch_keeps_order() {
        let docs: Vec<Node> = (0..8)
            .map(|i| {
                Node::new("doc").with_content(vec![
                    Node::new("paragraph").with_content(vec![Node::text(format!("doc {}", i))])
                ])
            })
            .collect();

        let results = render_batch(&docs, review_registry(), &RenderOptions::default());
        assert_eq!(results.len(), 8);
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.as_ref().unwrap().text_content(), format!("doc {}", i));
        }
    }
}
