//! Plain text rendering.

use super::options::{RenderOptions, UnhandledPolicy};
use super::renderer::{NodeProps, StaticRenderer};
use crate::error::{Error, Result};
use crate::extension::{Extension, ResolvedRegistry};
use crate::model::Node;
use crate::sanitize::sanitize_with_options;
use serde_json::Value;
use std::sync::Arc;

/// Build a plain-text renderer.
///
/// Block nodes are separated by blank lines, list items get `- ` or `n. `
/// markers and marks are dropped. Registered node types without a text
/// form render their children; unregistered types follow
/// [`RenderOptions::unhandled`].
pub fn text_renderer(
    registry: Arc<ResolvedRegistry>,
    options: &RenderOptions,
) -> StaticRenderer<String> {
    let policy = options.unhandled;
    let known_nodes = Arc::clone(&registry);
    let known_marks = Arc::clone(&registry);

    StaticRenderer::new(registry)
        .with_max_depth(options.max_depth)
        .with_node("doc", |props| blocks(&props, "\n\n"))
        .with_node("text", |props| Ok(props.node.text.clone().unwrap_or_default()))
        .with_node("paragraph", inline)
        .with_node("heading", inline)
        .with_node("codeBlock", inline)
        .with_node("listItem", |props| blocks(&props, "\n"))
        .with_node("blockquote", |props| {
            let body = blocks(&props, "\n\n")?;
            Ok(body
                .lines()
                .map(|line| if line.is_empty() { ">".to_string() } else { format!("> {}", line) })
                .collect::<Vec<_>>()
                .join("\n"))
        })
        .with_node("bulletList", |props| {
            let items = props.children.render()?;
            Ok(items
                .iter()
                .map(|item| prefix_lines(item, "- "))
                .collect::<Vec<_>>()
                .join("\n"))
        })
        .with_node("orderedList", |props| {
            let start = props.node.attr("start").and_then(Value::as_u64).unwrap_or(1);
            let items = props.children.render()?;
            Ok(items
                .iter()
                .zip(start..)
                .map(|(item, n)| prefix_lines(item, &format!("{}. ", n)))
                .collect::<Vec<_>>()
                .join("\n"))
        })
        .with_node("hardBreak", |_| Ok("\n".to_string()))
        .with_node("horizontalRule", |_| Ok("---".to_string()))
        .with_node("image", |props| {
            Ok(props
                .node
                .attr("alt")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string())
        })
        .with_unhandled_node(move |props| {
            let node_type = props.node.type_name();
            if known_nodes.is_allowed_node(node_type) {
                inline(props)
            } else {
                match policy {
                    UnhandledPolicy::Fail => Err(Error::MissingNodeHandler(node_type.to_string())),
                    UnhandledPolicy::Omit => Ok(String::new()),
                }
            }
        })
        .with_unhandled_mark(move |props| {
            let mark_type = props.mark.type_name();
            if policy == UnhandledPolicy::Fail && !known_marks.is_allowed_mark(mark_type) {
                return Err(Error::MissingMarkHandler(mark_type.to_string()));
            }
            Ok(props.children)
        })
}

fn inline(props: NodeProps<'_, String>) -> Result<String> {
    Ok(props.children.render()?.concat())
}

fn blocks(props: &NodeProps<'_, String>, separator: &str) -> Result<String> {
    Ok(props
        .children
        .render()?
        .into_iter()
        .filter(|block| !block.is_empty())
        .collect::<Vec<_>>()
        .join(separator))
}

/// Prefix the first line with `marker` and indent the rest to match.
fn prefix_lines(text: &str, marker: &str) -> String {
    if text.is_empty() {
        return marker.trim_end().to_string();
    }
    let indent = " ".repeat(marker.len());
    text.lines()
        .enumerate()
        .map(|(i, line)| match i {
            0 => format!("{}{}", marker, line),
            _ if line.is_empty() => String::new(),
            _ => format!("{}{}", indent, line),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render a document to plain text with an already resolved registry.
pub fn render_to_text(
    doc: &Node,
    registry: Arc<ResolvedRegistry>,
    options: &RenderOptions,
) -> Result<String> {
    let output = if options.sanitize {
        let clean = sanitize_with_options(doc, &registry, &options.sanitize_options());
        text_renderer(registry, options).render(&clean)?
    } else {
        text_renderer(registry, options).render(doc)?
    };
    Ok(output.trim().to_string())
}

/// Resolve extensions and render a document to plain text.
pub fn to_text(doc: &Node, extensions: &[Extension], options: &RenderOptions) -> Result<String> {
    let registry = ResolvedRegistry::resolve_with_policy(extensions, options.duplicate_policy)?;
    render_to_text(doc, Arc::new(registry), options)
}
