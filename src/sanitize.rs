//! Removal of unknown node and mark types.
//!
//! Sanitizing is lenient: anything the registry does not know is dropped
//! silently and the result is always renderable by the same registry.
//! The root node itself is never removed; callers must make sure its type
//! is known.
//!
//! # Example
//!
//! ```
//! use richdoc::extension::{builtin, ResolvedRegistry};
//! use richdoc::model::Node;
//! use richdoc::sanitize::sanitize;
//!
//! let registry = ResolvedRegistry::resolve(&builtin::review_extensions());
//! let doc = Node::new("doc").with_content(vec![Node::new("unknownWidget")]);
//!
//! let clean = sanitize(&doc, &registry);
//! assert!(clean.children().is_empty());
//! ```

use crate::extension::ResolvedRegistry;
use crate::model::Node;
use serde::{Deserialize, Serialize};

/// Default maximum nesting depth kept by the sanitizer.
///
/// Matches the renderer's limit and serde_json's parse nesting limit.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Options for sanitizing.
#[derive(Debug, Clone)]
pub struct SanitizeOptions {
    /// Subtrees nested deeper than this are cut off
    pub max_depth: usize,
}

impl SanitizeOptions {
    /// Create new sanitize options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum nesting depth.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// What a sanitize pass removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizeReport {
    /// Nodes removed, including the descendants of removed nodes
    pub removed_nodes: usize,

    /// Marks removed, including marks inside removed subtrees
    pub removed_marks: usize,

    /// Subtrees cut off at the depth limit
    pub truncated_subtrees: usize,
}

impl SanitizeReport {
    /// Check if nothing was removed.
    pub fn is_clean(&self) -> bool {
        self.removed_nodes == 0 && self.removed_marks == 0 && self.truncated_subtrees == 0
    }
}

/// Sanitize a document with default options.
///
/// The input is not modified; a filtered copy is returned.
pub fn sanitize(doc: &Node, registry: &ResolvedRegistry) -> Node {
    sanitize_with_report(doc, registry, &SanitizeOptions::default()).0
}

/// Sanitize a document with custom options.
pub fn sanitize_with_options(
    doc: &Node,
    registry: &ResolvedRegistry,
    options: &SanitizeOptions,
) -> Node {
    sanitize_with_report(doc, registry, options).0
}

/// Sanitize a document and report what was removed.
pub fn sanitize_with_report(
    doc: &Node,
    registry: &ResolvedRegistry,
    options: &SanitizeOptions,
) -> (Node, SanitizeReport) {
    let mut clone = doc.clone();
    let mut report = SanitizeReport::default();
    let mut stack: Vec<(&mut Node, usize)> = vec![(&mut clone, 0)];

    while let Some((node, depth)) = stack.pop() {
        if let Some(marks) = node.marks.as_mut() {
            let before = marks.len();
            marks.retain(|mark| registry.is_allowed_mark(mark.type_name()));
            report.removed_marks += before - marks.len();
        }

        let Some(content) = node.content.as_mut() else {
            continue;
        };

        if depth >= options.max_depth {
            if !content.is_empty() {
                report.truncated_subtrees += 1;
                for child in content.iter() {
                    report.removed_nodes += child.node_count();
                    report.removed_marks += child.mark_count();
                }
                content.clear();
            }
            continue;
        }

        content.retain(|child| {
            let keep = registry.is_allowed_node(child.type_name());
            if !keep {
                report.removed_nodes += child.node_count();
                report.removed_marks += child.mark_count();
            }
            keep
        });

        for child in content.iter_mut() {
            stack.push((child, depth + 1));
        }
    }

    if report.truncated_subtrees > 0 {
        log::warn!(
            "Sanitize cut {} subtree(s) nested deeper than {}",
            report.truncated_subtrees,
            options.max_depth
        );
    }
    if !report.is_clean() {
        log::debug!(
            "Sanitize removed {} node(s) and {} mark(s)",
            report.removed_nodes,
            report.removed_marks
        );
    }

    (clone, report)
}
