//! Generic static tree renderer.
//!
//! [`StaticRenderer`] walks a document depth first and dispatches each node
//! and mark by type name to a registered renderer. The output type is up to
//! the caller: the markup and plain-text targets in this crate are both
//! built on it.
//!
//! Children are rendered lazily. A node renderer receives a [`Children`]
//! handle and only pays for its subtree if it calls [`Children::render`].
//!
//! Marks wrap the node output in stored order: the first mark wraps the raw
//! node output, the second wraps that, and so on.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use richdoc::extension::{Extension, ResolvedRegistry};
//! use richdoc::model::{Mark, Node};
//! use richdoc::render::StaticRenderer;
//!
//! let registry = Arc::new(ResolvedRegistry::resolve(&[
//!     Extension::node("doc"),
//!     Extension::node("text"),
//!     Extension::mark("bold"),
//! ]));
//!
//! let renderer = StaticRenderer::<String>::new(registry)
//!     .with_node("doc", |props| Ok(props.children.render()?.concat()))
//!     .with_node("text", |props| Ok(props.node.text.clone().unwrap_or_default()))
//!     .with_mark("bold", |props| Ok(format!("**{}**", props.children)));
//!
//! let doc = Node::new("doc").with_content(vec![Node::text("hi").with_mark(Mark::new("bold"))]);
//! assert_eq!(renderer.render(&doc)?, "**hi**");
//! # Ok::<(), richdoc::Error>(())
//! ```

use crate::error::{Error, Result};
use crate::extension::{Options, ResolvedRegistry};
use crate::model::{Mark, Node};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Default maximum nesting depth accepted by the renderer.
///
/// Rendering recurses once per level, so this must fit a 2 MB thread stack
/// (test threads and rayon workers) in unoptimized builds.
pub const DEFAULT_MAX_DEPTH: usize = crate::sanitize::DEFAULT_MAX_DEPTH;

/// Renders one node given its props.
pub type NodeRenderer<T> = Arc<dyn Fn(NodeProps<'_, T>) -> Result<T> + Send + Sync>;

/// Wraps already-rendered output in one mark.
pub type MarkRenderer<T> = Arc<dyn Fn(MarkProps<'_, T>) -> Result<T> + Send + Sync>;

/// Input to a node renderer.
pub struct NodeProps<'a, T> {
    /// The node being rendered
    pub node: &'a Node,

    /// Parent node; `None` only for the root
    pub parent: Option<&'a Node>,

    /// Options of the node's extension, if registered
    pub options: Option<&'a Options>,

    /// Lazily rendered children
    pub children: Children<'a, T>,

    renderer: &'a StaticRenderer<T>,
    depth: usize,
}

impl<'a, T> NodeProps<'a, T> {
    /// Render arbitrary content nested inside this node.
    ///
    /// Lets a renderer place content itself instead of relying on
    /// [`NodeProps::children`].
    pub fn render_element(&self, content: &Node, parent: Option<&Node>) -> Result<T> {
        self.renderer.render_node(content, parent, self.depth + 1)
    }

    /// Nesting depth of this node (the root is 0).
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// Input to a mark renderer.
pub struct MarkProps<'a, T> {
    /// The mark being rendered
    pub mark: &'a Mark,

    /// The node the mark is applied to
    pub node: &'a Node,

    /// Parent of the marked node
    pub parent: Option<&'a Node>,

    /// Options of the mark's extension, if registered
    pub options: Option<&'a Options>,

    /// Output rendered so far (the node plus any earlier marks)
    pub children: T,
}

/// Deferred rendering of a node's children.
pub struct Children<'a, T> {
    node: &'a Node,
    renderer: &'a StaticRenderer<T>,
    depth: usize,
}

impl<'a, T> Children<'a, T> {
    /// Render every child in order.
    pub fn render(&self) -> Result<Vec<T>> {
        self.node
            .children()
            .iter()
            .map(|child| self.renderer.render_node(child, Some(self.node), self.depth + 1))
            .collect()
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.node.children().len()
    }

    /// Check if there are no children.
    pub fn is_empty(&self) -> bool {
        self.node.children().is_empty()
    }
}

/// Renders document trees by dispatching on type names.
pub struct StaticRenderer<T> {
    registry: Arc<ResolvedRegistry>,
    node_mapping: HashMap<String, NodeRenderer<T>>,
    mark_mapping: HashMap<String, MarkRenderer<T>>,
    unhandled_node: Option<NodeRenderer<T>>,
    unhandled_mark: Option<MarkRenderer<T>>,
    max_depth: usize,
}

impl<T> StaticRenderer<T> {
    /// Create a renderer with no mappings.
    pub fn new(registry: Arc<ResolvedRegistry>) -> Self {
        Self {
            registry,
            node_mapping: HashMap::new(),
            mark_mapping: HashMap::new(),
            unhandled_node: None,
            unhandled_mark: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Register a node renderer, replacing any existing one.
    pub fn with_node<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(NodeProps<'_, T>) -> Result<T> + Send + Sync + 'static,
    {
        self.node_mapping.insert(name.into(), Arc::new(f));
        self
    }

    /// Register a mark renderer, replacing any existing one.
    pub fn with_mark<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(MarkProps<'_, T>) -> Result<T> + Send + Sync + 'static,
    {
        self.mark_mapping.insert(name.into(), Arc::new(f));
        self
    }

    /// Fallback for node types without a renderer.
    pub fn with_unhandled_node<F>(mut self, f: F) -> Self
    where
        F: Fn(NodeProps<'_, T>) -> Result<T> + Send + Sync + 'static,
    {
        self.unhandled_node = Some(Arc::new(f));
        self
    }

    /// Fallback for mark types without a renderer.
    pub fn with_unhandled_mark<F>(mut self, f: F) -> Self
    where
        F: Fn(MarkProps<'_, T>) -> Result<T> + Send + Sync + 'static,
    {
        self.unhandled_mark = Some(Arc::new(f));
        self
    }

    /// Set the maximum nesting depth.
    ///
    /// Each level costs one `render_node` frame plus the renderer closure;
    /// raise it only on threads with a matching stack size.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// The registry options are looked up in.
    pub fn registry(&self) -> &Arc<ResolvedRegistry> {
        &self.registry
    }

    /// Render a document from its root.
    pub fn render(&self, root: &Node) -> Result<T> {
        self.render_node(root, None, 0)
    }

    fn render_node(&self, node: &Node, parent: Option<&Node>, depth: usize) -> Result<T> {
        if depth > self.max_depth {
            return Err(Error::DepthLimitExceeded {
                limit: self.max_depth,
            });
        }

        let node_type = node.type_name();
        let handler = self
            .node_mapping
            .get(node_type)
            .or(self.unhandled_node.as_ref())
            .ok_or_else(|| Error::MissingNodeHandler(node_type.to_string()))?;

        let output = handler(NodeProps {
            node,
            parent,
            options: self.registry.options(node_type),
            children: Children {
                node,
                renderer: self,
                depth,
            },
            renderer: self,
            depth,
        })?;

        node.mark_list().iter().try_fold(output, |acc, mark| {
            let mark_type = mark.type_name();
            let handler = self
                .mark_mapping
                .get(mark_type)
                .or(self.unhandled_mark.as_ref())
                .ok_or_else(|| Error::MissingMarkHandler(mark_type.to_string()))?;

            handler(MarkProps {
                mark,
                node,
                parent,
                options: self.registry.options(mark_type),
                children: acc,
            })
        })
    }
}

impl<T> fmt::Debug for StaticRenderer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut nodes: Vec<&String> = self.node_mapping.keys().collect();
        nodes.sort();
        let mut marks: Vec<&String> = self.mark_mapping.keys().collect();
        marks.sort();
        f.debug_struct("StaticRenderer")
            .field("nodes", &nodes)
            .field("marks", &marks)
            .field("unhandled_node", &self.unhandled_node.is_some())
            .field("unhandled_mark", &self.unhandled_mark.is_some())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}
