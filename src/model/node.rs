//! Node-level types.

use super::Mark;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;

/// Open attribute mapping of a node or mark.
///
/// The schema is owned by the extension that defines the type.
pub type Attrs = Map<String, Value>;

/// Type reference of a node or mark.
///
/// Stored JSON carries a bare string, while editor-side node instances
/// carry an object with a `name`. Both normalize through [`TypeName::as_str`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeName {
    /// Plain type name, e.g. `"paragraph"`
    Name(String),
    /// Type object carrying a name
    Object {
        /// Type name
        name: String,
    },
}

impl TypeName {
    /// Get the normalized type name.
    pub fn as_str(&self) -> &str {
        match self {
            TypeName::Name(name) => name,
            TypeName::Object { name } => name,
        }
    }
}

impl From<&str> for TypeName {
    fn from(name: &str) -> Self {
        TypeName::Name(name.to_string())
    }
}

impl From<String> for TypeName {
    fn from(name: String) -> Self {
        TypeName::Name(name)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq<str> for TypeName {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for TypeName {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// A node in a rich-text document tree.
///
/// Identity is purely structural; a node is addressed only by its position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Node type, e.g. `doc`, `paragraph`, `text`
    #[serde(rename = "type")]
    pub node_type: TypeName,

    /// Node attributes
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Map::is_empty"
    )]
    pub attrs: Attrs,

    /// Child nodes (absent for leaf and text nodes)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<Node>>,

    /// Marks applied to this node, in stored order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks: Option<Vec<Mark>>,

    /// Literal text (text nodes only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Node {
    /// Create a node of the given type with no attributes or content.
    pub fn new(node_type: impl Into<TypeName>) -> Self {
        Self {
            node_type: node_type.into(),
            attrs: Attrs::new(),
            content: None,
            marks: None,
            text: None,
        }
    }

    /// Create a text node.
    pub fn text(text: impl Into<String>) -> Self {
        let mut node = Self::new("text");
        node.text = Some(text.into());
        node
    }

    /// The document stored when nothing else is available:
    /// `{type: "doc", content: [{type: "paragraph"}]}`.
    pub fn default_document() -> Self {
        Self::new("doc").with_content(vec![Self::new("paragraph")])
    }

    /// Set the child nodes.
    pub fn with_content(mut self, content: Vec<Node>) -> Self {
        self.content = Some(content);
        self
    }

    /// Set the marks.
    pub fn with_marks(mut self, marks: Vec<Mark>) -> Self {
        self.marks = Some(marks);
        self
    }

    /// Append a mark.
    pub fn with_mark(mut self, mark: Mark) -> Self {
        self.marks.get_or_insert_with(Vec::new).push(mark);
        self
    }

    /// Set an attribute.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Get the normalized type name.
    pub fn type_name(&self) -> &str {
        self.node_type.as_str()
    }

    /// Check if this is a text node.
    pub fn is_text(&self) -> bool {
        self.node_type == "text"
    }

    /// Get the child nodes (empty for leaves).
    pub fn children(&self) -> &[Node] {
        self.content.as_deref().unwrap_or(&[])
    }

    /// Get the marks (empty if none).
    pub fn mark_list(&self) -> &[Mark] {
        self.marks.as_deref().unwrap_or(&[])
    }

    /// Get an attribute value.
    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.attrs.get(key)
    }

    /// Iterate over this node and all descendants, depth first.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Total number of nodes in this subtree, including this node.
    pub fn node_count(&self) -> usize {
        self.descendants().count()
    }

    /// Total number of marks in this subtree.
    pub fn mark_count(&self) -> usize {
        self.descendants().map(|n| n.mark_list().len()).sum()
    }

    /// Concatenated text of all text nodes in this subtree.
    pub fn text_content(&self) -> String {
        self.descendants()
            .filter_map(|n| n.text.as_deref())
            .collect()
    }

    /// Names of all node and mark types used in this subtree.
    pub fn types(&self) -> BTreeSet<String> {
        let mut types = BTreeSet::new();
        for node in self.descendants() {
            types.insert(node.type_name().to_string());
            for mark in node.mark_list() {
                types.insert(mark.type_name().to_string());
            }
        }
        types
    }

    /// Maximum nesting depth of this subtree (a leaf has depth 0).
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(self, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            max = max.max(depth);
            for child in node.children() {
                stack.push((child, depth + 1));
            }
        }
        max
    }
}

/// Depth-first, pre-order iterator over a subtree.
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<Attrs, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Attrs>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_name_forms() {
        let plain: TypeName = serde_json::from_value(json!("paragraph")).unwrap();
        let object: TypeName = serde_json::from_value(json!({"name": "paragraph", "spec": {}})).unwrap();
        assert_eq!(plain.as_str(), "paragraph");
        assert_eq!(object.as_str(), "paragraph");
    }

    #[test]
    fn test_deserialize_node() {
        let node: Node = serde_json::from_value(json!({
            "type": "paragraph",
            "attrs": null,
            "content": [{"type": "text", "text": "hi", "marks": [{"type": "bold"}]}]
        }))
        .unwrap();

        assert_eq!(node.type_name(), "paragraph");
        assert!(node.attrs.is_empty());
        assert_eq!(node.children().len(), 1);
        assert!(node.children()[0].is_text());
        assert_eq!(node.children()[0].mark_list()[0].type_name(), "bold");
    }

    #[test]
    fn test_serialize_skips_absent_fields() {
        let value = serde_json::to_value(Node::new("paragraph")).unwrap();
        assert_eq!(value, json!({"type": "paragraph"}));
    }

    #[test]
    fn test_counts() {
        let doc = Node::new("doc").with_content(vec![
            Node::new("paragraph").with_content(vec![
                Node::text("a").with_mark(Mark::new("bold")).with_mark(Mark::new("italic")),
                Node::text("b"),
            ]),
            Node::new("horizontalRule"),
        ]);

        assert_eq!(doc.node_count(), 5);
        assert_eq!(doc.mark_count(), 2);
        assert_eq!(doc.text_content(), "ab");
        assert_eq!(doc.depth(), 2);
        assert!(doc.types().contains("italic"));
    }

    #[test]
    fn test_descendants_preorder() {
        let doc = Node::new("doc").with_content(vec![
            Node::new("paragraph").with_content(vec![Node::text("x")]),
            Node::new("image"),
        ]);
        let order: Vec<&str> = doc.descendants().map(|n| n.type_name()).collect();
        assert_eq!(order, vec!["doc", "paragraph", "text", "image"]);
    }
}
