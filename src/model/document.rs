//! Stored document content.
//!
//! Documents are persisted as `{type: "doc", content: [...]}` JSON. The
//! storage layer hands the value back either already parsed or as a
//! JSON-encoded string. Loading never fails on malformed content: the
//! default empty document is substituted instead.

use super::Node;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// Document content as handed back by the storage layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredContent {
    /// JSON-encoded document string
    Encoded(String),
    /// Already-parsed JSON value
    Value(Value),
}

impl StoredContent {
    /// Load the document, substituting the default document on failure.
    pub fn load(&self) -> Node {
        match self {
            StoredContent::Encoded(s) => parse_document(s),
            StoredContent::Value(Value::String(s)) => parse_document(s),
            StoredContent::Value(v) => from_value(v.clone()),
        }
    }
}

impl From<&str> for StoredContent {
    fn from(s: &str) -> Self {
        StoredContent::Encoded(s.to_string())
    }
}

impl From<String> for StoredContent {
    fn from(s: String) -> Self {
        StoredContent::Encoded(s)
    }
}

impl From<Value> for StoredContent {
    fn from(v: Value) -> Self {
        StoredContent::Value(v)
    }
}

impl From<Node> for StoredContent {
    fn from(node: Node) -> Self {
        match serde_json::to_value(node) {
            Ok(v) => StoredContent::Value(v),
            Err(_) => StoredContent::Value(Value::Null),
        }
    }
}

/// Load a document from stored content.
///
/// Malformed content yields [`Node::default_document`].
pub fn load_document(content: &StoredContent) -> Node {
    content.load()
}

/// Parse a JSON-encoded document string.
///
/// Malformed content yields [`Node::default_document`].
pub fn parse_document(s: &str) -> Node {
    match try_parse_document(s) {
        Ok(node) => node,
        Err(e) => {
            log::debug!("Stored content is not a valid document ({}), using default", e);
            Node::default_document()
        }
    }
}

/// Parse a JSON-encoded document string, reporting why it is malformed.
///
/// A `text` node without `text` is accepted and renders as empty text.
pub fn try_parse_document(s: &str) -> Result<Node> {
    Ok(serde_json::from_str(s)?)
}

fn from_value(value: Value) -> Node {
    match serde_json::from_value::<Node>(value) {
        Ok(node) => node,
        Err(e) => {
            log::debug!("Stored value is not a valid document ({}), using default", e);
            Node::default_document()
        }
    }
}

/// Load a document from a file containing stored content.
///
/// I/O errors are returned; malformed contents fall back to the default
/// document. A file holding a JSON string literal is decoded once more.
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Node> {
    let data = std::fs::read_to_string(path)?;
    let content = match serde_json::from_str::<Value>(&data) {
        Ok(value) => StoredContent::Value(value),
        Err(_) => StoredContent::Encoded(data),
    };
    Ok(content.load())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_valid() {
        let node = parse_document(r#"{"type":"doc","content":[{"type":"paragraph"}]}"#);
        assert_eq!(node.type_name(), "doc");
        assert_eq!(node.children().len(), 1);
    }

    #[test]
    fn test_parse_malformed_falls_back() {
        assert_eq!(parse_document("not valid json{"), Node::default_document());
    }

    #[test]
    fn test_parse_not_a_tree_falls_back() {
        assert_eq!(parse_document("[1, 2, 3]"), Node::default_document());
        assert_eq!(parse_document(r#"{"content": []}"#), Node::default_document());
    }

    #[test]
    fn test_text_node_without_text_is_kept() {
        let stored = r#"{"type":"doc","content":[{"type":"text"},{"type":"text","text":"after"}]}"#;
        let node = parse_document(stored);
        assert_eq!(node.children().len(), 2);
        assert_eq!(node.children()[0].text, None);
        assert_eq!(node.text_content(), "after");
    }

    #[test]
    fn test_try_parse_reports_json_error() {
        assert!(matches!(try_parse_document("{"), Err(crate::Error::Json(_))));
    }

    #[test]
    fn test_load_value() {
        let stored = StoredContent::from(json!({"type": "doc", "content": []}));
        let node = load_document(&stored);
        assert_eq!(node.children().len(), 0);
        assert!(node.content.is_some());
    }

    #[test]
    fn test_load_value_holding_string() {
        let stored = StoredContent::Value(json!(r#"{"type":"doc"}"#));
        assert_eq!(load_document(&stored), Node::new("doc"));
    }

    #[test]
    fn test_default_document_shape() {
        let value = serde_json::to_value(Node::default_document()).unwrap();
        assert_eq!(value, json!({"type": "doc", "content": [{"type": "paragraph"}]}));
    }
}
