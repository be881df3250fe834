//! JSON serialization of documents.

use crate::error::Result;
use crate::model::Node;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a document to JSON.
///
/// Absent `content`, `marks` and `text` fields stay absent, and empty
/// `attrs` are omitted, so a loaded document serializes back to the shape
/// it was stored in.
pub fn to_json(doc: &Node, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(doc)?,
        JsonFormat::Compact => serde_json::to_string(doc)?,
    };
    Ok(json)
}

/// Serialize a document to compact JSON for storage.
pub fn serialize_document(doc: &Node) -> Result<String> {
    to_json(doc, JsonFormat::Compact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{parse_document, Mark};

    #[test]
    fn test_to_json_pretty() {
        let doc = Node::new("doc").with_content(vec![Node::new("paragraph")
            .with_content(vec![Node::text("Hello").with_mark(Mark::new("bold"))])]);

        let json = to_json(&doc, JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"type\": \"paragraph\""));
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_to_json_compact() {
        let json = to_json(&Node::default_document(), JsonFormat::Compact).unwrap();
        assert_eq!(json, r#"{"type":"doc","content":[{"type":"paragraph"}]}"#);
    }

    #[test]
    fn test_stored_shape_preserved() {
        let stored = r#"{"type":"doc","content":[{"type":"paragraph","attrs":{"textAlign":"left"},"content":[]},{"type":"horizontalRule"}]}"#;
        let doc = parse_document(stored);
        assert_eq!(serialize_document(&doc).unwrap(), stored);
    }
}
