//! Integration tests for loading and saving stored documents.

use std::io::Write;

use richdoc::model::try_parse_document;
use richdoc::render::{serialize_document, to_json};
use richdoc::{load_document, load_file, parse_document, Error, JsonFormat, Node, StoredContent};
use serde_json::json;
use tempfile::NamedTempFile;

const DEFAULT_DOC: &str = r#"{"type":"doc","content":[{"type":"paragraph"}]}"#;

#[test]
fn test_malformed_string_falls_back() {
    let doc = load_document(&StoredContent::from("not valid json{"));
    assert_eq!(doc, Node::default_document());
    assert_eq!(serialize_document(&doc).unwrap(), DEFAULT_DOC);
}

#[test]
fn test_value_and_string_forms_agree() {
    let value = json!({"type": "doc", "content": [
        {"type": "paragraph", "content": [{"type": "text", "text": "hi", "marks": [{"type": "bold"}]}]}
    ]});
    let from_value = load_document(&StoredContent::from(value.clone()));
    let from_string = load_document(&StoredContent::from(value.to_string()));
    assert_eq!(from_value, from_string);
    assert_eq!(from_value.text_content(), "hi");
}

#[test]
fn test_stored_content_deserializes_untagged() {
    let encoded: StoredContent = serde_json::from_str(r#""{\"type\":\"doc\"}""#).unwrap();
    assert!(matches!(encoded, StoredContent::Encoded(_)));
    assert_eq!(encoded.load(), Node::new("doc"));

    let value: StoredContent = serde_json::from_str(r#"{"type":"doc"}"#).unwrap();
    assert!(matches!(value, StoredContent::Value(_)));
    assert_eq!(value.load(), Node::new("doc"));
}

#[test]
fn test_non_document_values_fall_back() {
    for value in [json!(null), json!(42), json!([1, 2]), json!({"content": []})] {
        assert_eq!(load_document(&StoredContent::from(value)), Node::default_document());
    }
}

#[test]
fn test_null_attrs_accepted() {
    let doc = parse_document(r#"{"type":"doc","attrs":null,"content":[{"type":"paragraph","attrs":null}]}"#);
    assert!(doc.attrs.is_empty());
    assert_eq!(doc.children()[0].type_name(), "paragraph");
}

#[test]
fn test_try_parse_document_errors() {
    assert!(matches!(try_parse_document("not valid json{"), Err(Error::Json(_))));
    assert!(matches!(try_parse_document(r#"{"content":[]}"#), Err(Error::Json(_))));
    assert!(try_parse_document(DEFAULT_DOC).is_ok());
}

#[test]
fn test_save_and_reload_roundtrip() {
    let doc = Node::new("doc").with_content(vec![
        Node::new("heading")
            .with_attr("level", 2)
            .with_content(vec![Node::text("Notes")]),
        Node::new("horizontalRule"),
    ]);
    let saved = serialize_document(&doc).unwrap();
    assert_eq!(parse_document(&saved), doc);

    let pretty = to_json(&doc, JsonFormat::Pretty).unwrap();
    assert!(pretty.contains('\n'));
    assert_eq!(parse_document(&pretty), doc);
}

#[test]
fn test_load_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", DEFAULT_DOC).unwrap();
    assert_eq!(load_file(file.path()).unwrap(), Node::default_document());
}

#[test]
fn test_load_file_with_encoded_string() {
    let mut file = NamedTempFile::new().unwrap();
    let encoded = serde_json::to_string(r#"{"type":"doc","content":[]}"#).unwrap();
    write!(file, "{}", encoded).unwrap();

    let doc = load_file(file.path()).unwrap();
    assert_eq!(doc.type_name(), "doc");
    assert!(doc.children().is_empty());
}

#[test]
fn test_load_file_malformed_falls_back() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "not valid json{{").unwrap();
    assert_eq!(load_file(file.path()).unwrap(), Node::default_document());
}

#[test]
fn test_load_file_missing_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_file(dir.path().join("missing.json"));
    assert!(matches!(result, Err(Error::Io(_))));
}
