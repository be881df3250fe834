//! Integration tests for the sanitizer.

use richdoc::extension::{builtin, Extension, ResolvedRegistry};
use richdoc::sanitize::{sanitize, sanitize_with_options, sanitize_with_report, SanitizeOptions};
use richdoc::{parse_document, Mark, Node};

fn minimal_registry() -> ResolvedRegistry {
    ResolvedRegistry::resolve(&[
        Extension::node("doc"),
        Extension::node("paragraph"),
        Extension::node("text"),
        Extension::mark("bold"),
    ])
}

fn messy_document() -> Node {
    parse_document(
        r#"{
            "type": "doc",
            "content": [
                {"type": "paragraph", "content": [
                    {"type": "text", "text": "a", "marks": [{"type": "bold"}, {"type": "comment"}, {"type": "italic"}]},
                    {"type": "mention", "attrs": {"id": 7}}
                ]},
                {"type": "table", "content": [
                    {"type": "tableRow", "content": [{"type": "paragraph"}]}
                ]},
                {"type": "bulletList", "content": [{"type": "listItem"}]},
                {"type": "paragraph", "content": [
                    {"type": "text", "text": "b", "marks": [{"type": {"name": "bold"}}]}
                ]}
            ]
        }"#,
    )
}

#[test]
fn test_unknown_widget_is_filtered() {
    let doc = parse_document(
        r#"{"type":"doc","content":[{"type":"paragraph","content":[{"type":"text","text":"hi","marks":[{"type":"bold"}]}]},{"type":"unknownWidget"}]}"#,
    );
    let clean = sanitize(&doc, &minimal_registry());

    assert_eq!(clean.children().len(), 1);
    assert_eq!(clean.children()[0].type_name(), "paragraph");
    assert_eq!(clean.children()[0].children()[0].mark_list().len(), 1);
}

#[test]
fn test_idempotent() {
    let registry = minimal_registry();
    let once = sanitize(&messy_document(), &registry);
    let twice = sanitize(&once, &registry);
    assert_eq!(once, twice);

    let (_, report) = sanitize_with_report(&once, &registry, &SanitizeOptions::default());
    assert!(report.is_clean());
}

#[test]
fn test_shrink_only_and_membership() {
    let registry = minimal_registry();
    let doc = messy_document();
    let clean = sanitize(&doc, &registry);

    assert!(clean.node_count() <= doc.node_count());
    assert!(clean.mark_count() <= doc.mark_count());

    for node in clean.descendants().skip(1) {
        assert!(registry.is_allowed_node(node.type_name()), "{}", node.type_name());
        for mark in node.mark_list() {
            assert!(registry.is_allowed_mark(mark.type_name()), "{}", mark.type_name());
        }
    }
}

#[test]
fn test_report_counts() {
    let (clean, report) =
        sanitize_with_report(&messy_document(), &minimal_registry(), &SanitizeOptions::default());

    // mention, table + tableRow + paragraph, bulletList + listItem
    assert_eq!(report.removed_nodes, 6);
    // comment, italic
    assert_eq!(report.removed_marks, 2);
    assert_eq!(report.truncated_subtrees, 0);
    assert_eq!(clean.children().len(), 2);
}

#[test]
fn test_object_type_names_are_normalized() {
    let clean = sanitize(&messy_document(), &minimal_registry());
    let last = &clean.children()[1].children()[0];
    assert_eq!(last.mark_list().len(), 1);
    assert_eq!(last.mark_list()[0].type_name(), "bold");
}

#[test]
fn test_non_mutation() {
    let doc = messy_document();
    let before = doc.clone();
    let _ = sanitize(&doc, &minimal_registry());
    assert_eq!(doc, before);
}

#[test]
fn test_mark_order_is_preserved() {
    let text = Node::text("x").with_marks(vec![
        Mark::new("italic"),
        Mark::new("unknown"),
        Mark::new("strike"),
        Mark::new("bold"),
    ]);
    let doc = Node::new("doc").with_content(vec![Node::new("paragraph").with_content(vec![text])]);

    let registry = ResolvedRegistry::resolve(&builtin::review_extensions());
    let clean = sanitize(&doc, &registry);
    let marks: Vec<&str> = clean.children()[0].children()[0]
        .mark_list()
        .iter()
        .map(|m| m.type_name())
        .collect();
    assert_eq!(marks, vec!["italic", "strike", "bold"]);
}

#[test]
fn test_deep_document_is_truncated() {
    let mut doc = Node::text("leaf");
    for _ in 0..2_000 {
        doc = Node::new("paragraph").with_content(vec![doc]);
    }
    let doc = Node::new("doc").with_content(vec![doc]);

    let (clean, report) =
        sanitize_with_report(&doc, &minimal_registry(), &SanitizeOptions::default());
    assert_eq!(clean.depth(), richdoc::sanitize::DEFAULT_MAX_DEPTH);
    assert_eq!(report.truncated_subtrees, 1);

    let shallow = sanitize_with_options(&doc, &minimal_registry(), &SanitizeOptions::new().with_max_depth(8));
    assert_eq!(shallow.depth(), 8);
}
