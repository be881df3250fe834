//! Document model types for rich-text content.
//!
//! A document is a recursive tree of [`Node`]s decorated with [`Mark`]s,
//! serialized as Tiptap/ProseMirror JSON. The model is schema-agnostic:
//! which types are valid is decided by the extension registry.

mod document;
mod mark;
mod node;

pub use document::{
    load_document, load_file, parse_document, try_parse_document, StoredContent,
};
pub use mark::Mark;
pub use node::{Attrs, Descendants, Node, TypeName};
