//! # richdoc
//!
//! Server-side rendering for Tiptap/ProseMirror rich-text documents.
//!
//! Documents are stored as JSON trees (`{type: "doc", content: [...]}`).
//! This library resolves a declared list of extensions into a registry,
//! strips node and mark types the registry does not know, and renders the
//! remaining tree to a markup tree, HTML, or plain text.
//!
//! ## Quick Start
//!
//! ```
//! use richdoc::{builtin, render, load_document, StoredContent};
//!
//! fn main() -> richdoc::Result<()> {
//!     let stored = StoredContent::from(
//!         r#"{"type":"doc","content":[{"type":"paragraph","content":[{"type":"text","text":"Hi"}]}]}"#,
//!     );
//!     let doc = load_document(&stored);
//!
//!     let options = render::RenderOptions::default();
//!     let html = render::render_html(&doc, &builtin::review_extensions(), &options)?;
//!     assert_eq!(html, r#"<div class="tiptap-editor"><p>Hi</p></div>"#);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Extension registry**: flattening, priority sorting, duplicate detection
//! - **Sanitizer**: removes unknown node and mark types, bounded depth
//! - **Static renderer**: generic over the output type, lazy children
//! - **Output targets**: markup tree, HTML string, plain text, JSON
//! - **Parallel processing**: Uses Rayon for batches of documents

pub mod error;
pub mod extension;
pub mod model;
pub mod render;
pub mod sanitize;

// Re-export commonly used types
pub use error::{Error, Result};
pub use extension::{
    builtin, DuplicatePolicy, Extension, ExtensionKind, RegistryCache, ResolvedRegistry,
};
pub use model::{load_document, load_file, parse_document, Mark, Node, StoredContent, TypeName};
pub use render::{JsonFormat, Markup, RenderOptions, StaticRenderer, UnhandledPolicy};
pub use sanitize::{sanitize, sanitize_with_report, SanitizeOptions, SanitizeReport};

use std::path::Path;
use std::sync::Arc;

/// Render stored content to HTML with the review extensions.
///
/// Malformed content renders as an empty paragraph instead of failing.
///
/// # Example
///
/// ```
/// use richdoc::{to_html, StoredContent};
///
/// let html = to_html(&StoredContent::from("not valid json{")).unwrap();
/// assert_eq!(html, r#"<div class="tiptap-editor"><p></p></div>"#);
/// ```
pub fn to_html(stored: &StoredContent) -> Result<String> {
    Richdoc::new().load(stored)?.to_html()
}

/// Extract plain text from stored content with the review extensions.
///
/// # Example
///
/// ```
/// use richdoc::{to_text, StoredContent};
///
/// let stored = StoredContent::from(
///     r#"{"type":"doc","content":[{"type":"paragraph","content":[{"type":"text","text":"Hello"}]}]}"#,
/// );
/// assert_eq!(to_text(&stored).unwrap(), "Hello");
/// ```
pub fn to_text(stored: &StoredContent) -> Result<String> {
    Richdoc::new().load(stored)?.to_text()
}

/// Render a stored-content file to HTML with the review extensions.
///
/// # Example
///
/// ```no_run
/// use richdoc::render_file;
///
/// let html = render_file("review.json").unwrap();
/// std::fs::write("review.html", html).unwrap();
/// ```
pub fn render_file<P: AsRef<Path>>(path: P) -> Result<String> {
    Richdoc::new().load_file(path)?.to_html()
}

/// Builder for loading and rendering documents.
///
/// # Example
///
/// ```
/// use richdoc::{Richdoc, StoredContent};
///
/// let html = Richdoc::new()
///     .with_root_class("lb-editor")
///     .load(&StoredContent::from(r#"{"type":"doc","content":[{"type":"horizontalRule"}]}"#))?
///     .to_html()?;
/// assert_eq!(html, r#"<div class="lb-editor"><hr class="tiptap-horizontal-rule"></div>"#);
/// # Ok::<(), richdoc::Error>(())
/// ```
pub struct Richdoc {
    extensions: Vec<Extension>,
    render_options: RenderOptions,
    cache: Option<Arc<RegistryCache>>,
}

impl Richdoc {
    /// Create a builder using the review extensions.
    pub fn new() -> Self {
        Self {
            extensions: builtin::review_extensions(),
            render_options: RenderOptions::default(),
            cache: None,
        }
    }

    /// Replace the declared extension list.
    pub fn with_extensions(mut self, extensions: Vec<Extension>) -> Self {
        self.extensions = extensions;
        self
    }

    /// Append an extension to the declared list.
    pub fn with_extension(mut self, extension: Extension) -> Self {
        self.extensions.push(extension);
        self
    }

    /// Set the root class name.
    pub fn with_root_class(mut self, class_name: impl Into<String>) -> Self {
        self.render_options = self.render_options.with_root_class(class_name);
        self
    }

    /// Skip sanitizing; unknown types then fail to render.
    pub fn without_sanitize(mut self) -> Self {
        self.render_options = self.render_options.with_sanitize(false);
        self
    }

    /// Render unknown types as nothing instead of failing.
    pub fn lenient(self) -> Self {
        self.with_unhandled(UnhandledPolicy::Omit)
    }

    /// Set how types without a renderer are handled.
    pub fn with_unhandled(mut self, policy: UnhandledPolicy) -> Self {
        self.render_options = self.render_options.with_unhandled(policy);
        self
    }

    /// Refuse extension lists with duplicate names.
    pub fn fail_on_duplicates(mut self) -> Self {
        self.render_options = self
            .render_options
            .with_duplicate_policy(DuplicatePolicy::FailClosed);
        self
    }

    /// Set the maximum nesting depth.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.render_options = self.render_options.with_max_depth(depth);
        self
    }

    /// Share resolved registries through a cache.
    pub fn with_cache(mut self, cache: Arc<RegistryCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Resolve the declared extensions.
    pub fn registry(&self) -> Result<Arc<ResolvedRegistry>> {
        let policy = self.render_options.duplicate_policy;
        match &self.cache {
            Some(cache) => cache.get_or_resolve(&self.extensions, policy),
            None => Ok(Arc::new(ResolvedRegistry::resolve_with_policy(
                &self.extensions,
                policy,
            )?)),
        }
    }

    /// Load stored content and return a result wrapper.
    pub fn load(self, stored: &StoredContent) -> Result<RichdocResult> {
        self.with_document(load_document(stored))
    }

    /// Load stored content from a file.
    pub fn load_file<P: AsRef<Path>>(self, path: P) -> Result<RichdocResult> {
        let document = load_file(path)?;
        self.with_document(document)
    }

    /// Wrap an already loaded document.
    pub fn with_document(self, document: Node) -> Result<RichdocResult> {
        let registry = self.registry()?;
        Ok(RichdocResult {
            document,
            registry,
            render_options: self.render_options,
        })
    }
}

impl Default for Richdoc {
    fn default() -> Self {
        Self::new()
    }
}

/// A loaded document together with its registry and render options.
pub struct RichdocResult {
    /// The loaded document
    pub document: Node,
    registry: Arc<ResolvedRegistry>,
    render_options: RenderOptions,
}

impl RichdocResult {
    /// Render to a markup tree.
    pub fn to_markup(&self) -> Result<Markup> {
        render::render_resolved(&self.document, Arc::clone(&self.registry), &self.render_options)
    }

    /// Render to an HTML string.
    pub fn to_html(&self) -> Result<String> {
        self.to_markup().map(|markup| markup.to_html())
    }

    /// Render to plain text.
    pub fn to_text(&self) -> Result<String> {
        render::render_to_text(&self.document, Arc::clone(&self.registry), &self.render_options)
    }

    /// Convert the loaded document to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.document, format)
    }

    /// Sanitize the loaded document and report what was removed.
    pub fn sanitized(&self) -> (Node, SanitizeReport) {
        sanitize_with_report(
            &self.document,
            &self.registry,
            &self.render_options.sanitize_options(),
        )
    }

    /// Get the document.
    pub fn document(&self) -> &Node {
        &self.document
    }

    /// Get the resolved registry.
    pub fn registry(&self) -> &ResolvedRegistry {
        &self.registry
    }
}
