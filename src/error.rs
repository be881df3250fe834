//! Error types for richdoc library.

use std::io;
use thiserror::Error;

/// Result type alias for richdoc operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while resolving, sanitizing or rendering.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A node type has neither a renderer nor an unhandled-node fallback.
    #[error("missing handler for node type {0}")]
    MissingNodeHandler(String),

    /// A mark type has neither a renderer nor an unhandled-mark fallback.
    #[error("missing handler for mark type {0}")]
    MissingMarkHandler(String),

    /// An extension produced an output description the adapter cannot interpret.
    #[error("Unsupported output spec, check the extension's render_html output: {0}")]
    UnsupportedOutputSpec(serde_json::Value),

    /// The document nests deeper than the configured limit.
    #[error("Document exceeds maximum nesting depth of {limit}")]
    DepthLimitExceeded {
        /// Configured maximum depth
        limit: usize,
    },

    /// Duplicate extension names under the fail-closed policy.
    #[error("Duplicate extension names found: [{}]", quoted(.0))]
    DuplicateExtensions(Vec<String>),
}

fn quoted(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("'{}'", n))
        .collect::<Vec<_>>()
        .join(", ")
}
