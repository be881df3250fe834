//! Rendering options and configuration.

use super::renderer::DEFAULT_MAX_DEPTH;
use crate::extension::DuplicatePolicy;
use crate::sanitize::SanitizeOptions;

/// Class name put on the wrapper element around a rendered document.
pub const DEFAULT_ROOT_CLASS: &str = "tiptap-editor";

/// Options for rendering document content.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Class name of the document wrapper element
    pub root_class_name: String,

    /// Maximum nesting depth; deeper documents are rejected
    pub max_depth: usize,

    /// Sanitize against the registry before rendering
    pub sanitize: bool,

    /// What to do with node and mark types that have no renderer
    pub unhandled: UnhandledPolicy,

    /// How duplicate extension names are treated during resolution
    pub duplicate_policy: DuplicatePolicy,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the root class name.
    pub fn with_root_class(mut self, class_name: impl Into<String>) -> Self {
        self.root_class_name = class_name.into();
        self
    }

    /// Set the maximum nesting depth.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Enable or disable sanitizing before rendering.
    pub fn with_sanitize(mut self, sanitize: bool) -> Self {
        self.sanitize = sanitize;
        self
    }

    /// Set the unhandled-type policy.
    pub fn with_unhandled(mut self, policy: UnhandledPolicy) -> Self {
        self.unhandled = policy;
        self
    }

    /// Set the duplicate-name policy.
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// Sanitize options matching these render options.
    ///
    /// The sanitizer keeps exactly as much nesting as the renderer accepts,
    /// so sanitized output never trips the depth limit.
    pub fn sanitize_options(&self) -> SanitizeOptions {
        SanitizeOptions::new().with_max_depth(self.max_depth)
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            root_class_name: DEFAULT_ROOT_CLASS.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            sanitize: true,
            unhandled: UnhandledPolicy::Fail,
            duplicate_policy: DuplicatePolicy::LastWins,
        }
    }
}

/// Handling of node and mark types without a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnhandledPolicy {
    /// Fail with a missing-handler error
    #[default]
    Fail,
    /// Render unknown nodes as nothing and unknown marks as their content
    Omit,
}

impl UnhandledPolicy {
    /// Parse a policy name ("fail" or "omit").
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail" => Ok(UnhandledPolicy::Fail),
            "omit" => Ok(UnhandledPolicy::Omit),
            other => Err(format!("Invalid unhandled policy: {}", other)),
        }
    }
}
