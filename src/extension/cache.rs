//! Memoized registry resolution.

use super::{DuplicatePolicy, Extension, ResolvedRegistry};
use crate::error::Result;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};

/// Caches resolved registries per declared extension list.
///
/// The key is a fingerprint of each extension's name, kind, priority,
/// options, rendered attributes, renderer identity and bundled children.
/// Renderers are compared by allocation, so a list hits the cache only when
/// it shares its `render_html` functions with an earlier list: build custom
/// extensions once and clone them. The built-ins are shared per process.
#[derive(Debug, Default)]
pub struct RegistryCache {
    entries: Mutex<HashMap<(u64, DuplicatePolicy), Arc<ResolvedRegistry>>>,
}

impl RegistryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the registry for a list, resolving it on first use.
    pub fn get_or_resolve(
        &self,
        extensions: &[Extension],
        policy: DuplicatePolicy,
    ) -> Result<Arc<ResolvedRegistry>> {
        let key = (fingerprint(extensions), policy);
        if let Some(registry) = self.lock().get(&key) {
            return Ok(Arc::clone(registry));
        }

        let registry = Arc::new(ResolvedRegistry::resolve_with_policy(extensions, policy)?);
        self.lock().insert(key, Arc::clone(&registry));
        Ok(registry)
    }

    /// Number of cached registries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop all cached registries.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<(u64, DuplicatePolicy), Arc<ResolvedRegistry>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Content fingerprint of a declared extension list.
pub fn fingerprint(extensions: &[Extension]) -> u64 {
    let mut hasher = DefaultHasher::new();
    hash_list(extensions, &mut hasher);
    hasher.finish()
}

fn hash_list<H: Hasher>(extensions: &[Extension], state: &mut H) {
    extensions.len().hash(state);
    for ext in extensions {
        ext.name().hash(state);
        ext.kind().hash(state);
        ext.priority().hash(state);
        // Map serialization is key-ordered, so equal options hash equally.
        serde_json::to_string(ext.options())
            .unwrap_or_default()
            .hash(state);
        ext.attributes().hash(state);
        // Cached registries hold the renderer, so its address is not reused.
        ext.render_html_id().hash(state);
        hash_list(ext.extensions(), state);
    }
}
