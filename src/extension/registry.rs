//! Extension registry resolution.
//!
//! Resolution flattens bundled extensions, stable-sorts them by priority and
//! indexes them by name. Duplicate names are reported; under the default
//! policy the last registration in sorted order wins the lookup.

use super::{Extension, ExtensionKind, Options};
use crate::error::{Error, Result};
use std::collections::{HashMap, HashSet};

/// How duplicate extension names are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DuplicatePolicy {
    /// Warn and let the last registration win
    #[default]
    LastWins,
    /// Refuse to build a registry containing duplicates
    FailClosed,
}

/// Flattened, sorted extension list plus the duplicate names found.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Extensions in resolved order
    pub extensions: Vec<Extension>,

    /// Names declared more than once, in order of first repetition
    pub duplicates: Vec<String>,
}

/// Recursively flatten bundled extensions.
///
/// Each extension is followed by its bundled children, preserving
/// declaration order.
pub fn flatten_extensions(extensions: &[Extension]) -> Vec<Extension> {
    let mut flat = Vec::new();
    for ext in extensions {
        flat.push(ext.clone());
        flat.extend(flatten_extensions(ext.extensions()));
    }
    flat
}

/// Stable-sort extensions by descending priority.
pub fn sort_extensions(mut extensions: Vec<Extension>) -> Vec<Extension> {
    extensions.sort_by(|a, b| b.priority().cmp(&a.priority()));
    extensions
}

/// Find names that occur more than once.
pub fn find_duplicates<'a, I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    let mut duplicates: Vec<String> = Vec::new();
    for name in names {
        if !seen.insert(name) && !duplicates.iter().any(|d| d == name) {
            duplicates.push(name.to_string());
        }
    }
    duplicates
}

/// Flatten, sort and check a declared extension list.
pub fn resolve_extensions(extensions: &[Extension]) -> Resolution {
    let extensions = sort_extensions(flatten_extensions(extensions));
    let duplicates = find_duplicates(extensions.iter().map(|e| e.name()));
    Resolution {
        extensions,
        duplicates,
    }
}

/// Name-keyed view of a resolved extension list.
///
/// Read-only after construction, so one registry may serve any number of
/// concurrent renders.
#[derive(Debug, Clone)]
pub struct ResolvedRegistry {
    extensions: Vec<Extension>,
    by_name: HashMap<String, usize>,
    node_types: HashSet<String>,
    mark_types: HashSet<String>,
    duplicates: Vec<String>,
}

impl ResolvedRegistry {
    /// Resolve a declared list, warning about duplicate names.
    pub fn resolve(extensions: &[Extension]) -> Self {
        Self::from_resolution(resolve_extensions(extensions))
    }

    /// Resolve a declared list under the given duplicate policy.
    pub fn resolve_with_policy(extensions: &[Extension], policy: DuplicatePolicy) -> Result<Self> {
        let resolution = resolve_extensions(extensions);
        if policy == DuplicatePolicy::FailClosed && !resolution.duplicates.is_empty() {
            return Err(Error::DuplicateExtensions(resolution.duplicates));
        }
        Ok(Self::from_resolution(resolution))
    }

    fn from_resolution(resolution: Resolution) -> Self {
        let Resolution {
            extensions,
            duplicates,
        } = resolution;

        if !duplicates.is_empty() {
            log::warn!(
                "Duplicate extension names found: [{}], last registration wins",
                duplicates
                    .iter()
                    .map(|n| format!("'{}'", n))
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        let mut by_name = HashMap::new();
        for (index, ext) in extensions.iter().enumerate() {
            by_name.insert(ext.name().to_string(), index);
        }

        let mut node_types = HashSet::new();
        let mut mark_types = HashSet::new();
        for &index in by_name.values() {
            let ext = &extensions[index];
            match ext.kind() {
                ExtensionKind::Node => {
                    node_types.insert(ext.name().to_string());
                }
                ExtensionKind::Mark => {
                    mark_types.insert(ext.name().to_string());
                }
                ExtensionKind::Extension => {}
            }
        }

        Self {
            extensions,
            by_name,
            node_types,
            mark_types,
            duplicates,
        }
    }

    /// Look up the winning extension for a name.
    pub fn get(&self, name: &str) -> Option<&Extension> {
        self.by_name.get(name).map(|&i| &self.extensions[i])
    }

    /// Options of the winning extension for a name.
    pub fn options(&self, name: &str) -> Option<&Options> {
        self.get(name).map(Extension::options)
    }

    /// Check if a node type is known.
    pub fn is_allowed_node(&self, name: &str) -> bool {
        self.node_types.contains(name)
    }

    /// Check if a mark type is known.
    pub fn is_allowed_mark(&self, name: &str) -> bool {
        self.mark_types.contains(name)
    }

    /// Known node types.
    pub fn allowed_node_types(&self) -> &HashSet<String> {
        &self.node_types
    }

    /// Known mark types.
    pub fn allowed_mark_types(&self) -> &HashSet<String> {
        &self.mark_types
    }

    /// All extensions in resolved order, duplicates included.
    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    /// Winning extensions in resolved order.
    pub fn effective(&self) -> impl Iterator<Item = &Extension> + '_ {
        self.extensions
            .iter()
            .enumerate()
            .filter(|(i, ext)| self.by_name.get(ext.name()) == Some(i))
            .map(|(_, ext)| ext)
    }

    /// Names declared more than once.
    pub fn duplicates(&self) -> &[String] {
        &self.duplicates
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
