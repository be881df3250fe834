//! Mark types.

use super::node::null_as_empty;
use super::{Attrs, TypeName};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A non-recursive decoration on a node, e.g. bold or italic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    /// Mark type
    #[serde(rename = "type")]
    pub mark_type: TypeName,

    /// Mark attributes
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Map::is_empty"
    )]
    pub attrs: Attrs,
}

impl Mark {
    /// Create a mark of the given type.
    pub fn new(mark_type: impl Into<TypeName>) -> Self {
        Self {
            mark_type: mark_type.into(),
            attrs: Attrs::new(),
        }
    }

    /// Set an attribute.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Get the normalized type name.
    pub fn type_name(&self) -> &str {
        self.mark_type.as_str()
    }
}
