//! Built-in pack registry.
//!
//! The registry is a lookup from pack id to pack document. Only
//! [`DEFAULT_BUILTIN_ID`] is registered out of the box, and it is an empty
//! skeleton: applications register their own default content through
//! [`BuiltinRegistry::register`].

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// Built-in pack that every merge includes.
pub const DEFAULT_BUILTIN_ID: &str = "core";

/// Lookup from built-in pack id to its document.
#[derive(Debug, Clone)]
pub struct BuiltinRegistry {
    packs: BTreeMap<String, Value>,
}

impl Default for BuiltinRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BuiltinRegistry {
    /// Create a registry holding only the empty default pack.
    #[must_use]
    pub fn new() -> Self {
        let mut packs = BTreeMap::new();
        packs.insert(DEFAULT_BUILTIN_ID.to_owned(), Value::Object(Map::new()));
        Self { packs }
    }

    /// Create a registry with no packs at all.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            packs: BTreeMap::new(),
        }
    }

    /// Register `document` under `id`, returning the document it replaced.
    pub fn register(&mut self, id: impl Into<String>, document: Value) -> Option<Value> {
        self.packs.insert(id.into(), document)
    }

    /// Builder-style variant of [`Self::register`].
    #[must_use]
    pub fn with_pack(mut self, id: impl Into<String>, document: Value) -> Self {
        self.register(id, document);
        self
    }

    /// Look up the pack registered under `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Value> {
        self.packs.get(id)
    }

    /// Registered ids in lexicographic order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.packs.keys().map(String::as_str)
    }
}
