//! Directives read from the user document rather than merged as content.

use std::collections::BTreeMap;

use serde_json::Value;

/// Packs requested by the user document's `use_packs` section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackSelection {
    /// Built-in pack ids, in the order listed.
    pub builtin: Vec<String>,
    /// External pack URLs, in the order listed.
    pub external: Vec<String>,
}

/// Non-content instructions carried by a user document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDirectives {
    /// Packs to layer beneath the user document.
    pub packs: PackSelection,
    /// Batch removal list keyed by collection name as written by the user.
    pub removals: BTreeMap<String, Vec<String>>,
}

impl UserDirectives {
    /// Extract the directives from a raw user document.
    ///
    /// Absent or malformed sections read as empty; non-string entries are
    /// ignored.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dashpack::document::UserDirectives;
    /// use serde_json::json;
    ///
    /// let directives = UserDirectives::from_document(&json!({
    ///     "use_packs": {"builtin": ["core", "lcars"], "external": ["https://packs/a.json"]},
    ///     "remove": {"overlays": ["legacy"]}
    /// }));
    /// assert_eq!(directives.packs.builtin, ["core", "lcars"]);
    /// assert_eq!(directives.removals["overlays"], ["legacy"]);
    /// ```
    #[must_use]
    pub fn from_document(document: &Value) -> Self {
        let use_packs = document.get("use_packs");
        let packs = PackSelection {
            builtin: string_list(use_packs.and_then(|packs| packs.get("builtin"))),
            external: string_list(use_packs.and_then(|packs| packs.get("external"))),
        };
        let removals = document
            .get("remove")
            .and_then(Value::as_object)
            .map(|map| {
                map.iter()
                    .map(|(collection, ids)| (collection.clone(), string_list(Some(ids))))
                    .collect()
            })
            .unwrap_or_default();
        Self { packs, removals }
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}
