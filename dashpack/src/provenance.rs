//! Where every merged value came from.
//!
//! Provenance is recorded for every item that ever existed during a merge,
//! including items later removed, and for every anchor and palette.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::document::{Collection, REMOVAL_MARKER};

/// `removal_source` value used by the batch removal list.
pub const GLOBAL_REMOVAL: &str = "global";

/// What removed an item.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RemovalSource {
    /// An inline `remove: true` item in the named layer.
    Layer(String),
    /// The user document's `remove` map.
    Global,
}

impl From<String> for RemovalSource {
    fn from(value: String) -> Self {
        if value == GLOBAL_REMOVAL {
            Self::Global
        } else {
            Self::Layer(value)
        }
    }
}

impl From<RemovalSource> for String {
    fn from(value: RemovalSource) -> Self {
        match value {
            RemovalSource::Layer(layer) => layer,
            RemovalSource::Global => GLOBAL_REMOVAL.to_owned(),
        }
    }
}

impl fmt::Display for RemovalSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Layer(layer) => f.write_str(layer),
            Self::Global => f.write_str(GLOBAL_REMOVAL),
        }
    }
}

/// Provenance of one item, anchor or palette.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceEntry {
    /// Layer that first introduced the value.
    pub origin_pack: String,
    /// Whether a later layer replaced the value.
    pub overridden: bool,
    /// Last layer that replaced the value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_layer: Option<String>,
    /// Whether the value was removed; the entry is kept.
    #[serde(default)]
    pub removed: bool,
    /// What removed the value. Kept after a restore as removal history.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub removal_source: Option<RemovalSource>,
    /// Layer that re-introduced the value after a removal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restored_by: Option<String>,
    /// Fingerprint of the final value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

impl ProvenanceEntry {
    pub(crate) fn originating(layer: &str) -> Self {
        Self {
            origin_pack: layer.to_owned(),
            ..Self::default()
        }
    }

    pub(crate) fn mark_overridden(&mut self, layer: &str) {
        self.overridden = true;
        self.override_layer = Some(layer.to_owned());
    }

    pub(crate) fn mark_removed(&mut self, source: RemovalSource) {
        self.removed = true;
        self.removal_source = Some(source);
        self.checksum = None;
    }

    /// Record `layer` re-adding a removed value; origin and removal source stay.
    pub(crate) fn mark_restored(&mut self, layer: &str) {
        self.removed = false;
        self.restored_by = Some(layer.to_owned());
        self.mark_overridden(layer);
    }

    /// Whether the latest write was a restore rather than an override.
    pub(crate) fn last_write_restored(&self) -> bool {
        self.restored_by.is_some() && self.restored_by == self.override_layer
    }
}

/// Field names that never take part in redundancy comparisons.
///
/// Derived from the serialised form of [`ProvenanceEntry`], so adding a
/// provenance field extends the set automatically, plus the inline removal
/// marker.
pub static COMPARISON_EXCLUSIONS: LazyLock<BTreeSet<String>> = LazyLock::new(|| {
    let sample = ProvenanceEntry {
        origin_pack: String::new(),
        overridden: true,
        override_layer: Some(String::new()),
        removed: true,
        removal_source: Some(RemovalSource::Global),
        restored_by: Some(String::new()),
        checksum: Some(String::new()),
    };
    let mut fields: BTreeSet<String> = match serde_json::to_value(sample) {
        Ok(serde_json::Value::Object(map)) => map.into_iter().map(|(key, _)| key).collect(),
        _ => BTreeSet::new(),
    };
    fields.insert(REMOVAL_MARKER.to_owned());
    fields
});

/// Provenance for one merge result.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    /// Per collection, per item id.
    #[serde(default)]
    pub collections: BTreeMap<Collection, BTreeMap<String, ProvenanceEntry>>,
    /// Per anchor id.
    #[serde(default)]
    pub anchors: BTreeMap<String, ProvenanceEntry>,
    /// Per palette name.
    #[serde(default)]
    pub palettes: BTreeMap<String, ProvenanceEntry>,
}

impl Provenance {
    /// Provenance of item `id` in `collection`.
    #[must_use]
    pub fn item(&self, collection: Collection, id: &str) -> Option<&ProvenanceEntry> {
        self.collections.get(&collection).and_then(|items| items.get(id))
    }

    /// Provenance of anchor `id`.
    #[must_use]
    pub fn anchor(&self, id: &str) -> Option<&ProvenanceEntry> {
        self.anchors.get(id)
    }

    /// Provenance of palette `name`.
    #[must_use]
    pub fn palette(&self, name: &str) -> Option<&ProvenanceEntry> {
        self.palettes.get(name)
    }

    pub(crate) fn item_mut(
        &mut self,
        collection: Collection,
        id: &str,
    ) -> Option<&mut ProvenanceEntry> {
        self.collections
            .get_mut(&collection)
            .and_then(|items| items.get_mut(id))
    }

    pub(crate) fn item_entry(
        &mut self,
        collection: Collection,
        id: &str,
        layer: &str,
    ) -> &mut ProvenanceEntry {
        self.collections
            .entry(collection)
            .or_default()
            .entry(id.to_owned())
            .or_insert_with(|| ProvenanceEntry::originating(layer))
    }
}

#[cfg(test)]
mod tests {
    //! Provenance records and the comparison exclusion set.
    #![expect(clippy::expect_used, reason = "tests panic on broken fixtures")]

    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn exclusions_cover_every_provenance_field() {
        let expected: BTreeSet<String> = [
            "checksum",
            "origin_pack",
            "override_layer",
            "overridden",
            "removal_source",
            "removed",
            "restored_by",
            "remove",
        ]
        .into_iter()
        .map(str::to_owned)
        .collect();
        assert_eq!(*COMPARISON_EXCLUSIONS, expected);
    }

    #[rstest]
    #[case(RemovalSource::Global, "global")]
    #[case(RemovalSource::Layer("user".to_owned()), "user")]
    fn removal_source_serialises_as_plain_string(
        #[case] source: RemovalSource,
        #[case] text: &str,
    ) {
        assert_eq!(serde_json::to_value(&source).expect("serialise"), json!(text));
        let parsed: RemovalSource = serde_json::from_value(json!(text)).expect("parse");
        assert_eq!(parsed, source);
    }

    #[rstest]
    fn removal_keeps_origin_and_clears_checksum() {
        let mut entry = ProvenanceEntry::originating("core");
        entry.checksum = Some("0123456789".to_owned());
        entry.mark_overridden("user");
        entry.mark_removed(RemovalSource::Global);
        assert_eq!(entry.origin_pack, "core");
        assert_eq!(entry.override_layer.as_deref(), Some("user"));
        assert!(entry.removed && entry.checksum.is_none());
        assert_eq!(entry.removal_source, Some(RemovalSource::Global));
    }

    #[rstest]
    fn restore_keeps_origin_and_removal_history() {
        let mut entry = ProvenanceEntry::originating("core");
        entry.mark_removed(RemovalSource::Layer("lcars".to_owned()));
        entry.mark_restored("user");
        assert_eq!(entry.origin_pack, "core");
        assert!(!entry.removed);
        assert_eq!(entry.removal_source, Some(RemovalSource::Layer("lcars".to_owned())));
        assert_eq!(entry.restored_by.as_deref(), Some("user"));
        assert_eq!(entry.override_layer.as_deref(), Some("user"));
        assert!(entry.overridden && entry.last_write_restored());
        entry.mark_overridden("extra");
        assert!(!entry.last_write_restored());
    }

    #[rstest]
    fn provenance_serialises_collections_by_name() {
        let mut provenance = Provenance::default();
        provenance.item_entry(Collection::Overlays, "warp", "core");
        let value = serde_json::to_value(&provenance).expect("serialise");
        assert_eq!(
            value["collections"]["overlays"]["warp"],
            json!({"origin_pack": "core", "overridden": false, "removed": false})
        );
        assert!(provenance.item(Collection::Overlays, "warp").is_some());
        assert!(provenance.item(Collection::Rules, "warp").is_none());
    }
}
