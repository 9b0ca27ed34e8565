//! Accumulator folded across layers during one merge.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde_json::{Map, Value};

use crate::canonical::{canonical_eq, fingerprint, strip_fields};
use crate::document::{Collection, CollectionItem, ConfigDocument, REMOVAL_MARKER};
use crate::issue::{Issue, IssueCode};
use crate::layer::Layer;
use crate::provenance::{COMPARISON_EXCLUSIONS, Provenance, ProvenanceEntry, RemovalSource};

/// Items of one collection in accumulator order, keyed by id.
type Items = Vec<(String, Value)>;

#[derive(Debug, Default)]
pub(super) struct MergeState {
    pub(super) items: BTreeMap<Collection, Items>,
    baseline: BTreeMap<Collection, HashMap<String, Value>>,
    last_effective: BTreeMap<Collection, HashMap<String, Value>>,
    warned: BTreeMap<Collection, HashSet<String>>,
    pub(super) version: Option<Value>,
    pub(super) palettes: BTreeMap<String, Map<String, Value>>,
    pub(super) anchors: BTreeMap<String, Value>,
    pub(super) routing: Map<String, Value>,
    pub(super) active_profiles: Vec<String>,
    pub(super) provenance: Provenance,
    pub(super) issues: Vec<Issue>,
}

impl MergeState {
    pub(super) fn fold_layer(&mut self, layer: &Layer<'_>) {
        let Some(document) = layer.document().as_object() else {
            tracing::debug!(layer = layer.identifier(), "skipping non-mapping layer");
            return;
        };
        tracing::debug!(layer = layer.identifier(), kind = %layer.kind(), "folding layer");
        for collection in Collection::ALL {
            match document.get(collection.as_str()) {
                None | Some(Value::Null) => {}
                Some(Value::Array(items)) => {
                    self.fold_items(collection, items, layer.identifier());
                }
                Some(_) => self.issues.push(
                    Issue::error(
                        IssueCode::InvalidCollection,
                        format!("'{collection}' must be a list of items"),
                    )
                    .in_collection(collection)
                    .in_layer(layer.identifier()),
                ),
            }
        }
        self.fold_sections(document, layer.identifier());
    }

    fn fold_items(&mut self, collection: Collection, items: &[Value], layer: &str) {
        let mut seen: HashSet<&str> = HashSet::new();
        for (index, item) in items.iter().enumerate() {
            let Some(id) = item_id(item) else {
                self.issues.push(
                    Issue::error(
                        IssueCode::MissingId,
                        format!("{collection} item #{index} has no string id"),
                    )
                    .in_collection(collection)
                    .in_layer(layer),
                );
                continue;
            };
            if is_removal(item) {
                self.remove_inline(collection, id, layer);
                continue;
            }
            let duplicate = !seen.insert(id);
            if duplicate {
                self.issues.push(
                    Issue::error(
                        IssueCode::DuplicateItem,
                        format!("{collection} id '{id}' appears more than once in this layer"),
                    )
                    .in_collection(collection)
                    .for_id(id)
                    .in_layer(layer),
                );
            }
            let marker: BTreeSet<&str> = BTreeSet::from([REMOVAL_MARKER]);
            let value = strip_fields(item, &marker);
            self.upsert(collection, id, value, layer, duplicate);
        }
    }

    fn upsert(
        &mut self,
        collection: Collection,
        id: &str,
        value: Value,
        layer: &str,
        duplicate: bool,
    ) {
        let items = self.items.entry(collection).or_default();
        let Some(position) = items.iter().position(|(existing, _)| existing == id) else {
            items.push((id.to_owned(), value.clone()));
            let baseline = self.baseline.entry(collection).or_default();
            let restored = baseline.contains_key(id);
            baseline.entry(id.to_owned()).or_insert_with(|| value.clone());
            self.record_effective(collection, id, value);
            if restored && let Some(entry) = self.provenance.item_mut(collection, id) {
                entry.mark_restored(layer);
            } else {
                // Replaces any stub left by removing an id that never existed.
                *self.provenance.item_entry(collection, id, layer) =
                    ProvenanceEntry::originating(layer);
            }
            return;
        };
        if let Some(slot) = items.get_mut(position) {
            slot.1 = value.clone();
        }
        if duplicate {
            // The later item of the same layer wins without counting as an override.
            self.record_effective(collection, id, value);
            return;
        }
        self.provenance.item_entry(collection, id, layer).mark_overridden(layer);
        let redundant = self.matches_history(collection, id, &value);
        if redundant {
            self.warn_redundant(collection, id, layer);
        }
        self.record_effective(collection, id, value);
    }

    fn matches_history(&self, collection: Collection, id: &str, value: &Value) -> bool {
        [&self.baseline, &self.last_effective]
            .into_iter()
            .filter_map(|history| history.get(&collection).and_then(|values| values.get(id)))
            .any(|previous| canonical_eq(previous, value, &*COMPARISON_EXCLUSIONS))
    }

    fn warn_redundant(&mut self, collection: Collection, id: &str, layer: &str) {
        if !self.warned.entry(collection).or_default().insert(id.to_owned()) {
            return;
        }
        self.issues.push(
            Issue::warn(
                IssueCode::RedundantOverride,
                format!("{collection} '{id}' is overridden with an identical value"),
            )
            .in_collection(collection)
            .for_id(id)
            .in_layer(layer),
        );
    }

    fn record_effective(&mut self, collection: Collection, id: &str, value: Value) {
        self.last_effective
            .entry(collection)
            .or_default()
            .insert(id.to_owned(), value);
    }

    fn remove_inline(&mut self, collection: Collection, id: &str, layer: &str) {
        if !self.delete(collection, id) {
            self.issues.push(
                Issue::warn(
                    IssueCode::UnknownRemoval,
                    format!("cannot remove unknown {collection} '{id}'"),
                )
                .in_collection(collection)
                .for_id(id)
                .in_layer(layer),
            );
        }
        self.provenance
            .item_entry(collection, id, layer)
            .mark_removed(RemovalSource::Layer(layer.to_owned()));
    }

    /// Drop `id` from the accumulator; returns whether it was present.
    fn delete(&mut self, collection: Collection, id: &str) -> bool {
        let Some(items) = self.items.get_mut(&collection) else {
            return false;
        };
        let before = items.len();
        items.retain(|(existing, _)| existing != id);
        let removed = items.len() != before;
        if removed && let Some(values) = self.last_effective.get_mut(&collection) {
            values.remove(id);
        }
        removed
    }

    /// Warn about surviving overrides that ended up equal to their first value.
    pub(super) fn sweep_redundant(&mut self) {
        let mut pending = Vec::new();
        for (collection, items) in &self.items {
            for (id, value) in items {
                let Some(entry) = self.provenance.item(*collection, id) else {
                    continue;
                };
                if !entry.overridden || entry.last_write_restored() {
                    continue;
                }
                let baseline = self.baseline.get(collection).and_then(|values| values.get(id));
                let unchanged = baseline
                    .is_some_and(|first| canonical_eq(first, value, &*COMPARISON_EXCLUSIONS));
                if unchanged {
                    let layer = entry.override_layer.clone().unwrap_or_default();
                    pending.push((*collection, id.clone(), layer));
                }
            }
        }
        for (collection, id, layer) in pending {
            self.warn_redundant(collection, &id, &layer);
        }
    }

    /// Apply the user document's batch removal map.
    pub(super) fn remove_global(&mut self, removals: &BTreeMap<String, Vec<String>>) {
        for (name, ids) in removals {
            let Ok(collection) = name.parse::<Collection>() else {
                self.issues.push(Issue::warn(
                    IssueCode::UnknownRemoval,
                    format!("cannot remove from unknown collection '{name}'"),
                ));
                continue;
            };
            for id in ids {
                if self.delete(collection, id) {
                    if let Some(entry) = self.provenance.item_mut(collection, id) {
                        entry.mark_removed(RemovalSource::Global);
                    }
                } else {
                    self.issues.push(
                        Issue::warn(
                            IssueCode::UnknownRemoval,
                            format!("cannot remove unknown {collection} '{id}'"),
                        )
                        .in_collection(collection)
                        .for_id(id.as_str()),
                    );
                }
            }
        }
    }

    /// Fingerprint surviving values and build the merged document.
    pub(super) fn finish(mut self) -> (ConfigDocument, Provenance, Vec<Issue>) {
        for (collection, items) in &self.items {
            for (id, value) in items {
                if let Some(entry) = self.provenance.item_mut(*collection, id) {
                    entry.checksum = Some(fingerprint(value));
                }
            }
        }
        for (id, point) in &self.anchors {
            if let Some(entry) = self.provenance.anchors.get_mut(id) {
                entry.checksum = Some(fingerprint(point));
            }
        }
        for (name, tokens) in &self.palettes {
            if let Some(entry) = self.provenance.palettes.get_mut(name) {
                entry.checksum = Some(fingerprint(&Value::Object(tokens.clone())));
            }
        }
        let mut items = std::mem::take(&mut self.items);
        let mut take = |collection: Collection| items.remove(&collection).unwrap_or_default();
        let merged = ConfigDocument {
            version: self.version,
            animations: typed(take(Collection::Animations)),
            rules: typed(take(Collection::Rules)),
            profiles: typed(take(Collection::Profiles)),
            overlays: typed(take(Collection::Overlays)),
            timelines: typed(take(Collection::Timelines)),
            palettes: self.palettes,
            anchors: self.anchors,
            routing: self.routing,
            active_profiles: self.active_profiles,
        };
        (merged, self.provenance, self.issues)
    }
}

fn typed<T: CollectionItem>(items: Items) -> Vec<T> {
    items
        .into_iter()
        .filter_map(|(_, value)| match value {
            Value::Object(object) => T::from_object(object),
            _ => None,
        })
        .collect()
}

fn item_id(item: &Value) -> Option<&str> {
    item.get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}

fn is_removal(item: &Value) -> bool {
    item.get(REMOVAL_MARKER) == Some(&Value::Bool(true))
}
