//! Map-shaped and scalar sections: palettes, anchors, routing, active
//! profiles and version.

use serde_json::{Map, Value};

use crate::issue::{Issue, IssueCode};
use crate::provenance::ProvenanceEntry;

use super::state::MergeState;

impl MergeState {
    pub(super) fn fold_sections(&mut self, document: &Map<String, Value>, layer: &str) {
        if let Some(version) = document.get("version").filter(|value| !value.is_null()) {
            self.version = Some(version.clone());
        }
        if let Some(palettes) = document.get("palettes") {
            self.merge_palettes(palettes, layer);
        }
        if let Some(anchors) = document.get("anchors") {
            self.merge_anchors(anchors, layer);
        }
        if let Some(Value::Object(routing)) = document.get("routing") {
            for (key, value) in routing {
                self.routing.insert(key.clone(), value.clone());
            }
        }
        if let Some(Value::Array(requested)) = document.get("active_profiles") {
            let profiles: Vec<String> = requested
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect();
            if !profiles.is_empty() {
                self.active_profiles = profiles;
            }
        }
    }

    /// Token-level palette merge; `null` tokens delete.
    fn merge_palettes(&mut self, section: &Value, layer: &str) {
        let palettes = match section {
            Value::Null => return,
            Value::Object(map) => map,
            _ => {
                self.issues.push(
                    Issue::error(IssueCode::PaletteMergeError, "'palettes' must be a mapping")
                        .in_layer(layer),
                );
                return;
            }
        };
        for (name, palette) in palettes {
            let Value::Object(tokens) = palette else {
                self.issues.push(
                    Issue::error(
                        IssueCode::PaletteMergeError,
                        format!("palette '{name}' must be a mapping of tokens"),
                    )
                    .for_id(name.as_str())
                    .in_layer(layer),
                );
                continue;
            };
            let target = self.palettes.entry(name.clone()).or_default();
            for (token, value) in tokens {
                if value.is_null() {
                    target.remove(token);
                } else {
                    target.insert(token.clone(), value.clone());
                }
            }
            record_write(&mut self.provenance.palettes, name, layer);
        }
    }

    /// Whole-value last-write-wins per anchor.
    fn merge_anchors(&mut self, section: &Value, layer: &str) {
        let Value::Object(anchors) = section else {
            tracing::debug!(layer, "ignoring non-mapping anchors section");
            return;
        };
        for (id, point) in anchors {
            self.anchors.insert(id.clone(), point.clone());
            record_write(&mut self.provenance.anchors, id, layer);
        }
    }
}

fn record_write(
    entries: &mut std::collections::BTreeMap<String, ProvenanceEntry>,
    id: &str,
    layer: &str,
) {
    match entries.get_mut(id) {
        Some(entry) => entry.mark_overridden(layer),
        None => {
            entries.insert(id.to_owned(), ProvenanceEntry::originating(layer));
        }
    }
}
