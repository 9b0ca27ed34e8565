//! Sample pack documents.

use dashpack::BuiltinRegistry;
use serde_json::{Value, json};

/// Id of the sample themed built-in pack.
pub const LCARS_PACK: &str = "lcars";

/// A themed built-in pack with one item per collection, a palette and an
/// anchor.
#[must_use]
pub fn lcars_pack() -> Value {
    json!({
        "version": 1,
        "animations": [{"id": "pulse", "preset": "fade", "duration": 400}],
        "rules": [{"id": "alert-red", "when": {"gt": ["temp", 90]}, "apply": {"palette": "alert"}}],
        "profiles": [{"id": "night", "style": {"bg": "black"}}],
        "overlays": [
            {"id": "frame", "type": "box", "anchor": "centre", "color": "orange"},
            {"id": "label", "type": "text", "attach_to": "frame"}
        ],
        "timelines": [{"id": "intro", "steps": ["pulse"]}],
        "palettes": {"alert": {"fg": "red", "bg": "black", "glow": "amber"}},
        "anchors": {"centre": ["50%", "50%"]},
        "routing": {"bus": "main"},
        "active_profiles": ["night"]
    })
}

/// Registry holding the empty default pack and [`lcars_pack`].
#[must_use]
pub fn registry() -> BuiltinRegistry {
    BuiltinRegistry::new().with_pack(LCARS_PACK, lcars_pack())
}

/// User document selecting [`LCARS_PACK`] plus `external` URLs.
#[must_use]
pub fn user_selecting(external: &[&str]) -> Value {
    json!({
        "use_packs": {"builtin": [LCARS_PACK], "external": external},
    })
}

/// Set `key` on a user document, which must be a mapping.
///
/// # Panics
///
/// Panics when `document` is not a JSON object.
#[must_use]
pub fn with_section(mut document: Value, key: &str, value: Value) -> Value {
    let Some(map) = document.as_object_mut() else {
        panic!("user document must be a mapping");
    };
    map.insert(key.to_owned(), value);
    document
}
