//! Export a user document reduced to the fields the merge engine reads.

use serde_json::{Map, Value};

use crate::document::ACCEPTED_KEYS;

/// Keep only the top-level keys a merge consumes.
///
/// Merging the collapsed document yields the same checksum as merging the
/// original. Non-mapping input collapses to an empty mapping.
///
/// # Examples
///
/// ```rust
/// use dashpack::collapse::collapse;
/// use serde_json::json;
///
/// let collapsed = collapse(&json!({"overlays": [], "editor": {"zoom": 2}}));
/// assert_eq!(collapsed, json!({"overlays": []}));
/// ```
#[must_use]
pub fn collapse(document: &Value) -> Value {
    let kept: Map<String, Value> = document
        .as_object()
        .into_iter()
        .flatten()
        .filter(|(key, _)| ACCEPTED_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    Value::Object(kept)
}

#[cfg(test)]
mod tests {
    //! Collapsed export.

    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn keeps_every_accepted_key() {
        let full: Map<String, Value> = ACCEPTED_KEYS
            .iter()
            .map(|key| ((*key).to_owned(), json!(null)))
            .collect();
        let document = Value::Object(full);
        assert_eq!(collapse(&document), document);
    }

    #[rstest]
    #[case(json!({"$schema": "x", "comment": "y", "routing": {}}), json!({"routing": {}}))]
    #[case(json!([1, 2]), json!({}))]
    #[case(json!(null), json!({}))]
    fn drops_unknown_and_non_mapping_input(#[case] input: Value, #[case] expected: Value) {
        assert_eq!(collapse(&input), expected);
    }
}
