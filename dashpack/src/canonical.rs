//! Canonical serialisation and content fingerprints for JSON values.
//!
//! Every equality check in the merge engine goes through this module so that
//! mapping-key order never influences the outcome. Canonical text follows
//! RFC 8785 (JSON Canonicalization Scheme): object keys are sorted, arrays keep
//! their order, and numbers use their shortest round-trip form.
//!
//! Fingerprints are truncated SHA-256 digests. They exist for cheap identity
//! checks and stable snapshots, not for security.

use std::collections::BTreeSet;

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Number of hexadecimal characters kept from the digest.
pub const FINGERPRINT_LEN: usize = 10;

/// Render `value` as canonical JSON text.
///
/// Two values that are deeply equal up to object key order produce the same
/// string.
///
/// # Examples
///
/// ```rust
/// use dashpack::canonical::canonicalize;
/// use serde_json::json;
///
/// let left = canonicalize(&json!({"b": 1, "a": [2, 1]}));
/// let right = canonicalize(&json!({"a": [2, 1], "b": 1}));
/// assert_eq!(left, right);
/// assert_eq!(left, r#"{"a":[2,1],"b":1}"#);
/// ```
#[must_use]
pub fn canonicalize(value: &Value) -> String {
    // JCS only rejects non-finite numbers, which `Value` cannot hold.
    serde_json_canonicalizer::to_string(value).unwrap_or_else(|_| value.to_string())
}

/// Compute the short content fingerprint of `value`.
///
/// # Examples
///
/// ```rust
/// use dashpack::canonical::{fingerprint, FINGERPRINT_LEN};
/// use serde_json::json;
///
/// let print = fingerprint(&json!({"id": "warp", "type": "line"}));
/// assert_eq!(print.len(), FINGERPRINT_LEN);
/// assert_eq!(print, fingerprint(&json!({"type": "line", "id": "warp"})));
/// ```
#[must_use]
pub fn fingerprint(value: &Value) -> String {
    let digest = Sha256::digest(canonicalize(value).as_bytes());
    let mut encoded = hex::encode(digest);
    encoded.truncate(FINGERPRINT_LEN);
    encoded
}

/// Return a copy of `value` without the named top-level object fields.
///
/// Non-object values are returned unchanged.
#[must_use]
pub fn strip_fields<S>(value: &Value, fields: &BTreeSet<S>) -> Value
where
    S: AsRef<str> + Ord,
{
    match value {
        Value::Object(map) => Value::Object(strip_map(map, fields)),
        other => other.clone(),
    }
}

fn strip_map<S>(map: &Map<String, Value>, fields: &BTreeSet<S>) -> Map<String, Value>
where
    S: AsRef<str> + Ord,
{
    map.iter()
        .filter(|(key, _)| !fields.iter().any(|field| field.as_ref() == key.as_str()))
        .map(|(key, inner)| (key.clone(), inner.clone()))
        .collect()
}

/// Deep equality after canonicalisation, ignoring `exclusions` at the top
/// level of both values.
///
/// This is the only comparator the merge engine uses for redundancy checks.
#[must_use]
pub fn canonical_eq<S>(left: &Value, right: &Value, exclusions: &BTreeSet<S>) -> bool
where
    S: AsRef<str> + Ord,
{
    canonicalize(&strip_fields(left, exclusions)) == canonicalize(&strip_fields(right, exclusions))
}
