//! Structural checks over a merged document.
//!
//! Validation is a pure function: it never mutates the document and reports
//! every finding instead of stopping at the first.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;
use serde_json::Value;

use crate::document::{Collection, ConfigDocument, ItemRef, REMOVAL_MARKER};
use crate::issue::{Issue, IssueCode, Severity};

/// Findings from [`validate`], split by severity.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ValidationReport {
    /// Structural problems.
    pub errors: Vec<Issue>,
    /// Likely authoring mistakes.
    pub warnings: Vec<Issue>,
}

impl ValidationReport {
    /// Returns `true` when no errors were found; warnings are allowed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Every finding, errors first.
    pub fn issues(&self) -> impl Iterator<Item = &Issue> {
        self.errors.iter().chain(&self.warnings)
    }

    fn push(&mut self, issue: Issue) {
        match issue.severity {
            Severity::Error => self.errors.push(issue),
            Severity::Warn => self.warnings.push(issue),
        }
    }
}

/// Check `merged`, and optionally the raw `user` document it came from.
///
/// # Examples
///
/// ```rust
/// use dashpack::document::ConfigDocument;
/// use dashpack::validate::validate;
/// use serde_json::json;
///
/// let merged: ConfigDocument = serde_json::from_value(json!({
///     "anchors": {"centre": ["50%", "50%"]},
///     "overlays": [{"id": "dial", "type": "gauge", "anchor": "centre"}]
/// }))
/// .expect("valid document");
/// let report = validate(&merged, None);
/// assert!(report.is_valid());
/// assert!(report.warnings.is_empty());
/// ```
#[must_use]
pub fn validate(merged: &ConfigDocument, user: Option<&Value>) -> ValidationReport {
    let mut report = ValidationReport::default();
    if let Some(user) = user {
        check_user_duplicates(user, &mut report);
    }
    for collection in Collection::ALL {
        let items = merged.items(collection);
        for id in duplicates(items.iter().map(|item| item.id())) {
            report.push(
                Issue::error(
                    IssueCode::MergedDuplicateId,
                    format!("merged {collection} contain '{id}' more than once"),
                )
                .in_collection(collection)
                .for_id(id),
            );
        }
        for item in items {
            check_fields(item, &mut report);
        }
    }
    check_anchors(merged, &mut report);
    check_references(merged, &mut report);
    report
}

fn check_user_duplicates(user: &Value, report: &mut ValidationReport) {
    for collection in Collection::ALL {
        let Some(items) = user.get(collection.as_str()).and_then(Value::as_array) else {
            continue;
        };
        let ids = items
            .iter()
            .filter(|item| item.get(REMOVAL_MARKER) != Some(&Value::Bool(true)))
            .filter_map(|item| item.get("id").and_then(Value::as_str));
        for id in duplicates(ids) {
            report.push(
                Issue::error(
                    IssueCode::UserDuplicateId,
                    format!("user {collection} repeat '{id}'; the last entry wins"),
                )
                .in_collection(collection)
                .for_id(id),
            );
        }
    }
}

/// Ids occurring more than once, in order of their second occurrence.
fn duplicates<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    let mut reported = BTreeSet::new();
    let mut found = Vec::new();
    for id in ids {
        if !seen.insert(id) && reported.insert(id) {
            found.push(id);
        }
    }
    found
}

fn check_fields(item: ItemRef<'_>, report: &mut ValidationReport) {
    let collection = item.collection();
    let id = item.id();
    if id.is_empty() {
        report.push(
            Issue::error(IssueCode::MissingField, format!("{collection} item has an empty id"))
                .in_collection(collection)
                .on_field("id"),
        );
    }
    let fields = item.fields();
    let present = |name: &str| fields.get(name).is_some_and(|value| !value.is_null());
    let missing = match item {
        ItemRef::Overlay(overlay) if overlay.kind().is_none() => {
            Some((Severity::Error, IssueCode::MissingField, "type"))
        }
        ItemRef::Rule(_) if !present("when") => {
            Some((Severity::Warn, IssueCode::RecommendedField, "when"))
        }
        ItemRef::Animation(_) if !present("preset") => {
            Some((Severity::Warn, IssueCode::RecommendedField, "preset"))
        }
        _ => None,
    };
    if let Some((severity, code, field)) = missing {
        let message = format!("{collection} '{id}' has no '{field}'");
        let issue = match severity {
            Severity::Error => Issue::error(code, message),
            Severity::Warn => Issue::warn(code, message),
        };
        report.push(issue.in_collection(collection).for_id(id).on_field(field));
    }
}

fn check_anchors(merged: &ConfigDocument, report: &mut ValidationReport) {
    for (id, point) in &merged.anchors {
        if !is_point(point) {
            report.push(
                Issue::warn(
                    IssueCode::UnresolvedAnchor,
                    format!("anchor '{id}' is not an [x, y] pair of numbers or percentages"),
                )
                .for_id(id.as_str()),
            );
        }
    }
}

fn is_point(value: &Value) -> bool {
    match value.as_array().map(Vec::as_slice) {
        Some([x, y]) => is_coordinate(x) && is_coordinate(y),
        _ => false,
    }
}

fn is_coordinate(value: &Value) -> bool {
    match value {
        Value::Number(number) => number.as_f64().is_some_and(f64::is_finite),
        Value::String(text) => text
            .strip_suffix('%')
            .and_then(|amount| amount.trim().parse::<f64>().ok())
            .is_some_and(f64::is_finite),
        _ => false,
    }
}

fn check_references(merged: &ConfigDocument, report: &mut ValidationReport) {
    let known: HashSet<&str> = merged
        .anchors
        .keys()
        .map(String::as_str)
        .chain(merged.overlays.iter().map(|overlay| overlay.id.as_str()))
        .collect();
    for overlay in &merged.overlays {
        let references = [("anchor", overlay.anchor()), ("attach_to", overlay.attach_to())];
        for (field, target) in references
            .into_iter()
            .filter_map(|(field, target)| Some((field, target?)))
        {
            if known.contains(target) {
                continue;
            }
            report.push(
                Issue::warn(
                    IssueCode::UnresolvedReference,
                    format!("overlay '{}' {field} '{target}' names no anchor or overlay", overlay.id),
                )
                .in_collection(Collection::Overlays)
                .for_id(overlay.id.as_str())
                .on_field(field),
            );
        }
    }
}
