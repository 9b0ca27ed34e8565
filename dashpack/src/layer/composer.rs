//! Layer ordering helpers.

use std::borrow::Cow;
use std::collections::HashSet;

use serde_json::Value;

use crate::issue::Issue;

use super::{Layer, LayerKind};

/// Resolve the built-in pack order for a merge.
///
/// `default_id` is forced to the front when the request does not mention it;
/// duplicates are dropped, keeping the first occurrence.
///
/// # Examples
///
/// ```rust
/// use dashpack::layer::builtin_order;
///
/// let requested = vec!["lcars".to_owned(), "core".to_owned(), "lcars".to_owned()];
/// assert_eq!(builtin_order(&requested, "core"), ["lcars", "core"]);
/// assert_eq!(builtin_order(&["lcars".to_owned()], "core"), ["core", "lcars"]);
/// ```
#[must_use]
pub fn builtin_order(requested: &[String], default_id: &str) -> Vec<String> {
    let mut ordered = Vec::with_capacity(requested.len() + 1);
    if !requested.iter().any(|id| id == default_id) {
        ordered.push(default_id.to_owned());
    }
    let mut seen: HashSet<&str> = HashSet::new();
    for id in requested {
        if seen.insert(id.as_str()) {
            ordered.push(id.clone());
        }
    }
    ordered
}

/// Builder that accumulates layers and yields them in precedence order.
///
/// Built-in layers keep their push order, external layers are sorted by URL
/// so network completion order never matters, and the user layer is always
/// last.
///
/// ```rust
/// use std::borrow::Cow;
///
/// use dashpack::layer::{Layer, LayerComposer};
/// use serde_json::json;
///
/// let user = json!({"routing": {"a": 1}});
/// let mut composer = LayerComposer::new();
/// composer.push_layer(Layer::user(Cow::Borrowed(&user)));
/// composer.push_external("https://packs/z.json", json!({}));
/// composer.push_layer(Layer::builtin("core", Cow::Owned(json!({}))));
/// composer.push_external("https://packs/a.json", json!({}));
///
/// let ids: Vec<String> = composer
///     .layers()
///     .iter()
///     .map(|layer| layer.identifier().to_owned())
///     .collect();
/// assert_eq!(ids, ["core", "https://packs/a.json", "https://packs/z.json", "user"]);
/// ```
#[derive(Default, Debug)]
pub struct LayerComposer<'a> {
    builtin: Vec<Layer<'a>>,
    external: Vec<Layer<'a>>,
    user: Option<Layer<'a>>,
}

impl<'a> LayerComposer<'a> {
    /// Create an empty composer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            builtin: Vec::new(),
            external: Vec::new(),
            user: None,
        }
    }

    /// Push an external layer.
    pub fn push_external(&mut self, url: impl Into<String>, document: Value) {
        self.push_layer(Layer::external(url, Cow::Owned(document)));
    }

    /// Push a layer into the slot matching its kind; a user layer replaces
    /// any earlier one.
    pub fn push_layer(&mut self, layer: Layer<'a>) {
        match layer.kind() {
            LayerKind::Builtin => self.builtin.push(layer),
            LayerKind::External => self.external.push(layer),
            LayerKind::User => self.user = Some(layer),
        }
    }

    /// Consume the composer and return the layers in folding order.
    #[must_use]
    pub fn layers(self) -> Vec<Layer<'a>> {
        let Self {
            builtin,
            mut external,
            user,
        } = self;
        external.sort_by(|left, right| left.identifier().cmp(right.identifier()));
        external.dedup_by(|later, earlier| later.identifier() == earlier.identifier());
        builtin.into_iter().chain(external).chain(user).collect()
    }
}

/// Ordered layers alongside the issues raised while assembling them.
#[derive(Debug)]
pub struct LayerComposition<'a> {
    layers: Vec<Layer<'a>>,
    issues: Vec<Issue>,
}

impl<'a> LayerComposition<'a> {
    /// Create a new composition from `layers` and `issues`.
    #[must_use]
    #[expect(
        clippy::missing_const_for_fn,
        reason = "Constructing Vec-based compositions requires allocation"
    )]
    pub fn new(layers: Vec<Layer<'a>>, issues: Vec<Issue>) -> Self {
        Self { layers, issues }
    }

    /// Decompose the composition into its constituent parts.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Layer<'a>>, Vec<Issue>) {
        (self.layers, self.issues)
    }
}
