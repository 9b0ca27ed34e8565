//! Layer metadata and ordering for pack merges.
//!
//! A layer is one partial configuration document together with where it came
//! from. Layers are built fresh for every merge and folded in a fixed
//! precedence order: built-in packs, then external packs sorted by URL, then
//! the user document.

mod composer;

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use composer::{LayerComposer, LayerComposition, builtin_order};

/// Identifier used for the user layer.
pub const USER_LAYER_ID: &str = "user";

/// Source category of a layer.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum LayerKind {
    /// A pack shipped with the application.
    Builtin,
    /// A pack fetched from a URL.
    External,
    /// The user's own document.
    User,
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Builtin => "builtin",
            Self::External => "external",
            Self::User => "user",
        })
    }
}

/// One partial configuration document and its origin.
#[derive(Clone, Debug)]
pub struct Layer<'a> {
    kind: LayerKind,
    identifier: String,
    document: Cow<'a, Value>,
}

impl<'a> Layer<'a> {
    /// Construct a layer for the built-in pack `id`.
    #[must_use]
    pub fn builtin(id: impl Into<String>, document: Cow<'a, Value>) -> Self {
        Self {
            kind: LayerKind::Builtin,
            identifier: id.into(),
            document,
        }
    }

    /// Construct a layer for the external pack fetched from `url`.
    #[must_use]
    pub fn external(url: impl Into<String>, document: Cow<'a, Value>) -> Self {
        Self {
            kind: LayerKind::External,
            identifier: url.into(),
            document,
        }
    }

    /// Construct the user layer.
    #[must_use]
    pub fn user(document: Cow<'a, Value>) -> Self {
        Self {
            kind: LayerKind::User,
            identifier: USER_LAYER_ID.to_owned(),
            document,
        }
    }

    /// Returns the source category of the layer.
    #[must_use]
    pub const fn kind(&self) -> LayerKind {
        self.kind
    }

    /// Pack id, URL, or `"user"`.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Borrow the layer's document.
    #[must_use]
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Convert this layer into a `'static` owned variant.
    #[must_use]
    pub fn into_owned(self) -> Layer<'static> {
        Layer {
            kind: self.kind,
            identifier: self.identifier,
            document: Cow::Owned(self.document.into_owned()),
        }
    }
}
