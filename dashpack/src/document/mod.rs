//! Configuration document model shared by every layer and by merge output.
//!
//! Layers arrive as loosely shaped JSON, but the merged document is typed:
//! each id-keyed collection holds its own item type with a mandatory `id` and
//! a map of the remaining fields.

mod items;
mod user;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::canonical::fingerprint;

pub use items::{AnimationSpec, CollectionItem, ItemRef, Overlay, Profile, Rule, TimelineSpec};
pub use user::{PackSelection, UserDirectives};

/// Field that marks an item inside a layer as a removal request.
pub const REMOVAL_MARKER: &str = "remove";

/// Top-level keys the merge engine understands in a user document.
pub const ACCEPTED_KEYS: &[&str] = &[
    "version",
    "use_packs",
    "anchors",
    "palettes",
    "routing",
    "active_profiles",
    "animations",
    "rules",
    "profiles",
    "overlays",
    "timelines",
    "remove",
];

/// The five id-keyed collections of a configuration document.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    /// Animation presets.
    Animations,
    /// Conditional styling rules.
    Rules,
    /// Named style profiles.
    Profiles,
    /// Visual overlays.
    Overlays,
    /// Animation timelines.
    Timelines,
}

impl Collection {
    /// Every collection, in folding order.
    pub const ALL: [Self; 5] = [
        Self::Animations,
        Self::Rules,
        Self::Profiles,
        Self::Overlays,
        Self::Timelines,
    ];

    /// Key used for this collection in configuration documents.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Animations => "animations",
            Self::Rules => "rules",
            Self::Profiles => "profiles",
            Self::Overlays => "overlays",
            Self::Timelines => "timelines",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a known collection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown collection '{0}'")]
pub struct UnknownCollection(pub String);

impl FromStr for Collection {
    type Err = UnknownCollection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|collection| collection.as_str() == s)
            .ok_or_else(|| UnknownCollection(s.to_owned()))
    }
}

/// A merged, fully resolved configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    /// Schema version supplied by the last layer that set one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Value>,
    /// Animation presets.
    #[serde(default)]
    pub animations: Vec<AnimationSpec>,
    /// Conditional styling rules.
    #[serde(default)]
    pub rules: Vec<Rule>,
    /// Named style profiles.
    #[serde(default)]
    pub profiles: Vec<Profile>,
    /// Visual overlays.
    #[serde(default)]
    pub overlays: Vec<Overlay>,
    /// Animation timelines.
    #[serde(default)]
    pub timelines: Vec<TimelineSpec>,
    /// Palette name to token map.
    #[serde(default)]
    pub palettes: BTreeMap<String, Map<String, Value>>,
    /// Anchor name to point or percentage pair.
    #[serde(default)]
    pub anchors: BTreeMap<String, Value>,
    /// Arbitrary routing hints.
    #[serde(default)]
    pub routing: Map<String, Value>,
    /// Identifiers of the profiles currently active.
    #[serde(default)]
    pub active_profiles: Vec<String>,
}

impl ConfigDocument {
    /// Borrow every item of `collection` in document order.
    #[must_use]
    pub fn items(&self, collection: Collection) -> Vec<ItemRef<'_>> {
        match collection {
            Collection::Animations => self.animations.iter().map(ItemRef::Animation).collect(),
            Collection::Rules => self.rules.iter().map(ItemRef::Rule).collect(),
            Collection::Profiles => self.profiles.iter().map(ItemRef::Profile).collect(),
            Collection::Overlays => self.overlays.iter().map(ItemRef::Overlay).collect(),
            Collection::Timelines => self.timelines.iter().map(ItemRef::Timeline).collect(),
        }
    }

    /// Ids of `collection` in document order.
    #[must_use]
    pub fn ids(&self, collection: Collection) -> Vec<&str> {
        self.items(collection).into_iter().map(|item| item.id()).collect()
    }

    /// Render the document as a JSON value.
    ///
    /// Absent `version` is omitted; every other section is always present.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        if let Some(version) = &self.version {
            map.insert("version".to_owned(), version.clone());
        }
        for collection in Collection::ALL {
            let items = self
                .items(collection)
                .into_iter()
                .map(|item| item.to_value())
                .collect();
            map.insert(collection.as_str().to_owned(), Value::Array(items));
        }
        let palettes = self
            .palettes
            .iter()
            .map(|(name, tokens)| (name.clone(), Value::Object(tokens.clone())))
            .collect();
        map.insert("palettes".to_owned(), Value::Object(palettes));
        let anchors = self
            .anchors
            .iter()
            .map(|(name, point)| (name.clone(), point.clone()))
            .collect();
        map.insert("anchors".to_owned(), Value::Object(anchors));
        map.insert("routing".to_owned(), Value::Object(self.routing.clone()));
        let active = self
            .active_profiles
            .iter()
            .map(|id| Value::String(id.clone()))
            .collect();
        map.insert("active_profiles".to_owned(), Value::Array(active));
        Value::Object(map)
    }

    /// Content fingerprint of the whole document.
    #[must_use]
    pub fn checksum(&self) -> String {
        fingerprint(&self.to_value())
    }
}
