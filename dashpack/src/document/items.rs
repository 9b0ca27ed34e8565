//! Typed items for the id-keyed collections.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Collection;

/// Behaviour shared by every id-keyed collection item.
pub trait CollectionItem: Sized {
    /// Collection the item type lives in.
    const COLLECTION: Collection;

    /// Identifier unique within the collection.
    fn id(&self) -> &str;

    /// Every field other than `id`.
    fn fields(&self) -> &Map<String, Value>;

    /// Build an item from a JSON object, returning `None` when `id` is not a
    /// non-empty string.
    fn from_object(object: Map<String, Value>) -> Option<Self>;

    /// Render the item, `id` included, as a JSON object.
    fn to_value(&self) -> Value {
        let mut object = self.fields().clone();
        object.insert("id".to_owned(), Value::String(self.id().to_owned()));
        Value::Object(object)
    }

    /// Borrow a string-valued field.
    fn str_field(&self, name: &str) -> Option<&str> {
        self.fields().get(name).and_then(Value::as_str)
    }
}

macro_rules! collection_item {
    ($(#[$meta:meta])* $name:ident => $collection:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            /// Identifier unique within the collection.
            pub id: String,
            /// Remaining fields, preserved verbatim.
            #[serde(flatten)]
            pub fields: Map<String, Value>,
        }

        impl CollectionItem for $name {
            const COLLECTION: Collection = $collection;

            fn id(&self) -> &str {
                &self.id
            }

            fn fields(&self) -> &Map<String, Value> {
                &self.fields
            }

            fn from_object(mut object: Map<String, Value>) -> Option<Self> {
                match object.remove("id") {
                    Some(Value::String(id)) if !id.is_empty() => Some(Self { id, fields: object }),
                    _ => None,
                }
            }
        }
    };
}

collection_item!(
    /// A named animation preset.
    AnimationSpec => Collection::Animations
);
collection_item!(
    /// A conditional rule applied to overlays and profiles.
    Rule => Collection::Rules
);
collection_item!(
    /// A reusable style profile.
    Profile => Collection::Profiles
);
collection_item!(
    /// A visual overlay drawn over the dashboard.
    Overlay => Collection::Overlays
);
collection_item!(
    /// An ordered sequence of animation steps.
    TimelineSpec => Collection::Timelines
);

impl AnimationSpec {
    /// Preset the animation builds on.
    #[must_use]
    pub fn preset(&self) -> Option<&str> {
        self.str_field("preset")
    }
}

impl Rule {
    /// Condition block deciding when the rule applies.
    #[must_use]
    pub fn when(&self) -> Option<&Value> {
        self.fields.get("when")
    }

    /// Effects applied when the rule matches.
    #[must_use]
    pub fn apply(&self) -> Option<&Value> {
        self.fields.get("apply")
    }
}

impl Profile {
    /// Style tokens carried by the profile.
    #[must_use]
    pub fn style(&self) -> Option<&Map<String, Value>> {
        self.fields.get("style").and_then(Value::as_object)
    }
}

impl Overlay {
    /// Renderer type of the overlay (the `type` field).
    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        self.str_field("type")
    }

    /// Anchor or overlay the overlay is positioned against.
    #[must_use]
    pub fn anchor(&self) -> Option<&str> {
        self.str_field("anchor")
    }

    /// Overlay or anchor the overlay attaches to.
    #[must_use]
    pub fn attach_to(&self) -> Option<&str> {
        self.str_field("attach_to")
    }
}

impl TimelineSpec {
    /// Ordered timeline steps.
    #[must_use]
    pub fn steps(&self) -> Option<&[Value]> {
        self.fields.get("steps").and_then(Value::as_array).map(Vec::as_slice)
    }
}

/// Borrowed view over an item of any collection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ItemRef<'a> {
    /// Item from `animations`.
    Animation(&'a AnimationSpec),
    /// Item from `rules`.
    Rule(&'a Rule),
    /// Item from `profiles`.
    Profile(&'a Profile),
    /// Item from `overlays`.
    Overlay(&'a Overlay),
    /// Item from `timelines`.
    Timeline(&'a TimelineSpec),
}

impl<'a> ItemRef<'a> {
    /// Identifier of the referenced item.
    #[must_use]
    pub fn id(self) -> &'a str {
        match self {
            Self::Animation(item) => &item.id,
            Self::Rule(item) => &item.id,
            Self::Profile(item) => &item.id,
            Self::Overlay(item) => &item.id,
            Self::Timeline(item) => &item.id,
        }
    }

    /// Non-id fields of the referenced item.
    #[must_use]
    pub fn fields(self) -> &'a Map<String, Value> {
        match self {
            Self::Animation(item) => &item.fields,
            Self::Rule(item) => &item.fields,
            Self::Profile(item) => &item.fields,
            Self::Overlay(item) => &item.fields,
            Self::Timeline(item) => &item.fields,
        }
    }

    /// Collection the referenced item belongs to.
    #[must_use]
    pub const fn collection(self) -> Collection {
        match self {
            Self::Animation(_) => Collection::Animations,
            Self::Rule(_) => Collection::Rules,
            Self::Profile(_) => Collection::Profiles,
            Self::Overlay(_) => Collection::Overlays,
            Self::Timeline(_) => Collection::Timelines,
        }
    }

    /// Render the referenced item as a JSON object.
    #[must_use]
    pub fn to_value(self) -> Value {
        match self {
            Self::Animation(item) => item.to_value(),
            Self::Rule(item) => item.to_value(),
            Self::Profile(item) => item.to_value(),
            Self::Overlay(item) => item.to_value(),
            Self::Timeline(item) => item.to_value(),
        }
    }
}
