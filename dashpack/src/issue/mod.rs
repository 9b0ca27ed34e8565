//! Diagnostic issues raised while merging and validating packs.
//!
//! Issues are side-channel reports, never errors: a merge always completes
//! and hands every issue both to the configured [`IssueSink`] and back to the
//! caller in the merge result.

mod metrics;
mod sink;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::Collection;

pub use metrics::{MetricsRecorder, NoOpMetrics};
pub use sink::{CollectingSink, IssueSink, NoOpSink, TracingSink};

/// Severity attached to an [`Issue`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Authoring or transport failure.
    Error,
    /// Non-blocking authoring smell.
    Warn,
}

/// Stable identifier of an issue kind.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum IssueCode {
    /// An item has no usable `id`.
    #[serde(rename = "pack.item.missing_id")]
    MissingId,
    /// The same id appears twice within one layer.
    #[serde(rename = "pack.item.duplicate")]
    DuplicateItem,
    /// An override restated the current or original value.
    #[serde(rename = "pack.override.redundant")]
    RedundantOverride,
    /// A removal named an id that does not exist.
    #[serde(rename = "pack.removal.unknown")]
    UnknownRemoval,
    /// An external pack could not be loaded.
    #[serde(rename = "pack.external.load_failed")]
    ExternalLoadFailed,
    /// A palette value was not a token map.
    #[serde(rename = "pack.palette.merge.error")]
    PaletteMergeError,
    /// A requested built-in pack id is not registered.
    #[serde(rename = "pack.builtin.unknown")]
    UnknownBuiltin,
    /// A collection section was not a sequence.
    #[serde(rename = "pack.collection.invalid")]
    InvalidCollection,
    /// The user document repeats an id inside one collection.
    #[serde(rename = "validation.user.duplicate_id")]
    UserDuplicateId,
    /// The merged document repeats an id inside one collection.
    #[serde(rename = "validation.merged.duplicate_id")]
    MergedDuplicateId,
    /// A required field is absent.
    #[serde(rename = "validation.field.missing")]
    MissingField,
    /// A recommended field is absent.
    #[serde(rename = "validation.field.recommended")]
    RecommendedField,
    /// An anchor does not resolve to a finite point.
    #[serde(rename = "validation.anchor.unresolved")]
    UnresolvedAnchor,
    /// An overlay references an unknown anchor or overlay.
    #[serde(rename = "validation.reference.unresolved")]
    UnresolvedReference,
}

impl IssueCode {
    /// Dotted code string used in logs and serialised output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingId => "pack.item.missing_id",
            Self::DuplicateItem => "pack.item.duplicate",
            Self::RedundantOverride => "pack.override.redundant",
            Self::UnknownRemoval => "pack.removal.unknown",
            Self::ExternalLoadFailed => "pack.external.load_failed",
            Self::PaletteMergeError => "pack.palette.merge.error",
            Self::UnknownBuiltin => "pack.builtin.unknown",
            Self::InvalidCollection => "pack.collection.invalid",
            Self::UserDuplicateId => "validation.user.duplicate_id",
            Self::MergedDuplicateId => "validation.merged.duplicate_id",
            Self::MissingField => "validation.field.missing",
            Self::RecommendedField => "validation.field.recommended",
            Self::UnresolvedAnchor => "validation.anchor.unresolved",
            Self::UnresolvedReference => "validation.reference.unresolved",
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an issue was observed.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct IssueContext {
    /// Collection the issue concerns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<Collection>,
    /// Item, anchor or palette id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Identifier of the layer being folded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<String>,
    /// Field name for validation findings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// A diagnostic raised during merge or validation.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Error or warning.
    pub severity: Severity,
    /// Stable issue kind.
    pub code: IssueCode,
    /// Human-readable description.
    pub message: String,
    /// Location details.
    #[serde(flatten)]
    pub context: IssueContext,
}

impl Issue {
    /// Create an error-severity issue.
    #[must_use]
    pub fn error(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            context: IssueContext::default(),
        }
    }

    /// Create a warning-severity issue.
    #[must_use]
    pub fn warn(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warn,
            code,
            message: message.into(),
            context: IssueContext::default(),
        }
    }

    /// Attach the collection the issue concerns.
    #[must_use]
    pub fn in_collection(mut self, collection: Collection) -> Self {
        self.context.collection = Some(collection);
        self
    }

    /// Attach the item, anchor or palette id.
    #[must_use]
    pub fn for_id(mut self, id: impl Into<String>) -> Self {
        self.context.id = Some(id.into());
        self
    }

    /// Attach the layer identifier.
    #[must_use]
    pub fn in_layer(mut self, layer: impl Into<String>) -> Self {
        self.context.layer = Some(layer.into());
        self
    }

    /// Attach the field name.
    #[must_use]
    pub fn on_field(mut self, field: impl Into<String>) -> Self {
        self.context.field = Some(field.into());
        self
    }

    /// Returns `true` for error-severity issues.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}
