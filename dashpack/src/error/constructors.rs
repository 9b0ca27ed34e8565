//! Constructors shared by pack loading helpers.

use std::error::Error;
use std::sync::Arc;

use serde_json::Value;

use super::PackError;

impl PackError {
    /// Construct a transport error for `url`.
    ///
    /// # Examples
    ///
    /// ```
    /// use dashpack::PackError;
    /// let err = PackError::transport("https://packs/a.json", "connection reset");
    /// assert!(matches!(&*err, PackError::Transport { .. }));
    /// ```
    #[must_use]
    pub fn transport(
        url: impl Into<String>,
        source: impl Into<Box<dyn Error + Send + Sync>>,
    ) -> Arc<Self> {
        Arc::new(Self::Transport {
            url: url.into(),
            source: source.into(),
        })
    }

    /// Construct a parse error for `url`.
    #[must_use]
    pub fn parse(
        url: impl Into<String>,
        source: impl Into<Box<dyn Error + Send + Sync>>,
    ) -> Arc<Self> {
        Arc::new(Self::Parse {
            url: url.into(),
            source: source.into(),
        })
    }

    /// Construct the error for a body of `size` bytes over `limit`.
    #[must_use]
    pub fn too_large(url: impl Into<String>, size: usize, limit: usize) -> Arc<Self> {
        Arc::new(Self::TooLarge {
            url: url.into(),
            size,
            limit,
        })
    }

    /// Construct the error reported when a pack root is not a mapping.
    #[must_use]
    pub fn not_a_mapping(url: impl Into<String>, found: &Value) -> Arc<Self> {
        Arc::new(Self::NotAMapping {
            url: url.into(),
            found: json_type_name(found),
        })
    }

    /// URL the error refers to.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Transport { url, .. }
            | Self::Timeout { url, .. }
            | Self::TooLarge { url, .. }
            | Self::Parse { url, .. }
            | Self::NotAMapping { url, .. }
            | Self::UnsupportedFormat { url, .. } => url,
        }
    }
}

pub(crate) const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}
