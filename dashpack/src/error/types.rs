//! Primary error enum for pack loading flows.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// Shared result type used at the pack loading boundary.
///
/// Errors are reference counted so a single failure can be cached, logged and
/// turned into an issue without cloning the underlying source.
pub type PackResult<T> = Result<T, Arc<PackError>>;

/// Errors that can occur while fetching or parsing an external pack.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PackError {
    /// The transport could not deliver the pack body.
    #[error("failed to fetch '{url}': {source}")]
    Transport {
        /// URL that was requested.
        url: String,
        /// Underlying error reported by the transport.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The transport did not answer within the configured window.
    #[error("fetching '{url}' timed out after {}ms", after.as_millis())]
    Timeout {
        /// URL that was requested.
        url: String,
        /// Time waited before giving up.
        after: Duration,
    },

    /// The payload exceeded the configured size limit and was not parsed.
    #[error("pack '{url}' is {size} bytes, over the {limit} byte limit")]
    TooLarge {
        /// URL that was requested.
        url: String,
        /// Size of the rejected payload.
        size: usize,
        /// Configured maximum.
        limit: usize,
    },

    /// The payload could not be parsed.
    #[error("failed to parse pack '{url}': {source}")]
    Parse {
        /// URL whose body failed to parse.
        url: String,
        /// Underlying parser error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The payload parsed, but its root is not a mapping.
    #[error("pack '{url}' must contain a mapping at its root, found {found}")]
    NotAMapping {
        /// URL whose body was rejected.
        url: String,
        /// JSON type name found at the root.
        found: &'static str,
    },

    /// The pack format requires a feature that is disabled in this build.
    #[error("pack '{url}' uses the {format} format; enable the '{feature}' feature")]
    UnsupportedFormat {
        /// URL whose format is unsupported.
        url: String,
        /// Format inferred from the URL.
        format: &'static str,
        /// Cargo feature that enables the format.
        feature: &'static str,
    },
}
