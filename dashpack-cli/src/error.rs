//! Error types for the `dashpack` binary.

use std::sync::Arc;

use camino::Utf8PathBuf;
use dashpack::PackError;
use thiserror::Error;

/// Errors surfaced by the `dashpack` command pipeline.
#[derive(Debug, Error)]
pub enum DashpackError {
    /// A settings source held an invalid value.
    #[error("invalid settings: {0}")]
    Settings(#[source] Box<figment::Error>),

    /// The input document could not be read or parsed.
    #[error("failed to load input: {0}")]
    Input(#[from] Arc<PackError>),

    /// Output could not be serialised.
    #[error("failed to serialise output: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading or writing a file failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path being accessed.
        path: Utf8PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// The async runtime could not start.
    #[error("failed to start runtime: {0}")]
    Runtime(#[source] std::io::Error),

    /// Validation reported errors.
    #[error("validation failed with {errors} error(s)")]
    Invalid {
        /// Number of error-severity findings.
        errors: usize,
    },
}

impl DashpackError {
    pub(crate) fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
