//! Layered runtime settings for the CLI.
//!
//! Sources merge in order: defaults, the TOML settings file, `DASHPACK_`
//! environment variables, then command-line flags.

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use dashpack::FetchOptions;
use dashpack::fetch::{DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_PACK_BYTES};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::cli::SettingsOverrides;
use crate::error::DashpackError;

/// Settings file read when `--config` is not given.
pub const DEFAULT_SETTINGS_FILE: &str = ".dashpack.toml";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "DASHPACK_";

/// Effective CLI settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Largest accepted external pack body, in bytes.
    pub max_pack_bytes: usize,
    /// Time allowed for one external pack fetch, in milliseconds.
    pub fetch_timeout_ms: u64,
    /// Directory relative pack paths resolve against.
    pub pack_root: Option<Utf8PathBuf>,
    /// `tracing` filter directive.
    pub log: String,
    /// Pretty-print JSON output.
    pub pretty: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_pack_bytes: DEFAULT_MAX_PACK_BYTES,
            fetch_timeout_ms: u64::try_from(DEFAULT_FETCH_TIMEOUT.as_millis()).unwrap_or(u64::MAX),
            pack_root: None,
            log: "warn".to_owned(),
            pretty: false,
        }
    }
}

impl Settings {
    /// Load settings from every source.
    ///
    /// A missing settings file is skipped.
    ///
    /// # Errors
    ///
    /// Returns [`DashpackError::Settings`] when a source holds a value of the
    /// wrong type.
    pub fn load(
        config: Option<&Utf8Path>,
        overrides: &SettingsOverrides,
    ) -> Result<Self, DashpackError> {
        let path = config.unwrap_or_else(|| Utf8Path::new(DEFAULT_SETTINGS_FILE));
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_std_path()))
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Serialized::defaults(overrides))
            .extract()
            .map_err(|err| DashpackError::Settings(Box::new(err)))
    }

    /// Fetch limits derived from these settings.
    #[must_use]
    pub const fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            max_bytes: self.max_pack_bytes,
            timeout: Duration::from_millis(self.fetch_timeout_ms),
        }
    }
}
