//! Format-specific parsing for pack bodies.

use camino::Utf8Path;
use serde_json::Value;

use crate::{PackError, PackResult};

/// Pack formats recognised from the URL extension.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PackFormat {
    /// JSON, the fallback for unknown extensions.
    Json,
    /// YAML (`.yaml`, `.yml`).
    Yaml,
    /// TOML (`.toml`).
    Toml,
}

impl PackFormat {
    /// Infer the format from `url`, ignoring any query string or fragment.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dashpack::fetch::PackFormat;
    ///
    /// assert_eq!(PackFormat::from_url("https://packs.example/lcars.YML?v=2"), PackFormat::Yaml);
    /// assert_eq!(PackFormat::from_url("file:///packs/base.toml"), PackFormat::Toml);
    /// assert_eq!(PackFormat::from_url("https://packs.example/pack"), PackFormat::Json);
    /// ```
    #[must_use]
    pub fn from_url(url: &str) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        let ext = Utf8Path::new(path)
            .extension()
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("yaml" | "yml") => Self::Yaml,
            Some("toml") => Self::Toml,
            _ => Self::Json,
        }
    }
}

/// Parse a pack body according to the format implied by `url`.
///
/// The parsed root must be a mapping.
///
/// # Errors
///
/// Returns a [`PackError`] when the body is not UTF-8, fails to parse, needs
/// a disabled format feature, or does not contain a mapping at its root.
pub fn parse_pack_by_format(url: &str, body: &[u8]) -> PackResult<Value> {
    let data = std::str::from_utf8(body).map_err(|err| PackError::parse(url, err))?;
    let value = match PackFormat::from_url(url) {
        PackFormat::Json => serde_json::from_str(data).map_err(|err| PackError::parse(url, err))?,
        PackFormat::Yaml => parse_yaml(url, data)?,
        PackFormat::Toml => parse_toml(url, data)?,
    };
    if value.is_object() {
        Ok(value)
    } else {
        Err(PackError::not_a_mapping(url, &value))
    }
}

#[cfg(feature = "yaml")]
fn parse_yaml(url: &str, data: &str) -> PackResult<Value> {
    serde_saphyr::from_str_with_options(
        data,
        serde_saphyr::Options {
            strict_booleans: true,
            ..serde_saphyr::Options::default()
        },
    )
    .map_err(|err| PackError::parse(url, err.to_string()))
}

#[cfg(not(feature = "yaml"))]
fn parse_yaml(url: &str, _data: &str) -> PackResult<Value> {
    Err(std::sync::Arc::new(PackError::UnsupportedFormat {
        url: url.to_owned(),
        format: "YAML",
        feature: "yaml",
    }))
}

#[cfg(feature = "toml")]
fn parse_toml(url: &str, data: &str) -> PackResult<Value> {
    toml::from_str::<Value>(data).map_err(|err| PackError::parse(url, err))
}

#[cfg(not(feature = "toml"))]
fn parse_toml(url: &str, _data: &str) -> PackResult<Value> {
    Err(std::sync::Arc::new(PackError::UnsupportedFormat {
        url: url.to_owned(),
        format: "TOML",
        feature: "toml",
    }))
}
