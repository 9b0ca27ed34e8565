//! Isolated settings sources for CLI tests.
//!
//! [`with_sources`] runs a closure inside a [`figment::Jail`] whose
//! environment has been cleared, so ambient `DASHPACK_*` variables never leak
//! into a test, then stages the requested files and variables.

use anyhow::{Result, anyhow};

/// Files and environment variables staged in a jail before a test runs.
#[derive(Debug, Default, Clone)]
pub struct JailSources<'a> {
    files: Vec<(&'a str, &'a str)>,
    env: Vec<(&'a str, &'a str)>,
}

impl<'a> JailSources<'a> {
    /// No files and an empty environment.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            files: Vec::new(),
            env: Vec::new(),
        }
    }

    /// Create `name` with `contents` relative to the jail directory.
    #[must_use]
    pub fn file(mut self, name: &'a str, contents: &'a str) -> Self {
        self.files.push((name, contents));
        self
    }

    /// Set the environment variable `key`.
    #[must_use]
    pub fn env(mut self, key: &'a str, value: &'a str) -> Self {
        self.env.push((key, value));
        self
    }
}

/// Stage `sources` in a fresh jail and return the output of `f`.
///
/// # Errors
///
/// Returns an error if the jail cannot be created, a file cannot be written,
/// or `f` fails.
pub fn with_sources<F, T>(sources: &JailSources<'_>, f: F) -> Result<T>
where
    F: FnOnce(&mut figment::Jail) -> figment::error::Result<T>,
{
    let mut output = None;
    figment::Jail::try_with(|jail| {
        jail.clear_env();
        for (name, contents) in &sources.files {
            jail.create_file(name, contents)?;
        }
        for (key, value) in &sources.env {
            jail.set_env(key, value);
        }
        output = Some(f(jail)?);
        Ok(())
    })
    .map_err(|err| anyhow!(err.to_string()))?;
    output.ok_or_else(|| anyhow!("jail closure did not return a value"))
}
