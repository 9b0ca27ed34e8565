//! External pack loading with size limits, timeouts and a URL cache.
//!
//! [`PackFetcher::load`] never panics and never hangs: every call resolves to
//! a parsed mapping or a [`PackError`]. Successful parses are cached by URL
//! for the lifetime of the fetcher, so share one fetcher (behind an `Arc`)
//! across merges to get process-wide caching.

mod parser;
mod transport;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use parking_lot::RwLock;
use serde_json::Value;

use crate::{PackError, PackResult};

pub use parser::{PackFormat, parse_pack_by_format};
pub use transport::{FileTransport, MemoryTransport, PackTransport};

/// Default maximum accepted pack body, in bytes.
pub const DEFAULT_MAX_PACK_BYTES: usize = 512 * 1024;

/// Default time allowed for a single fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Limits applied to every fetch.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FetchOptions {
    /// Bodies larger than this are rejected without parsing.
    pub max_bytes: usize,
    /// Time allowed for the transport to answer.
    pub timeout: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_PACK_BYTES,
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

/// Loads, parses and caches external packs.
pub struct PackFetcher {
    transport: Arc<dyn PackTransport>,
    options: FetchOptions,
    cache: RwLock<HashMap<String, Arc<Value>>>,
}

impl std::fmt::Debug for PackFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackFetcher")
            .field("transport", &"<transport>")
            .field("options", &self.options)
            .field("cached", &self.cache.read().len())
            .finish()
    }
}

impl PackFetcher {
    /// Create a fetcher with default limits.
    #[must_use]
    pub fn new(transport: Arc<dyn PackTransport>) -> Self {
        Self::with_options(transport, FetchOptions::default())
    }

    /// Create a fetcher with explicit limits.
    #[must_use]
    pub fn with_options(transport: Arc<dyn PackTransport>, options: FetchOptions) -> Self {
        Self {
            transport,
            options,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Limits applied by this fetcher.
    #[must_use]
    pub const fn options(&self) -> FetchOptions {
        self.options
    }

    /// Load the pack at `url`, serving repeat requests from the cache.
    ///
    /// # Errors
    ///
    /// Returns a [`PackError`] when the transport fails or times out, the
    /// body exceeds the size limit, or the body does not parse to a mapping.
    /// Failures are never cached.
    pub async fn load(&self, url: &str) -> PackResult<Arc<Value>> {
        if let Some(hit) = self.cached(url) {
            tracing::debug!(%url, "serving pack from cache");
            return Ok(hit);
        }
        let body = self.fetch_body(url).await?;
        if body.len() > self.options.max_bytes {
            tracing::warn!(
                %url,
                size = body.len(),
                limit = self.options.max_bytes,
                "rejecting oversized pack"
            );
            return Err(PackError::too_large(url, body.len(), self.options.max_bytes));
        }
        let document = Arc::new(parse_pack_by_format(url, &body)?);
        // Racing loads of one URL parse to the same value, so first insert wins.
        let cached = Arc::clone(
            self.cache
                .write()
                .entry(url.to_owned())
                .or_insert_with(|| Arc::clone(&document)),
        );
        Ok(cached)
    }

    /// Load every URL concurrently and wait for all of them to settle.
    ///
    /// Results are returned in input order, each paired with its URL.
    pub async fn load_all(&self, urls: &[String]) -> Vec<(String, PackResult<Arc<Value>>)> {
        join_all(urls.iter().map(|url| async move {
            let outcome = self.load(url).await;
            if let Err(err) = &outcome {
                tracing::warn!(%url, error = %err, "external pack failed to load");
            }
            (url.clone(), outcome)
        }))
        .await
    }

    async fn fetch_body(&self, url: &str) -> PackResult<Vec<u8>> {
        let request = self.transport.fetch(url, self.options.max_bytes);
        match tokio::time::timeout(self.options.timeout, request).await {
            Ok(result) => result,
            Err(_elapsed) => Err(Arc::new(PackError::Timeout {
                url: url.to_owned(),
                after: self.options.timeout,
            })),
        }
    }

    /// Cached document for `url`, if any.
    #[must_use]
    pub fn cached(&self, url: &str) -> Option<Arc<Value>> {
        self.cache.read().get(url).map(Arc::clone)
    }

    /// Drop the cached document for `url`; returns whether one existed.
    #[must_use]
    pub fn invalidate(&self, url: &str) -> bool {
        self.cache.write().remove(url).is_some()
    }

    /// Drop every cached document.
    pub fn clear(&self) {
        self.cache.write().clear();
    }
}

#[cfg(test)]
mod tests;
