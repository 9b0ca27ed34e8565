//! Transports that deliver raw pack bodies.
//!
//! The fetcher only needs "give me the bytes behind this URL"; timeouts, size
//! limits and caching are layered on top in [`super::PackFetcher`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use futures::future::BoxFuture;
use parking_lot::RwLock;

use crate::{PackError, PackResult};

/// Fetches raw pack bodies by URL.
///
/// Implementations should resolve every request to success or failure; the
/// fetcher still bounds each call with its own timeout and re-checks the
/// body length.
pub trait PackTransport: Send + Sync {
    /// Fetch the body stored at `url`.
    ///
    /// Transports that know a body's size before reading it should fail
    /// with [`PackError::TooLarge`] when it exceeds `max_bytes`.
    fn fetch<'a>(&'a self, url: &'a str, max_bytes: usize) -> BoxFuture<'a, PackResult<Vec<u8>>>;
}

/// Reads packs from the local filesystem.
///
/// Accepts `file://` URLs and plain paths. Relative paths resolve against the
/// configured root, or the working directory when no root is set.
#[derive(Debug, Clone, Default)]
pub struct FileTransport {
    root: Option<Utf8PathBuf>,
}

impl FileTransport {
    /// Create a transport resolving relative paths against the working
    /// directory.
    #[must_use]
    pub const fn new() -> Self {
        Self { root: None }
    }

    /// Create a transport resolving relative paths against `root`.
    #[must_use]
    pub fn with_root(root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// Map `url` onto a filesystem path.
    #[must_use]
    pub fn resolve(&self, url: &str) -> Utf8PathBuf {
        let raw = Utf8Path::new(url.strip_prefix("file://").unwrap_or(url));
        match &self.root {
            Some(root) if raw.is_relative() => root.join(raw),
            _ => raw.to_path_buf(),
        }
    }
}

impl PackTransport for FileTransport {
    fn fetch<'a>(&'a self, url: &'a str, max_bytes: usize) -> BoxFuture<'a, PackResult<Vec<u8>>> {
        let path = self.resolve(url);
        Box::pin(async move {
            let metadata = tokio::fs::metadata(&path)
                .await
                .map_err(|err| PackError::transport(url, err))?;
            let size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
            if size > max_bytes {
                return Err(PackError::too_large(url, size, max_bytes));
            }
            tokio::fs::read(&path)
                .await
                .map_err(|err| PackError::transport(url, err))
        })
    }
}

#[derive(Debug, Clone)]
struct MemoryEntry {
    body: Result<Vec<u8>, String>,
    delay: Option<Duration>,
}

/// Serves packs from an in-memory table.
///
/// Entries can be delayed or made to fail, which makes the transport useful
/// for exercising concurrency and failure isolation without a network.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    entries: RwLock<HashMap<String, MemoryEntry>>,
    requests: AtomicUsize,
}

impl MemoryTransport {
    /// Create an empty transport; every URL fails until inserted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `url`.
    pub fn insert(&self, url: impl Into<String>, body: impl Into<Vec<u8>>) {
        self.insert_entry(url, Ok(body.into()), None);
    }

    /// Serve `body` for `url` after waiting `delay`.
    pub fn insert_delayed(
        &self,
        url: impl Into<String>,
        body: impl Into<Vec<u8>>,
        delay: Duration,
    ) {
        self.insert_entry(url, Ok(body.into()), Some(delay));
    }

    /// Fail every request for `url` with `message`.
    pub fn insert_failure(&self, url: impl Into<String>, message: impl Into<String>) {
        self.insert_entry(url, Err(message.into()), None);
    }

    /// Total number of fetches served or failed so far.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn insert_entry(
        &self,
        url: impl Into<String>,
        body: Result<Vec<u8>, String>,
        delay: Option<Duration>,
    ) {
        self.entries.write().insert(url.into(), MemoryEntry { body, delay });
    }
}

impl PackTransport for MemoryTransport {
    // Bodies are already in memory; the fetcher applies the size limit.
    fn fetch<'a>(&'a self, url: &'a str, _max_bytes: usize) -> BoxFuture<'a, PackResult<Vec<u8>>> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let entry = self.entries.read().get(url).cloned();
        Box::pin(async move {
            let Some(MemoryEntry { body, delay }) = entry else {
                return Err(PackError::transport(url, "not found"));
            };
            if let Some(wait) = delay {
                tokio::time::sleep(wait).await;
            }
            body.map_err(|message| PackError::transport(url, message))
        })
    }
}
