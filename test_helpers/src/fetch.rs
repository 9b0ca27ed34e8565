//! In-memory fetchers for merge tests.

use std::sync::Arc;
use std::time::Duration;

use dashpack::fetch::{FetchOptions, MemoryTransport, PackFetcher, PackTransport};

/// Builder for a [`PackFetcher`] backed by a [`MemoryTransport`].
#[derive(Debug, Default)]
pub struct MemoryPacks {
    transport: Arc<MemoryTransport>,
    options: FetchOptions,
}

impl MemoryPacks {
    /// Start with no packs and default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `url`.
    #[must_use]
    pub fn with(self, url: &str, body: &str) -> Self {
        self.transport.insert(url, body);
        self
    }

    /// Serve `body` for `url` after `delay`.
    #[must_use]
    pub fn with_delayed(self, url: &str, body: &str, delay: Duration) -> Self {
        self.transport.insert_delayed(url, body, delay);
        self
    }

    /// Fail every request for `url` with `reason`.
    #[must_use]
    pub fn failing(self, url: &str, reason: &str) -> Self {
        self.transport.insert_failure(url, reason);
        self
    }

    /// Override the fetch limits.
    #[must_use]
    pub const fn with_options(mut self, options: FetchOptions) -> Self {
        self.options = options;
        self
    }

    /// Shared handle on the transport, for request counting.
    #[must_use]
    pub fn transport(&self) -> Arc<MemoryTransport> {
        Arc::clone(&self.transport)
    }

    /// Build the fetcher.
    #[must_use]
    pub fn fetcher(&self) -> Arc<PackFetcher> {
        let transport: Arc<dyn PackTransport> = self.transport();
        Arc::new(PackFetcher::with_options(transport, self.options))
    }
}
