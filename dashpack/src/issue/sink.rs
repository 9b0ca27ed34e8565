//! Destinations for published issues.

use parking_lot::Mutex;

use super::{Issue, Severity};

/// Receives every issue raised during a merge or validation pass.
///
/// The trait is object-safe so engines can hold it behind `Arc<dyn IssueSink>`.
/// Closures taking `&Issue` implement it directly.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use dashpack::issue::{Issue, IssueCode, IssueSink};
///
/// let sink: Arc<dyn IssueSink> = Arc::new(|issue: &Issue| {
///     assert_eq!(issue.code, IssueCode::MissingId);
/// });
/// sink.publish(&Issue::error(IssueCode::MissingId, "overlay without id"));
/// ```
pub trait IssueSink: Send + Sync {
    /// Handle a single issue.
    fn publish(&self, issue: &Issue);
}

impl<F> IssueSink for F
where
    F: Fn(&Issue) + Send + Sync,
{
    fn publish(&self, issue: &Issue) {
        self(issue);
    }
}

/// Sink that discards every issue.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpSink;

impl IssueSink for NoOpSink {
    fn publish(&self, _issue: &Issue) {}
}

/// Sink that forwards issues to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl IssueSink for TracingSink {
    fn publish(&self, issue: &Issue) {
        let context = &issue.context;
        match issue.severity {
            Severity::Error => tracing::error!(
                code = %issue.code,
                collection = ?context.collection,
                id = ?context.id,
                layer = ?context.layer,
                "{}",
                issue.message
            ),
            Severity::Warn => tracing::warn!(
                code = %issue.code,
                collection = ?context.collection,
                id = ?context.id,
                layer = ?context.layer,
                "{}",
                issue.message
            ),
        }
    }
}

/// Sink that records issues in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    issues: Mutex<Vec<Issue>>,
}

impl CollectingSink {
    /// Create an empty collector.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            issues: Mutex::new(Vec::new()),
        }
    }

    /// Copy of every issue published so far.
    #[must_use]
    pub fn issues(&self) -> Vec<Issue> {
        self.issues.lock().clone()
    }

    /// Remove and return every issue published so far.
    #[must_use]
    pub fn drain(&self) -> Vec<Issue> {
        std::mem::take(&mut *self.issues.lock())
    }
}

impl IssueSink for CollectingSink {
    fn publish(&self, issue: &Issue) {
        self.issues.lock().push(issue.clone());
    }
}
