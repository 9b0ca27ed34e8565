//! Layered merge of built-in, external and user documents.
//!
//! [`MergeEngine::merge`] resolves the layers a user document asks for,
//! folds them in precedence order and returns the merged document with its
//! provenance and every issue raised along the way. A merge never fails:
//! authoring mistakes and unreachable packs become [`Issue`]s.

mod sections;
mod state;

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use serde_json::Value;

use crate::document::{ConfigDocument, PackSelection, UserDirectives};
use crate::fetch::{FileTransport, PackFetcher};
use crate::issue::{Issue, IssueCode, IssueSink, MetricsRecorder, NoOpMetrics, NoOpSink};
use crate::layer::{Layer, LayerComposer, LayerComposition, builtin_order};
use crate::provenance::Provenance;
use crate::registry::{BuiltinRegistry, DEFAULT_BUILTIN_ID};

use state::MergeState;

/// Outcome of one merge.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MergeResult {
    /// The merged document.
    pub merged: ConfigDocument,
    /// Where every item, anchor and palette came from.
    pub provenance: Provenance,
    /// Issues in the order they were raised.
    pub issues: Vec<Issue>,
}

impl MergeResult {
    /// Fingerprint of the merged document.
    #[must_use]
    pub fn checksum(&self) -> String {
        self.merged.checksum()
    }

    /// Issues of error severity.
    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|issue| issue.is_error())
    }

    /// Issues carrying `code`.
    pub fn issues_with(&self, code: IssueCode) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |issue| issue.code == code)
    }
}

/// Fold `layers` in order and apply the batch `removals` map.
///
/// This is the synchronous core of [`MergeEngine::merge`]; callers that
/// assemble their own layers use it directly.
///
/// # Examples
///
/// ```rust
/// use std::borrow::Cow;
/// use std::collections::BTreeMap;
///
/// use dashpack::layer::Layer;
/// use dashpack::merge::merge_layers;
/// use serde_json::json;
///
/// let core = json!({"overlays": [{"id": "warp", "type": "line", "color": "red"}]});
/// let user = json!({"overlays": [{"id": "warp", "type": "line", "color": "blue"}]});
/// let layers = [Layer::builtin("core", Cow::Owned(core)), Layer::user(Cow::Owned(user))];
///
/// let result = merge_layers(&layers, &BTreeMap::new());
/// assert_eq!(result.merged.overlays[0].fields["color"], json!("blue"));
/// assert!(result.issues.is_empty());
/// ```
#[must_use]
pub fn merge_layers(layers: &[Layer<'_>], removals: &BTreeMap<String, Vec<String>>) -> MergeResult {
    let mut state = MergeState::default();
    for layer in layers {
        state.fold_layer(layer);
    }
    state.sweep_redundant();
    state.remove_global(removals);
    let (merged, provenance, issues) = state.finish();
    MergeResult {
        merged,
        provenance,
        issues,
    }
}

/// Merges user documents against built-in and external packs.
///
/// The engine is stateless between merges apart from the fetcher's URL
/// cache; share one engine, or one fetcher, to reuse fetched packs.
pub struct MergeEngine {
    registry: BuiltinRegistry,
    fetcher: Arc<PackFetcher>,
    sink: Arc<dyn IssueSink>,
    metrics: Arc<dyn MetricsRecorder>,
}

impl std::fmt::Debug for MergeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MergeEngine")
            .field("registry", &self.registry)
            .field("fetcher", &self.fetcher)
            .finish_non_exhaustive()
    }
}

impl Default for MergeEngine {
    fn default() -> Self {
        Self::new(BuiltinRegistry::new())
    }
}

impl MergeEngine {
    /// Create an engine that reads external packs from the filesystem and
    /// discards issues and metrics.
    #[must_use]
    pub fn new(registry: BuiltinRegistry) -> Self {
        Self {
            registry,
            fetcher: Arc::new(PackFetcher::new(Arc::new(FileTransport::new()))),
            sink: Arc::new(NoOpSink),
            metrics: Arc::new(NoOpMetrics),
        }
    }

    /// Use `fetcher` for external packs.
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: Arc<PackFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Publish issues to `sink`.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn IssueSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Report counters and timings to `metrics`.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsRecorder>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Built-in packs available to merges.
    #[must_use]
    pub const fn registry(&self) -> &BuiltinRegistry {
        &self.registry
    }

    /// Mutable access to the built-in packs.
    pub const fn registry_mut(&mut self) -> &mut BuiltinRegistry {
        &mut self.registry
    }

    /// Fetcher used for external packs.
    #[must_use]
    pub fn fetcher(&self) -> &Arc<PackFetcher> {
        &self.fetcher
    }

    /// Merge `user` over the packs it selects.
    pub async fn merge(&self, user: &Value) -> MergeResult {
        let started = Instant::now();
        let directives = UserDirectives::from_document(user);
        let composition = self.compose(user, &directives.packs).await;
        let (layers, mut issues) = composition.into_parts();
        let failures = issues
            .iter()
            .filter(|issue| issue.code == IssueCode::ExternalLoadFailed)
            .count();

        let mut result = merge_layers(&layers, &directives.removals);
        issues.append(&mut result.issues);
        result.issues = issues;

        for issue in &result.issues {
            self.sink.publish(issue);
        }
        self.metrics.increment("pack.layers", count(layers.len()));
        self.metrics.increment("pack.issues", count(result.issues.len()));
        self.metrics.increment("pack.external.failures", count(failures));
        self.metrics.record_duration("pack.merge", started.elapsed());
        tracing::debug!(
            layers = layers.len(),
            issues = result.issues.len(),
            checksum = %result.checksum(),
            "merge complete"
        );
        result
    }

    /// Resolve and order the layers for `user`.
    ///
    /// External packs are fetched concurrently; each failure drops its layer
    /// and yields one `pack.external.load_failed` issue.
    pub async fn compose<'a>(
        &'a self,
        user: &'a Value,
        packs: &PackSelection,
    ) -> LayerComposition<'a> {
        let mut composer = LayerComposer::new();
        let mut issues = Vec::new();

        for id in builtin_order(&packs.builtin, DEFAULT_BUILTIN_ID) {
            match self.registry.get(&id) {
                Some(document) => composer.push_layer(Layer::builtin(id, Cow::Borrowed(document))),
                None => issues.push(
                    Issue::warn(IssueCode::UnknownBuiltin, format!("unknown built-in pack '{id}'"))
                        .for_id(id),
                ),
            }
        }

        let urls: Vec<String> = packs
            .external
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        for (url, outcome) in self.fetcher.load_all(&urls).await {
            match outcome {
                Ok(document) => composer.push_external(url, Value::clone(&document)),
                Err(err) => issues.push(
                    Issue::error(
                        IssueCode::ExternalLoadFailed,
                        format!("external pack could not be loaded: {err}"),
                    )
                    .in_layer(url),
                ),
            }
        }

        composer.push_layer(Layer::user(Cow::Borrowed(user)));
        LayerComposition::new(composer.layers(), issues)
    }
}

fn count(n: usize) -> u64 {
    u64::try_from(n).unwrap_or(u64::MAX)
}
