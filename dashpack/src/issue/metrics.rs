//! Performance counters reported by the merge engine.

use std::time::Duration;

/// Receives counters and timings from the merge engine.
///
/// Implementations must be cheap; the engine calls them on the hot path.
pub trait MetricsRecorder: Send + Sync {
    /// Add `by` to the counter `name`.
    fn increment(&self, name: &'static str, by: u64);

    /// Record how long the operation `name` took.
    fn record_duration(&self, name: &'static str, elapsed: Duration);
}

/// Recorder that discards every measurement.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpMetrics;

impl MetricsRecorder for NoOpMetrics {
    fn increment(&self, _name: &'static str, _by: u64) {}

    fn record_duration(&self, _name: &'static str, _elapsed: Duration) {}
}
