// Metrics hooks for the `matcher` crate.
//
// Callers install a global `MatchMetrics` implementation via [`set_match_metrics`];
// every `Matcher` then reports insert outcomes and per-query retrieval latency.
// This keeps instrumentation decoupled from any specific metrics backend.
use std::sync::{Arc, RwLock};
use std::time::Duration;

use once_cell::sync::OnceCell;

use crate::types::{MatchError, QueryKind};

/// Metrics observer for matcher operations.
pub trait MatchMetrics: Send + Sync {
    /// Record the outcome of an insert.
    fn record_add(&self, latency: Duration, result: Result<(), MatchError>);

    /// Record a query.
    ///
    /// `latency` covers candidate retrieval only; filtering happens lazily as
    /// the caller consumes the hits. `candidates` is the number of items that
    /// shared at least one element with the query.
    fn record_query(&self, kind: QueryKind, latency: Duration, candidates: usize);
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn MatchMetrics>>> {
    static METRICS: OnceCell<RwLock<Option<Arc<dyn MatchMetrics>>>> = OnceCell::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

pub(crate) fn metrics_recorder() -> Option<Arc<dyn MatchMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

/// Install or clear the global match metrics recorder.
///
/// This is typically called once during startup so all `Matcher` instances
/// share the same metrics backend.
pub fn set_match_metrics(recorder: Option<Arc<dyn MatchMetrics>>) {
    let lock = metrics_lock();
    let mut guard = lock
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}
