//! Progress callbacks for selection and batch publishing.

use crate::core::PublishOutcome;

/// Observability callbacks for a publish run. All methods default to no-ops.
///
/// Indices are zero-based; `total` is the size of the current phase.
pub trait PublishObserver: Send + Sync {
    /// Called after each full-record fetch during selection.
    fn on_fetch_progress(&self, _done: usize, _total: usize) {}

    /// Called before a flow is uploaded.
    fn on_item_started(&self, _index: usize, _total: usize, _key: &str) {}

    /// Called after a flow's upload and local sync finished.
    fn on_item_finished(&self, _index: usize, _total: usize, _outcome: &PublishOutcome) {}
}

/// An observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl PublishObserver for NoOpObserver {}

fn scaled(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 50;
    }
    let done = done.min(total);
    // at most 50, so the cast cannot truncate
    ((done * 100 + total) / (2 * total)) as u8
}

/// Overall percentage during the fetch phase, which covers 0 to 50.
#[must_use]
pub fn fetch_progress(done: usize, total: usize) -> u8 {
    scaled(done, total)
}

/// Overall percentage during the publish phase, which covers 50 to 100.
#[must_use]
pub fn publish_progress(done: usize, total: usize) -> u8 {
    50 + scaled(done, total)
}
