//! Best-effort local mirror of a confirmed remote publish.

use std::sync::Arc;

use crate::admin::FlowStore;

/// Patches the local record after the target accepted a flow.
///
/// A failed patch is logged and dropped: the remote publish already
/// happened and stays authoritative.
#[derive(Clone)]
pub struct LocalStateSync {
    store: Arc<dyn FlowStore>,
}

impl std::fmt::Debug for LocalStateSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStateSync").finish_non_exhaustive()
    }
}

impl LocalStateSync {
    /// Creates a sync over a store.
    #[must_use]
    pub fn new(store: Arc<dyn FlowStore>) -> Self {
        Self { store }
    }

    /// Marks `key` as published at `published_at`. Never fails.
    pub async fn mark_published(&self, key: &str, published_at: &str) {
        match self.store.mark_published(key, published_at).await {
            Ok(()) => {
                tracing::debug!(flow_key = %key, published_at = %published_at, "Local record marked published");
            }
            Err(e) => {
                tracing::warn!(
                    flow_key = %key,
                    published_at = %published_at,
                    error = %e,
                    "Failed to mark flow published locally"
                );
            }
        }
    }
}
