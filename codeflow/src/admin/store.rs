//! The local system-of-record as seen by the publish pipeline.

use async_trait::async_trait;

use crate::core::Flow;
use crate::errors::CodeflowError;

/// Read/patch access to locally stored flows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FlowStore: Send + Sync {
    /// Fetches the full record, code body included.
    async fn get_flow(&self, key: &str) -> Result<Flow, CodeflowError>;

    /// Records a confirmed remote publish: status enabled, `published_at` set.
    async fn mark_published(&self, key: &str, published_at: &str) -> Result<(), CodeflowError>;
}
