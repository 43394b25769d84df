//! Turns a set of selected keys into full flow records.
//!
//! List views only carry summaries, so every selected flow is fetched again
//! before a batch starts.

use crate::admin::FlowStore;
use crate::core::Flow;
use crate::errors::CodeflowError;

use super::observer::PublishObserver;

/// Fetches each key's full record, one after another, in input order.
///
/// # Errors
///
/// The first failed fetch aborts the selection and is returned; no batch
/// should start from a partial selection.
pub async fn fetch_full_flows(
    store: &dyn FlowStore,
    keys: &[String],
    observer: &dyn PublishObserver,
) -> Result<Vec<Flow>, CodeflowError> {
    let total = keys.len();
    let mut flows = Vec::with_capacity(total);

    for (i, key) in keys.iter().enumerate() {
        let flow = store.get_flow(key).await.map_err(|e| {
            tracing::error!(flow_key = %key, error = %e, "Failed to fetch flow for publishing");
            e
        })?;
        flows.push(flow);
        observer.on_fetch_progress(i + 1, total);
    }

    Ok(flows)
}
