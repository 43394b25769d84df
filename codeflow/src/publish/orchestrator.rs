//! Sequential batch publishing.

use std::sync::Arc;
use tracing::Instrument;

use super::observer::{NoOpObserver, PublishObserver};
use super::selection::fetch_full_flows;
use super::uploader::RemoteUploader;
use crate::admin::FlowStore;
use crate::config::{ConfigResolver, DeploymentTarget};
use crate::core::{BatchPublishReport, Flow, PublishOutcome};
use crate::errors::CodeflowError;

/// Drives publishes against one deployment target.
///
/// Flows in a batch are handled strictly one at a time, in input order: an
/// upload and its local sync complete before the next upload starts. A
/// failed flow never stops the batch and nothing is retried.
#[derive(Clone)]
pub struct PublishOrchestrator {
    uploader: RemoteUploader,
    target: DeploymentTarget,
    observer: Arc<dyn PublishObserver>,
}

impl std::fmt::Debug for PublishOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublishOrchestrator")
            .field("uploader", &self.uploader)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl PublishOrchestrator {
    /// Creates an orchestrator for an explicit target.
    #[must_use]
    pub fn new(uploader: RemoteUploader, target: DeploymentTarget) -> Self {
        Self {
            uploader,
            target,
            observer: Arc::new(NoOpObserver),
        }
    }

    /// Creates an orchestrator from resolved configuration.
    ///
    /// # Errors
    ///
    /// [`CodeflowError::ConfigurationUnavailable`] when publishing is not
    /// enabled for this build or no target is configured.
    pub fn from_config(
        resolver: &ConfigResolver,
        uploader: RemoteUploader,
    ) -> Result<Self, CodeflowError> {
        let target = resolver
            .resolve_target()
            .ok_or_else(|| CodeflowError::unavailable("production target is not configured"))?;
        if !resolver.is_publish_enabled() {
            return Err(CodeflowError::unavailable(format!(
                "publishing is disabled in {} builds",
                resolver.build_mode()
            )));
        }
        Ok(Self::new(uploader, target.clone()))
    }

    /// Sets the progress observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn PublishObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// The target flows are pushed to.
    #[must_use]
    pub fn target(&self) -> &DeploymentTarget {
        &self.target
    }

    /// Publishes a single flow.
    pub async fn publish_single(&self, flow: &Flow) -> PublishOutcome {
        self.uploader.publish(flow, &self.target).await
    }

    /// Publishes every flow once, in order, and tallies the outcomes.
    pub async fn publish_batch(&self, flows: &[Flow]) -> BatchPublishReport {
        let total = flows.len();
        let span = tracing::info_span!(
            "publish_batch",
            batch_id = %uuid::Uuid::new_v4(),
            total
        );

        async move {
            tracing::info!(endpoint = %self.target.endpoint(), "Starting batch publish");

            let mut outcomes = Vec::with_capacity(total);
            for (index, flow) in flows.iter().enumerate() {
                self.observer.on_item_started(index, total, &flow.key);
                let outcome = self.uploader.publish(flow, &self.target).await;
                self.observer.on_item_finished(index, total, &outcome);
                outcomes.push(outcome);
            }

            let report = BatchPublishReport::from_outcomes(outcomes);
            if report.all_succeeded() {
                tracing::info!(succeeded = report.success_count(), "Batch publish finished");
            } else {
                tracing::warn!(
                    succeeded = report.success_count(),
                    failed = report.failure_count(),
                    "Batch publish finished with failures"
                );
            }
            report
        }
        .instrument(span)
        .await
    }

    /// Fetches the full record for each key, then publishes the batch.
    ///
    /// # Errors
    ///
    /// Returns the first fetch error; in that case nothing is published.
    pub async fn publish_selected(
        &self,
        store: &dyn FlowStore,
        keys: &[String],
    ) -> Result<BatchPublishReport, CodeflowError> {
        let flows = fetch_full_flows(store, keys, self.observer.as_ref()).await?;
        Ok(self.publish_batch(&flows).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BuildMode, MapEnv};
    use crate::config::resolver::{BUILD_MODE, PROD_ACCESS_SECRET, PROD_API_URL};
    use crate::publish::LocalStateSync;
    use crate::testing::{sample_target, InMemoryFlowStore, MockTransport};

    fn uploader() -> RemoteUploader {
        RemoteUploader::new(
            Arc::new(MockTransport::new()),
            LocalStateSync::new(Arc::new(InMemoryFlowStore::new())),
        )
    }

    #[test]
    fn test_from_config_requires_target() {
        let resolver = ConfigResolver::new(BuildMode::Development, None);
        let err = PublishOrchestrator::from_config(&resolver, uploader()).unwrap_err();
        assert!(matches!(err, CodeflowError::ConfigurationUnavailable(_)));
    }

    #[test]
    fn test_from_config_refuses_production_build() {
        let resolver = ConfigResolver::new(BuildMode::Production, Some(sample_target()));
        let err = PublishOrchestrator::from_config(&resolver, uploader()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Publishing unavailable: publishing is disabled in production builds"
        );
    }

    #[test]
    fn test_from_config_in_development() {
        let env = MapEnv::new()
            .with(PROD_API_URL, "https://prod.example.com")
            .with(PROD_ACCESS_SECRET, "prod-secret")
            .with(BUILD_MODE, "development");
        let resolver = ConfigResolver::from_source(&env);

        let orchestrator = PublishOrchestrator::from_config(&resolver, uploader()).unwrap();
        assert_eq!(orchestrator.target(), &sample_target());
    }

    #[test]
    fn test_empty_batch_makes_no_calls() {
        let transport = Arc::new(MockTransport::new());
        let orchestrator = PublishOrchestrator::new(
            RemoteUploader::new(
                transport.clone(),
                LocalStateSync::new(Arc::new(InMemoryFlowStore::new())),
            ),
            sample_target(),
        );

        let report = tokio_test::block_on(orchestrator.publish_batch(&[]));

        assert_eq!(report, BatchPublishReport::default());
        assert!(transport.calls().is_empty());
    }
}
