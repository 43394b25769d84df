//! Pushes one flow to the deployment target.

use serde::Serialize;
use std::sync::Arc;

use super::sync::LocalStateSync;
use crate::config::DeploymentTarget;
use crate::core::{Flow, PublishOutcome};
use crate::envelope::decode_publish_response;
use crate::errors::CodeflowError;
use crate::transport::{HttpRequest, HttpTransport};

/// Header carrying the target's access secret.
pub const ACCESS_SECRET_HEADER: &str = "x-access-secret";

/// Message used when a network error has no text of its own.
pub const NETWORK_FALLBACK: &str = "network error";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadBody<'a> {
    key: &'a str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    code: &'a str,
    is_publish: bool,
}

impl<'a> UploadBody<'a> {
    fn new(flow: &'a Flow, code: &'a str) -> Self {
        Self {
            key: &flow.key,
            name: &flow.name,
            category: flow.category.as_deref(),
            description: flow.description.as_deref(),
            code,
            is_publish: true,
        }
    }
}

/// Builds the upload request for a full flow.
pub fn upload_request(flow: &Flow, target: &DeploymentTarget) -> Result<HttpRequest, CodeflowError> {
    let code = flow
        .code
        .as_deref()
        .ok_or_else(|| CodeflowError::MissingCode(flow.key.clone()))?;

    Ok(HttpRequest::post(target.upload_url())
        .with_header("Content-Type", "application/json")
        .with_header(ACCESS_SECRET_HEADER, target.secret())
        .with_json(serde_json::to_value(UploadBody::new(flow, code))?))
}

/// Sends one flow to the target and folds every failure into the outcome.
#[derive(Clone)]
pub struct RemoteUploader {
    transport: Arc<dyn HttpTransport>,
    sync: LocalStateSync,
}

impl std::fmt::Debug for RemoteUploader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteUploader")
            .field("sync", &self.sync)
            .finish_non_exhaustive()
    }
}

impl RemoteUploader {
    /// Creates an uploader.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>, sync: LocalStateSync) -> Self {
        Self { transport, sync }
    }

    /// Publishes `flow` to `target`.
    ///
    /// A successful upload that reports `publishedAt` is mirrored locally
    /// before this returns. Never fails; check
    /// [`PublishOutcome::is_success`].
    pub async fn publish(&self, flow: &Flow, target: &DeploymentTarget) -> PublishOutcome {
        let request = match upload_request(flow, target) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(flow_key = %flow.key, error = %e, "Cannot build upload request");
                return PublishOutcome::failed_for(flow, e.to_string());
            }
        };

        tracing::debug!(flow_key = %flow.key, endpoint = %target.endpoint(), "Uploading flow");

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                let message = Some(e.to_string())
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| NETWORK_FALLBACK.to_string());
                tracing::warn!(flow_key = %flow.key, error = %message, "Upload failed");
                return PublishOutcome::failed_for(flow, message);
            }
        };

        match decode_publish_response(&response) {
            Ok(receipt) => {
                if let Some(ref published_at) = receipt.published_at {
                    self.sync.mark_published(&flow.key, published_at).await;
                }
                tracing::info!(
                    flow_key = %flow.key,
                    action = receipt.action.as_deref().unwrap_or("-"),
                    published_at = receipt.published_at.as_deref().unwrap_or("-"),
                    "Flow published"
                );
                let outcome = PublishOutcome::succeeded_for(flow, receipt.published_at);
                match receipt.message {
                    Some(message) => outcome.with_message(message),
                    None => outcome,
                }
            }
            Err(e) => {
                tracing::warn!(
                    flow_key = %flow.key,
                    status = response.status,
                    error = %e,
                    "Target refused flow"
                );
                PublishOutcome::failed_for(flow, e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        sample_flow, sample_target, upload_accepted, upload_rejected, InMemoryFlowStore,
        MockTransport,
    };
    use crate::transport::{HttpResponse, MockHttpTransport};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn uploader(transport: Arc<dyn HttpTransport>, store: &Arc<InMemoryFlowStore>) -> RemoteUploader {
        RemoteUploader::new(transport, LocalStateSync::new(store.clone()))
    }

    #[test]
    fn test_upload_request_shape() {
        let flow = sample_flow("a1").with_description("desc");
        let request = upload_request(&flow, &sample_target()).unwrap();

        assert_eq!(request.url, "https://prod.example.com/api/code/upload");
        assert_eq!(request.header("x-access-secret"), Some("prod-secret"));
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert!(request.header("authorization").is_none());
        assert_eq!(
            request.body,
            Some(json!({
                "key": "a1",
                "name": "Flow a1",
                "category": "pricing",
                "description": "desc",
                "code": "export default () => 'a1'",
                "isPublish": true
            }))
        );
    }

    #[tokio::test]
    async fn test_publish_success_marks_local_record() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(&upload_accepted(Some("2024-01-01T00:00:00Z")));
        let store = Arc::new(InMemoryFlowStore::with_flows([sample_flow("a1")]));

        let outcome = uploader(transport, &store)
            .publish(&sample_flow("a1"), &sample_target())
            .await;

        assert!(outcome.is_success());
        assert_eq!(outcome.published_at(), Some("2024-01-01T00:00:00Z"));
        assert_eq!(
            store.marks(),
            vec![("a1".to_string(), "2024-01-01T00:00:00Z".to_string())]
        );
    }

    #[tokio::test]
    async fn test_publish_success_without_timestamp_skips_sync() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(&upload_accepted(None));
        let store = Arc::new(InMemoryFlowStore::with_flows([sample_flow("a1")]));

        let outcome = uploader(transport, &store)
            .publish(&sample_flow("a1"), &sample_target())
            .await;

        assert!(outcome.is_success());
        assert!(outcome.published_at().is_none());
        assert!(store.marks().is_empty());
    }

    #[tokio::test]
    async fn test_publish_rejection() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(&upload_rejected("duplicate key"));
        let store = Arc::new(InMemoryFlowStore::new());

        let outcome = uploader(transport, &store)
            .publish(&sample_flow("a1"), &sample_target())
            .await;

        assert_eq!(outcome, PublishOutcome::failed("a1", "Flow a1", "duplicate key"));
        assert!(store.marks().is_empty());
    }

    #[tokio::test]
    async fn test_publish_outer_rejection() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(&json!({"code": 1, "message": "bad key"}));
        let store = Arc::new(InMemoryFlowStore::new());

        let outcome = uploader(transport, &store)
            .publish(&sample_flow("a1"), &sample_target())
            .await;

        assert!(!outcome.is_success());
        assert_eq!(outcome.message(), Some("bad key"));
    }

    #[tokio::test]
    async fn test_publish_http_error() {
        let transport = Arc::new(MockTransport::new());
        transport.push(HttpResponse::new(500, "internal error"));
        let store = Arc::new(InMemoryFlowStore::new());

        let outcome = uploader(transport, &store)
            .publish(&sample_flow("a1"), &sample_target())
            .await;

        assert!(!outcome.is_success());
        assert_eq!(outcome.message(), Some("HTTP 500: internal error"));
        assert!(outcome.published_at().is_none());
    }

    #[tokio::test]
    async fn test_publish_network_error_fallback() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| Err(CodeflowError::transport("")));
        let store = Arc::new(InMemoryFlowStore::new());

        let outcome = uploader(Arc::new(transport), &store)
            .publish(&sample_flow("a1"), &sample_target())
            .await;

        assert_eq!(outcome.message(), Some(NETWORK_FALLBACK));
    }

    #[tokio::test]
    async fn test_publish_network_error_message() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .returning(|_| Err(CodeflowError::transport("connection refused")));
        let store = Arc::new(InMemoryFlowStore::new());

        let outcome = uploader(Arc::new(transport), &store)
            .publish(&sample_flow("a1"), &sample_target())
            .await;

        assert_eq!(outcome.message(), Some("connection refused"));
    }

    #[tokio::test]
    async fn test_publish_summary_flow_is_refused_without_network() {
        let mut transport = MockHttpTransport::new();
        transport.expect_send().never();
        let store = Arc::new(InMemoryFlowStore::new());

        let outcome = uploader(Arc::new(transport), &store)
            .publish(&sample_flow("a1").into_summary(), &sample_target())
            .await;

        assert!(!outcome.is_success());
        assert!(outcome.message().unwrap().contains("no code body"));
    }

    #[tokio::test]
    async fn test_local_sync_failure_keeps_success() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(&upload_accepted(Some("2024-01-01T00:00:00Z")));
        let store = Arc::new(InMemoryFlowStore::with_flows([sample_flow("a1")]));
        store.fail_mark_published(true);

        let outcome = uploader(transport, &store)
            .publish(&sample_flow("a1"), &sample_target())
            .await;

        assert!(outcome.is_success());
        assert_eq!(store.marks().len(), 1);
    }
}
