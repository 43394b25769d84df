//! Client for the admin backend's flow endpoints.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use super::store::FlowStore;
use crate::config::AdminSettings;
use crate::core::{CreateFlow, Flow, FlowExecution, FlowParams, UpdateFlow};
use crate::envelope::decode_admin_response;
use crate::errors::CodeflowError;
use crate::transport::{HttpMethod, HttpRequest, HttpTransport};

/// Flow CRUD, execution and cache control against the admin backend.
#[derive(Clone)]
pub struct AdminClient {
    transport: Arc<dyn HttpTransport>,
    settings: AdminSettings,
}

impl std::fmt::Debug for AdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminClient")
            .field("base_url", &self.settings.base_url)
            .field("authenticated", &self.settings.token.is_some())
            .finish_non_exhaustive()
    }
}

impl AdminClient {
    /// Creates a client.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>, settings: AdminSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        let request = HttpRequest::new(method, format!("{}{path}", self.settings.base_url));
        match self.settings.token {
            Some(ref token) => request.with_header("Authorization", format!("Bearer {token}")),
            None => request,
        }
    }

    async fn call(&self, request: HttpRequest) -> Result<Value, CodeflowError> {
        let method = request.method;
        let url = request.url.clone();
        let response = self.transport.send(request).await?;
        decode_admin_response(&response).map_err(|e| {
            tracing::error!(%method, %url, error = %e, "Admin request failed");
            e
        })
    }

    /// Lists all flows in summary form. A non-array payload reads as empty.
    pub async fn list_flows(&self) -> Result<Vec<Flow>, CodeflowError> {
        let data = self
            .call(self.request(HttpMethod::Get, "/api/code/flows"))
            .await?;
        match data {
            Value::Array(_) => Ok(serde_json::from_value(data)?),
            _ => Ok(Vec::new()),
        }
    }

    /// Fetches one flow with its code body.
    pub async fn get_flow(&self, key: &str) -> Result<Flow, CodeflowError> {
        let data = self
            .call(self.request(HttpMethod::Get, &format!("/api/code/flows/{key}")))
            .await?;
        if data.is_null() {
            return Err(CodeflowError::NotFound(key.to_string()));
        }
        Ok(serde_json::from_value(data)?)
    }

    /// Creates a flow; the backend assigns the key when none is given.
    pub async fn create_flow(&self, body: &CreateFlow) -> Result<Flow, CodeflowError> {
        let request = self
            .request(HttpMethod::Post, "/api/code/flows")
            .with_json(serde_json::to_value(body)?);
        Ok(serde_json::from_value(self.call(request).await?)?)
    }

    /// Applies a partial update and returns the raw payload.
    pub async fn update_flow(&self, key: &str, body: &UpdateFlow) -> Result<Value, CodeflowError> {
        let request = self
            .request(HttpMethod::Put, &format!("/api/code/flows/{key}"))
            .with_json(serde_json::to_value(body)?);
        self.call(request).await
    }

    /// Deletes (disables) a flow locally. The production copy is untouched.
    pub async fn delete_flow(&self, key: &str) -> Result<(), CodeflowError> {
        self.call(self.request(HttpMethod::Delete, &format!("/api/code/flows/{key}")))
            .await
            .map(|_| ())
    }

    /// Runs a flow with parameters.
    pub async fn execute_flow(
        &self,
        key: &str,
        params: &FlowParams,
    ) -> Result<FlowExecution, CodeflowError> {
        let request = self
            .request(HttpMethod::Post, &format!("/api/code/run/{key}"))
            .with_json(json!({ "params": params }));
        Ok(serde_json::from_value(self.call(request).await?)?)
    }

    /// Clears the compiled-flow cache for one flow, or for all.
    pub async fn clear_cache(&self, key: Option<&str>) -> Result<(), CodeflowError> {
        let path = key.map_or_else(
            || "/api/code/flows/clear-cache".to_string(),
            |k| format!("/api/code/flows/{k}/clear-cache"),
        );
        self.call(self.request(HttpMethod::Post, &path))
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl FlowStore for AdminClient {
    async fn get_flow(&self, key: &str) -> Result<Flow, CodeflowError> {
        Self::get_flow(self, key).await
    }

    async fn mark_published(&self, key: &str, published_at: &str) -> Result<(), CodeflowError> {
        self.update_flow(key, &UpdateFlow::mark_published(published_at))
            .await
            .map(|_| ())
    }
}
