//! Recording doubles for the transport and the flow store.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use crate::admin::FlowStore;
use crate::core::{Flow, FlowStatus};
use crate::errors::CodeflowError;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};
use crate::utils::parse_timestamp;

#[derive(Debug)]
enum Scripted {
    Response(HttpResponse, Option<Duration>),
    Error(CodeflowError),
}

/// A transport that replays scripted responses in order and records every
/// request, including how many were in flight at once.
#[derive(Debug, Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<HttpRequest>>,
    timeline: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockTransport {
    /// Creates a transport with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response.
    pub fn push(&self, response: HttpResponse) {
        self.script.lock().push_back(Scripted::Response(response, None));
    }

    /// Queues a 200 response with a JSON body.
    pub fn push_json(&self, body: &serde_json::Value) {
        self.push(HttpResponse::json(body));
    }

    /// Queues a response delivered after `delay`.
    pub fn push_delayed(&self, response: HttpResponse, delay: Duration) {
        self.script
            .lock()
            .push_back(Scripted::Response(response, Some(delay)));
    }

    /// Queues a network-level failure.
    pub fn push_error(&self, error: CodeflowError) {
        self.script.lock().push_back(Scripted::Error(error));
    }

    /// Requests received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<HttpRequest> {
        self.calls.lock().clone()
    }

    /// `start:<label>` / `end:<label>` entries in the order they happened.
    /// The label is the body's `key` when present, the URL otherwise.
    #[must_use]
    pub fn timeline(&self) -> Vec<String> {
        self.timeline.lock().clone()
    }

    /// Highest number of concurrently pending requests observed.
    #[must_use]
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Number of scripted responses not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.script.lock().len()
    }
}

fn label(request: &HttpRequest) -> String {
    request
        .body
        .as_ref()
        .and_then(|b| b.get("key"))
        .and_then(serde_json::Value::as_str)
        .map_or_else(|| request.url.clone(), str::to_string)
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, CodeflowError> {
        let label = label(&request);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        self.timeline.lock().push(format!("start:{label}"));
        self.calls.lock().push(request);

        let next = self.script.lock().pop_front();
        let result = match next {
            Some(Scripted::Response(response, delay)) => {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                Ok(response)
            }
            Some(Scripted::Error(error)) => Err(error),
            None => Err(CodeflowError::transport("no scripted response")),
        };

        self.timeline.lock().push(format!("end:{label}"));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// An in-memory flow store that records mark-published calls.
#[derive(Debug, Default)]
pub struct InMemoryFlowStore {
    flows: Mutex<HashMap<String, Flow>>,
    marks: Mutex<Vec<(String, String)>>,
    fetches: Mutex<Vec<String>>,
    fail_marks: AtomicBool,
}

impl InMemoryFlowStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `flows`.
    #[must_use]
    pub fn with_flows(flows: impl IntoIterator<Item = Flow>) -> Self {
        let store = Self::new();
        for flow in flows {
            store.insert(flow);
        }
        store
    }

    /// Inserts or replaces a flow.
    pub fn insert(&self, flow: Flow) {
        self.flows.lock().insert(flow.key.clone(), flow);
    }

    /// Makes every subsequent `mark_published` fail.
    pub fn fail_mark_published(&self, fail: bool) {
        self.fail_marks.store(fail, Ordering::SeqCst);
    }

    /// `(key, published_at)` pairs passed to `mark_published`.
    #[must_use]
    pub fn marks(&self) -> Vec<(String, String)> {
        self.marks.lock().clone()
    }

    /// Keys passed to `get_flow`, in call order.
    #[must_use]
    pub fn fetches(&self) -> Vec<String> {
        self.fetches.lock().clone()
    }

    /// Current copy of a flow.
    #[must_use]
    pub fn flow(&self, key: &str) -> Option<Flow> {
        self.flows.lock().get(key).cloned()
    }
}

#[async_trait]
impl FlowStore for InMemoryFlowStore {
    async fn get_flow(&self, key: &str) -> Result<Flow, CodeflowError> {
        self.fetches.lock().push(key.to_string());
        self.flows
            .lock()
            .get(key)
            .cloned()
            .ok_or_else(|| CodeflowError::NotFound(key.to_string()))
    }

    async fn mark_published(&self, key: &str, published_at: &str) -> Result<(), CodeflowError> {
        self.marks
            .lock()
            .push((key.to_string(), published_at.to_string()));

        if self.fail_marks.load(Ordering::SeqCst) {
            return Err(CodeflowError::Http {
                status: 500,
                message: "internal server error".to_string(),
            });
        }

        let mut flows = self.flows.lock();
        let flow = flows
            .get_mut(key)
            .ok_or_else(|| CodeflowError::NotFound(key.to_string()))?;
        flow.published_at = parse_timestamp(published_at).ok();
        flow.status = FlowStatus::Enabled;
        Ok(())
    }
}
