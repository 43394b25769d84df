//! Publish outcomes and batch reports.

use serde::Serialize;
use std::fmt;

use super::flow::Flow;

/// The result of pushing one flow to one deployment target.
///
/// `published_at` can only be set on a successful outcome; the constructors
/// are the only way to build one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishOutcome {
    key: String,
    name: String,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    published_at: Option<String>,
}

impl PublishOutcome {
    /// Creates a successful outcome.
    #[must_use]
    pub fn succeeded(
        key: impl Into<String>,
        name: impl Into<String>,
        published_at: Option<String>,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            success: true,
            message: None,
            published_at,
        }
    }

    /// Creates a failed outcome.
    #[must_use]
    pub fn failed(
        key: impl Into<String>,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            success: false,
            message: Some(message.into()),
            published_at: None,
        }
    }

    /// Successful outcome for a flow.
    #[must_use]
    pub fn succeeded_for(flow: &Flow, published_at: Option<String>) -> Self {
        Self::succeeded(&flow.key, &flow.name, published_at)
    }

    /// Failed outcome for a flow.
    #[must_use]
    pub fn failed_for(flow: &Flow, message: impl Into<String>) -> Self {
        Self::failed(&flow.key, &flow.name, message)
    }

    /// Adds an informational message, e.g. the target's success text.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// The flow key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The flow display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the publish succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// The failure reason, or an informational message on success.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Publication time reported by the target.
    #[must_use]
    pub fn published_at(&self) -> Option<&str> {
        self.published_at.as_deref()
    }
}

impl fmt::Display for PublishOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.success { "ok" } else { "failed" };
        write!(f, "[{mark}] {} ({})", self.name, self.key)?;
        if let Some(ref message) = self.message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

/// Aggregate of a batch publish, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPublishReport {
    total: usize,
    success_count: usize,
    failure_count: usize,
    outcomes: Vec<PublishOutcome>,
}

impl BatchPublishReport {
    /// Tallies a finished list of outcomes.
    #[must_use]
    pub fn from_outcomes(outcomes: Vec<PublishOutcome>) -> Self {
        let success_count = outcomes.iter().filter(|o| o.is_success()).count();
        Self {
            total: outcomes.len(),
            success_count,
            failure_count: outcomes.len() - success_count,
            outcomes,
        }
    }

    /// Number of flows attempted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of successful publishes.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.success_count
    }

    /// Number of failed publishes.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failure_count
    }

    /// All outcomes in input order.
    #[must_use]
    pub fn outcomes(&self) -> &[PublishOutcome] {
        &self.outcomes
    }

    /// The failed outcomes.
    pub fn failures(&self) -> impl Iterator<Item = &PublishOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    /// True when nothing failed.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failure_count == 0
    }

    /// One-line summary.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "published {}, failed {}",
            self.success_count, self.failure_count
        )
    }
}
