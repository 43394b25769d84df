//! Flow records as the admin backend stores them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::status::PublishStatus;
use crate::utils::timestamps::{flexible, Timestamp};

/// Enabled/disabled flag of a flow, transmitted as an integer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum FlowStatus {
    /// The flow cannot be executed.
    Disabled,
    /// The flow is active. Also the value written after a publish.
    #[default]
    Enabled,
    /// A value this client does not know about.
    Other(i64),
}

impl From<i64> for FlowStatus {
    fn from(value: i64) -> Self {
        match value {
            0 => Self::Disabled,
            1 => Self::Enabled,
            other => Self::Other(other),
        }
    }
}

impl From<FlowStatus> for i64 {
    fn from(status: FlowStatus) -> Self {
        match status {
            FlowStatus::Disabled => 0,
            FlowStatus::Enabled => 1,
            FlowStatus::Other(v) => v,
        }
    }
}

impl fmt::Display for FlowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "disabled"),
            Self::Enabled => write!(f, "enabled"),
            Self::Other(v) => write!(f, "status({v})"),
        }
    }
}

/// A named, keyed unit of executable code.
///
/// List endpoints return summaries without `code`; the detail endpoint
/// returns the full record. Only full records can be published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flow {
    /// Backend row id.
    #[serde(default)]
    pub id: i64,
    /// Unique, immutable key.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Optional grouping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Code body; absent in summary form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Enabled/disabled flag.
    #[serde(default)]
    pub status: FlowStatus,
    /// Creation time.
    #[serde(with = "flexible")]
    pub created_at: Timestamp,
    /// Last update time.
    #[serde(with = "flexible")]
    pub updated_at: Timestamp,
    /// Last successful push to production.
    #[serde(
        default,
        with = "flexible::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub published_at: Option<Timestamp>,
}

impl Flow {
    /// Creates a full flow record stamped with the current time.
    #[must_use]
    pub fn new(key: impl Into<String>, name: impl Into<String>, code: impl Into<String>) -> Self {
        let now = crate::utils::now_utc();
        Self {
            id: 0,
            key: key.into(),
            name: name.into(),
            category: None,
            description: None,
            code: Some(code.into()),
            status: FlowStatus::Enabled,
            created_at: now,
            updated_at: now,
            published_at: None,
        }
    }

    /// Sets the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the last-published time.
    #[must_use]
    pub fn with_published_at(mut self, published_at: Timestamp) -> Self {
        self.published_at = Some(published_at);
        self
    }

    /// Drops the code body, producing the summary form.
    #[must_use]
    pub fn into_summary(mut self) -> Self {
        self.code = None;
        self
    }

    /// Whether the record carries its code body.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.code.is_some()
    }

    /// The code body, or an empty string for summaries.
    #[must_use]
    pub fn code_body(&self) -> &str {
        self.code.as_deref().unwrap_or_default()
    }

    /// Publish state derived from `published_at`.
    #[must_use]
    pub fn publish_status(&self) -> PublishStatus {
        if self.published_at.is_some() {
            PublishStatus::Published
        } else {
            PublishStatus::Unpublished
        }
    }
}

/// Body for creating a flow. The backend generates the key when omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFlow {
    /// Requested key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Display name.
    pub name: String,
    /// Optional grouping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Code body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Free-form remark.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

impl CreateFlow {
    /// Creates a body with only a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Sets the code body.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Partial update of a flow. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFlow {
    /// New display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New code body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// New remark.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
    /// New status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<FlowStatus>,
    /// Published time, as reported by the production target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
}

impl UpdateFlow {
    /// The patch written after a confirmed remote publish.
    #[must_use]
    pub fn mark_published(published_at: impl Into<String>) -> Self {
        Self {
            published_at: Some(published_at.into()),
            status: Some(FlowStatus::Enabled),
            ..Default::default()
        }
    }
}

/// Result of running a flow on the admin backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowExecution {
    /// Whether the run succeeded.
    #[serde(default)]
    pub success: bool,
    /// Data returned by the flow.
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    /// Error or info message.
    #[serde(default)]
    pub message: Option<String>,
}

/// Parameters passed to a flow run.
pub type FlowParams = HashMap<String, serde_json::Value>;
