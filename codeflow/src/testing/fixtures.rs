//! Canned records and response bodies.

use serde_json::{json, Value};

use crate::config::DeploymentTarget;
use crate::core::{Flow, FlowStatus};
use crate::utils::parse_timestamp;

/// A full flow with fixed timestamps, named after its key.
#[must_use]
pub fn sample_flow(key: &str) -> Flow {
    let at = parse_timestamp("2024-01-01T00:00:00Z").unwrap_or_default();
    Flow {
        id: 0,
        key: key.to_string(),
        name: format!("Flow {key}"),
        category: Some("pricing".to_string()),
        description: None,
        code: Some(format!("export default () => '{key}'")),
        status: FlowStatus::Enabled,
        created_at: at,
        updated_at: at,
        published_at: None,
    }
}

/// A target pointing at `https://prod.example.com`.
#[must_use]
#[allow(clippy::expect_used)]
pub fn sample_target() -> DeploymentTarget {
    DeploymentTarget::new("https://prod.example.com", "prod-secret").expect("sample target")
}

/// Upload response where both layers succeed.
#[must_use]
pub fn upload_accepted(published_at: Option<&str>) -> Value {
    let inner = published_at.map_or_else(|| json!({}), |at| json!({ "publishedAt": at }));
    json!({
        "code": 0,
        "message": "ok",
        "data": { "success": true, "action": "updated", "data": inner }
    })
}

/// Upload response rejected by the business layer.
#[must_use]
pub fn upload_rejected(message: &str) -> Value {
    json!({
        "code": 0,
        "data": { "success": false, "message": message }
    })
}
