//! Two-layer envelope returned by the production upload endpoint.
//!
//! ```text
//! { code, message, data: { success, action, message, data: { publishedAt } } }
//! ```
//!
//! Each layer unwraps into an [`EnvelopeResult`]; a rejection at either layer
//! is reported the same way.

use serde::Deserialize;

use super::non_blank;
use crate::errors::CodeflowError;
use crate::transport::HttpResponse;

/// Fallback when the outer layer fails without a message.
pub const TRANSPORT_FALLBACK: &str = "publish request failed";
/// Fallback when the inner layer fails without a message.
pub const BUSINESS_FALLBACK: &str = "publish rejected by target";

/// Outcome of unwrapping one envelope layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeResult<T> {
    /// The layer reported success.
    Accepted(T),
    /// The layer reported failure with this message.
    Rejected(String),
}

impl<T> EnvelopeResult<T> {
    /// Chains the next layer onto an accepted value.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> EnvelopeResult<U>) -> EnvelopeResult<U> {
        match self {
            Self::Accepted(value) => f(value),
            Self::Rejected(message) => EnvelopeResult::Rejected(message),
        }
    }

    /// Converts into a `Result`, mapping rejections to [`CodeflowError::Rejected`].
    pub fn into_result(self) -> Result<T, CodeflowError> {
        match self {
            Self::Accepted(value) => Ok(value),
            Self::Rejected(message) => Err(CodeflowError::Rejected(message)),
        }
    }
}

/// Outer, transport-level wrapper.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TransportEnvelope {
    /// `0` means success.
    #[serde(default)]
    pub code: Option<i64>,
    /// Failure text.
    #[serde(default)]
    pub message: Option<String>,
    /// Inner envelope.
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// Inner, business-level wrapper.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BusinessEnvelope {
    /// Whether the target accepted the flow.
    #[serde(default)]
    pub success: bool,
    /// What the target did, e.g. `created` or `updated`.
    #[serde(default)]
    pub action: Option<String>,
    /// Result text.
    #[serde(default)]
    pub message: Option<String>,
    /// Payload; carries `publishedAt` on success.
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// What a successful upload tells us.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReceipt {
    /// Action reported by the target.
    pub action: Option<String>,
    /// Message reported by the target.
    pub message: Option<String>,
    /// Publication time reported by the target.
    pub published_at: Option<String>,
}

/// Unwraps the outer layer.
#[must_use]
pub fn unwrap_transport(envelope: TransportEnvelope) -> EnvelopeResult<serde_json::Value> {
    if envelope.code == Some(0) {
        EnvelopeResult::Accepted(envelope.data.unwrap_or(serde_json::Value::Null))
    } else {
        EnvelopeResult::Rejected(
            non_blank(envelope.message).unwrap_or_else(|| TRANSPORT_FALLBACK.to_string()),
        )
    }
}

/// Unwraps the inner layer.
#[must_use]
pub fn unwrap_business(data: serde_json::Value) -> EnvelopeResult<PublishReceipt> {
    let envelope: BusinessEnvelope = match serde_json::from_value(data) {
        Ok(envelope) => envelope,
        Err(_) => return EnvelopeResult::Rejected(BUSINESS_FALLBACK.to_string()),
    };

    if !envelope.success {
        return EnvelopeResult::Rejected(
            non_blank(envelope.message).unwrap_or_else(|| BUSINESS_FALLBACK.to_string()),
        );
    }

    let published_at = envelope
        .data
        .as_ref()
        .and_then(|d| d.get("publishedAt"))
        .and_then(|v| match v {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

    EnvelopeResult::Accepted(PublishReceipt {
        action: envelope.action,
        message: non_blank(envelope.message),
        published_at,
    })
}

/// Decodes an upload response: HTTP status, then both envelope layers.
///
/// # Errors
///
/// - [`CodeflowError::Http`] for a non-2xx status, carrying the raw body
/// - [`CodeflowError::Transport`] for a body that is not JSON
/// - [`CodeflowError::Rejected`] when either layer reports failure
pub fn decode_publish_response(response: &HttpResponse) -> Result<PublishReceipt, CodeflowError> {
    if !response.is_success() {
        return Err(CodeflowError::Http {
            status: response.status,
            message: response.body.clone(),
        });
    }

    let envelope: TransportEnvelope = serde_json::from_str(&response.body)
        .map_err(|e| CodeflowError::transport(format!("invalid response: {e}")))?;

    unwrap_transport(envelope)
        .and_then(unwrap_business)
        .into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn decode(body: serde_json::Value) -> Result<PublishReceipt, CodeflowError> {
        decode_publish_response(&HttpResponse::json(&body))
    }

    #[test]
    fn test_both_layers_succeed() {
        let receipt = decode(json!({
            "code": 0,
            "data": {"success": true, "data": {"publishedAt": "2024-01-01T00:00:00Z"}}
        }))
        .unwrap();
        assert_eq!(receipt.published_at.as_deref(), Some("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn test_success_without_timestamp() {
        let receipt = decode(json!({
            "code": 0,
            "data": {"success": true, "action": "updated", "message": "ok"}
        }))
        .unwrap();
        assert_eq!(
            receipt,
            PublishReceipt {
                action: Some("updated".to_string()),
                message: Some("ok".to_string()),
                published_at: None,
            }
        );
    }

    #[test]
    fn test_outer_rejection() {
        let err = decode(json!({"code": 1, "message": "bad key"})).unwrap_err();
        assert_eq!(err, CodeflowError::Rejected("bad key".to_string()));
    }

    #[test]
    fn test_outer_rejection_fallback() {
        let err = decode(json!({"code": 401, "message": ""})).unwrap_err();
        assert_eq!(err.to_string(), TRANSPORT_FALLBACK);
    }

    #[test]
    fn test_missing_code_is_rejection() {
        let err = decode(json!({"data": {"success": true}})).unwrap_err();
        assert!(err.is_rejection());
    }

    #[test]
    fn test_inner_rejection() {
        let err = decode(json!({
            "code": 0,
            "data": {"success": false, "message": "duplicate key"}
        }))
        .unwrap_err();
        assert_eq!(err, CodeflowError::Rejected("duplicate key".to_string()));
    }

    #[test]
    fn test_inner_missing_is_rejection() {
        let err = decode(json!({"code": 0})).unwrap_err();
        assert_eq!(err.to_string(), BUSINESS_FALLBACK);
    }

    #[test]
    fn test_http_error_keeps_body() {
        let err = decode_publish_response(&HttpResponse::new(500, "internal error")).unwrap_err();
        assert_eq!(err.to_string(), "HTTP 500: internal error");
    }

    #[test]
    fn test_non_json_body() {
        let err = decode_publish_response(&HttpResponse::new(200, "<html>")).unwrap_err();
        assert!(matches!(err, CodeflowError::Transport(ref m) if m.starts_with("invalid response")));
    }

    #[test]
    fn test_and_then_short_circuits() {
        let result: EnvelopeResult<u8> = EnvelopeResult::Rejected("outer".to_string());
        let chained = result.and_then(|_| EnvelopeResult::Accepted(1u8));
        assert_eq!(chained, EnvelopeResult::Rejected("outer".to_string()));
    }
}
