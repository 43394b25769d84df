//! The admin backend's `{code, message, data}` wrapper.
//!
//! Codes `0` and `200` mean success. Bodies without a `code` field are
//! unwrapped bodies and pass through.

use serde_json::Value;

use super::non_blank;
use crate::errors::CodeflowError;
use crate::transport::HttpResponse;

/// Fallback when a business error carries no message.
pub const REQUEST_FALLBACK: &str = "request failed";

fn body_message(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .and_then(|m| non_blank(Some(m)))
}

/// Maps a non-2xx status to the message shown to the user.
#[must_use]
pub fn status_message(status: u16, body: &str) -> String {
    match status {
        400 => body_message(body).unwrap_or_else(|| "invalid request parameters".to_string()),
        401 => "unauthorized, please sign in again".to_string(),
        403 => "access denied".to_string(),
        404 => "resource not found".to_string(),
        500 => "internal server error".to_string(),
        502 => "bad gateway".to_string(),
        503 => "service unavailable".to_string(),
        other => body_message(body).unwrap_or_else(|| format!("{REQUEST_FALLBACK} ({other})")),
    }
}

/// Decodes an admin backend response into its payload.
///
/// # Errors
///
/// - [`CodeflowError::Http`] for a non-2xx status
/// - [`CodeflowError::Transport`] for a body that is not JSON
/// - [`CodeflowError::Rejected`] for a `code` other than `0` or `200`
pub fn decode_admin_response(response: &HttpResponse) -> Result<Value, CodeflowError> {
    if !response.is_success() {
        return Err(CodeflowError::Http {
            status: response.status,
            message: status_message(response.status, &response.body),
        });
    }

    if response.body.trim().is_empty() {
        return Ok(Value::Null);
    }

    let mut body: Value = serde_json::from_str(&response.body)
        .map_err(|e| CodeflowError::transport(format!("invalid response: {e}")))?;

    if let Some(code) = body.get("code").filter(|c| !c.is_null()) {
        let ok = matches!(code.as_i64(), Some(0 | 200));
        if !ok {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string);
            return Err(CodeflowError::Rejected(
                non_blank(message).unwrap_or_else(|| REQUEST_FALLBACK.to_string()),
            ));
        }
    }

    Ok(match body.get_mut("data") {
        Some(data) => data.take(),
        None => body,
    })
}
