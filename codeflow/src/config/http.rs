//! HTTP client settings.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings shared by every outbound call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: f64,
    /// User agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout() -> f64 {
    30.0
}

/// Converts seconds to a usable timeout. Zero, negative, NaN and values
/// too large for a `Duration` yield `None`.
#[must_use]
pub fn timeout_from_secs(seconds: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(seconds)
        .ok()
        .filter(|d| !d.is_zero())
}

fn default_user_agent() -> String {
    concat!("codeflow/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl HttpSettings {
    /// Creates settings with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the timeout.
    #[must_use]
    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Sets the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Gets timeout as Duration, falling back to the default when
    /// `timeout_seconds` is unusable.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        timeout_from_secs(self.timeout_seconds)
            .unwrap_or_else(|| Duration::from_secs_f64(default_timeout()))
    }
}

/// Connection settings for the admin tool's own backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSettings {
    /// Base URL of the backend.
    #[serde(default = "default_admin_url")]
    pub base_url: String,
    /// Bearer token for `Authorization`, if signed in.
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
}

fn default_admin_url() -> String {
    "http://localhost:3009".to_string()
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            base_url: default_admin_url(),
            token: None,
        }
    }
}

impl AdminSettings {
    /// Creates settings for a base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Sets the bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}
