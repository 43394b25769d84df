//! Deployment target and build mode.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::CodeflowError;

/// Where flows are pushed: base URL plus the access secret sent in
/// `x-access-secret`.
#[derive(Clone, PartialEq, Eq)]
pub struct DeploymentTarget {
    endpoint: String,
    secret: String,
}

impl DeploymentTarget {
    /// Builds a target. Both values are trimmed and must be non-empty;
    /// trailing slashes are removed from the endpoint.
    pub fn new(endpoint: impl AsRef<str>, secret: impl AsRef<str>) -> Result<Self, CodeflowError> {
        let endpoint = endpoint.as_ref().trim().trim_end_matches('/');
        let secret = secret.as_ref().trim();

        if endpoint.is_empty() {
            return Err(CodeflowError::InvalidTarget("endpoint is empty".to_string()));
        }
        if secret.is_empty() {
            return Err(CodeflowError::InvalidTarget("access secret is empty".to_string()));
        }

        Ok(Self {
            endpoint: endpoint.to_string(),
            secret: secret.to_string(),
        })
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The access secret.
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Full URL of the upload endpoint.
    #[must_use]
    pub fn upload_url(&self) -> String {
        format!("{}/api/code/upload", self.endpoint)
    }
}

impl fmt::Debug for DeploymentTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeploymentTarget")
            .field("endpoint", &self.endpoint)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Build flavor of the hosting tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildMode {
    /// Local/developer build; publishing may be offered.
    Development,
    /// Deployed build; publishing is never offered.
    #[default]
    Production,
}

impl BuildMode {
    /// Parses a mode name. Unknown values fall back to `Production`.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Self::Development,
            "production" | "prod" => Self::Production,
            other => {
                tracing::warn!(mode = %other, "Unknown build mode, assuming production");
                Self::Production
            }
        }
    }

    /// Whether this is a development build.
    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}
