//! Resolves publish configuration from an [`EnvSource`].

use super::http::{timeout_from_secs, AdminSettings, HttpSettings};
use super::source::EnvSource;
use super::target::{BuildMode, DeploymentTarget};

/// Production API base URL.
pub const PROD_API_URL: &str = "CODEFLOW_PROD_API_URL";
/// Production access secret.
pub const PROD_ACCESS_SECRET: &str = "CODEFLOW_PROD_ACCESS_SECRET";
/// `development` or `production`.
pub const BUILD_MODE: &str = "CODEFLOW_BUILD_MODE";
/// Admin backend base URL.
pub const API_URL: &str = "CODEFLOW_API_URL";
/// Admin backend bearer token.
pub const API_TOKEN: &str = "CODEFLOW_API_TOKEN";
/// Per-request timeout in seconds.
pub const HTTP_TIMEOUT_SECS: &str = "CODEFLOW_HTTP_TIMEOUT_SECS";

fn non_empty(source: &dyn EnvSource, key: &str) -> Option<String> {
    source
        .get(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Configuration captured once per session.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    build_mode: BuildMode,
    target: Option<DeploymentTarget>,
    admin: AdminSettings,
    http: HttpSettings,
}

impl ConfigResolver {
    /// Creates a resolver from explicit values.
    #[must_use]
    pub fn new(build_mode: BuildMode, target: Option<DeploymentTarget>) -> Self {
        Self {
            build_mode,
            target,
            admin: AdminSettings::default(),
            http: HttpSettings::default(),
        }
    }

    /// Reads every setting from `source`.
    #[must_use]
    pub fn from_source(source: &dyn EnvSource) -> Self {
        let build_mode = non_empty(source, BUILD_MODE)
            .map(|v| BuildMode::parse(&v))
            .unwrap_or_default();

        let target = match (
            non_empty(source, PROD_API_URL),
            non_empty(source, PROD_ACCESS_SECRET),
        ) {
            (Some(endpoint), Some(secret)) => DeploymentTarget::new(endpoint, secret).ok(),
            _ => None,
        };

        let mut admin = non_empty(source, API_URL).map_or_else(AdminSettings::default, AdminSettings::new);
        admin.token = non_empty(source, API_TOKEN);

        let mut http = HttpSettings::default();
        if let Some(raw) = non_empty(source, HTTP_TIMEOUT_SECS) {
            match raw.parse::<f64>() {
                Ok(secs) if timeout_from_secs(secs).is_some() => http.timeout_seconds = secs,
                _ => tracing::warn!(value = %raw, "Ignoring invalid {}", HTTP_TIMEOUT_SECS),
            }
        }

        tracing::debug!(
            build_mode = %build_mode,
            target_configured = target.is_some(),
            admin_url = %admin.base_url,
            "Resolved configuration"
        );

        Self {
            build_mode,
            target,
            admin,
            http,
        }
    }

    /// Sets the admin backend settings.
    #[must_use]
    pub fn with_admin(mut self, admin: AdminSettings) -> Self {
        self.admin = admin;
        self
    }

    /// Sets the HTTP settings.
    #[must_use]
    pub fn with_http(mut self, http: HttpSettings) -> Self {
        self.http = http;
        self
    }

    /// The production target, present only when both values are configured.
    #[must_use]
    pub fn resolve_target(&self) -> Option<&DeploymentTarget> {
        self.target.as_ref()
    }

    /// True only in a development build with a configured target.
    #[must_use]
    pub fn is_publish_enabled(&self) -> bool {
        self.build_mode.is_development() && self.target.is_some()
    }

    /// The build mode.
    #[must_use]
    pub fn build_mode(&self) -> BuildMode {
        self.build_mode
    }

    /// Admin backend settings.
    #[must_use]
    pub fn admin(&self) -> &AdminSettings {
        &self.admin
    }

    /// HTTP settings.
    #[must_use]
    pub fn http(&self) -> &HttpSettings {
        &self.http
    }
}
