//! Error types for the codeflow publish pipeline.
//!
//! Publish operations resolve expected failures into
//! [`PublishOutcome`](crate::core::PublishOutcome) values. The variants here
//! surface from the lower layers (transport, admin backend, configuration)
//! and are only returned to callers where a failure has no outcome to land in.

use thiserror::Error;

/// The main error type for codeflow operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodeflowError {
    /// Publishing is not configured or is disabled by the build mode.
    #[error("Publishing unavailable: {0}")]
    ConfigurationUnavailable(String),

    /// A deployment target was built from invalid values.
    #[error("Invalid deployment target: {0}")]
    InvalidTarget(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Http {
        /// The HTTP status code.
        status: u16,
        /// Response body or mapped status message.
        message: String,
    },

    /// The request never produced a response (connect, timeout, TLS).
    #[error("{0}")]
    Transport(String),

    /// An envelope reported failure despite a 2xx response.
    #[error("{0}")]
    Rejected(String),

    /// The body could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A summary record was handed to an operation that needs the code body.
    #[error("Flow '{0}' has no code body; fetch the full record first")]
    MissingCode(String),

    /// A flow was requested that the backend does not know.
    #[error("Flow not found: {0}")]
    NotFound(String),
}

impl CodeflowError {
    /// Creates a configuration-unavailable error.
    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::ConfigurationUnavailable(reason.into())
    }

    /// Creates a transport error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates a rejection error.
    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    /// Whether this error belongs to the transport class: non-2xx, network
    /// failure or an unparseable body.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Http { .. } | Self::Transport(_) | Self::Serialization(_)
        )
    }

    /// Whether this error is a business rejection carried in an envelope.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

impl From<serde_json::Error> for CodeflowError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for CodeflowError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Transport(format!("request timed out: {err}"))
        } else {
            Self::Transport(err.to_string())
        }
    }
}
