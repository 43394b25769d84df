//! Publish state of a flow.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a flow has ever reached the production target.
///
/// Derived from `published_at` alone. A flow edited after its last publish
/// still reads as `Published`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishStatus {
    /// Never pushed.
    Unpublished,
    /// Pushed at least once.
    Published,
}

impl PublishStatus {
    /// Human-readable label for list views.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unpublished => "Not published",
            Self::Published => "Published",
        }
    }
}

impl fmt::Display for PublishStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unpublished => write!(f, "unpublished"),
            Self::Published => write!(f, "published"),
        }
    }
}
