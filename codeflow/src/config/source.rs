//! Sources of configuration values.

use std::collections::HashMap;
use std::path::Path;

use crate::errors::CodeflowError;

/// A read-only view of environment-style key/value configuration.
pub trait EnvSource: Send + Sync {
    /// Returns the raw value for a key, if set.
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl ProcessEnv {
    /// Loads `.env` from the working directory (if any) into the process
    /// environment, then returns the source. Existing variables win.
    #[must_use]
    pub fn with_dotenv() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env file");
        }
        Self
    }
}

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// An in-memory source, used by tests and for `.env` files read without
/// touching the process environment.
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    values: HashMap<String, String>,
}

impl MapEnv {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a value.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Reads a `.env` file into a new source.
    pub fn from_dotenv_file(path: impl AsRef<Path>) -> Result<Self, CodeflowError> {
        let path = path.as_ref();
        let iter = dotenvy::from_path_iter(path).map_err(|e| {
            CodeflowError::unavailable(format!("cannot read {}: {e}", path.display()))
        })?;

        let mut values = HashMap::new();
        for item in iter {
            let (key, value) = item.map_err(|e| {
                CodeflowError::unavailable(format!("invalid entry in {}: {e}", path.display()))
            })?;
            values.insert(key, value);
        }
        Ok(Self { values })
    }
}

impl EnvSource for MapEnv {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

impl<K, V> FromIterator<(K, V)> for MapEnv
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
