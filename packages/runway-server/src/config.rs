//! Environment configuration store with dotted-path reads.
//!
//! Configuration lives in `configs/<env>.json` under the application base
//! directory and is parsed once into a JSON tree. Reads never fail: any
//! missing segment yields the caller's default. Only loading can fail, and
//! that failure is fatal by design — it is never folded into the dispatch
//! error taxonomy.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

/// Fatal configuration failures, propagated past the dispatch catch boundary.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no configuration for environment {env:?} at {path}")]
    Missing { env: String, path: PathBuf },
    #[error("configuration for environment {env:?} is not valid JSON")]
    Parse {
        env: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Immutable per-environment configuration tree.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    env: String,
    cache: Value,
}

impl ConfigStore {
    /// Loads `base_dir/configs/<env>.json`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Missing`] when the file is absent or unreadable,
    /// [`ConfigError::Parse`] when it is not valid JSON.
    pub fn load(env: &str, base_dir: &Path) -> Result<Self, ConfigError> {
        let path = base_dir.join("configs").join(format!("{env}.json"));
        let raw = fs::read_to_string(&path).map_err(|_| ConfigError::Missing {
            env: env.to_string(),
            path: path.clone(),
        })?;
        let cache = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            env: env.to_string(),
            source,
        })?;
        Ok(Self {
            env: env.to_string(),
            cache,
        })
    }

    /// The environment name this store was loaded for.
    #[must_use]
    pub fn env(&self) -> &str {
        &self.env
    }

    /// Walks a dotted path through the tree. Empty segments are skipped, so
    /// the empty path returns the whole tree.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut ptr = &self.cache;
        for segment in path.split('.').filter(|s| !s.is_empty()) {
            ptr = ptr.get(segment)?;
        }
        Some(ptr)
    }

    /// Like [`get`](Self::get), but clones the value and substitutes the
    /// default on any missing segment.
    #[must_use]
    pub fn get_or(&self, path: &str, default: Value) -> Value {
        self.get(path).cloned().unwrap_or(default)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
