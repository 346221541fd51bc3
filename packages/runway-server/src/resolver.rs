//! Symbolic-name resolution and idempotent unit loading.
//!
//! A symbolic name (`app::models::Widget`) is turned into an on-disk path by
//! the first matching namespace prefix. "Loading" a unit verifies the file
//! is present and records its canonical path in a process-wide set, so a
//! unit is marked loaded at most once however many requests race on it. The
//! executable code itself comes from the startup registration tables; the
//! on-disk unit file is the deployable artifact being verified.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

/// File extension of on-disk unit files.
pub const UNIT_EXTENSION: &str = ".unit";

/// Separator between symbolic namespace segments.
pub const NAMESPACE_SEPARATOR: &str = "::";

// ---------------------------------------------------------------------------
// NamespaceTable
// ---------------------------------------------------------------------------

/// Ordered mapping from a symbolic namespace prefix to a base directory.
///
/// Populated once at startup and immutable afterwards; resolution takes the
/// first matching prefix in registration order.
#[derive(Debug, Clone, Default)]
pub struct NamespaceTable {
    entries: Vec<(String, PathBuf)>,
}

impl NamespaceTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a namespace prefix and its base directory.
    pub fn register(&mut self, prefix: impl Into<String>, dir: impl Into<PathBuf>) {
        self.entries.push((prefix.into(), dir.into()));
    }

    /// Splits a symbolic name into `(base directory, remainder)` using the
    /// first prefix the name starts with. Empty prefixes and empty
    /// remainders never match.
    fn split<'a>(&self, symbolic: &'a str) -> Option<(&Path, &'a str)> {
        for (prefix, dir) in &self.entries {
            if prefix.is_empty() {
                continue;
            }
            let head = format!("{prefix}{NAMESPACE_SEPARATOR}");
            if let Some(rest) = symbolic.strip_prefix(&head) {
                if rest.is_empty() {
                    return None;
                }
                return Some((dir.as_path(), rest));
            }
        }
        None
    }
}

// ---------------------------------------------------------------------------
// NameResolver
// ---------------------------------------------------------------------------

/// Maps symbolic names to canonical unit paths and tracks loaded units.
///
/// The loaded-units set is the only state shared across concurrent dispatch
/// cycles; it grows monotonically for the life of the process.
#[derive(Debug, Default)]
pub struct NameResolver {
    namespaces: NamespaceTable,
    loaded: Mutex<HashSet<PathBuf>>,
}

impl NameResolver {
    #[must_use]
    pub fn new(namespaces: NamespaceTable) -> Self {
        Self {
            namespaces,
            loaded: Mutex::new(HashSet::new()),
        }
    }

    /// Resolves a symbolic name to the canonical path of its unit file.
    ///
    /// Returns `None` when no namespace prefix matches, when the remainder
    /// is empty, or when the candidate path does not exist on disk.
    /// Canonicalization resolves `..` and symlinks, so the result is always
    /// an absolute real path. Never errors: a well-formed but unmapped name
    /// is a negative result, not a failure.
    #[must_use]
    pub fn resolve(&self, symbolic: &str) -> Option<PathBuf> {
        let (dir, rest) = self.namespaces.split(symbolic)?;
        let relative = rest.replace(NAMESPACE_SEPARATOR, "/");
        let candidate = dir.join(format!("{relative}{UNIT_EXTENSION}"));
        fs::canonicalize(candidate).ok()
    }

    /// Marks a unit file as loaded.
    ///
    /// Returns `false` when the path is not a readable file. Idempotent:
    /// repeated calls for the same path are no-ops, and the set insertion is
    /// made under a lock so parallel first-loads cannot race.
    pub fn load(&self, path: &Path) -> bool {
        if !path.is_file() || fs::File::open(path).is_err() {
            return false;
        }
        self.loaded.lock().insert(path.to_path_buf());
        true
    }

    /// Whether a unit file has already been loaded this process.
    #[must_use]
    pub fn is_loaded(&self, path: &Path) -> bool {
        self.loaded.lock().contains(path)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
