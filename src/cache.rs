//! Change cache for incremental builds.
//!
//! Rendering every article on every build is wasteful once a blog has a few
//! hundred posts. The cache remembers, per source file, the modification time
//! observed when the file was last rendered. An article is stale when its
//! path is missing from the cache or its current mtime differs from the
//! stored one (see [`crate::collect`]).
//!
//! # Design
//!
//! Change detection is **timestamp-based**, not content-based: an edit that
//! leaves the mtime untouched is not picked up. Pass the file to
//! `build <file>` to force it, or delete the cache file.
//!
//! ## Storage
//!
//! A flat, pretty-printed JSON object keyed by source path:
//!
//! ```json
//! {
//!   "content/2024/hello.md": 1718000000.123456
//! }
//! ```
//!
//! The cache is loaded once at build start and saved once at build end, even
//! when nothing was rebuilt. Only articles rebuilt during the run get new
//! entries; entries for deleted sources are never pruned.
//!
//! A missing, unreadable or corrupt file loads as an empty cache, which
//! simply triggers a full rebuild.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// In-memory change cache: source path → mtime in epoch seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildCache {
    entries: BTreeMap<String, f64>,
}

impl BuildCache {
    /// Create an empty cache (first build or unreadable cache file).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load from `path`. Returns an empty cache if the file doesn't exist or
    /// can't be parsed.
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Write the full mapping to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), CacheError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Stored mtime for a source path, if any.
    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries.get(key).copied()
    }

    /// True when the source must be re-rendered: unknown path or a stored
    /// mtime that differs from `mtime`.
    pub fn is_stale(&self, key: &str, mtime: f64) -> bool {
        self.get(key) != Some(mtime)
    }

    /// Record the mtime of a freshly rendered source.
    pub fn record(&mut self, key: impl Into<String>, mtime: f64) {
        self.entries.insert(key.into(), mtime);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Cache key for a source path: the path as enumerated, `/`-separated.
pub fn cache_key(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
