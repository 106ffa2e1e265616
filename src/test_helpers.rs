//! Shared fixtures for unit tests: source files with controlled mtimes and
//! in-memory articles.

use crate::collect::{Article, article_url};
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Write `root/rel` (creating parents) and pin its mtime to `mtime_secs`.
pub fn write_source(root: &Path, rel: &str, content: &str, mtime_secs: u64) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    set_mtime(&path, mtime_secs);
    path
}

/// Pin a file's modification time to `secs` after the epoch.
pub fn set_mtime(path: &Path, secs: u64) {
    let file = fs::File::options().write(true).open(path).unwrap();
    file.set_modified(UNIX_EPOCH + Duration::from_secs(secs))
        .unwrap();
}

/// An article under `content/2024/` with the given slug and mtime.
pub fn article(slug: &str, mtime: f64) -> Article {
    Article {
        path: PathBuf::from(format!("content/2024/{slug}.md")),
        year: "2024".to_string(),
        slug: slug.to_string(),
        url: article_url("https://blog.example", "2024", slug),
        modified: DateTime::<Local>::from(SystemTime::UNIX_EPOCH),
        mtime,
        needs_rebuild: true,
    }
}

/// Positions of `needles` in `haystack`, panicking on a miss.
pub fn positions(haystack: &str, needles: &[&str]) -> Vec<usize> {
    needles
        .iter()
        .map(|n| {
            haystack
                .find(n)
                .unwrap_or_else(|| panic!("'{n}' not found in output"))
        })
        .collect()
}

/// Assert that `needles` appear in `haystack` in the given order.
pub fn assert_in_order(haystack: &str, needles: &[&str]) {
    let found = positions(haystack, needles);
    let mut sorted = found.clone();
    sorted.sort();
    assert_eq!(found, sorted, "expected {needles:?} in order");
}
