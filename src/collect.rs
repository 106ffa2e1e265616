//! Article discovery and rebuild decisions.
//!
//! Walks the source tree, turns every markdown file into an [`Article`] and
//! decides whether it has to be rendered again.
//!
//! ## Directory Structure
//!
//! ```text
//! content/                     # Source root
//! ├── 2023/
//! │   └── year_in_review.md    # → articles/2023/year_in_review/
//! └── 2024/
//!     ├── hello.md             # → articles/2024/hello/
//!     └── drafts/
//!         └── wip.md           # → articles/2024/wip/ (year = first segment)
//! ```
//!
//! The first directory under the root is the article's year; the file stem is
//! its slug. Files placed directly in the root have no year and are skipped
//! with a warning. Only the lowercase `.md` extension counts.
//!
//! Symbolic links are followed, so a linked article carries the target's
//! mtime. Entries that can't be read (dangling links, permission errors) are
//! reported as warnings and the walk goes on. A missing source root is a
//! warning too: the build still writes an empty home page.
//!
//! ## Rebuild Decision
//!
//! An article needs rebuilding when any of these hold:
//! - it is in the [`ForceList`]
//! - its path is not in the [`BuildCache`]
//! - the cached mtime differs from the file's current mtime
//!
//! ## Ordering
//!
//! Articles are returned newest first by mtime. Files are enumerated in
//! file-name order and the sort is stable, so equal mtimes keep that order.

use crate::cache::{BuildCache, cache_key};
use chrono::{DateTime, Local};
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use walkdir::WalkDir;

/// Number of older articles linked from each article page.
pub const RELATED_COUNT: usize = 3;

#[derive(Error, Debug)]
pub enum CollectError {
    #[error("Failed to read source directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// One markdown source and everything derived from its path.
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    /// Source path as enumerated under the source root.
    pub path: PathBuf,
    /// First directory under the source root.
    pub year: String,
    /// File stem.
    pub slug: String,
    /// `{base}/articles/{year}/{slug}/`
    pub url: String,
    /// Last modification, local time.
    pub modified: DateTime<Local>,
    /// Last modification as epoch seconds; compared against the cache.
    pub mtime: f64,
    pub needs_rebuild: bool,
}

impl Article {
    /// Output path relative to the output root.
    pub fn output_path(&self) -> PathBuf {
        Path::new("articles")
            .join(&self.year)
            .join(&self.slug)
            .join("index.html")
    }

    /// Key under which this article is tracked in the change cache.
    pub fn cache_key(&self) -> String {
        cache_key(&self.path)
    }
}

/// Build the public URL of an article.
pub fn article_url(base_url: &str, year: &str, slug: &str) -> String {
    format!("{}/articles/{}/{}/", base_url, year, slug)
}

/// Non-fatal problems found while collecting.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectWarning {
    /// Markdown file directly under the source root.
    MissingYear(PathBuf),
    /// Two sources map to the same output directory.
    DuplicateSlug {
        year: String,
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },
    /// An entry below the root that couldn't be read, e.g. a dangling link.
    Unreadable { path: PathBuf, error: String },
    /// The source root doesn't exist.
    MissingSource(PathBuf),
}

/// Result of a collection run: articles newest first, plus warnings.
#[derive(Debug, Default)]
pub struct Collection {
    pub articles: Vec<Article>,
    pub warnings: Vec<CollectWarning>,
}

impl Collection {
    pub fn stale_count(&self) -> usize {
        self.articles.iter().filter(|a| a.needs_rebuild).count()
    }
}

/// Source files the caller wants rebuilt regardless of cache state.
///
/// Paths are canonicalized so `./content/2024/a.md` and `content/2024/a.md`
/// name the same article.
#[derive(Debug, Clone, Default)]
pub struct ForceList {
    paths: HashSet<PathBuf>,
}

impl ForceList {
    /// Keep the paths that exist. Missing paths are returned separately so
    /// the caller can warn about them.
    pub fn resolve<I, P>(paths: I) -> (Self, Vec<PathBuf>)
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut resolved = HashSet::new();
        let mut missing = Vec::new();
        for path in paths {
            let path = path.as_ref();
            match path.canonicalize() {
                Ok(canonical) => {
                    resolved.insert(canonical);
                }
                Err(_) => missing.push(path.to_path_buf()),
            }
        }
        (Self { paths: resolved }, missing)
    }

    pub fn contains(&self, path: &Path) -> bool {
        if self.paths.is_empty() {
            return false;
        }
        path.canonicalize()
            .map(|p| self.paths.contains(&p))
            .unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }
}

/// Scan `source_root` and build the newest-first article list.
pub fn collect_articles(
    source_root: &Path,
    base_url: &str,
    cache: &BuildCache,
    force: &ForceList,
) -> Result<Collection, CollectError> {
    let mut articles = Vec::new();
    let mut warnings = Vec::new();
    if !source_root.exists() {
        warnings.push(CollectWarning::MissingSource(source_root.to_path_buf()));
        return Ok(Collection { articles, warnings });
    }

    let mut seen: HashMap<(String, String), PathBuf> = HashMap::new();

    let walker = WalkDir::new(source_root)
        .follow_links(true)
        .sort_by_file_name();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            // The root itself failing means there is nothing to collect.
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(e) => {
                warnings.push(CollectWarning::Unreadable {
                    path: e.path().unwrap_or(source_root).to_path_buf(),
                    error: e.to_string(),
                });
                continue;
            }
        };
        let path = entry.path();
        if !entry.file_type().is_file() || !is_markdown(path) {
            continue;
        }

        let Some(year) = year_of(path, source_root) else {
            warnings.push(CollectWarning::MissingYear(path.to_path_buf()));
            continue;
        };
        let slug = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let modified = entry
            .metadata()
            .map_err(io::Error::from)
            .and_then(|m| m.modified());
        let modified_at = match modified {
            Ok(time) => time,
            Err(e) => {
                warnings.push(CollectWarning::Unreadable {
                    path: path.to_path_buf(),
                    error: e.to_string(),
                });
                continue;
            }
        };
        let mtime = epoch_seconds(modified_at);
        let key = cache_key(path);
        let needs_rebuild = force.contains(path) || cache.is_stale(&key, mtime);

        if let Some(first) = seen.insert((year.clone(), slug.clone()), path.to_path_buf()) {
            warnings.push(CollectWarning::DuplicateSlug {
                year: year.clone(),
                slug: slug.clone(),
                first,
                second: path.to_path_buf(),
            });
        }

        articles.push(Article {
            path: path.to_path_buf(),
            url: article_url(base_url, &year, &slug),
            year,
            slug,
            modified: DateTime::<Local>::from(modified_at),
            mtime,
            needs_rebuild,
        });
    }

    sort_newest_first(&mut articles);

    Ok(Collection { articles, warnings })
}

/// Stable sort by mtime, newest first.
pub fn sort_newest_first(articles: &mut [Article]) {
    articles.sort_by(|a, b| b.mtime.total_cmp(&a.mtime));
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "md")
        .unwrap_or(false)
}

/// First directory below the root, or `None` for files in the root itself.
fn year_of(path: &Path, root: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let mut components = rel.components();
    let first = components.next()?;
    // The file itself must come after the year directory.
    components.next()?;
    Some(first.as_os_str().to_string_lossy().into_owned())
}

/// Epoch seconds with sub-second precision; negative before 1970.
pub fn epoch_seconds(time: SystemTime) -> f64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs_f64(),
        Err(e) => -e.duration().as_secs_f64(),
    }
}

// ============================================================================
// Navigation index
// ============================================================================

/// Position of every article in the newest-first list, built once per build.
#[derive(Debug, Default)]
pub struct ArticleIndex {
    positions: HashMap<PathBuf, usize>,
}

impl ArticleIndex {
    pub fn new(articles: &[Article]) -> Self {
        let positions = articles
            .iter()
            .enumerate()
            .map(|(i, a)| (a.path.clone(), i))
            .collect();
        Self { positions }
    }

    pub fn position(&self, path: &Path) -> Option<usize> {
        self.positions.get(path).copied()
    }

    /// Up to [`RELATED_COUNT`] articles directly after `article`, i.e. the
    /// next-older ones. Empty when the article is not in the list.
    pub fn related<'a>(&self, article: &Article, articles: &'a [Article]) -> &'a [Article] {
        match self.position(&article.path) {
            Some(pos) if pos < articles.len() => {
                let end = (pos + 1 + RELATED_COUNT).min(articles.len());
                &articles[pos + 1..end]
            }
            _ => &[],
        }
    }
}
