//! Build orchestration.
//!
//! One `build` invocation runs these phases, in order, exactly once:
//!
//! ```text
//! Collecting        load cache, resolve force list, scan sources
//! Rebuilding        render + write every stale article, record its mtime
//! RegeneratingHome  always rewrite {out}/index.html
//! PersistingCache   always save the cache, even if nothing was rebuilt
//! Done              report rebuilt/total
//! ```
//!
//! The article list produced by collection is never modified afterwards:
//! navigation for every page is computed against the same newest-first list.
//!
//! ## Failure policy
//!
//! - A forced file that doesn't exist is reported and ignored.
//! - A missing source root or an unreadable source entry is reported; the
//!   build goes on with whatever was collected.
//! - An article whose source can't be read is reported and skipped; it gets
//!   no cache entry, so the next build retries it.
//! - An output directory that can't be created aborts the build.
//!
//! Progress is reported through an optional channel of [`BuildEvent`]s; the
//! CLI prints them with [`crate::output::format_build_event`].

use crate::cache::{BuildCache, CacheError};
use crate::collect::{
    ArticleIndex, CollectError, CollectWarning, Collection, ForceList, collect_articles,
};
use crate::config::{BlogConfig, BuildTarget, Mode};
use crate::render::{self, RenderContext};
use chrono::NaiveDate;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Collect error: {0}")]
    Collect(#[from] CollectError),
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
    #[error("Cannot create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Inputs for one build, resolved from config and CLI arguments.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub source_dir: PathBuf,
    pub cache_file: PathBuf,
    pub site_title: String,
    pub target: BuildTarget,
    /// Source files to rebuild regardless of the cache.
    pub force: Vec<PathBuf>,
    /// Date stamped into page footers.
    pub today: NaiveDate,
}

impl BuildOptions {
    pub fn from_config(
        config: &BlogConfig,
        target: BuildTarget,
        force: Vec<PathBuf>,
        today: NaiveDate,
    ) -> Self {
        Self {
            source_dir: config.source_dir.clone(),
            cache_file: config.cache_file.clone(),
            site_title: config.site_title.clone(),
            target,
            force,
            today,
        }
    }

    fn render_context(&self) -> RenderContext {
        RenderContext {
            base_url: self.target.base_url.clone(),
            site_title: self.site_title.clone(),
            generated_on: self.today,
        }
    }
}

/// Progress events emitted while building.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildEvent {
    Started {
        mode: Mode,
        output_dir: PathBuf,
    },
    ForcedFileMissing(PathBuf),
    Warning(CollectWarning),
    Collected {
        total: usize,
        stale: usize,
    },
    Rebuilt {
        slug: String,
        output: PathBuf,
    },
    Skipped {
        slug: String,
    },
    Failed {
        slug: String,
        error: String,
    },
    HomeWritten(PathBuf),
    StylesheetWritten(PathBuf),
}

/// Outcome of a completed build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub rebuilt: usize,
    pub skipped: usize,
    pub failed: usize,
    pub total: usize,
    pub output_dir: PathBuf,
}

impl fmt::Display for BuildSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Built {}/{} articles into {}",
            self.rebuilt,
            self.total,
            self.output_dir.display()
        )?;
        if self.failed > 0 {
            write!(f, " ({} failed)", self.failed)?;
        }
        Ok(())
    }
}

/// Collected articles plus the forced paths that didn't exist.
#[derive(Debug)]
pub struct Plan {
    pub collection: Collection,
    pub missing_forced: Vec<PathBuf>,
}

/// Load the cache, resolve forced files and collect articles. Writes nothing.
pub fn plan(
    source_dir: &Path,
    base_url: &str,
    cache: &BuildCache,
    force: &[PathBuf],
) -> Result<Plan, CollectError> {
    let (force, missing_forced) = ForceList::resolve(force);
    let collection = collect_articles(source_dir, base_url, cache, &force)?;
    Ok(Plan {
        collection,
        missing_forced,
    })
}

/// Run a full incremental build.
pub fn build(
    options: &BuildOptions,
    events: Option<Sender<BuildEvent>>,
) -> Result<BuildSummary, BuildError> {
    let emit = |event: BuildEvent| {
        if let Some(tx) = &events {
            tx.send(event).ok();
        }
    };
    let output_dir = &options.target.output_dir;
    emit(BuildEvent::Started {
        mode: options.target.mode,
        output_dir: output_dir.clone(),
    });

    create_dir(output_dir)?;

    // Collecting
    let mut cache = BuildCache::load(&options.cache_file);
    let Plan {
        collection,
        missing_forced,
    } = plan(
        &options.source_dir,
        &options.target.base_url,
        &cache,
        &options.force,
    )?;
    for path in missing_forced {
        emit(BuildEvent::ForcedFileMissing(path));
    }
    for warning in &collection.warnings {
        emit(BuildEvent::Warning(warning.clone()));
    }
    let articles = collection.articles;
    emit(BuildEvent::Collected {
        total: articles.len(),
        stale: articles.iter().filter(|a| a.needs_rebuild).count(),
    });

    // Rebuilding
    let ctx = options.render_context();
    let index = ArticleIndex::new(&articles);
    let mut rebuilt = 0;
    let mut skipped = 0;
    let mut failed = 0;

    for article in &articles {
        if !article.needs_rebuild {
            skipped += 1;
            emit(BuildEvent::Skipped {
                slug: article.slug.clone(),
            });
            continue;
        }

        let html = match render::render_article(article, &articles, &index, &ctx) {
            Ok(html) => html,
            Err(e) => {
                failed += 1;
                emit(BuildEvent::Failed {
                    slug: article.slug.clone(),
                    error: e.to_string(),
                });
                continue;
            }
        };

        let output = output_dir.join(article.output_path());
        if let Some(dir) = output.parent() {
            create_dir(dir)?;
        }
        fs::write(&output, html)?;
        cache.record(article.cache_key(), article.mtime);
        rebuilt += 1;
        emit(BuildEvent::Rebuilt {
            slug: article.slug.clone(),
            output,
        });
    }

    // RegeneratingHome
    let home = output_dir.join("index.html");
    fs::write(&home, render::render_home(&articles, &ctx))?;
    emit(BuildEvent::HomeWritten(home));

    let stylesheet = output_dir.join("style.css");
    if !stylesheet.exists() {
        fs::write(&stylesheet, render::STYLESHEET)?;
        emit(BuildEvent::StylesheetWritten(stylesheet));
    }

    // PersistingCache
    cache.save(&options.cache_file)?;

    Ok(BuildSummary {
        rebuilt,
        skipped,
        failed,
        total: articles.len(),
        output_dir: output_dir.clone(),
    })
}

fn create_dir(path: &Path) -> Result<(), BuildError> {
    fs::create_dir_all(path).map_err(|source| BuildError::OutputDir {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::cache_key;
    use crate::test_helpers::{assert_in_order, set_mtime, write_source};
    use std::sync::mpsc;
    use tempfile::TempDir;

    struct Site {
        tmp: TempDir,
    }

    impl Site {
        fn new() -> Self {
            Self {
                tmp: TempDir::new().unwrap(),
            }
        }

        fn source(&self) -> PathBuf {
            self.tmp.path().join("content")
        }

        fn out(&self) -> PathBuf {
            self.tmp.path().join("docs")
        }

        fn cache_file(&self) -> PathBuf {
            self.tmp.path().join(".build_cache.json")
        }

        fn write(&self, rel: &str, content: &str, mtime: u64) -> PathBuf {
            write_source(&self.source(), rel, content, mtime)
        }

        fn options(&self, force: Vec<PathBuf>) -> BuildOptions {
            BuildOptions {
                source_dir: self.source(),
                cache_file: self.cache_file(),
                site_title: "My Blog".to_string(),
                target: BuildTarget::new(Mode::Deploy, self.out(), "https://blog.example/"),
                force,
                today: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            }
        }

        fn build(&self) -> BuildSummary {
            build(&self.options(vec![]), None).unwrap()
        }

        fn read(&self, rel: &str) -> String {
            fs::read_to_string(self.out().join(rel)).unwrap()
        }
    }

    #[test]
    fn first_build_renders_scenario_article() {
        let site = Site::new();
        let src = site.write("2024/hello.md", "---\ntitle: Hello\n---\n\n# Hi", 1_700_000_000);

        let summary = site.build();
        assert_eq!(summary.rebuilt, 1);
        assert_eq!(summary.total, 1);

        let html = site.read("articles/2024/hello/index.html");
        assert!(html.contains("<article><h2>Hello</h2><h1>Hi</h1>"));

        let cache = BuildCache::load(&site.cache_file());
        assert_eq!(cache.get(&cache_key(&src)), Some(1_700_000_000.0));
    }

    #[test]
    fn second_build_rebuilds_nothing() {
        let site = Site::new();
        site.write("2024/a.md", "# A", 100);
        site.write("2023/b.md", "# B", 50);

        assert_eq!(site.build().rebuilt, 2);
        let second = site.build();
        assert_eq!(second.rebuilt, 0);
        assert_eq!(second.skipped, 2);
        assert_eq!(second.total, 2);
    }

    #[test]
    fn touched_article_is_the_only_rebuild() {
        let site = Site::new();
        site.write("2024/a.md", "# A", 100);
        let b = site.write("2024/b.md", "# B", 200);
        site.build();

        set_mtime(&b, 300);
        let summary = site.build();
        assert_eq!(summary.rebuilt, 1);
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    fn home_is_rewritten_when_nothing_is_stale() {
        let site = Site::new();
        site.write("2024/old.md", "x", 100);
        site.write("2024/new.md", "x", 200);
        site.build();

        let home = site.out().join("index.html");
        fs::write(&home, "stale").unwrap();

        let summary = site.build();
        assert_eq!(summary.rebuilt, 0);
        let html = site.read("index.html");
        assert_ne!(html, "stale");
        assert_in_order(&html, &[">new</a>", ">old</a>"]);
    }

    #[test]
    fn forced_article_is_rebuilt() {
        let site = Site::new();
        let a = site.write("2024/a.md", "x", 100);
        site.write("2024/b.md", "x", 200);
        site.build();

        let summary = build(&site.options(vec![a]), None).unwrap();
        assert_eq!(summary.rebuilt, 1);
    }

    #[test]
    fn missing_forced_file_is_reported_not_fatal() {
        let site = Site::new();
        site.write("2024/a.md", "x", 100);
        let ghost = site.source().join("2024/ghost.md");

        let (tx, rx) = mpsc::channel();
        let summary = build(&site.options(vec![ghost.clone()]), Some(tx)).unwrap();
        assert_eq!(summary.rebuilt, 1);

        let events: Vec<BuildEvent> = rx.iter().collect();
        assert!(events.contains(&BuildEvent::ForcedFileMissing(ghost)));
    }

    #[test]
    fn cache_is_saved_even_when_nothing_rebuilt() {
        let site = Site::new();
        fs::create_dir_all(site.source()).unwrap();

        let summary = site.build();
        assert_eq!(summary.total, 0);
        assert!(site.cache_file().exists());
        assert!(site.out().join("index.html").exists());
    }

    #[test]
    fn missing_source_root_still_writes_home_and_cache() {
        let site = Site::new();

        let (tx, rx) = mpsc::channel();
        let summary = build(&site.options(vec![]), Some(tx)).unwrap();
        assert_eq!(summary.total, 0);
        assert!(site.out().join("index.html").exists());
        assert!(site.cache_file().exists());

        let events: Vec<BuildEvent> = rx.iter().collect();
        assert!(events.contains(&BuildEvent::Warning(CollectWarning::MissingSource(
            site.source()
        ))));
    }

    #[test]
    fn deleted_source_keeps_its_cache_entry() {
        let site = Site::new();
        let a = site.write("2024/a.md", "x", 100);
        site.build();

        fs::remove_file(&a).unwrap();
        site.build();

        let cache = BuildCache::load(&site.cache_file());
        assert_eq!(cache.get(&cache_key(&a)), Some(100.0));
    }

    #[test]
    fn corrupt_cache_triggers_full_rebuild() {
        let site = Site::new();
        site.write("2024/a.md", "x", 100);
        site.write("2024/b.md", "x", 200);
        site.build();

        fs::write(site.cache_file(), "{ not json").unwrap();
        assert_eq!(site.build().rebuilt, 2);
    }

    #[test]
    fn unreadable_article_is_skipped_and_not_cached() {
        let site = Site::new();
        site.write("2024/good.md", "# Good", 100);
        let bad = site.write("2024/bad.md", "x", 200);
        // Invalid UTF-8 makes read_to_string fail regardless of permissions.
        fs::write(&bad, [0xff, 0xfe, 0xfd]).unwrap();
        set_mtime(&bad, 200);

        let (tx, rx) = mpsc::channel();
        let summary = build(&site.options(vec![]), Some(tx)).unwrap();
        assert_eq!(summary.rebuilt, 1);
        assert_eq!(summary.failed, 1);
        assert!(!site.out().join("articles/2024/bad/index.html").exists());
        assert!(site.out().join("articles/2024/good/index.html").exists());

        let cache = BuildCache::load(&site.cache_file());
        assert_eq!(cache.get(&cache_key(&bad)), None);

        let failed = rx
            .iter()
            .filter(|e| matches!(e, BuildEvent::Failed { slug, .. } if slug == "bad"))
            .count();
        assert_eq!(failed, 1);
    }

    #[test]
    fn article_nav_links_next_three_older() {
        let site = Site::new();
        for (slug, mtime) in [("a", 50), ("b", 40), ("c", 30), ("d", 20), ("e", 10)] {
            site.write(&format!("2024/{slug}.md"), "x", mtime);
        }
        site.build();

        let html = site.read("articles/2024/b/index.html");
        let nav = &html[html.find("<nav>").unwrap()..];
        assert_in_order(
            nav,
            &[
                "https://blog.example/\"",
                "/articles/2024/c/",
                "/articles/2024/d/",
                "/articles/2024/e/",
            ],
        );
        assert!(!nav.contains("/articles/2024/a/"));
    }

    #[test]
    fn output_dir_that_is_a_file_is_fatal() {
        let site = Site::new();
        site.write("2024/a.md", "x", 100);
        fs::write(site.out(), "not a directory").unwrap();

        let err = build(&site.options(vec![]), None).unwrap_err();
        assert!(matches!(err, BuildError::OutputDir { .. }));
    }

    #[test]
    fn existing_stylesheet_is_preserved() {
        let site = Site::new();
        site.write("2024/a.md", "x", 100);
        fs::create_dir_all(site.out()).unwrap();
        fs::write(site.out().join("style.css"), "body { color: red; }").unwrap();

        site.build();
        assert_eq!(site.read("style.css"), "body { color: red; }");
    }

    #[test]
    fn default_stylesheet_written_once() {
        let site = Site::new();
        site.write("2024/a.md", "x", 100);

        let (tx, rx) = mpsc::channel();
        build(&site.options(vec![]), Some(tx)).unwrap();
        let events: Vec<BuildEvent> = rx.iter().collect();
        assert!(events
            .iter()
            .any(|e| matches!(e, BuildEvent::StylesheetWritten(_))));
        assert_eq!(site.read("style.css"), render::STYLESHEET);

        let (tx, rx) = mpsc::channel();
        build(&site.options(vec![]), Some(tx)).unwrap();
        assert!(!rx
            .iter()
            .any(|e| matches!(e, BuildEvent::StylesheetWritten(_))));
    }

    #[test]
    fn events_follow_phase_order() {
        let site = Site::new();
        site.write("2024/a.md", "x", 100);
        site.write("2024/b.md", "x", 200);
        site.build();
        set_mtime(&site.source().join("2024/a.md"), 300);

        let (tx, rx) = mpsc::channel();
        build(&site.options(vec![]), Some(tx)).unwrap();
        let events: Vec<BuildEvent> = rx.iter().collect();

        assert!(matches!(events[0], BuildEvent::Started { mode: Mode::Deploy, .. }));
        assert_eq!(events[1], BuildEvent::Collected { total: 2, stale: 1 });
        assert!(matches!(&events[2], BuildEvent::Rebuilt { slug, .. } if slug == "a"));
        assert_eq!(events[3], BuildEvent::Skipped { slug: "b".to_string() });
        assert!(matches!(events[4], BuildEvent::HomeWritten(_)));
        assert_eq!(events.len(), 5);
    }

    #[test]
    fn summary_display() {
        let summary = BuildSummary {
            rebuilt: 2,
            skipped: 3,
            failed: 0,
            total: 5,
            output_dir: PathBuf::from("docs"),
        };
        assert_eq!(summary.to_string(), "Built 2/5 articles into docs");

        let with_failures = BuildSummary { failed: 1, ..summary };
        assert_eq!(
            with_failures.to_string(),
            "Built 2/5 articles into docs (1 failed)"
        );
    }

    #[test]
    fn plan_writes_nothing() {
        let site = Site::new();
        site.write("2024/a.md", "x", 100);

        let plan = plan(
            &site.source(),
            "https://blog.example",
            &BuildCache::empty(),
            &[],
        )
        .unwrap();
        assert_eq!(plan.collection.stale_count(), 1);
        assert!(!site.out().exists());
        assert!(!site.cache_file().exists());
    }
}
