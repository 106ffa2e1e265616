//! # Simple Blog
//!
//! A minimal incremental static site generator for markdown blogs. Sources
//! live in `content/{year}/{slug}.md`; every build renders only the articles
//! whose modification time changed since the last build, then rewrites the
//! home page.
//!
//! # Architecture: One-Way Pipeline
//!
//! ```text
//! content/ ──collect──▶ [Article] ──render──▶ docs/articles/{year}/{slug}/index.html
//!    ▲                      │                 docs/index.html
//!    └── .build_cache.json ◀┘ (read once at start, written once at end)
//! ```
//!
//! The article list is collected once per build, sorted newest first, and
//! then treated as read-only: navigation on each page links to the next
//! three older articles in that list.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`frontmatter`] | Removes the leading `---` metadata block |
//! | [`cache`] | Persisted source path → mtime map |
//! | [`collect`] | Source scan, rebuild decisions, newest-first ordering, navigation index |
//! | [`render`] | Article and home pages with Maud + pulldown-cmark |
//! | [`pipeline`] | The `build` orchestration and its progress events |
//! | [`draft`] | The `new` command |
//! | [`config`] | `blog.toml` loading and the test/deploy build targets |
//! | [`naming`] | Slug → display title and link title |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Timestamps, Not Hashes
//!
//! Staleness is decided by comparing the file's mtime with the cached one.
//! Reading every source just to hash it would cost as much as the scan
//! itself. Edits that keep the mtime are missed; force them with
//! `build <file>`.
//!
//! ## No Global State
//!
//! The output directory and base URL are chosen once per invocation
//! ([`config::BuildTarget`]) and passed explicitly to every stage.
//!
//! ## Frontmatter Is Ignored
//!
//! Titles come from the filename slug. The frontmatter written by `new` is
//! stripped before rendering and never read.

pub mod cache;
pub mod collect;
pub mod config;
pub mod draft;
pub mod frontmatter;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod render;

#[cfg(test)]
pub(crate) mod test_helpers;
