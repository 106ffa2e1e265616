//! Draft creation for the `new` command.
//!
//! Creates `{source}/{year}/{Title}_{suffix}.md` with a frontmatter block and
//! a heading. The 5-character suffix keeps two drafts with the same title from
//! colliding. Existing files are never overwritten, and the change cache is
//! not touched: the draft is simply a new, uncached source for the next build.

use crate::naming::title_to_stem;
use chrono::{Datelike, NaiveDate};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_TITLE: &str = "Untitled";

const SUFFIX_LEN: usize = 5;

#[derive(Error, Debug)]
pub enum DraftError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// What `create_draft` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftOutcome {
    Created(PathBuf),
    AlreadyExists(PathBuf),
}

/// Create a new draft for `title` (or [`DEFAULT_TITLE`]) dated `today`.
pub fn create_draft(
    source_root: &Path,
    title: Option<&str>,
    today: NaiveDate,
) -> Result<DraftOutcome, DraftError> {
    let title = title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TITLE);
    let suffix = random_suffix();
    create_draft_with_suffix(source_root, title, today, &suffix)
}

/// Create a draft with a caller-chosen suffix.
pub fn create_draft_with_suffix(
    source_root: &Path,
    title: &str,
    today: NaiveDate,
    suffix: &str,
) -> Result<DraftOutcome, DraftError> {
    let dir = source_root.join(today.year().to_string());
    fs::create_dir_all(&dir)?;

    let path = dir.join(format!("{}_{}.md", title_to_stem(title), suffix));
    if path.exists() {
        return Ok(DraftOutcome::AlreadyExists(path));
    }
    fs::write(&path, draft_body(title, today))?;
    Ok(DraftOutcome::Created(path))
}

/// Frontmatter plus heading skeleton.
pub fn draft_body(title: &str, today: NaiveDate) -> String {
    format!(
        "---\ntitle: {title}\ndate: {date}\n---\n\n# {title}\n\nYour content here...\n",
        date = today.format("%Y-%m-%d"),
    )
}

/// Random `[A-Za-z0-9]` suffix.
fn random_suffix() -> String {
    (0..SUFFIX_LEN).map(|_| fastrand::alphanumeric()).collect()
}
