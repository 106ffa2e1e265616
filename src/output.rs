//! CLI output formatting.
//!
//! Every line the CLI prints is produced here. Each entity leads with its
//! identity (slug, positional index), with filesystem paths as indented
//! context lines.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! ==> Building for deployment → docs
//! Found 3 articles (1 to rebuild)
//!     rebuilt hello → docs/articles/2024/hello/index.html
//!     skipped year_in_review (unchanged)
//!     skipped first_post (unchanged)
//! Home → docs/index.html
//! Built 1/3 articles into docs
//! ```
//!
//! ## Check
//!
//! ```text
//! Articles
//! 001 hello [rebuild]
//!     Source: content/2024/hello.md
//!     Modified: 2024-03-01 12:00
//! 002 first post
//!     Source: content/2023/first_post.md
//!     Modified: 2023-01-05 09:30
//!
//! 1 of 2 articles would be rebuilt
//! ```
//!
//! # Architecture
//!
//! `format_*` functions return `Vec<String>` and do no I/O, so they are unit
//! tested directly. `print_*` wrappers write them to stdout.

use crate::collect::CollectWarning;
use crate::config::Mode;
use crate::draft::DraftOutcome;
use crate::naming::link_title;
use crate::pipeline::{BuildEvent, BuildSummary, Plan};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn format_warning(warning: &CollectWarning) -> String {
    match warning {
        CollectWarning::MissingYear(path) => format!(
            "Warning: {} is not inside a year directory, skipped",
            path.display()
        ),
        CollectWarning::DuplicateSlug {
            year,
            slug,
            first,
            second,
        } => format!(
            "Warning: {} and {} both map to articles/{}/{}/",
            first.display(),
            second.display(),
            year,
            slug
        ),
        CollectWarning::Unreadable { path, error } => {
            format!("Warning: cannot read {}: {}, skipped", path.display(), error)
        }
        CollectWarning::MissingSource(path) => {
            format!("Warning: source directory {} does not exist", path.display())
        }
    }
}

// ============================================================================
// Build
// ============================================================================

/// Format a single build progress event as display lines.
pub fn format_build_event(event: &BuildEvent) -> Vec<String> {
    let line = match event {
        BuildEvent::Started { mode, output_dir } => {
            let label = match mode {
                Mode::Test => "local testing",
                Mode::Deploy => "deployment",
            };
            format!("==> Building for {} \u{2192} {}", label, output_dir.display())
        }
        BuildEvent::ForcedFileMissing(path) => {
            format!("Warning: {} does not exist", path.display())
        }
        BuildEvent::Warning(warning) => format_warning(warning),
        BuildEvent::Collected { total, stale } => {
            format!("Found {} articles ({} to rebuild)", total, stale)
        }
        BuildEvent::Rebuilt { slug, output } => format!(
            "{}rebuilt {} \u{2192} {}",
            indent(1),
            slug,
            output.display()
        ),
        BuildEvent::Skipped { slug } => format!("{}skipped {} (unchanged)", indent(1), slug),
        BuildEvent::Failed { slug, error } => {
            format!("{}failed {}: {}", indent(1), slug, error)
        }
        BuildEvent::HomeWritten(path) => format!("Home \u{2192} {}", path.display()),
        BuildEvent::StylesheetWritten(path) => {
            format!("Stylesheet \u{2192} {}", path.display())
        }
    };
    vec![line]
}

pub fn format_build_summary(summary: &BuildSummary) -> Vec<String> {
    vec![summary.to_string()]
}

pub fn print_build_summary(summary: &BuildSummary) {
    for line in format_build_summary(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format the article inventory with the rebuild decision for each article.
pub fn format_check_output(plan: &Plan) -> Vec<String> {
    let mut lines = Vec::new();

    for path in &plan.missing_forced {
        lines.push(format!("Warning: {} does not exist", path.display()));
    }
    for warning in &plan.collection.warnings {
        lines.push(format_warning(warning));
    }

    let articles = &plan.collection.articles;
    lines.push("Articles".to_string());
    for (i, article) in articles.iter().enumerate() {
        let marker = if article.needs_rebuild { " [rebuild]" } else { "" };
        lines.push(format!(
            "{} {}{}",
            format_index(i + 1),
            link_title(&article.slug),
            marker
        ));
        lines.push(format!("{}Source: {}", indent(1), article.path.display()));
        lines.push(format!(
            "{}Modified: {}",
            indent(1),
            article.modified.format("%Y-%m-%d %H:%M")
        ));
    }

    lines.push(String::new());
    lines.push(format!(
        "{} of {} articles would be rebuilt",
        plan.collection.stale_count(),
        articles.len()
    ));
    lines
}

pub fn print_check_output(plan: &Plan) {
    for line in format_check_output(plan) {
        println!("{}", line);
    }
}

// ============================================================================
// New
// ============================================================================

pub fn format_draft_outcome(outcome: &DraftOutcome) -> Vec<String> {
    match outcome {
        DraftOutcome::Created(path) => {
            vec![format!("Creating new blog draft at {}", path.display())]
        }
        DraftOutcome::AlreadyExists(path) => {
            vec![format!("Blog post {} already exists", path.display())]
        }
    }
}

pub fn print_draft_outcome(outcome: &DraftOutcome) {
    for line in format_draft_outcome(outcome) {
        println!("{}", line);
    }
}
