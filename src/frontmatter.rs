//! Frontmatter removal.
//!
//! Source articles may start with a metadata block delimited by `---` lines:
//!
//! ```text
//! ---
//! title: Hello
//! date: 2024-03-01
//! ---
//!
//! # Hi
//! ```
//!
//! The block is never parsed. Titles come from the filename (see
//! [`crate::naming`]); this module only keeps the block out of the rendered
//! HTML.

const DELIMITER: &str = "---";

/// Return the text after a leading `---` … `---` block.
///
/// The opening delimiter must be the first line (surrounding whitespace
/// ignored). Everything after the closing delimiter line is returned as-is,
/// including a blank line that directly follows it. Input without an opening
/// delimiter, or with an opening delimiter that is never closed, is returned
/// unchanged.
pub fn strip_frontmatter(text: &str) -> &str {
    let mut lines = text.split('\n');
    match lines.next() {
        Some(first) if first.trim() == DELIMITER => {}
        _ => return text,
    }

    let mut offset = text.find('\n').map(|i| i + 1).unwrap_or(text.len());
    for line in lines {
        let next = offset + line.len() + 1;
        if line.trim() == DELIMITER {
            return &text[next.min(text.len())..];
        }
        offset = next;
    }
    text
}
