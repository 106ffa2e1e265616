//! Display names derived from article slugs.
//!
//! A slug is the source file stem (`content/2024/my_first_post.md` →
//! `my_first_post`). Underscores separate words:
//! - link title: `my_first_post` → "my first post" (navigation and home list)
//! - display title: `my_first_post` → "My First Post" (article heading)

/// Slug with underscores turned into spaces. Used as link text.
pub fn link_title(slug: &str) -> String {
    slug.replace('_', " ")
}

/// Link title in title case. Used as the article heading.
pub fn display_title(slug: &str) -> String {
    title_case(&link_title(slug))
}

/// Uppercase the first letter of every word and lowercase the rest.
///
/// A word starts at any letter that follows a non-letter, so `it's` becomes
/// `It'S` and `2nd` becomes `2Nd`.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

/// Turn a draft title into a file stem: spaces become underscores so the
/// slug humanizes back into the title.
pub fn title_to_stem(title: &str) -> String {
    title
        .trim()
        .chars()
        .map(|c| match c {
            ' ' => '_',
            '/' | '\\' => '-',
            c => c,
        })
        .collect()
}
