//! HTML rendering.
//!
//! Two pages exist:
//!
//! - **Article page** (`/articles/{year}/{slug}/index.html`): the converted
//!   markdown under a title-cased heading, followed by navigation to the home
//!   page and the next three older articles.
//! - **Home page** (`/index.html`): every article, newest first.
//!
//! Both share the same document shell: stylesheet link, site header, footer
//! stamped with the build date.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating, so
//! slugs and URLs are escaped automatically. Markdown is converted with
//! pulldown-cmark (CommonMark fenced code plus the tables extension) and
//! embedded as pre-escaped HTML.

use crate::collect::{Article, ArticleIndex};
use crate::frontmatter::strip_frontmatter;
use crate::naming::{display_title, link_title};
use chrono::NaiveDate;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Options, Parser, html as md_html};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Stylesheet written to `{out}/style.css` when none exists yet.
pub const STYLESHEET: &str = include_str!("../static/style.css");

/// Everything a page needs besides the article data. Fixed for one build.
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// Base URL without a trailing slash.
    pub base_url: String,
    pub site_title: String,
    /// Date stamped into every footer.
    pub generated_on: NaiveDate,
}

impl RenderContext {
    fn home_href(&self) -> String {
        format!("{}/", self.base_url)
    }

    fn stylesheet_href(&self) -> String {
        format!("{}/style.css", self.base_url)
    }
}

/// Convert markdown to HTML with fenced code blocks and tables.
pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::ENABLE_TABLES);
    let mut body_html = String::new();
    md_html::push_html(&mut body_html, parser);
    body_html
}

/// Read, strip and render one article into a complete HTML document.
///
/// A read failure is returned before anything is rendered.
pub fn render_article(
    article: &Article,
    articles: &[Article],
    index: &ArticleIndex,
    ctx: &RenderContext,
) -> Result<String, RenderError> {
    let source = fs::read_to_string(&article.path).map_err(|source| RenderError::Read {
        path: article.path.clone(),
        source,
    })?;
    let related = index.related(article, articles);
    Ok(article_page(article, strip_frontmatter(&source), related, ctx).into_string())
}

/// Render the home page listing every article in the given order.
pub fn render_home(articles: &[Article], ctx: &RenderContext) -> String {
    let content = html! {
        h2 { "Articles" }
        ul {
            @for art in articles {
                li { a href=(art.url) { (link_title(&art.slug)) } }
            }
        }
    };
    base_document("Home", ctx, content).into_string()
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the shared document shell.
fn base_document(title: &str, ctx: &RenderContext, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                link rel="stylesheet" href=(ctx.stylesheet_href());
            }
            body {
                header {
                    h1 { a href=(ctx.home_href()) { (ctx.site_title) } }
                }
                main {
                    (content)
                }
                footer {
                    p { "Generated " (ctx.generated_on.format("%Y-%m-%d").to_string()) }
                }
            }
        }
    }
}

/// Home link first, then the related articles.
fn render_nav(related: &[Article], ctx: &RenderContext) -> Markup {
    html! {
        nav {
            ul {
                li { a href=(ctx.home_href()) { "🏠 Home" } }
                @for prev in related {
                    li { a href=(prev.url) { (link_title(&prev.slug)) } }
                }
            }
        }
    }
}

fn article_page(
    article: &Article,
    markdown: &str,
    related: &[Article],
    ctx: &RenderContext,
) -> Markup {
    let content = html! {
        article {
            h2 { (display_title(&article.slug)) }
            (PreEscaped(markdown_to_html(markdown)))
        }
        (render_nav(related, ctx))
    };
    base_document(&article.slug, ctx, content)
}

// ============================================================================
// Tests
// ============================================================================
