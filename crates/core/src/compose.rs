//! Document composition.
//!
//! This module merges an ordered sequence of [`Article`]s with a
//! stylesheet into one full HTML document, the "source document" that
//! downstream rendering consumes. Templating is purely textual: a
//! repeating block delimited by `<!-- article -->` / `<!-- /article -->`
//! markers is instantiated once per article, in input order, with
//! `{{ article.title }}`, `{{ article.byline }}`, `{{ article.url }}`,
//! and `{{ article.content }}` tokens. Outside the block, `{{ title }}`
//! and `{{ style }}` are substituted once.
//!
//! Composition is deterministic: identical inputs produce identical
//! output, with no timestamps embedded in the document.

use crate::{Article, ColligoError, Result};

/// Built-in page template.
pub const DEFAULT_TEMPLATE: &str = include_str!("../assets/default.html");

/// Built-in stylesheet.
pub const DEFAULT_STYLE: &str = include_str!("../assets/default.css");

const BLOCK_START: &str = "<!-- article -->";
const BLOCK_END: &str = "<!-- /article -->";

/// A composed multi-article HTML document.
///
/// Owns its markup exclusively until handed to rendering. The document
/// contains the `.header-template` and `.footer-template` fragments the
/// print-fragment extractor addresses.
#[derive(Debug, Clone)]
pub struct ComposedDocument {
    /// Full serialized HTML document.
    pub html: String,
    /// Document title, taken from the first article.
    pub title: String,
    /// Number of articles bundled, consulted by the naming policy.
    pub article_count: usize,
}

/// Composes `articles` with `style` through `template`.
///
/// An empty article sequence is a precondition violation reported as
/// [`ColligoError::NoContent`]. A template without the article block
/// markers is rejected as [`ColligoError::HtmlParseError`].
pub fn compose(articles: &[Article], style: &str, template: &str) -> Result<ComposedDocument> {
    if articles.is_empty() {
        return Err(ColligoError::NoContent);
    }

    let start = template
        .find(BLOCK_START)
        .ok_or_else(|| ColligoError::HtmlParseError(format!("template is missing the {} marker", BLOCK_START)))?;
    let end = template
        .find(BLOCK_END)
        .filter(|&end| end > start)
        .ok_or_else(|| ColligoError::HtmlParseError(format!("template is missing the {} marker", BLOCK_END)))?;

    let block = &template[start + BLOCK_START.len()..end];

    let title = articles[0].title_or_default().to_string();

    // Document-level tokens are substituted into the template halves
    // before any article content is appended, so token-like text inside
    // fetched content is never expanded.
    let head = render_document_tokens(&template[..start], &title, style);
    let tail = render_document_tokens(&template[end + BLOCK_END.len()..], &title, style);

    let mut html = head;
    for article in articles {
        html.push_str(&render_block(block, article));
    }
    html.push_str(&tail);

    Ok(ComposedDocument { html, title, article_count: articles.len() })
}

/// Substitutes the document-level tokens of one template half.
fn render_document_tokens(template: &str, title: &str, style: &str) -> String {
    template
        .replace("{{ title }}", &escape_html(title))
        .replace("{{ style }}", style)
}

/// Instantiates the repeating block for one article.
///
/// Content is substituted last so token-like text inside an article body
/// is never re-expanded.
fn render_block(block: &str, article: &Article) -> String {
    block
        .replace("{{ article.title }}", &escape_html(article.title_or_default()))
        .replace(
            "{{ article.byline }}",
            &escape_html(article.byline.as_deref().unwrap_or("")),
        )
        .replace("{{ article.url }}", &escape_html(&article.url))
        .replace("{{ article.content }}", &article.content)
}

/// Escapes text for interpolation into markup.
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
