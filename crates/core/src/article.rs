//! The extracted-article record.
//!
//! This module defines the [`Article`] struct: the structured result of
//! running content extraction over one fetched page. Articles are created
//! once per URL, held in input order for the lifetime of a batch, and
//! consumed by the document composer.

use serde::Serialize;

/// One extracted page.
///
/// Immutable after construction. The `content` field holds a serialized
/// HTML fragment representing the readable body of the page.
#[derive(Debug, Clone, Serialize)]
pub struct Article {
    /// Source URL the page was fetched from.
    pub url: String,

    /// Page title, possibly empty.
    pub title: String,

    /// Author byline, when the page declares one.
    pub byline: Option<String>,

    /// Readable body as a clean HTML fragment.
    pub content: String,

    /// Short summary, when the page declares one.
    pub excerpt: Option<String>,
}

impl Article {
    /// Creates a new Article from its components.
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        byline: Option<String>,
        content: impl Into<String>,
        excerpt: Option<String>,
    ) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            byline,
            content: content.into(),
            excerpt,
        }
    }

    /// Title for display and naming purposes, with a fallback for pages
    /// that declare none.
    pub fn title_or_default(&self) -> &str {
        if self.title.trim().is_empty() { "Untitled page" } else { &self.title }
    }
}
