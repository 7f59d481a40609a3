//! Article extraction.
//!
//! This module adapts the content-extraction capability to the pipeline:
//! the [`ContentExtractor`] trait takes an enhanced document and returns
//! a structured [`Article`], configured to preserve the class markers the
//! enhancement passes attach so boilerplate removal does not strip them.
//!
//! The bundled [`ReadableExtractor`] locates the main content region via
//! a selector cascade and harvests title, byline, and excerpt from the
//! document head. Pages with no identifiable content region fail with
//! [`ColligoError::ExtractionFailed`].

use std::collections::HashSet;

use scraper::{Html, Selector};

use crate::enhance::{ANCHOR_CLASS, DEAD_LINK_CLASS};
use crate::{Article, ColligoError, Result};

/// Configuration for article extraction.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Class names kept on elements in the extracted content. Everything
    /// else is stripped, matching the extractor capability's
    /// `preserveClasses` contract.
    pub preserve_classes: Vec<String>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            preserve_classes: vec![DEAD_LINK_CLASS.to_string(), ANCHOR_CLASS.to_string()],
        }
    }
}

/// Capability for extracting the readable article from a document.
pub trait ContentExtractor: Send + Sync {
    /// Extracts an [`Article`] from the enhanced markup of `url`.
    ///
    /// Fails with [`ColligoError::ExtractionFailed`] when no main content
    /// region can be identified.
    fn extract(&self, html: &str, url: &str) -> Result<Article>;
}

/// Content regions tried in order; the first non-empty match wins.
const CONTENT_SELECTORS: &[&str] = &[
    "article",
    "main",
    "[role=\"main\"]",
    "#content",
    ".post-content",
    ".entry-content",
    "body",
];

/// Default extractor: selector-cascade content location plus head
/// metadata harvesting.
#[derive(Debug, Clone, Default)]
pub struct ReadableExtractor {
    options: ExtractOptions,
}

impl ReadableExtractor {
    pub fn new(options: ExtractOptions) -> Self {
        Self { options }
    }
}

impl ContentExtractor for ReadableExtractor {
    fn extract(&self, html: &str, url: &str) -> Result<Article> {
        let doc = Html::parse_document(html);

        let content = find_content_region(&doc)
            .ok_or_else(|| ColligoError::ExtractionFailed { url: url.to_string() })?;
        let content = strip_classes_except(&content, &self.options.preserve_classes);

        let title = extract_title(&doc).unwrap_or_default();
        let byline = extract_byline(&doc);
        let excerpt = extract_excerpt(&doc);

        Ok(Article::new(url, title, byline, content, excerpt))
    }
}

/// Returns the inner HTML of the first content region with any text.
fn find_content_region(doc: &Html) -> Option<String> {
    for selector in CONTENT_SELECTORS {
        let Ok(sel) = Selector::parse(selector) else { continue };
        if let Some(el) = doc.select(&sel).next() {
            let text: String = el.text().collect();
            if !text.trim().is_empty() {
                return Some(el.inner_html());
            }
        }
    }
    None
}

fn select_text(doc: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    doc.select(&sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}

fn select_meta_content(doc: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    doc.select(&sel)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn extract_title(doc: &Html) -> Option<String> {
    select_meta_content(doc, "meta[property=\"og:title\"]")
        .or_else(|| select_text(doc, "title"))
        .or_else(|| select_text(doc, "h1"))
}

fn extract_byline(doc: &Html) -> Option<String> {
    select_meta_content(doc, "meta[name=\"author\"]")
        .or_else(|| select_text(doc, "[rel=\"author\"]"))
        .or_else(|| select_text(doc, ".byline"))
}

fn extract_excerpt(doc: &Html) -> Option<String> {
    select_meta_content(doc, "meta[name=\"description\"]")
        .or_else(|| select_meta_content(doc, "meta[property=\"og:description\"]"))
}

/// Strips class attributes, keeping only the preserved markers.
fn strip_classes_except(html: &str, preserve: &[String]) -> String {
    let preserved: HashSet<&str> = preserve.iter().map(String::as_str).collect();

    let mut output = String::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: vec![lol_html::element!("[class]", |el| {
                if let Some(class) = el.get_attribute("class") {
                    let kept: Vec<&str> = class
                        .split_whitespace()
                        .filter(|c| preserved.contains(c))
                        .collect();

                    if kept.is_empty() {
                        el.remove_attribute("class");
                    } else {
                        el.set_attribute("class", &kept.join(" ")).ok();
                    }
                }
                Ok(())
            })],
            ..Default::default()
        },
        |c: &[u8]| {
            output.push_str(&String::from_utf8_lossy(c));
        },
    );

    if rewriter.write(html.as_bytes()).is_err() {
        return html.to_string();
    }

    if rewriter.end().is_err() {
        return html.to_string();
    }

    if output.is_empty() { html.to_string() } else { output }
}
