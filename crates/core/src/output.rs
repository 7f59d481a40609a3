//! Output dispatch.
//!
//! Given a composed document, a target format, and the naming policy,
//! this module stages the document for the renderer, invokes the matching
//! rendering capability, and writes the final artifact. Artifact bytes
//! are always produced in full before the single final write, so a
//! rendering failure never leaves a partial file on disk.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use crate::compose::ComposedDocument;
use crate::ebook::build_epub;
use crate::print::PrintFragments;
use crate::render::{PdfOptions, Renderer};
use crate::{Article, ColligoError, Result};

/// Target output format, fixed per batch invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputTarget {
    Pdf,
    Epub,
    Html,
}

impl OutputTarget {
    /// Filename extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Epub => "epub",
            Self::Html => "html",
        }
    }
}

/// Derives a filesystem-safe slug from a title.
///
/// Lowercases, folds every non-alphanumeric run into a single hyphen,
/// and trims leading/trailing hyphens.
pub fn slugify(title: &str) -> String {
    let separator_re = Regex::new(r"[^a-z0-9]+").unwrap();
    let slug = separator_re
        .replace_all(&title.to_lowercase(), "-")
        .trim_matches('-')
        .to_string();

    if slug.is_empty() { "untitled-page".to_string() } else { slug }
}

/// Applies the naming policy: an explicit file path wins (an explicit
/// directory receives the derived name); otherwise a single article is
/// named after its slugified title and a multi-article bundle from a
/// millisecond batch timestamp.
pub fn artifact_path(explicit: Option<&Path>, articles: &[Article], target: OutputTarget) -> PathBuf {
    match explicit {
        Some(path) if path.is_dir() => path.join(derived_name(articles, target)),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(derived_name(articles, target)),
    }
}

fn derived_name(articles: &[Article], target: OutputTarget) -> String {
    let stem = if articles.len() == 1 {
        slugify(articles[0].title_or_default())
    } else {
        format!("colligo-{}", Utc::now().timestamp_millis())
    };

    format!("{}.{}", stem, target.extension())
}

/// Renders `composed` to `target` and writes the artifact at `path`.
///
/// The composed document is staged as a temporary file and handed to the
/// renderer by `file://` reference; the staging directory lives until
/// rendering finishes.
pub async fn write_artifact(
    renderer: &dyn Renderer,
    composed: &ComposedDocument,
    fragments: &PrintFragments,
    target: OutputTarget,
    path: &Path,
) -> Result<PathBuf> {
    let staging = tempfile::tempdir()?;
    let source_path = staging.path().join("source.html");
    fs::write(&source_path, &composed.html)?;

    let source_url = Url::from_file_path(&source_path)
        .map_err(|_| ColligoError::RenderFailed("could not stage source document".to_string()))?;

    let bytes = match target {
        OutputTarget::Pdf => {
            let options = PdfOptions {
                header_template: fragments.header.clone(),
                footer_template: fragments.footer.clone(),
                ..Default::default()
            };
            renderer.render_pdf(source_url.as_str(), &options).await?
        }
        OutputTarget::Epub => {
            let rendered = renderer.render_html(source_url.as_str()).await?;
            build_epub(&composed.title, &extract_body(&rendered))?
        }
        OutputTarget::Html => {
            let rendered = renderer.render_html(source_url.as_str()).await?;
            extract_body(&rendered).into_bytes()
        }
    };

    persist_bytes(path, &bytes)?;
    tracing::info!(path = %path.display(), "wrote artifact");

    Ok(path.to_path_buf())
}

/// Writes `bytes` through a sibling temporary file renamed into place,
/// so an interrupted write never leaves a truncated artifact at `path`.
fn persist_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staged = tempfile::NamedTempFile::new_in(dir)?;
    staged.write_all(bytes)?;
    staged.persist(path).map_err(|e| ColligoError::WriteFailed(e.error))?;

    Ok(())
}

/// Inner markup of the document body, or the whole input when no body
/// element is present.
fn extract_body(html: &str) -> String {
    let doc = Html::parse_document(html);
    match Selector::parse("body") {
        Ok(sel) => doc
            .select(&sel)
            .next()
            .map(|el| el.inner_html())
            .unwrap_or_else(|| html.to_string()),
        Err(_) => html.to_string(),
    }
}
