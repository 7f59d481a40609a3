//! Batch orchestration.
//!
//! The public surface of the crate: [`pdf`], [`epub`], and [`html`] each
//! take an ordered sequence of URLs and an [`Options`] value, drive every
//! URL through fetch → enhance → extract, and bundle the results into
//! one artifact (or one per URL in individual mode).
//!
//! URLs are processed sequentially; each URL's fetch-through-extract
//! sequence completes before the next begins, and article order always
//! matches input order. One rendering session is held for the whole
//! invocation and released on both the success and failure paths.

use std::path::PathBuf;

use url::Url;

use crate::compose::{DEFAULT_STYLE, DEFAULT_TEMPLATE, compose};
use crate::css::Stylesheet;
use crate::enhance::{EnhanceConfig, enhance_html};
use crate::extract::{ContentExtractor, ReadableExtractor};
use crate::fetch::{FetchConfig, Fetcher, HttpFetcher, fetch_file};
use crate::output::{OutputTarget, artifact_path, write_artifact};
use crate::print::extract_print_fragments;
use crate::render::{ChromiumRenderer, Renderer};
use crate::{Article, ColligoError, Result};

/// Per-invocation configuration.
#[derive(Debug, Clone)]
pub struct Options {
    /// Emit one artifact per URL instead of a single merged artifact.
    pub individual: bool,
    /// Explicit output path; `None` derives a name from the content.
    pub output: Option<PathBuf>,
    /// Replacement stylesheet file.
    pub style: Option<PathBuf>,
    /// Extra CSS appended after the stylesheet.
    pub css: Option<String>,
    /// Replacement page template file.
    pub template: Option<PathBuf>,
    /// Whether the browser sandbox stays enabled.
    pub sandbox: bool,
    /// HTTP fetch settings.
    pub fetch: FetchConfig,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            individual: false,
            output: None,
            style: None,
            css: None,
            template: None,
            sandbox: true,
            fetch: FetchConfig::default(),
        }
    }
}

/// Bundles `urls` into PDF output.
pub async fn pdf(urls: &[String], options: &Options) -> Result<Vec<PathBuf>> {
    run(urls, OutputTarget::Pdf, options).await
}

/// Bundles `urls` into EPUB output.
pub async fn epub(urls: &[String], options: &Options) -> Result<Vec<PathBuf>> {
    run(urls, OutputTarget::Epub, options).await
}

/// Bundles `urls` into HTML output.
pub async fn html(urls: &[String], options: &Options) -> Result<Vec<PathBuf>> {
    run(urls, OutputTarget::Html, options).await
}

/// Runs a batch with the default capabilities: HTTP fetching, the
/// bundled extractor, and a headless Chromium session.
async fn run(urls: &[String], target: OutputTarget, options: &Options) -> Result<Vec<PathBuf>> {
    let fetcher = HttpFetcher::new(options.fetch.clone());
    let extractor = ReadableExtractor::default();
    let mut renderer = ChromiumRenderer::launch(options.sandbox).await?;

    let result = run_batch_with(&fetcher, &extractor, &renderer, urls, target, options).await;

    // The session is released regardless of how the batch ended.
    if let Err(close_err) = renderer.close().await {
        tracing::warn!(error = %close_err, "failed to close rendering session");
    }

    result
}

/// Runs a batch against caller-supplied capabilities.
///
/// The entry point integration tests use to substitute doubles for the
/// network and the browser.
pub async fn run_batch_with(
    fetcher: &dyn Fetcher,
    extractor: &dyn ContentExtractor,
    renderer: &dyn Renderer,
    urls: &[String],
    target: OutputTarget,
    options: &Options,
) -> Result<Vec<PathBuf>> {
    if urls.is_empty() {
        return Err(ColligoError::NoContent);
    }

    let style = load_style(options)?;
    let template = load_template(options)?;
    let stylesheet = Stylesheet::parse(&style);

    if options.individual {
        run_individual(fetcher, extractor, renderer, urls, target, options, &style, &template, &stylesheet).await
    } else {
        run_merged(fetcher, extractor, renderer, urls, target, options, &style, &template, &stylesheet).await
    }
}

/// Fetches one URL and extracts its article, applying the enhancement
/// pipeline in between.
async fn fetch_and_extract(
    fetcher: &dyn Fetcher,
    extractor: &dyn ContentExtractor,
    url: &str,
) -> Result<Article> {
    tracing::debug!(url, "fetching");
    let raw = fetcher.fetch(url).await?;

    let config = EnhanceConfig { base_url: Url::parse(url).ok() };
    let enhanced = enhance_html(&raw, &config);

    tracing::debug!(url, "extracting");
    extractor.extract(&enhanced, url)
}

/// Merged mode: everything is fetched and extracted first, in input
/// order, then composed and rendered once. Any per-URL failure aborts
/// the whole batch; there is no partial-merge output.
#[allow(clippy::too_many_arguments)]
async fn run_merged(
    fetcher: &dyn Fetcher,
    extractor: &dyn ContentExtractor,
    renderer: &dyn Renderer,
    urls: &[String],
    target: OutputTarget,
    options: &Options,
    style: &str,
    template: &str,
    stylesheet: &Stylesheet,
) -> Result<Vec<PathBuf>> {
    let mut articles = Vec::with_capacity(urls.len());
    for url in urls {
        articles.push(fetch_and_extract(fetcher, extractor, url).await?);
    }

    let composed = compose(&articles, style, template)?;
    let fragments = extract_print_fragments(&composed.html, stylesheet);
    let path = artifact_path(options.output.as_deref(), &articles, target);

    let written = write_artifact(renderer, &composed, &fragments, target, &path).await?;
    Ok(vec![written])
}

/// Individual mode: each URL is fully pipelined on its own. Fetch and
/// extraction failures are reported and skipped; rendering and write
/// failures stay fatal to the batch.
#[allow(clippy::too_many_arguments)]
async fn run_individual(
    fetcher: &dyn Fetcher,
    extractor: &dyn ContentExtractor,
    renderer: &dyn Renderer,
    urls: &[String],
    target: OutputTarget,
    options: &Options,
    style: &str,
    template: &str,
    stylesheet: &Stylesheet,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    for url in urls {
        let article = match fetch_and_extract(fetcher, extractor, url).await {
            Ok(article) => article,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "skipping URL");
                continue;
            }
        };

        let articles = [article];
        let composed = compose(&articles, style, template)?;
        let fragments = extract_print_fragments(&composed.html, stylesheet);

        // An explicit file path can only name one artifact; with several
        // URLs it is honored only when it is a directory, otherwise each
        // artifact falls back to its derived name.
        let explicit = match options.output.as_deref() {
            Some(path) if urls.len() > 1 && !path.is_dir() => None,
            other => other,
        };
        let path = artifact_path(explicit, &articles, target);

        written.push(write_artifact(renderer, &composed, &fragments, target, &path).await?);
    }

    if written.is_empty() {
        return Err(ColligoError::NoContent);
    }

    Ok(written)
}

fn load_style(options: &Options) -> Result<String> {
    let mut style = match &options.style {
        Some(path) => fetch_file(&path.to_string_lossy())?,
        None => DEFAULT_STYLE.to_string(),
    };

    if let Some(extra) = &options.css {
        style.push('\n');
        style.push_str(extra);
    }

    Ok(style)
}

fn load_template(options: &Options) -> Result<String> {
    match &options.template {
        Some(path) => fetch_file(&path.to_string_lossy()),
        None => Ok(DEFAULT_TEMPLATE.to_string()),
    }
}
