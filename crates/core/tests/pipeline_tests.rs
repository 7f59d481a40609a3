//! Batch pipeline integration tests, run against capability doubles so
//! no network access or browser session is required.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use colligo_core::*;

/// Serves canned pages from memory.
struct StubFetcher {
    pages: HashMap<String, String>,
}

impl StubFetcher {
    fn new(pages: &[(&str, &str)]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(url, html)| (url.to_string(), html.to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.pages.get(url).cloned().ok_or_else(|| ColligoError::FetchFailed {
            url: url.to_string(),
            reason: "no such page".to_string(),
        })
    }
}

/// Echoes the staged source document back instead of driving a browser.
struct StubRenderer {
    fail_pdf: bool,
}

impl StubRenderer {
    fn new() -> Self {
        Self { fail_pdf: false }
    }

    fn failing_pdf() -> Self {
        Self { fail_pdf: true }
    }

    fn staged_html(url: &str) -> String {
        let path = url.strip_prefix("file://").unwrap_or(url);
        std::fs::read_to_string(path).expect("staged source document should exist")
    }
}

#[async_trait]
impl Renderer for StubRenderer {
    async fn render_pdf(&self, url: &str, options: &PdfOptions) -> Result<Vec<u8>> {
        if self.fail_pdf {
            return Err(ColligoError::RenderFailed("print failed".to_string()));
        }
        let html = Self::staged_html(url);
        Ok(format!("%PDF\n{}\n{}\n{}", options.header_template, options.footer_template, html).into_bytes())
    }

    async fn render_html(&self, url: &str) -> Result<String> {
        Ok(Self::staged_html(url))
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><title>{}</title></head><body><article>{}</article></body></html>",
        title, body
    )
}

fn count_files(dir: &std::path::Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

#[tokio::test]
async fn merged_html_bundles_both_articles_in_order() {
    let fetcher = StubFetcher::new(&[
        ("https://example.com/one", &page("Page One", "<p>First body</p>")),
        ("https://example.com/two", &page("Page Two", "<p>Second body</p>")),
    ]);
    let extractor = ReadableExtractor::default();
    let renderer = StubRenderer::new();
    let dir = tempfile::tempdir().unwrap();

    let options = Options { output: Some(dir.path().to_path_buf()), ..Default::default() };
    let urls = vec![
        "https://example.com/one".to_string(),
        "https://example.com/two".to_string(),
    ];

    let written = run_batch_with(&fetcher, &extractor, &renderer, &urls, OutputTarget::Html, &options)
        .await
        .unwrap();

    assert_eq!(written.len(), 1);
    assert_eq!(count_files(dir.path()), 1);

    let output = std::fs::read_to_string(&written[0]).unwrap();
    let first = output.find("First body").unwrap();
    let second = output.find("Second body").unwrap();
    assert!(first < second);
}

#[tokio::test]
async fn individual_mode_skips_failing_url() {
    let fetcher = StubFetcher::new(&[
        ("https://example.com/good", &page("Good Page", "<p>Body</p>")),
        // Empty body: extraction finds no content region.
        (
            "https://example.com/bad",
            "<html><head><title>Bad</title></head><body>   </body></html>",
        ),
    ]);
    let extractor = ReadableExtractor::default();
    let renderer = StubRenderer::new();
    let dir = tempfile::tempdir().unwrap();

    let options = Options {
        individual: true,
        output: Some(dir.path().to_path_buf()),
        ..Default::default()
    };
    let urls = vec![
        "https://example.com/good".to_string(),
        "https://example.com/bad".to_string(),
    ];

    let written = run_batch_with(&fetcher, &extractor, &renderer, &urls, OutputTarget::Html, &options)
        .await
        .unwrap();

    assert_eq!(written.len(), 1);
    assert_eq!(count_files(dir.path()), 1);
    assert_eq!(written[0], dir.path().join("good-page.html"));
}

#[tokio::test]
async fn merged_mode_failing_extraction_writes_nothing() {
    let fetcher = StubFetcher::new(&[
        ("https://example.com/good", &page("Good Page", "<p>Body</p>")),
        (
            "https://example.com/bad",
            "<html><head><title>Bad</title></head><body>   </body></html>",
        ),
    ]);
    let extractor = ReadableExtractor::default();
    let renderer = StubRenderer::new();
    let dir = tempfile::tempdir().unwrap();

    let options = Options { output: Some(dir.path().to_path_buf()), ..Default::default() };
    let urls = vec![
        "https://example.com/good".to_string(),
        "https://example.com/bad".to_string(),
    ];

    let result = run_batch_with(&fetcher, &extractor, &renderer, &urls, OutputTarget::Html, &options).await;

    assert!(matches!(result, Err(ColligoError::ExtractionFailed { url }) if url.contains("bad")));
    assert_eq!(count_files(dir.path()), 0);
}

#[tokio::test]
async fn merged_mode_failing_fetch_aborts_batch() {
    let fetcher = StubFetcher::new(&[("https://example.com/one", &page("One", "<p>x</p>"))]);
    let extractor = ReadableExtractor::default();
    let renderer = StubRenderer::new();
    let dir = tempfile::tempdir().unwrap();

    let options = Options { output: Some(dir.path().to_path_buf()), ..Default::default() };
    let urls = vec![
        "https://example.com/one".to_string(),
        "https://example.com/missing".to_string(),
    ];

    let result = run_batch_with(&fetcher, &extractor, &renderer, &urls, OutputTarget::Html, &options).await;

    assert!(matches!(result, Err(ColligoError::FetchFailed { .. })));
    assert_eq!(count_files(dir.path()), 0);
}

#[tokio::test]
async fn single_article_artifact_is_named_from_title() {
    let fetcher = StubFetcher::new(&[(
        "https://example.com/hello",
        &page("Hello World!", "<p>Greetings</p>"),
    )]);
    let extractor = ReadableExtractor::default();
    let renderer = StubRenderer::new();
    let dir = tempfile::tempdir().unwrap();

    let options = Options { output: Some(dir.path().to_path_buf()), ..Default::default() };
    let urls = vec!["https://example.com/hello".to_string()];

    let written = run_batch_with(&fetcher, &extractor, &renderer, &urls, OutputTarget::Html, &options)
        .await
        .unwrap();

    assert_eq!(written[0], dir.path().join("hello-world.html"));
}

#[tokio::test]
async fn pdf_target_receives_styled_print_fragments() {
    let fetcher = StubFetcher::new(&[("https://example.com/one", &page("One", "<p>Body</p>"))]);
    let extractor = ReadableExtractor::default();
    let renderer = StubRenderer::new();
    let dir = tempfile::tempdir().unwrap();

    let options = Options { output: Some(dir.path().to_path_buf()), ..Default::default() };
    let urls = vec!["https://example.com/one".to_string()];

    let written = run_batch_with(&fetcher, &extractor, &renderer, &urls, OutputTarget::Pdf, &options)
        .await
        .unwrap();

    // The stub prepends both fragments; the default stylesheet rules
    // must have been projected into inline styles.
    let artifact = std::fs::read_to_string(&written[0]).unwrap();
    assert!(artifact.starts_with("%PDF"));
    assert!(artifact.contains("header-template"));
    assert!(artifact.contains("margin: 0 auto"));
}

#[tokio::test]
async fn render_failure_leaves_no_artifact() {
    let fetcher = StubFetcher::new(&[("https://example.com/one", &page("One", "<p>Body</p>"))]);
    let extractor = ReadableExtractor::default();
    let renderer = StubRenderer::failing_pdf();
    let dir = tempfile::tempdir().unwrap();

    let options = Options { output: Some(dir.path().to_path_buf()), ..Default::default() };
    let urls = vec!["https://example.com/one".to_string()];

    let result = run_batch_with(&fetcher, &extractor, &renderer, &urls, OutputTarget::Pdf, &options).await;

    assert!(matches!(result, Err(ColligoError::RenderFailed(_))));
    assert_eq!(count_files(dir.path()), 0);
}

#[tokio::test]
async fn empty_url_list_is_no_content() {
    let fetcher = StubFetcher::new(&[]);
    let extractor = ReadableExtractor::default();
    let renderer = StubRenderer::new();

    let result = run_batch_with(&fetcher, &extractor, &renderer, &[], OutputTarget::Html, &Options::default()).await;

    assert!(matches!(result, Err(ColligoError::NoContent)));
}

#[tokio::test]
async fn epub_target_writes_container() {
    let fetcher = StubFetcher::new(&[("https://example.com/one", &page("One", "<p>Body</p>"))]);
    let extractor = ReadableExtractor::default();
    let renderer = StubRenderer::new();
    let dir = tempfile::tempdir().unwrap();

    let options = Options { output: Some(dir.path().to_path_buf()), ..Default::default() };
    let urls = vec!["https://example.com/one".to_string()];

    let written = run_batch_with(&fetcher, &extractor, &renderer, &urls, OutputTarget::Epub, &options)
        .await
        .unwrap();

    assert_eq!(written[0], dir.path().join("one.epub"));
    let bytes = std::fs::read(&written[0]).unwrap();
    // OCF: the first bytes after the local header name the mimetype entry.
    assert_eq!(&bytes[0..2], b"PK");
}

#[test]
fn compose_round_trip_preserves_content() {
    let strip_ws = |s: &str| s.chars().filter(|c| !c.is_whitespace()).collect::<String>();

    let original = "<p>First paragraph.</p><p>Second paragraph.</p>";
    let articles = vec![Article::new(
        "https://example.com/one",
        "Round Trip",
        None,
        original,
        None,
    )];
    let composed = compose(&articles, DEFAULT_STYLE, DEFAULT_TEMPLATE).unwrap();

    let extractor = ReadableExtractor::default();
    let re_extracted = extractor.extract(&composed.html, "https://example.com/one").unwrap();

    assert!(strip_ws(&re_extracted.content).contains(&strip_ws(original)));
    assert_eq!(re_extracted.title, "Round Trip");
}
