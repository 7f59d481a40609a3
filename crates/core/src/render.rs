//! Headless rendering.
//!
//! This module defines the [`Renderer`] capability the output dispatcher
//! depends on, and the default [`ChromiumRenderer`] implementation over a
//! Chrome DevTools session. Exactly one browser session is held open per
//! invocation; [`Renderer::close`] must be called on both the success and
//! failure paths and is the only way the session is released.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::{ColligoError, Result};

/// Page-layout options for PDF rendering.
///
/// Header and footer are literal, self-styled HTML fragments; see the
/// print-fragment extractor for how they are produced.
#[derive(Debug, Clone)]
pub struct PdfOptions {
    pub header_template: String,
    pub footer_template: String,
    pub print_background: bool,
    pub prefer_css_page_size: bool,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            header_template: String::new(),
            footer_template: String::new(),
            print_background: true,
            prefer_css_page_size: true,
        }
    }
}

/// Capability for rendering a composed document.
///
/// `url` is a reference to the document, normally a `file://` URL to the
/// staged source document.
#[async_trait]
pub trait Renderer: Send {
    /// Renders the document to a PDF byte stream.
    async fn render_pdf(&self, url: &str, options: &PdfOptions) -> Result<Vec<u8>>;

    /// Returns the live-rendered body markup of the document.
    async fn render_html(&self, url: &str) -> Result<String>;

    /// Releases the rendering session. Required on every invocation
    /// path, including after a rendering failure.
    async fn close(&mut self) -> Result<()>;
}

/// Default renderer driving a headless Chromium session over CDP.
pub struct ChromiumRenderer {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

impl ChromiumRenderer {
    /// Launches a headless browser session.
    ///
    /// `sandbox: false` disables the Chromium sandbox, which container
    /// environments without user namespaces require.
    pub async fn launch(sandbox: bool) -> Result<Self> {
        let mut builder = BrowserConfig::builder();
        if !sandbox {
            builder = builder.no_sandbox();
        }
        let config = builder.build().map_err(ColligoError::RenderFailed)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ColligoError::RenderFailed(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(Self { browser, handler_task })
    }

    async fn open(&self, url: &str) -> Result<Page> {
        let page = self
            .browser
            .new_page(url)
            .await
            .map_err(|e| ColligoError::RenderFailed(e.to_string()))?;

        page.wait_for_navigation()
            .await
            .map_err(|e| ColligoError::RenderFailed(e.to_string()))?;

        Ok(page)
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn render_pdf(&self, url: &str, options: &PdfOptions) -> Result<Vec<u8>> {
        let page = self.open(url).await?;

        let params = PrintToPdfParams {
            display_header_footer: Some(true),
            header_template: Some(options.header_template.clone()),
            footer_template: Some(options.footer_template.clone()),
            print_background: Some(options.print_background),
            prefer_css_page_size: Some(options.prefer_css_page_size),
            ..Default::default()
        };

        page.pdf(params)
            .await
            .map_err(|e| ColligoError::RenderFailed(e.to_string()))
    }

    async fn render_html(&self, url: &str) -> Result<String> {
        let page = self.open(url).await?;

        page.content()
            .await
            .map_err(|e| ColligoError::RenderFailed(e.to_string()))
    }

    async fn close(&mut self) -> Result<()> {
        let closed = self.browser.close().await;
        let waited = self.browser.wait().await;
        self.handler_task.abort();

        closed.map_err(|e| ColligoError::RenderFailed(e.to_string()))?;
        waited.map_err(|e| ColligoError::RenderFailed(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_options_default() {
        let options = PdfOptions::default();
        assert!(options.print_background);
        assert!(options.prefer_css_page_size);
        assert!(options.header_template.is_empty());
        assert!(options.footer_template.is_empty());
    }
}
