//! Page fetching.
//!
//! This module provides the [`Fetcher`] capability trait consumed by the
//! batch orchestrator, along with the default [`HttpFetcher`] backed by
//! reqwest and a local-file fallback for inputs that are not http(s) URLs.

use std::fs;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::{ColligoError, Result};

/// HTTP client configuration for fetching web pages.
///
/// This struct controls timeout and user agent settings for HTTP requests.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Custom User-Agent string.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            user_agent: "Mozilla/5.0 (compatible; Colligo/1.0; +https://github.com/stormlightlabs/colligo)".to_string(),
        }
    }
}

/// Capability for turning a URL into raw markup text.
///
/// The pipeline depends on this trait rather than on reqwest directly so
/// integration tests can substitute a double that serves canned HTML.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches the raw markup for `url`.
    ///
    /// Fails with [`ColligoError::FetchFailed`] on network or HTTP errors.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Default fetcher performing an HTTP GET with browser-like headers.
///
/// Inputs without an http(s) scheme are treated as local file paths,
/// which keeps piped fixture workflows working without a server.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    config: FetchConfig,
}

impl HttpFetcher {
    pub fn new(config: FetchConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return fetch_file(url);
        }

        let parsed_url = Url::parse(url).map_err(|e| ColligoError::InvalidUrl(e.to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(self.config.timeout))
            .build()
            .map_err(|e| ColligoError::FetchFailed { url: url.to_string(), reason: e.to_string() })?;

        let response = client
            .get(parsed_url)
            .header("User-Agent", &self.config.user_agent)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ColligoError::Timeout { timeout: self.config.timeout }
                } else {
                    ColligoError::FetchFailed { url: url.to_string(), reason: e.to_string() }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ColligoError::FetchFailed {
                url: url.to_string(),
                reason: format!("HTTP status {}", status),
            });
        }

        response
            .text()
            .await
            .map_err(|e| ColligoError::FetchFailed { url: url.to_string(), reason: e.to_string() })
    }
}

/// Reads HTML content from a local file.
pub fn fetch_file(path: &str) -> Result<String> {
    let path_ref = Path::new(path);

    if !path_ref.exists() {
        Err(ColligoError::FetchFailed {
            url: path.to_string(),
            reason: "file not found".to_string(),
        })
    } else {
        fs::read_to_string(path_ref).map_err(|e| ColligoError::FetchFailed {
            url: path.to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.timeout, 30);
        assert!(config.user_agent.contains("Colligo"));
    }

    #[test]
    fn test_fetch_url_invalid() {
        let fetcher = HttpFetcher::default();
        let result = std::thread::spawn(move || {
            tokio::runtime::Runtime::new()
                .unwrap()
                .block_on(fetcher.fetch("http://"))
        })
        .join()
        .unwrap();

        assert!(result.is_err());
    }

    #[test]
    fn test_fetch_file_not_found() {
        let result = fetch_file("/nonexistent/path/file.html");
        assert!(matches!(result, Err(ColligoError::FetchFailed { .. })));
    }

    #[test]
    fn test_url_validation() {
        assert!(Url::parse("http://example.com").is_ok());
        assert!(Url::parse("https://example.com").is_ok());
        assert!(Url::parse("example.com").is_err()); // Missing scheme
    }
}
