//! Error types for Colligo operations.
//!
//! This module defines the main error type [`ColligoError`] which represents
//! all possible errors that can occur while fetching pages, extracting
//! articles, composing the bundled document, and writing output artifacts.
//!
//! # Example
//!
//! ```rust
//! use colligo_core::{ColligoError, Result};
//!
//! fn compose(articles: &[String]) -> Result<String> {
//!     if articles.is_empty() {
//!         return Err(ColligoError::NoContent);
//!     }
//!     // ... composition logic
//!     # Ok(String::new())
//! }
//! ```

use thiserror::Error;

/// Main error type for the bundling pipeline.
///
/// The variants mirror the pipeline stages: fetching a URL, extracting
/// its readable content, composing the merged document, rendering it
/// through the headless browser, and writing the final artifact.
#[derive(Error, Debug)]
pub enum ColligoError {
    /// Fetching a URL failed.
    ///
    /// Wraps network errors, DNS failures, and non-success HTTP statuses.
    /// Carries the offending URL so batch reporting can name it.
    #[error("Failed to fetch {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    /// Request timeout.
    ///
    /// Returned when an HTTP request exceeds the configured timeout duration.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The extractor could not identify a main content region.
    ///
    /// In individual mode this aborts only the offending URL; in merged
    /// mode it aborts the whole batch.
    #[error("Could not extract readable content from {url}")]
    ExtractionFailed { url: String },

    /// No articles were available to compose.
    ///
    /// Returned when the composer is handed an empty article sequence,
    /// or when every URL in a batch was skipped.
    #[error("No content to bundle")]
    NoContent,

    /// HTML parsing errors, usually an invalid CSS selector.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// The headless rendering capability failed.
    ///
    /// Fatal to the current artifact; no partial output is left on disk.
    #[error("Rendering failed: {0}")]
    RenderFailed(String),

    /// Writing the final artifact failed.
    #[error("Failed to write output: {0}")]
    WriteFailed(#[from] std::io::Error),
}

/// Result type alias for ColligoError.
///
/// This is a convenience alias for `std::result::Result<T, ColligoError>`.
pub type Result<T> = std::result::Result<T, ColligoError>;
