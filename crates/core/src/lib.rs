pub mod article;
pub mod compose;
pub mod css;
pub mod ebook;
pub mod enhance;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod output;
pub mod pipeline;
pub mod print;
pub mod render;

pub use article::Article;
pub use compose::{ComposedDocument, DEFAULT_STYLE, DEFAULT_TEMPLATE, compose};
pub use css::{CssRule, Stylesheet};
pub use ebook::build_epub;
pub use enhance::{ANCHOR_CLASS, DEAD_LINK_CLASS, EnhanceConfig, enhance_html};
pub use error::{ColligoError, Result};
pub use extract::{ContentExtractor, ExtractOptions, ReadableExtractor};
pub use fetch::{FetchConfig, Fetcher, HttpFetcher, fetch_file};
pub use output::{OutputTarget, artifact_path, slugify, write_artifact};
pub use pipeline::{Options, epub, html, pdf, run_batch_with};
pub use print::{PrintFragments, extract_print_fragments};
pub use render::{ChromiumRenderer, PdfOptions, Renderer};
