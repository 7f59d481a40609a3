//! Print header/footer fragment extraction.
//!
//! The headless renderer accepts page header and footer content only as
//! fully self-styled HTML fragments; a stylesheet link inside them is
//! ignored. This module locates the `.header-template` and
//! `.footer-template` elements in the composed document and projects the
//! matching stylesheet rule's declarations into the inline style of each
//! fragment's first child, so styling authored as ordinary CSS survives
//! the handoff.

use scraper::{Html, Selector};

use crate::css::Stylesheet;

const HEADER_CLASS: &str = "header-template";
const FOOTER_CLASS: &str = "footer-template";

/// Self-styled header and footer fragments for page-margin rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintFragments {
    pub header: String,
    pub footer: String,
}

/// Extracts and inlines the header/footer fragments of a composed
/// document.
///
/// Missing template elements fall back to an empty `<span>`; a missing
/// stylesheet rule leaves the fragment's inline style untouched.
pub fn extract_print_fragments(composed_html: &str, stylesheet: &Stylesheet) -> PrintFragments {
    PrintFragments {
        header: build_fragment(composed_html, stylesheet, HEADER_CLASS),
        footer: build_fragment(composed_html, stylesheet, FOOTER_CLASS),
    }
}

fn build_fragment(composed_html: &str, stylesheet: &Stylesheet, class: &str) -> String {
    let fragment = select_fragment(composed_html, class).unwrap_or_else(|| "<span></span>".to_string());

    let Some(declarations) = stylesheet.declarations_for(&format!(".{}", class)) else {
        return fragment;
    };

    if declarations.is_empty() {
        return fragment;
    }

    inline_into_first_child(&fragment, class, &declarations)
}

/// Outer HTML of the first element carrying `class`, if any.
fn select_fragment(composed_html: &str, class: &str) -> Option<String> {
    let doc = Html::parse_document(composed_html);
    let sel = Selector::parse(&format!(".{}", class)).ok()?;
    doc.select(&sel).next().map(|el| el.html())
}

/// Merges `declarations` into the inline style of the fragment's first
/// child element. Extracted declarations come first and any existing
/// inline style is appended, so existing style wins a direct textual
/// conflict.
fn inline_into_first_child(fragment: &str, class: &str, declarations: &str) -> String {
    let mut styled_one = false;

    let mut output = String::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: vec![lol_html::element!(format!(".{} > *", class), |el| {
                if !styled_one {
                    styled_one = true;
                    let merged = match el.get_attribute("style") {
                        Some(existing) if !existing.trim().is_empty() => {
                            format!("{}; {}", declarations, existing)
                        }
                        _ => declarations.to_string(),
                    };
                    el.set_attribute("style", &merged).ok();
                }
                Ok(())
            })],
            ..Default::default()
        },
        |c: &[u8]| {
            output.push_str(&String::from_utf8_lossy(c));
        },
    );

    if rewriter.write(fragment.as_bytes()).is_err() {
        return fragment.to_string();
    }

    if rewriter.end().is_err() {
        return fragment.to_string();
    }

    if output.is_empty() { fragment.to_string() } else { output }
}
