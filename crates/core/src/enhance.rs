//! DOM enhancement passes applied to fetched markup before extraction.
//!
//! Each pass is a string-to-string rewrite of the serialized document,
//! mutating nothing outside its own output. Passes are idempotent and
//! safe to apply to a document that has already been through other
//! passes. Two orderings are load-bearing: relative-URI resolution runs
//! first, because later passes read `src`/`href` values to make
//! decisions, and site-chrome stripping precedes dead-link
//! neutralization, because removing chrome can orphan in-page anchors.

use std::borrow::Cow;
use std::collections::HashSet;

use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

/// Class marker attached to anchors that lost their destination.
///
/// The extractor is configured to preserve this class so the generic
/// boilerplate heuristic does not discard the neutralized anchors.
pub const DEAD_LINK_CLASS: &str = "x-dead-link";

/// Class marker attached to working in-page navigation anchors.
pub const ANCHOR_CLASS: &str = "x-anchor";

/// Configuration for the enhancement pipeline.
#[derive(Debug, Clone, Default)]
pub struct EnhanceConfig {
    /// Originating URL, used to resolve relative URIs and to decide
    /// whether source-specific cleanup applies. `None` for local input.
    pub base_url: Option<Url>,
}

/// Runs the full enhancement pipeline over a fetched document.
///
/// URI resolution runs first and chrome stripping precedes the
/// dead-link scan; the remaining pass order is incidental.
pub fn enhance_html(html: &str, config: &EnhanceConfig) -> String {
    let mut processed = html.to_string();

    if let Some(base_url) = &config.base_url {
        processed = resolve_relative_urls(&processed, base_url);
    }

    processed = lift_linked_image_sizes(&processed);
    processed = promote_single_image_figures(&processed);
    // Chrome stripping runs before the dead-link scan so anchors
    // pointing at removed chrome are neutralized, not marked live.
    processed = strip_site_chrome(&processed, config.base_url.as_ref());
    processed = neutralize_dead_links(&processed);

    processed
}

type Handler<'h> = (Cow<'static, lol_html::Selector>, lol_html::ElementContentHandlers<'h>);

/// Streams `html` through a lol_html rewriter, falling back to the
/// input unchanged when rewriting fails.
fn rewrite_html(html: &str, handlers: Vec<Handler<'_>>) -> String {
    let mut output = String::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings { element_content_handlers: handlers, ..Default::default() },
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

/// Appends a class to an element unless it is already present.
fn append_class(el: &mut lol_html::html_content::Element, class: &str) {
    match el.get_attribute("class") {
        Some(existing) => {
            if !existing.split_whitespace().any(|c| c == class) {
                el.set_attribute("class", &format!("{} {}", existing, class)).ok();
            }
        }
        None => {
            el.set_attribute("class", class).ok();
        }
    }
}

/// Rewrites relative URIs in URI-bearing attributes to absolute form.
///
/// Already-absolute URIs are left untouched, as are URIs that fail to
/// resolve against the base. Fragment-only hrefs stay relative: they
/// refer into the document itself, and the dead-link pass decides their
/// fate.
pub fn resolve_relative_urls(html: &str, base_url: &Url) -> String {
    let resolve = |el: &mut lol_html::html_content::Element, attr: &str, base: &Url| {
        if let Some(value) = el.get_attribute(attr)
            && !value.starts_with('#')
            && Url::parse(&value).is_err()
            && let Ok(absolute) = base.join(&value)
        {
            el.set_attribute(attr, absolute.as_str()).ok();
        }
    };

    let attrs: &[(&str, &str)] = &[
        ("a", "href"),
        ("link", "href"),
        ("img", "src"),
        ("source", "src"),
        ("video", "src"),
        ("audio", "src"),
    ];

    let handlers = attrs
        .iter()
        .map(|&(tag, attr)| {
            let base = base_url.clone();
            lol_html::element!(tag, move |el| {
                resolve(el, attr, &base);
                Ok(())
            })
        })
        .collect();

    rewrite_html(html, handlers)
}

/// Returns true when the URL path looks like an image resource.
fn is_image_url(href: &str) -> bool {
    let path = href.split(['?', '#']).next().unwrap_or(href);
    let lower = path.to_lowercase();
    ["png", "jpg", "jpeg", "gif", "webp", "svg", "avif"]
        .iter()
        .any(|ext| lower.ends_with(&format!(".{}", ext)))
}

/// Removes constraining size attributes from images wrapped in links to
/// full-size image resources.
///
/// A thumbnail linking to the original would otherwise render at
/// thumbnail dimensions in the bundled document.
pub fn lift_linked_image_sizes(html: &str) -> String {
    let doc = Html::parse_document(html);
    let Ok(link_sel) = Selector::parse("a[href] img[src]") else {
        return html.to_string();
    };

    let mut linked_sources: HashSet<String> = HashSet::new();
    for img in doc.select(&link_sel) {
        let in_image_link = img
            .ancestors()
            .filter_map(scraper::ElementRef::wrap)
            .filter(|el| el.value().name() == "a")
            .any(|a| a.value().attr("href").is_some_and(is_image_url));

        if in_image_link && let Some(src) = img.value().attr("src") {
            linked_sources.insert(src.to_string());
        }
    }

    if linked_sources.is_empty() {
        return html.to_string();
    }

    rewrite_html(
        html,
        vec![lol_html::element!("img", move |el| {
            if let Some(src) = el.get_attribute("src")
                && linked_sources.contains(&src)
            {
                el.remove_attribute("width");
                el.remove_attribute("height");
            }
            Ok(())
        })],
    )
}

/// Replaces paragraphs whose sole meaningful content is one image with a
/// `<figure>`, captioned from the image's `title` or `alt` when present.
pub fn promote_single_image_figures(html: &str) -> String {
    let paragraph_re =
        Regex::new(r#"(?is)<p(?:\s[^>]*)?>\s*((?:<a[^>]*>\s*)?<img[^>]*/?>\s*(?:</a>)?)\s*</p>"#).unwrap();
    let title_re = Regex::new(r#"(?is)\btitle\s*=\s*"([^"]*)""#).unwrap();
    let alt_re = Regex::new(r#"(?is)\balt\s*=\s*"([^"]*)""#).unwrap();

    paragraph_re
        .replace_all(html, |caps: &regex::Captures| {
            let inner = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            let caption = title_re
                .captures(inner)
                .or_else(|| alt_re.captures(inner))
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string())
                .filter(|text| !text.is_empty());

            match caption {
                Some(text) => format!("<figure>{}<figcaption>{}</figcaption></figure>", inner, text),
                None => format!("<figure>{}</figure>", inner),
            }
        })
        .to_string()
}

/// Strips interactivity from anchors with no usable destination.
///
/// Empty hrefs and fragment links whose target id does not exist in the
/// document lose their `href` and gain [`DEAD_LINK_CLASS`]; fragment
/// links with a live target gain [`ANCHOR_CLASS`] instead so they
/// survive extraction.
pub fn neutralize_dead_links(html: &str) -> String {
    let doc = Html::parse_document(html);
    let mut ids: HashSet<String> = HashSet::new();

    if let Ok(id_sel) = Selector::parse("[id]") {
        for el in doc.select(&id_sel) {
            if let Some(id) = el.value().attr("id") {
                ids.insert(id.to_string());
            }
        }
    }
    if let Ok(name_sel) = Selector::parse("a[name]") {
        for el in doc.select(&name_sel) {
            if let Some(name) = el.value().attr("name") {
                ids.insert(name.to_string());
            }
        }
    }

    rewrite_html(
        html,
        vec![lol_html::element!("a", move |el| {
            let href = el.get_attribute("href");
            match href.as_deref() {
                None | Some("") => {
                    el.remove_attribute("href");
                    append_class(el, DEAD_LINK_CLASS);
                }
                Some(h) if h.starts_with('#') => {
                    if ids.contains(&h[1..]) {
                        append_class(el, ANCHOR_CLASS);
                    } else {
                        el.remove_attribute("href");
                        append_class(el, DEAD_LINK_CLASS);
                    }
                }
                Some(_) => {}
            }
            Ok(())
        })],
    )
}

/// Removes site chrome the generic extractor misclassifies on known
/// sources. Currently covers Wikipedia's edit links and navigation
/// boxes. A no-op for unknown or local sources.
pub fn strip_site_chrome(html: &str, base_url: Option<&Url>) -> String {
    let is_wikipedia = base_url
        .and_then(|u| u.host_str().map(str::to_string))
        .is_some_and(|host| host == "wikipedia.org" || host.ends_with(".wikipedia.org"));

    if !is_wikipedia {
        return html.to_string();
    }

    let chrome_selectors = [
        ".mw-editsection",
        ".mw-jump-link",
        "#toc",
        ".navbox",
        ".vertical-navbox",
        ".hatnote",
    ];

    let handlers = chrome_selectors
        .iter()
        .map(|sel| {
            lol_html::element!(sel, |el| {
                el.remove();
                Ok(())
            })
        })
        .collect();

    rewrite_html(html, handlers)
}
