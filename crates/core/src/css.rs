//! Stylesheet parsing.
//!
//! A deliberately small CSS scanner: the pipeline consults the composed
//! document's stylesheet only to pull the declaration blocks of the
//! header and footer template selectors, so all this module needs is a
//! brace-aware walk that records `(selector, declarations)` pairs,
//! descending into grouped at-rules like `@media print`.

use regex::Regex;

/// One style rule: a selector list and its flattened declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssRule {
    pub selector: String,
    pub declarations: String,
}

/// A parsed stylesheet, queryable by exact selector.
///
/// Read-only; derived fresh for each invocation.
#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
    rules: Vec<CssRule>,
}

impl Stylesheet {
    /// Parses CSS text. Malformed input never errors; unparseable trailing
    /// text is ignored.
    pub fn parse(css: &str) -> Self {
        let comment_re = Regex::new(r"(?s)/\*.*?\*/").unwrap();
        let stripped = comment_re.replace_all(css, "");

        let mut rules = Vec::new();
        collect_rules(&stripped, &mut rules);
        Self { rules }
    }

    /// All parsed rules, in source order.
    pub fn rules(&self) -> &[CssRule] {
        &self.rules
    }

    /// Joined declarations of every rule whose selector list contains
    /// exactly `selector`, or `None` when no rule matches.
    pub fn declarations_for(&self, selector: &str) -> Option<String> {
        let matching: Vec<&str> = self
            .rules
            .iter()
            .filter(|rule| rule.selector.split(',').any(|s| s.trim() == selector))
            .map(|rule| rule.declarations.as_str())
            .filter(|decls| !decls.is_empty())
            .collect();

        if matching.is_empty() { None } else { Some(matching.join("; ")) }
    }
}

/// Walks one block of CSS text, appending rules found at this level and
/// recursing into at-rule bodies that contain nested rules.
fn collect_rules(css: &str, rules: &mut Vec<CssRule>) {
    let bytes = css.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        let Some(open_rel) = css[pos..].find('{') else { break };
        let open = pos + open_rel;

        // Statement-style at-rules (@import, @charset) end at a semicolon
        // before any block opens.
        if let Some(semi_rel) = css[pos..open].rfind(';') {
            pos += semi_rel + 1;
        }

        let prelude = css[pos..open].trim().to_string();

        let Some(close) = matching_brace(css, open) else { break };
        let body = &css[open + 1..close];

        if prelude.starts_with('@') {
            // Grouped at-rules (@media, @supports) nest full rules;
            // others (@page, @font-face) hold declarations we can index
            // under the at-rule name itself.
            if body.contains('{') {
                collect_rules(body, rules);
            } else {
                rules.push(CssRule {
                    selector: prelude,
                    declarations: normalize_declarations(body),
                });
            }
        } else if !prelude.is_empty() {
            rules.push(CssRule {
                selector: prelude,
                declarations: normalize_declarations(body),
            });
        }

        pos = close + 1;
    }
}

/// Index of the brace closing the one at `open`, if balanced.
fn matching_brace(css: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in css[open..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Flattens a declaration block to `prop: value; prop: value`.
fn normalize_declarations(body: &str) -> String {
    body.split(';')
        .map(str::trim)
        .filter(|decl| !decl.is_empty())
        .collect::<Vec<_>>()
        .join("; ")
}
