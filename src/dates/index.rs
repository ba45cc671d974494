//! Indexed HTML documents with CSS-selector lookup.
//!
//! Wraps `scraper`'s best-effort parser: malformed third-party markup yields a
//! partial tree, never an error, so low-level parse problems surface as
//! "not found" rather than failures.

use scraper::{Html, Selector};

/// A parsed HTML document supporting first-match text and attribute lookup.
pub struct IndexedHtml {
    doc: Html,
}

impl IndexedHtml {
    /// Parse raw markup. Unclosed tags and invalid structure are tolerated.
    pub fn parse(raw: &str) -> Self {
        Self {
            doc: Html::parse_document(raw),
        }
    }

    /// Trimmed text content of the first element matching `css`.
    ///
    /// Returns None for no match, an empty match, or an invalid selector.
    pub fn first_text(&self, css: &str) -> Option<String> {
        let selector = Selector::parse(css).ok()?;
        let element = self.doc.select(&selector).next()?;
        let text: String = element.text().collect();
        let text = text.trim();
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    }

    /// Value of `attr` on the first element matching `css`.
    pub fn first_attr(&self, css: &str, attr: &str) -> Option<String> {
        let selector = Selector::parse(css).ok()?;
        let element = self.doc.select(&selector).next()?;
        let value = element.value().attr(attr)?.trim();
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }
}
