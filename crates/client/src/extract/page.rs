//! Parsed product page: raw markup, parse tree and the URL it came from.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::normalize::clean_text;

/// Elements whose text is never visible on the rendered page.
const INVISIBLE_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// A product page ready for extraction.
///
/// The parse tree is read-only; strategies only query it.
pub struct Page {
    url: Url,
    raw: String,
    document: Html,
}

impl Page {
    /// Parse raw markup fetched from `url`.
    pub fn parse(url: Url, raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let document = Html::parse_document(&raw);
        Self { url, raw, document }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Raw markup as fetched.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Lower-cased host, empty when the URL has none.
    pub fn host(&self) -> String {
        self.url.host_str().unwrap_or_default().to_lowercase()
    }

    /// First value of a query parameter, trimmed; empty values count as absent.
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    /// Resolve `href` against the page URL.
    pub fn absolutize(&self, href: &str) -> Option<String> {
        self.url.join(href.trim()).ok().map(|u| u.to_string())
    }

    /// All elements matching a CSS selector, in document order.
    ///
    /// An unparsable selector matches nothing.
    pub fn select<'a>(&'a self, css: &str) -> Vec<ElementRef<'a>> {
        match Selector::parse(css) {
            Ok(selector) => self.document.select(&selector).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// First element matching a CSS selector.
    pub fn select_first<'a>(&'a self, css: &str) -> Option<ElementRef<'a>> {
        let selector = Selector::parse(css).ok()?;
        self.document.select(&selector).next()
    }

    /// Content of the first `<meta>` whose `attr` equals `key`, when non-blank.
    pub fn meta_content(&self, attr: &str, key: &str) -> Option<String> {
        let selector = Selector::parse("meta").ok()?;
        self.document
            .select(&selector)
            .find(|el| el.value().attr(attr) == Some(key))
            .and_then(|el| el.value().attr("content"))
            .map(str::trim)
            .filter(|content| !content.is_empty())
            .map(str::to_string)
    }

    /// Cleaned `<title>` text.
    pub fn html_title(&self) -> Option<String> {
        self.select_first("title").and_then(|title| clean_text(&element_text(title)))
    }

    /// Cleaned `<title>` text, falling back to the `og:title` meta tag.
    pub fn title(&self) -> Option<String> {
        self.html_title()
            .or_else(|| self.meta_content("property", "og:title").and_then(|t| clean_text(&t)))
    }

    /// Cleaned text of the first `<h1>`.
    pub fn first_heading(&self) -> Option<String> {
        self.select_first("h1").and_then(|h1| clean_text(&element_text(h1)))
    }

    /// Bodies of every `application/ld+json` script block, in document order.
    pub fn json_ld_blocks(&self) -> Vec<String> {
        self.select(r#"script[type="application/ld+json"]"#)
            .into_iter()
            .map(|script| script.text().collect::<String>())
            .collect()
    }

    /// Visible page text: trimmed text nodes joined by single spaces.
    pub fn visible_text(&self) -> String {
        let mut parts = Vec::new();

        for node in self.document.root_element().descendants() {
            let Some(text) = node.value().as_text() else {
                continue;
            };

            let hidden = node
                .parent()
                .and_then(|parent| parent.value().as_element())
                .is_some_and(|el| INVISIBLE_TAGS.contains(&el.name()));
            if hidden {
                continue;
            }

            let trimmed = text.trim();
            if !trimmed.is_empty() {
                parts.push(trimmed);
            }
        }

        parts.join(" ")
    }
}

/// All text under an element, concatenated as-is.
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Following element siblings of `element`, in document order.
pub fn next_element_siblings<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    element.next_siblings().filter_map(ElementRef::wrap)
}
