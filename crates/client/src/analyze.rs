//! Page analysis entry points.
//!
//! Picks one site parser per page, runs it, and normalizes every text field of
//! its record. Parser outputs are never merged or retried.

use productmcp_core::{Analysis, ProductRecord};
use url::Url;

use crate::extract::{Page, normalize};
use crate::fetch::{PageSource, canonicalize};
use crate::sites::parser_for;

/// Extract a normalized record from a parsed page.
pub fn extract(page: &Page) -> ProductRecord {
    let parser = parser_for(page);
    tracing::debug!(parser = parser.name, url = %page.url(), "extracting product fields");

    let record = (parser.parse)(page);
    if record.is_empty() {
        tracing::debug!(parser = parser.name, url = %page.url(), "no product fields found");
    }

    ProductRecord {
        name: record.name.as_deref().and_then(normalize),
        brand: record.brand.as_deref().and_then(normalize),
        model: record.model.as_deref().and_then(normalize),
        price: record.price,
        spec: record.spec.as_deref().and_then(normalize),
        imagelink: record.imagelink,
    }
}

/// Parse `html` as the page at `url` and extract its record.
pub fn analyze_html(url: Url, html: &str) -> ProductRecord {
    extract(&Page::parse(url, html))
}

/// Fetch `url` through `source` and extract its record.
///
/// A fetch failure becomes [`Analysis::Failed`] carrying
/// `Failed to fetch page: <reason>`. Extraction uses the requested URL, so query
/// parameters survive redirects.
pub async fn analyze_url<S>(source: &S, url: &str) -> Analysis<ProductRecord>
where
    S: PageSource + ?Sized,
{
    let target = match canonicalize(url) {
        Ok(target) => target,
        Err(e) => return fetch_failed(e),
    };

    match source.fetch_html(target.as_str()).await {
        Ok(html) => Analysis::Record(analyze_html(target, &html)),
        Err(e) => fetch_failed(e),
    }
}

fn fetch_failed(reason: impl std::fmt::Display) -> Analysis<ProductRecord> {
    tracing::warn!("page fetch failed: {}", reason);
    Analysis::Failed { error: format!("Failed to fetch page: {}", reason) }
}
