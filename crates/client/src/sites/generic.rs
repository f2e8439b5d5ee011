//! Fallback parser for pages no vendor parser claims.
//!
//! Every field is looked up independently and may come back empty; this
//! parser accepts any page and never fails.

use once_cell::sync::Lazy;
use productmcp_core::ProductRecord;
use regex::Regex;

use super::SiteParser;
use crate::extract::jsonld::text_field;
use crate::extract::page::{element_text, next_element_siblings};
use crate::extract::{Page, StructuredData, clean_text, find_image_generic, find_price};

const BRAND_META_KEYS: &[&str] = &["brand", "product:brand", "og:brand"];
const PRODUCT_TYPES: &[&str] = &["product", "individualproduct"];
const MODEL_FIELDS: &[&str] = &["mpn", "model", "sku"];

const SPEC_HEADINGS: &str = "h1, h2, h3, h4, h5, h6";
const SPEC_KEYWORDS: &[&str] = &["spec", "specification", "specifications", "規格", "技術規格", "產品規格"];
const SPEC_BLOCK_TAGS: &[&str] = &["table", "dl", "ul", "ol", "div", "p"];
/// How many element siblings after a spec heading are inspected.
const SPEC_SIBLING_WINDOW: usize = 6;

static LABELED_MODEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:model|型號)[:：]?\s*([A-Za-z0-9\-_.]{2,40})").expect("invalid regex"));

pub const PARSER: SiteParser = SiteParser { name: "generic", can_handle, parse };

pub fn can_handle(_page: &Page) -> bool {
    true
}

pub fn parse(page: &Page) -> ProductRecord {
    ProductRecord {
        name: page.html_title(),
        brand: find_brand(page),
        model: find_model(page),
        price: find_price(page),
        spec: find_spec(page),
        imagelink: find_image_generic(page),
    }
}

/// First non-blank brand meta tag, by `name` then `property` for each key.
pub fn find_brand(page: &Page) -> Option<String> {
    BRAND_META_KEYS.iter().find_map(|key| {
        page.meta_content("name", key)
            .or_else(|| page.meta_content("property", key))
            .and_then(|brand| clean_text(&brand))
    })
}

/// Model from structured product data, else a labeled `Model:` token in the page text.
pub fn find_model(page: &Page) -> Option<String> {
    let data = StructuredData::from_page(page);
    let structured = data.items_of_type(PRODUCT_TYPES).find_map(|item| {
        MODEL_FIELDS.iter().find_map(|field| text_field(item, field)).and_then(|model| clean_text(&model))
    });

    structured.or_else(|| {
        LABELED_MODEL
            .captures(&page.visible_text())
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
    })
}

/// Text of the block elements that follow the first heading mentioning specifications.
///
/// Headings whose following window holds no text are skipped.
pub fn find_spec(page: &Page) -> Option<String> {
    page.select(SPEC_HEADINGS).into_iter().find_map(|heading| {
        let label = element_text(heading).to_lowercase();
        if !SPEC_KEYWORDS.iter().any(|k| label.contains(k)) {
            return None;
        }

        let blocks: Vec<String> = next_element_siblings(heading)
            .take(SPEC_SIBLING_WINDOW)
            .filter(|sibling| SPEC_BLOCK_TAGS.contains(&sibling.value().name()))
            .filter_map(|sibling| clean_text(&sibling.text().collect::<Vec<_>>().join(" ")))
            .collect();

        if blocks.is_empty() { None } else { Some(blocks.join("\n")) }
    })
}
