//! Price detection.
//!
//! Strategies, first success wins:
//! 1. JSON-LD `offers.price` / `offers.priceSpecification.price`
//! 2. `product:price:amount` / `price` meta tags
//! 3. Currency patterns in visible text, in fixed priority order
//!
//! Text patterns are tried strictly in list order: a `$` amount anywhere on the
//! page outranks `NT$`, `TWD` and `EUR` amounts.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::jsonld::{Object, StructuredData, objects};
use super::normalize::{coerce_number, coerce_str};
use super::page::Page;

/// Amount with optional thousands separators and up to two decimals.
const AMOUNT: &str = r"([0-9][0-9,]*(?:\.[0-9]{1,2})?)";

static CURRENCY_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        format!(r"(?i)\bUSD\s*\$?\s*{AMOUNT}"),
        format!(r"\$\s*{AMOUNT}"),
        format!(r"(?i)\bNT\$?\s*{AMOUNT}"),
        format!(r"(?i)\bTWD\s*{AMOUNT}"),
        format!(r"(?i)\bEUR\s*€?\s*{AMOUNT}"),
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("invalid regex"))
    .collect()
});

/// Find the page's price, if any strategy yields one.
pub fn find_price(page: &Page) -> Option<f64> {
    let data = StructuredData::from_page(page);
    price_from_structured(&data)
        .or_else(|| price_from_meta(page))
        .or_else(|| price_from_text(&page.visible_text()))
}

/// First coercible offer price across all structured items.
pub fn price_from_structured(data: &StructuredData) -> Option<f64> {
    data.items()
        .flat_map(|item| objects(item.get("offers")))
        .find_map(offer_price)
}

fn offer_price(offer: &Object) -> Option<f64> {
    let direct = offer.get("price").filter(|price| is_present(price));
    let raw = direct.or_else(|| {
        objects(offer.get("priceSpecification"))
            .into_iter()
            .find_map(|spec| spec.get("price").filter(|price| is_present(price)))
    })?;

    coerce_number(raw)
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

/// Price from `product:price:amount` (property) or `price` (name) meta tags.
pub fn price_from_meta(page: &Page) -> Option<f64> {
    let content = page
        .meta_content("property", "product:price:amount")
        .or_else(|| page.meta_content("name", "price"))?;

    coerce_str(&content)
}

/// Price from the first currency pattern that matches `text`.
pub fn price_from_text(text: &str) -> Option<f64> {
    CURRENCY_PATTERNS.iter().find_map(|pattern| {
        let amount = pattern.captures(text)?.get(1)?.as_str().replace(',', "");
        amount.parse::<f64>().ok().filter(|price| price.is_finite())
    })
}
