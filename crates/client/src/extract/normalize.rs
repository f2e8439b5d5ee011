//! Text normalization and numeric coercion for extracted fields.
//!
//! `normalize` is the last step every textual product field goes through. It
//! is idempotent: the pipeline is applied until the text stops changing.

use std::borrow::Cow;

use html_escape::decode_html_entities;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use unicode_normalization::UnicodeNormalization;

static INCH_MARK: Lazy<Regex> = Lazy::new(|| Regex::new(r#"([0-9])\s*""#).expect("invalid regex"));
static FOOT_MARK: Lazy<Regex> = Lazy::new(|| Regex::new(r"([0-9])\s*'").expect("invalid regex"));

/// Collapse whitespace runs to one space and trim. Empty results become `None`.
pub fn clean_text(text: &str) -> Option<String> {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() { None } else { Some(collapsed) }
}

/// Canonicalize a textual field for output.
///
/// Steps, in order:
/// 1. Decode HTML entities (`&Oslash;` -> `Ø`)
/// 2. Unicode NFC composition
/// 3. Digit-adjacent ASCII inch/foot marks become `″` / `′`; an escaped `\"` becomes `″`
/// 4. Remove every backslash
/// 5. Replace `"` with `”` so serializers never need to escape it
/// 6. Collapse whitespace and trim
///
/// Returns `None` when nothing is left.
pub fn normalize(text: &str) -> Option<String> {
    // Each changing pass either shortens the text or rewrites ASCII marks one way, so this settles.
    let mut current = normalize_pass(text);
    loop {
        let next = normalize_pass(&current);
        if next == current {
            break;
        }
        current = next;
    }

    if current.is_empty() { None } else { Some(current) }
}

fn normalize_pass(text: &str) -> String {
    let decoded = decode_html_entities(text);
    let composed: String = decoded.nfc().collect();

    let t = INCH_MARK.replace_all(&composed, "${1}″");
    let t = FOOT_MARK.replace_all(&t, "${1}′");
    let t = t.replace("\\\"", "″");

    let t = t.replace('\\', "");
    let t = t.replace('"', "”");

    t.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Best-effort conversion of a JSON value to a price-like number.
///
/// Numbers are taken as-is, strings go through [`coerce_str`]. Anything else,
/// and any negative or non-finite result, yields `None`.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => coerce_str(s)?,
        _ => return None,
    };

    if n.is_finite() && n >= 0.0 { Some(n) } else { None }
}

/// Parse a string after dropping every character that is not an ASCII digit or `.`.
pub fn coerce_str(text: &str) -> Option<f64> {
    let digits: Cow<'_, str> = if text.chars().all(|c| c.is_ascii_digit() || c == '.') {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect())
    };

    digits.parse::<f64>().ok().filter(|n| n.is_finite())
}
