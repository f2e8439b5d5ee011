//! Split a vendor page title into product name, spec tail and model.
//!
//! Vendor titles read like `Vendor - MODEL Name, spec, spec`. The vendor
//! prefix and model token are stripped, then the rest splits at the first
//! comma.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

/// Plausible part-number token: upper-case alphanumerics with optional dash groups.
static MODEL_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([A-Z0-9]{1,10}(?:-[A-Z0-9]+)*)\b").expect("invalid regex"));
static LEADING_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\s\-–—:,]+").expect("invalid regex"));

/// Fields recovered from a title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleFields {
    pub name: Option<String>,
    pub spec: Option<String>,
    /// The model passed in, or the one inferred from the title.
    pub model: Option<String>,
}

/// Split `title` into name, spec and model.
///
/// A known `model` is only stripped when the title starts with it. Without
/// one, the first token matching [`MODEL_TOKEN`] is adopted and every
/// whole-word occurrence of it is removed. Inference takes the first plausible
/// token, which can be an unrelated word on unusual layouts.
pub fn split_title(title: &str, model: Option<&str>, vendor_prefix: &str) -> TitleFields {
    let title = strip_vendor_prefix(title, vendor_prefix);
    let title = title.trim();
    let mut model = model.map(str::trim).filter(|m| !m.is_empty()).map(str::to_string);

    let tail = match &model {
        Some(known) => strip_model_prefix(title, known).unwrap_or_else(|| title.to_string()),
        None => match MODEL_TOKEN.captures(title).and_then(|c| c.get(1)) {
            Some(token) => {
                let inferred = token.as_str().to_string();
                let tail = remove_word(title, &inferred);
                model = Some(inferred);
                tail
            }
            None => title.to_string(),
        },
    };

    let mut parts = tail.split(',').map(str::trim);
    let name = parts.next().filter(|name| !name.is_empty()).map(str::to_string);
    let rest: Vec<&str> = parts.collect();
    let spec = if rest.is_empty() { None } else { Some(rest.join(", ")) };

    TitleFields { name, spec, model }
}

fn strip_vendor_prefix(title: &str, vendor_prefix: &str) -> String {
    let vendor = vendor_prefix.trim();
    if vendor.is_empty() {
        return title.to_string();
    }

    match RegexBuilder::new(&format!(r"^\s*{}\s*-\s*", regex::escape(vendor))).case_insensitive(true).build() {
        Ok(prefix) => prefix.replace(title, "").into_owned(),
        Err(_) => title.to_string(),
    }
}

/// Title with a leading `model` (case-insensitive) and following separators removed.
fn strip_model_prefix(title: &str, model: &str) -> Option<String> {
    let head = title.get(..model.len())?;
    if head.to_uppercase() != model.to_uppercase() {
        return None;
    }

    let rest = title[model.len()..].trim();
    Some(LEADING_SEPARATORS.replace(rest, "").into_owned())
}

fn remove_word(title: &str, word: &str) -> String {
    let removed = match Regex::new(&format!(r"\b{}\b", regex::escape(word))) {
        Ok(pattern) => pattern.replace_all(title, "").into_owned(),
        Err(_) => title.to_string(),
    };

    LEADING_SEPARATORS.replace(removed.trim(), "").into_owned()
}
