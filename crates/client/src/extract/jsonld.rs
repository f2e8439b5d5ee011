//! Structured data (JSON-LD) access with explicit shape checks.
//!
//! Blocks and fields may hold one object, a list of objects, or something else
//! entirely. Every lookup goes through [`objects`] so callers never assume a
//! shape.

use serde_json::{Map, Value};

use super::page::Page;

pub type Object = Map<String, Value>;

/// The parsed JSON-LD blocks of a page. Malformed blocks are dropped.
#[derive(Debug, Clone, Default)]
pub struct StructuredData {
    blocks: Vec<Value>,
}

impl StructuredData {
    pub fn from_page(page: &Page) -> Self {
        Self::from_sources(page.json_ld_blocks().iter().map(String::as_str))
    }

    /// Parse each source independently; one bad block does not affect the rest.
    pub fn from_sources<'a>(sources: impl IntoIterator<Item = &'a str>) -> Self {
        let blocks = sources
            .into_iter()
            .filter_map(|source| match serde_json::from_str::<Value>(source.trim()) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::debug!("skipping malformed ld+json block: {}", e);
                    None
                }
            })
            .collect();

        Self { blocks }
    }

    /// Top-level items: each block read as one object or a list of objects.
    pub fn items(&self) -> impl Iterator<Item = &Object> {
        self.blocks.iter().flat_map(|block| objects(Some(block)))
    }

    /// Items whose type matches any of `types` (case-insensitive).
    pub fn items_of_type<'a>(&'a self, types: &'a [&'a str]) -> impl Iterator<Item = &'a Object> {
        self.items().filter(move |item| has_type(item, types))
    }
}

/// Objects held by a field: one object, the objects of an array, or none.
pub fn objects(value: Option<&Value>) -> Vec<&Object> {
    match value {
        Some(Value::Object(map)) => vec![map],
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_object).collect(),
        _ => Vec::new(),
    }
}

/// Whether an item's `@type` (or `type`) names one of `types`.
///
/// The type may be a string or a list of strings.
pub fn has_type(item: &Object, types: &[&str]) -> bool {
    let declared = item.get("@type").or_else(|| item.get("type"));
    let matches = |name: &str| types.iter().any(|t| t.eq_ignore_ascii_case(name));

    match declared {
        Some(Value::String(name)) => matches(name.as_str()),
        Some(Value::Array(names)) => names.iter().filter_map(Value::as_str).any(matches),
        _ => false,
    }
}

/// A field as trimmed text when it is a non-empty string or a number.
pub fn text_field(item: &Object, key: &str) -> Option<String> {
    match item.get(key)? {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_items_single_and_list() {
        let data = StructuredData::from_sources([
            r#"{"@type": "Product", "name": "A"}"#,
            r#"[{"@type": "Offer"}, 3, {"@type": "Product", "name": "B"}]"#,
        ]);
        let names: Vec<_> = data.items().filter_map(|i| i.get("name")).collect();
        assert_eq!(names, vec![&json!("A"), &json!("B")]);
        assert_eq!(data.items().count(), 3);
    }

    #[test]
    fn test_malformed_block_is_skipped() {
        let data = StructuredData::from_sources(["{not json", r#"{"@type": "Product"}"#, ""]);
        assert_eq!(data.items().count(), 1);
    }

    #[test]
    fn test_scalar_block_has_no_items() {
        let data = StructuredData::from_sources(["42", r#""text""#]);
        assert_eq!(data.items().count(), 0);
    }

    #[test]
    fn test_objects_shapes() {
        assert_eq!(objects(Some(&json!({"a": 1}))).len(), 1);
        assert_eq!(objects(Some(&json!([{"a": 1}, "x", {"b": 2}]))).len(), 2);
        assert!(objects(Some(&json!("x"))).is_empty());
        assert!(objects(None).is_empty());
    }

    #[test]
    fn test_has_type() {
        let item = json!({"@type": "product"});
        assert!(has_type(item.as_object().unwrap(), &["Product"]));

        let item = json!({"@type": ["Thing", "IndividualProduct"]});
        assert!(has_type(item.as_object().unwrap(), &["Product", "IndividualProduct"]));

        let item = json!({"type": "Product"});
        assert!(has_type(item.as_object().unwrap(), &["product"]));

        let item = json!({"@type": "Offer"});
        assert!(!has_type(item.as_object().unwrap(), &["Product"]));
    }

    #[test]
    fn test_items_of_type() {
        let data = StructuredData::from_sources([r#"[{"@type": "BreadcrumbList"}, {"@type": "Product"}]"#]);
        assert_eq!(data.items_of_type(&["Product"]).count(), 1);
    }

    #[test]
    fn test_text_field() {
        let item = json!({"mpn": " AB-12 ", "sku": 12345, "model": {"name": "x"}, "empty": "  "});
        let item = item.as_object().unwrap();
        assert_eq!(text_field(item, "mpn"), Some("AB-12".to_string()));
        assert_eq!(text_field(item, "sku"), Some("12345".to_string()));
        assert_eq!(text_field(item, "model"), None);
        assert_eq!(text_field(item, "empty"), None);
        assert_eq!(text_field(item, "missing"), None);
    }
}
