//! Product record types returned to callers.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Structured product metadata extracted from one page.
///
/// Every field is independently optional. Textual fields are normalized before
/// a record leaves the extractor; `price` is finite and non-negative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProductRecord {
    /// Product name.
    pub name: Option<String>,
    /// Manufacturer or seller brand.
    pub brand: Option<String>,
    /// Model or part number.
    pub model: Option<String>,
    /// Listed price, currency not recorded.
    pub price: Option<f64>,
    /// Free-form specification text.
    pub spec: Option<String>,
    /// Absolute URL of the main product image.
    pub imagelink: Option<String>,
}

impl ProductRecord {
    /// Whether no field was extracted at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.brand.is_none()
            && self.model.is_none()
            && self.price.is_none()
            && self.spec.is_none()
            && self.imagelink.is_none()
    }
}

/// The five-key projection of a [`ProductRecord`], without the image link.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProductFields {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub price: Option<f64>,
    pub spec: Option<String>,
}

impl From<ProductRecord> for ProductFields {
    fn from(record: ProductRecord) -> Self {
        Self { name: record.name, brand: record.brand, model: record.model, price: record.price, spec: record.spec }
    }
}

/// Outcome of analyzing a URL: a record, or the single-key error object.
///
/// Serializes untagged, so a failure is exactly `{"error": "<message>"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Analysis<T> {
    Failed { error: String },
    Record(T),
}

impl<T> Analysis<T> {
    /// Transform the record, passing failures through unchanged.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Analysis<U> {
        match self {
            Analysis::Record(record) => Analysis::Record(f(record)),
            Analysis::Failed { error } => Analysis::Failed { error },
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Analysis::Failed { .. })
    }
}
