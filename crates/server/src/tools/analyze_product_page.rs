//! analyze_product_page tool implementation.
//!
//! Fetches a product page and returns its structured fields as JSON. A fetch
//! failure is not an MCP error: the tool answers with `{"error": "..."}`.

use productmcp_client::{PageSource, analyze_url};
use productmcp_core::{Error, ProductFields};
use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Input parameters for analyze_product_page tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalyzeProductPageParams {
    /// The product page URL.
    pub url: String,

    /// Also return `imagelink`, the main product image URL (default: false).
    #[serde(default)]
    pub include_image: bool,
}

/// Implementation of the analyze_product_page tool.
pub async fn analyze_impl<S>(source: &S, params: AnalyzeProductPageParams) -> Result<CallToolResult, McpError>
where
    S: PageSource + ?Sized,
{
    if params.url.trim().is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()).into());
    }

    let analysis = analyze_url(source, &params.url).await;
    let json = if params.include_image {
        serde_json::to_string_pretty(&analysis)
    } else {
        serde_json::to_string_pretty(&analysis.map(ProductFields::from))
    };

    Ok(CallToolResult::success(vec![Content::text(json.unwrap_or_default())]))
}
