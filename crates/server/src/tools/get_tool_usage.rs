//! get_tool_usage tool implementation.
//!
//! Reports per-tool call counts and last-used times from the server's usage sink.

use productmcp_core::UsageSink;
use rmcp::{ErrorData as McpError, model::*};

/// Implementation of the get_tool_usage tool.
pub async fn usage_impl(usage: &dyn UsageSink) -> Result<CallToolResult, McpError> {
    let snapshot = usage.snapshot();
    Ok(CallToolResult::success(vec![Content::text(serde_json::to_string_pretty(&snapshot).unwrap_or_default())]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use productmcp_core::{InMemoryUsage, UsageSnapshot};

    #[tokio::test]
    async fn test_usage_reports_counts() {
        let usage = InMemoryUsage::new();
        usage.record_call("analyze_product_page");
        usage.record_call("analyze_product_page");

        let result = usage_impl(&usage).await.unwrap();
        let text = result.content[0].as_text().map(|t| t.text.clone()).unwrap_or_default();
        let snapshot: UsageSnapshot = serde_json::from_str(&text).unwrap();

        assert_eq!(snapshot.counts.get("analyze_product_page"), Some(&2));
        assert!(snapshot.last_used.contains_key("analyze_product_page"));
        assert!(!snapshot.server_time.is_empty());
    }

    #[tokio::test]
    async fn test_usage_empty() {
        let result = usage_impl(&InMemoryUsage::new()).await.unwrap();
        let text = result.content[0].as_text().map(|t| t.text.clone()).unwrap_or_default();
        let snapshot: UsageSnapshot = serde_json::from_str(&text).unwrap();
        assert!(snapshot.counts.is_empty());
    }
}
