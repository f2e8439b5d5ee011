//! MCP server handler implementation.
//!
//! This module defines the main server handler that routes tool calls to the
//! appropriate implementations. Every call is stamped, counted in the usage
//! sink, and logged as `call start` / `call end`.
use std::sync::Arc;

use crate::tools::{AnalyzeProductPageParams, analyze_impl, usage_impl};

use productmcp_client::{FetchClient, FetchConfig, PageSource};
use productmcp_core::{AppConfig, CallStamp, Error, UsageSink};
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for product-mcp.
#[derive(Clone)]
pub struct ProductMcpServer {
    tool_router: ToolRouter<Self>,
    usage: Arc<dyn UsageSink>,
    source: Arc<dyn PageSource>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl ProductMcpServer {
    /// Create a server that fetches pages over HTTP.
    pub fn new(config: &AppConfig, usage: Arc<dyn UsageSink>) -> Result<Self, Error> {
        let client = FetchClient::new(FetchConfig::from(config))?;
        Ok(Self::with_source(Arc::new(client), usage))
    }

    /// Create a server that reads pages from `source`.
    pub fn with_source(source: Arc<dyn PageSource>, usage: Arc<dyn UsageSink>) -> Self {
        Self { tool_router: Self::tool_router(), usage, source }
    }

    /// Analyze a product page.
    ///
    /// Fetches the URL and returns name, brand, model, price and spec, plus the
    /// main image URL when requested.
    #[tool(
        description = "Fetch a product page and extract name, brand, model, price and spec as JSON. Set include_image to also return imagelink. Returns {\"error\": ...} when the page cannot be fetched."
    )]
    async fn analyze_product_page(
        &self, params: Parameters<AnalyzeProductPageParams>,
    ) -> Result<CallToolResult, McpError> {
        let stamp = self.begin("analyze_product_page");
        let result = analyze_impl(self.source.as_ref(), params.0).await;
        finish(&stamp, &result);
        result
    }

    /// Report tool usage.
    #[tool(description = "Report how many times each tool was called and when it was last used.")]
    async fn get_tool_usage(&self) -> Result<CallToolResult, McpError> {
        let stamp = self.begin("get_tool_usage");
        let result = usage_impl(self.usage.as_ref()).await;
        finish(&stamp, &result);
        result
    }
}

impl ProductMcpServer {
    fn begin(&self, tool: &str) -> CallStamp {
        let stamp = self.usage.record_call(tool);
        tracing::info!(tool = %stamp.tool, request_id = %stamp.request_id, ts = %stamp.ts, "call start");
        stamp
    }
}

fn finish(stamp: &CallStamp, result: &Result<CallToolResult, McpError>) {
    match result {
        Ok(_) => tracing::info!(tool = %stamp.tool, request_id = %stamp.request_id, status = "ok", "call end"),
        Err(e) => {
            tracing::warn!(tool = %stamp.tool, request_id = %stamp.request_id, status = "error", error = %e.message, "call end")
        }
    }
}

impl ServerHandler for ProductMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "product-mcp".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
