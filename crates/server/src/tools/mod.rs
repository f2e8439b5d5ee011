//! MCP tool implementations.
//!
//! This module contains all tools exposed by the product-mcp server.

pub mod analyze_product_page;
pub mod get_tool_usage;

pub use analyze_product_page::{AnalyzeProductPageParams, analyze_impl};
pub use get_tool_usage::usage_impl;
