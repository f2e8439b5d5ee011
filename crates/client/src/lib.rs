//! Client code for product-mcp.
//!
//! This crate provides the page fetch pipeline, field extraction, the site
//! parser registry and the analysis entry points shared by the server and CLI.

pub mod analyze;
pub mod extract;
pub mod fetch;
pub mod sites;

pub use analyze::{analyze_html, analyze_url, extract};
pub use extract::Page;
pub use fetch::{FetchClient, FetchConfig, FetchResponse, PageSource, RetryPolicy};
pub use sites::{SITE_PARSERS, SiteParser, parser_for};
