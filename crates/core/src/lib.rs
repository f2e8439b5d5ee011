//! Core types and shared functionality for product-mcp.
//!
//! This crate provides:
//! - Product record and analysis outcome types
//! - Unified error types
//! - Configuration structures
//! - Injected usage telemetry

pub mod config;
pub mod error;
pub mod product;
pub mod usage;

pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use product::{Analysis, ProductFields, ProductRecord};
pub use usage::{CallStamp, InMemoryUsage, UsageSink, UsageSnapshot};
