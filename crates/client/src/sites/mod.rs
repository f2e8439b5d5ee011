//! Site parser registry.
//!
//! Vendor parsers are tried in [`SITE_PARSERS`] order and the first whose
//! `can_handle` accepts the page produces the record on its own. The
//! [`generic`] parser is the terminal fallback and accepts every page.
//!
//! To support another vendor, add a module exposing a `PARSER` constant and
//! list it in [`SITE_PARSERS`].

pub mod generic;
pub mod thorlabs;

use productmcp_core::ProductRecord;

use crate::extract::Page;

/// A capability-gated extraction strategy for one page layout.
#[derive(Debug, Clone, Copy)]
pub struct SiteParser {
    /// Short identifier used in logs.
    pub name: &'static str,
    pub can_handle: fn(&Page) -> bool,
    /// Raw field values; the orchestrator normalizes them.
    pub parse: fn(&Page) -> ProductRecord,
}

/// Vendor parsers in priority order.
pub const SITE_PARSERS: &[SiteParser] = &[thorlabs::PARSER];

/// The first vendor parser that accepts `page`, else the generic parser.
pub fn parser_for(page: &Page) -> &'static SiteParser {
    SITE_PARSERS.iter().find(|parser| (parser.can_handle)(page)).unwrap_or(&generic::PARSER)
}
