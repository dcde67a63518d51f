//! Web search for Ragline.
//!
//! This crate holds everything on the retrieval side of the pipeline:
//! - `SearchResult`: tolerant model of raw provider records
//! - `needs_search`: the keyword gate deciding whether to search at all
//! - `format_results`: rendering results into an LLM context block
//! - `SearchProvider` / `SearchHandle`: the provider seam and its explicit
//!   available/unavailable handle
//! - Providers: Tavily and a static in-process provider

pub mod format;
pub mod gate;
pub mod provider;
pub mod providers;
pub mod types;

pub use format::{format_results, MAX_CONTENT_CHARS, NO_RESULTS_PLACEHOLDER};
pub use gate::{needs_search, SEARCH_KEYWORDS};
pub use provider::{create_search_handle, SearchHandle, SearchProvider};
pub use providers::{StaticSearch, TavilyClient};
pub use types::{SearchRecord, SearchResult};
