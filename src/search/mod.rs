// src/search/mod.rs
// =============================================================================
// This module contains everything needed to run a paginated search.
//
// Submodules:
// - client: search configuration and the HTTP session
// - stream: the pager that turns pages into a lazy stream of results
// - parse: pulls results out of one HTML results page
// - selectors: the CSS markers used by parse
// - record: the SearchResult type
// - error: SearchError
//
// This file (mod.rs) is the module root - it re-exports the public API so
// users can write `search::GoogleSearch` instead of
// `search::client::GoogleSearch`.
// =============================================================================

mod client;
mod error;
mod parse;
mod record;
mod selectors;
mod stream;

pub use client::{GoogleSearch, ProxyAuth, SessionProbe, DEFAULT_ENDPOINT, REQUEST_TIMEOUT, USER_AGENT};
pub use error::SearchError;
pub use parse::extract_results;
pub use record::SearchResult;
pub use selectors::{CompiledSelectors, Selectors};
pub use stream::SearchStream;
