// src/search/error.rs
// =============================================================================
// Errors a search can fail with.
//
// Two groups:
// - setup errors, reported by GoogleSearch::search() before any request
// - page errors, yielded from the stream; they end the whole search
//
// A page that simply has no results is NOT an error.
// =============================================================================

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    /// The HTTP client could not be built
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The search endpoint is not a valid URL
    #[error("Invalid search endpoint '{url}': {source}")]
    Endpoint {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// reqwest rejected the proxy URL
    #[error("Invalid proxy '{url}': {source}")]
    Proxy {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A selector string does not parse as CSS
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Connection failure, timeout or unreadable body while fetching a page
    #[error("Request for page {page} failed: {source}")]
    Request {
        page: u32,
        #[source]
        source: reqwest::Error,
    },

    /// The endpoint answered a page request with a non-2xx status
    #[error("Search endpoint returned HTTP {} for page {page}", .status.as_u16())]
    Status { page: u32, status: StatusCode },
}

impl SearchError {
    /// True when a page request ran past the request timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, SearchError::Request { source, .. } if source.is_timeout())
    }

    /// The page index the error happened on, if it came from a page fetch
    pub fn page(&self) -> Option<u32> {
        match self {
            SearchError::Request { page, .. } | SearchError::Status { page, .. } => Some(*page),
            _ => None,
        }
    }
}
