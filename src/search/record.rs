// src/search/record.rs
// =============================================================================
// This module defines a single search result.
//
// A SearchResult is what we pull out of one result block on a results page:
// - the link the result points to
// - the heading text (title)
// - the snippet text underneath it (description)
//
// It also offers two small helpers that slice the URL:
// - origin_prefix(): "https://example.com/path" -> "https://example.com/"
// - bare_host():     "https://example.com/path" -> "example.com"
//
// These helpers only split strings on '/'. They do not parse the URL, so a
// relative or malformed URL gives back a truncated or empty value instead of
// an error.
// =============================================================================

use serde::{Deserialize, Serialize};

// One organic result extracted from a results page
//
// Fields are private and only readable through accessors, so a result
// can't be changed after extraction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchResult {
    /// Absolute URL of the result (never empty)
    url: String,
    /// Heading text, may be empty
    title: String,
    /// Snippet text, may be empty
    description: String,
}

impl SearchResult {
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Scheme and host with a trailing slash, e.g. `https://example.com/`
    ///
    /// Takes the first three '/'-separated segments ("https:", "", host)
    /// and joins them back together.
    pub fn origin_prefix(&self) -> String {
        let head: Vec<&str> = self.url.split('/').take(3).collect();
        format!("{}/", head.join("/"))
    }

    /// Host only, e.g. `example.com`
    ///
    /// Returns an empty string when the URL has fewer than three segments.
    pub fn bare_host(&self) -> &str {
        self.url.split('/').nth(2).unwrap_or("")
    }
}
