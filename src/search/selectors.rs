// src/search/selectors.rs
// =============================================================================
// The markup markers used to find results on a page.
//
// Google does not publish its result markup, so these CSS selectors are
// whatever the current pages happen to use. They live here as data (not as
// literals inside the parser) so they can be swapped when the markup shifts:
//
//   result_block  one organic result            div.g
//   link          the result's link             a[href]
//   heading       the result's title            h3
//   summary       box around the snippet        div[style="-webkit-line-clamp:2"]
//   snippet       snippet text inside summary   span
//
// The summary box has no stable class, so it is matched by its inline style.
// =============================================================================

use scraper::Selector;

use super::error::SearchError;

// Selector strings, as configured by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selectors {
    pub result_block: String,
    pub link: String,
    pub heading: String,
    pub summary: String,
    pub snippet: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            result_block: "div.g".to_string(),
            link: "a[href]".to_string(),
            heading: "h3".to_string(),
            summary: r#"div[style="-webkit-line-clamp:2"]"#.to_string(),
            snippet: "span".to_string(),
        }
    }
}

impl Selectors {
    // Parses every selector once, so a search doesn't re-parse per page
    //
    // Returns: CompiledSelectors or the first selector that fails to parse
    pub fn compile(&self) -> Result<CompiledSelectors, SearchError> {
        Ok(CompiledSelectors {
            result_block: parse_selector(&self.result_block)?,
            link: parse_selector(&self.link)?,
            heading: parse_selector(&self.heading)?,
            summary: parse_selector(&self.summary)?,
            snippet: parse_selector(&self.snippet)?,
        })
    }
}

// Parsed form of Selectors, ready to run against a document
#[derive(Debug, Clone)]
pub struct CompiledSelectors {
    pub(crate) result_block: Selector,
    pub(crate) link: Selector,
    pub(crate) heading: Selector,
    pub(crate) summary: Selector,
    pub(crate) snippet: Selector,
}

fn parse_selector(selector: &str) -> Result<Selector, SearchError> {
    Selector::parse(selector).map_err(|e| SearchError::Selector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}
