// src/search/parse.rs
// =============================================================================
// This module turns one results page (HTML) into SearchResults.
//
// Steps:
// 1. Parse the page into a document with `scraper`
// 2. Select every result block
// 3. For each block, pull out link, heading and snippet
// 4. Skip any block that is missing one of them
//
// Extraction is best-effort per block: a block that doesn't have the
// expected shape is dropped without an error. A page with no matching
// blocks at all yields an empty Vec.
//
// Everything here is synchronous. scraper's Html is not Send, so it must
// never be held across an .await; callers get back a plain Vec.
// =============================================================================

use scraper::{ElementRef, Html};
use tracing::trace;

use super::record::SearchResult;
use super::selectors::CompiledSelectors;

// Extracts all complete results from a results page
//
// Parameters:
//   html: the page body
//   selectors: compiled markup markers
//
// Returns: results in page order; incomplete blocks are left out
pub fn extract_results(html: &str, selectors: &CompiledSelectors) -> Vec<SearchResult> {
    let document = Html::parse_document(html);

    let mut results = Vec::new();
    for (index, block) in document.select(&selectors.result_block).enumerate() {
        match extract_result(block, selectors) {
            Some(result) => results.push(result),
            None => trace!(block = index, "Skipping incomplete result block"),
        }
    }

    results
}

// Extracts one result from a result block
//
// Link, heading and summary box must all be present (and the link must
// have a non-empty href) before the snippet is even looked at. A missing
// snippet inside a present summary box also drops the block.
fn extract_result(block: ElementRef<'_>, selectors: &CompiledSelectors) -> Option<SearchResult> {
    let link = block.select(&selectors.link).next();
    let heading = block.select(&selectors.heading).next();
    let summary = block.select(&selectors.summary).next();

    let (link, heading, summary) = match (link, heading, summary) {
        (Some(link), Some(heading), Some(summary)) => (link, heading, summary),
        _ => return None,
    };

    let url = link.value().attr("href").filter(|href| !href.is_empty())?;
    let snippet = summary.select(&selectors.snippet).next()?;

    Some(SearchResult::new(url, element_text(heading), element_text(snippet)))
}

// Concatenates all text nodes under an element
fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
