// src/lib.rs
// =============================================================================
// Lazy, paginated Google search.
//
// Build a GoogleSearch, call search(), and poll the returned stream:
//
//   use futures::TryStreamExt;
//
//   let mut results = GoogleSearch::new("rust async").with_pages(2).search()?;
//   while let Some(result) = results.try_next().await? {
//       println!("{} ({})", result.title(), result.url());
//   }
//
// Pages are requested one at a time, only as the stream is polled.
// =============================================================================

pub mod search;

pub use search::{GoogleSearch, SearchError, SearchResult, SearchStream, Selectors};
