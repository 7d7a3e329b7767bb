// src/search/stream.rs
// =============================================================================
// This module turns a configured search into a lazy stream of results.
//
// The pager walks through pages one at a time:
//
//   Requesting(page) --fetch + parse--> Emitting(results)
//   Emitting(results) --drained--> Requesting(page + 1)
//   Requesting(page == total_pages) --> Done
//
// A failed fetch yields its error once and then goes straight to Done, so
// the stream ends right after the error.
//
// Nothing happens until the stream is polled. The only .await is the page
// fetch; parsing and emitting are synchronous. The HTTP session lives inside
// the pager and is dropped with it, whether the stream ran to the end, hit
// an error, or was dropped early by the caller.
// =============================================================================

use std::pin::Pin;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::stream::{self, BoxStream, Stream, StreamExt};
use tracing::{debug, warn};
use url::Url;

use super::client::{GoogleSearch, Session, SessionProbe};
use super::error::SearchError;
use super::parse::extract_results;
use super::record::SearchResult;
use super::selectors::CompiledSelectors;

enum PagerState {
    Requesting,
    Emitting(std::vec::IntoIter<SearchResult>),
    Done,
}

// Owns everything one search needs while it runs
struct Pager {
    config: GoogleSearch,
    endpoint: Url,
    session: Session,
    selectors: CompiledSelectors,
    page_index: u32,
    state: PagerState,
    pages_fetched: Arc<AtomicU32>,
}

impl Pager {
    // Produces the next result, fetching pages as needed
    //
    // Returns:
    //   Ok(Some(result)) - next result
    //   Ok(None)         - all pages consumed
    //   Err(e)           - the current page failed; the pager is now Done
    async fn next_result(&mut self) -> Result<Option<SearchResult>, SearchError> {
        loop {
            match std::mem::replace(&mut self.state, PagerState::Done) {
                PagerState::Done => return Ok(None),

                PagerState::Requesting => {
                    if self.page_index >= self.config.total_pages() {
                        debug!(pages = self.page_index, "Search finished");
                        return Ok(None);
                    }

                    let page = self.page_index;
                    let params = self.config.page_params(page);
                    debug!(page, start = self.config.start_offset(page), "Requesting results page");

                    let html = match self.session.fetch_page(&self.endpoint, &params, page).await {
                        Ok(html) => html,
                        Err(e) => {
                            warn!(page, error = %e, "Results page failed, ending search");
                            return Err(e);
                        }
                    };

                    let results = extract_results(&html, &self.selectors);
                    debug!(page, results = results.len(), "Parsed results page");
                    self.state = PagerState::Emitting(results.into_iter());
                }

                PagerState::Emitting(mut results) => match results.next() {
                    Some(result) => {
                        self.state = PagerState::Emitting(results);
                        return Ok(Some(result));
                    }
                    None => {
                        self.page_index += 1;
                        self.pages_fetched.store(self.page_index, Ordering::Relaxed);
                        self.state = PagerState::Requesting;
                    }
                },
            }
        }
    }
}

/// Lazy stream of search results
///
/// Yields `Ok(result)` for every extracted result, in page order. If a page
/// request fails, the error is yielded once and the stream ends.
/// Dropping the stream releases the HTTP session.
pub struct SearchStream {
    inner: BoxStream<'static, Result<SearchResult, SearchError>>,
    probe: SessionProbe,
    pages_fetched: Arc<AtomicU32>,
}

impl SearchStream {
    pub(crate) fn new(
        config: GoogleSearch,
        endpoint: Url,
        session: Session,
        selectors: CompiledSelectors,
    ) -> Self {
        let probe = session.probe();
        let pages_fetched = Arc::new(AtomicU32::new(0));

        let pager = Pager {
            config,
            endpoint,
            session,
            selectors,
            page_index: 0,
            state: PagerState::Requesting,
            pages_fetched: Arc::clone(&pages_fetched),
        };

        // The pager (and with it the session) is dropped as soon as
        // next_result reports the end or an error; a None state ends the stream
        let inner = stream::unfold(Some(pager), |pager| async move {
            let mut pager = pager?;
            match pager.next_result().await {
                Ok(Some(result)) => Some((Ok(result), Some(pager))),
                Ok(None) => None,
                Err(e) => {
                    drop(pager);
                    Some((Err(e), None))
                }
            }
        })
        .boxed();

        Self {
            inner,
            probe,
            pages_fetched,
        }
    }

    /// Handle for checking whether the HTTP session has been released
    pub fn session_probe(&self) -> SessionProbe {
        self.probe.clone()
    }

    /// Number of pages whose results have all been yielded
    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched.load(Ordering::Relaxed)
    }
}

impl Stream for SearchStream {
    type Item = Result<SearchResult, SearchError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::client::USER_AGENT;
    use futures::TryStreamExt;
    use mockito::{Matcher, Mock, Server, ServerGuard};

    fn block(url: &str, title: &str) -> String {
        format!(
            r#"<div class="g">
                <a href="{}"><h3>{}</h3></a>
                <div style="-webkit-line-clamp:2"><span>About {}</span></div>
            </div>"#,
            url, title, title
        )
    }

    fn page(blocks: &[(&str, &str)]) -> String {
        let body: String = blocks.iter().map(|(url, title)| block(url, title)).collect();
        format!("<html><body><div id=\"search\">{}</div></body></html>", body)
    }

    async fn mock_page(server: &mut ServerGuard, start: u64, status: usize, body: &str) -> Mock {
        server
            .mock("GET", "/search")
            .match_query(Matcher::UrlEncoded("start".into(), start.to_string()))
            .with_status(status)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body(body)
            .expect(1)
            .create_async()
            .await
    }

    fn search_against(server: &ServerGuard, query: &str) -> GoogleSearch {
        GoogleSearch::new(query).with_endpoint(format!("{}/search", server.url()))
    }

    #[tokio::test]
    async fn test_fetches_each_page_once_in_order() {
        let mut server = Server::new_async().await;
        let first = mock_page(&mut server, 0, 200, &page(&[("https://a.example/", "A")])).await;
        let second = mock_page(&mut server, 5, 200, &page(&[("https://b.example/", "B")])).await;
        let third = mock_page(&mut server, 10, 200, &page(&[("https://c.example/", "C")])).await;

        let stream = search_against(&server, "rust")
            .with_pages(3)
            .with_results_per_page(5)
            .search()
            .unwrap();
        let results: Vec<SearchResult> = stream.try_collect().await.unwrap();

        let urls: Vec<&str> = results.iter().map(|r| r.url()).collect();
        assert_eq!(urls, vec!["https://a.example/", "https://b.example/", "https://c.example/"]);
        first.assert_async().await;
        second.assert_async().await;
        third.assert_async().await;
    }

    #[tokio::test]
    async fn test_sends_query_parameters_and_user_agent() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "rust+async".into()),
                Matcher::UrlEncoded("num".into(), "20".into()),
                Matcher::UrlEncoded("hl".into(), "fr".into()),
                Matcher::UrlEncoded("start".into(), "0".into()),
            ]))
            .match_header("user-agent", USER_AGENT)
            .with_status(200)
            .with_body(page(&[]))
            .expect(1)
            .create_async()
            .await;

        let stream = search_against(&server, "rust async")
            .with_results_per_page(20)
            .with_language("fr")
            .search()
            .unwrap();
        let results: Vec<SearchResult> = stream.try_collect().await.unwrap();

        assert!(results.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_empty_page_does_not_stop_search() {
        let mut server = Server::new_async().await;
        let empty = mock_page(&mut server, 0, 200, "<html><body>No results</body></html>").await;
        let full = mock_page(
            &mut server,
            10,
            200,
            &page(&[("https://a.example/", "A"), ("https://b.example/", "B")]),
        )
        .await;

        let stream = search_against(&server, "rust").with_pages(2).search().unwrap();
        let results: Vec<SearchResult> = stream.try_collect().await.unwrap();

        assert_eq!(results.len(), 2);
        empty.assert_async().await;
        full.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error_ends_search_after_earlier_pages() {
        let mut server = Server::new_async().await;
        let _p0 = mock_page(
            &mut server,
            0,
            200,
            &page(&[("https://a.example/", "A"), ("https://b.example/", "B")]),
        )
        .await;
        let _p1 = mock_page(&mut server, 10, 200, &page(&[("https://c.example/", "C")])).await;
        let _p2 = mock_page(&mut server, 20, 500, "Internal Server Error").await;
        let p3 = server
            .mock("GET", "/search")
            .match_query(Matcher::UrlEncoded("start".into(), "30".into()))
            .with_status(200)
            .with_body(page(&[("https://d.example/", "D")]))
            .expect(0)
            .create_async()
            .await;

        let mut stream = search_against(&server, "rust").with_pages(4).search().unwrap();

        let mut urls = Vec::new();
        let error = loop {
            match stream.next().await {
                Some(Ok(result)) => urls.push(result.url().to_string()),
                Some(Err(e)) => break e,
                None => panic!("stream ended without an error"),
            }
        };

        assert_eq!(urls, vec!["https://a.example/", "https://b.example/", "https://c.example/"]);
        match error {
            SearchError::Status { page, status } => {
                assert_eq!(page, 2);
                assert_eq!(status.as_u16(), 500);
            }
            other => panic!("expected status error, got {:?}", other),
        }
        assert!(stream.next().await.is_none());
        assert_eq!(stream.pages_fetched(), 2);
        p3.assert_async().await;
    }

    #[tokio::test]
    async fn test_dropping_stream_early_releases_session() {
        let mut server = Server::new_async().await;
        let _p0 = mock_page(
            &mut server,
            0,
            200,
            &page(&[("https://a.example/", "A"), ("https://b.example/", "B")]),
        )
        .await;

        let mut stream = search_against(&server, "rust").with_pages(3).search().unwrap();
        let probe = stream.session_probe();

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.url(), "https://a.example/");
        assert!(!probe.is_released());

        drop(stream);
        assert!(probe.is_released());
    }

    #[tokio::test]
    async fn test_exhausted_stream_releases_session() {
        let mut server = Server::new_async().await;
        let _p0 = mock_page(&mut server, 0, 200, &page(&[("https://a.example/", "A")])).await;

        let mut stream = search_against(&server, "rust").search().unwrap();
        let probe = stream.session_probe();

        assert!(stream.next().await.is_some());
        assert!(stream.next().await.is_none());
        assert!(probe.is_released());
        assert_eq!(stream.pages_fetched(), 1);
    }

    #[tokio::test]
    async fn test_failed_page_releases_session_immediately() {
        let mut server = Server::new_async().await;
        let _p0 = mock_page(&mut server, 0, 500, "Internal Server Error").await;

        let mut stream = search_against(&server, "rust").with_pages(3).search().unwrap();
        let probe = stream.session_probe();

        assert!(matches!(stream.next().await, Some(Err(SearchError::Status { page: 0, .. }))));
        assert!(probe.is_released());
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_connection_failure_ends_stream() {
        // Bind and drop a listener so the port is known to be closed
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();

        let mut stream = GoogleSearch::new("rust")
            .with_endpoint(format!("http://127.0.0.1:{}/search", port))
            .with_pages(2)
            .search()
            .unwrap();
        let probe = stream.session_probe();

        match stream.next().await {
            Some(Err(SearchError::Request { page, .. })) => assert_eq!(page, 0),
            other => panic!("expected request error, got {:?}", other),
        }
        assert!(stream.next().await.is_none());
        assert!(probe.is_released());
    }

    #[tokio::test]
    async fn test_zero_pages_sends_no_request() {
        let mut server = Server::new_async().await;
        let mock = server.mock("GET", Matcher::Any).expect(0).create_async().await;

        let results: Vec<SearchResult> = search_against(&server, "rust")
            .with_pages(0)
            .search()
            .unwrap()
            .try_collect()
            .await
            .unwrap();

        assert!(results.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_invalid_blocks_are_not_yielded() {
        let mut server = Server::new_async().await;
        let body = format!(
            "<html><body>{}<div class=\"g\"><h3>no link</h3></div>{}</body></html>",
            block("https://a.example/", "A"),
            block("https://b.example/", "B"),
        );
        let _p0 = mock_page(&mut server, 0, 200, &body).await;

        let results: Vec<SearchResult> = search_against(&server, "rust")
            .search()
            .unwrap()
            .try_collect()
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[1].description(), "About B");
    }

    #[test]
    fn test_stream_is_send() {
        fn assert_send<T: Send + 'static>() {}
        assert_send::<SearchStream>();
    }
}
