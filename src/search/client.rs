// src/search/client.rs
// =============================================================================
// This module holds the search configuration and the HTTP side of a search.
//
// GoogleSearch  - what to search for and how (query, pages, page size, ...)
// Session       - one reqwest Client shared by every page of one search
//
// Each page is one GET:
//   <endpoint>?q=<query>&num=<per page>&hl=<lang>&start=<page * per page>
//
// The endpoint only serves usable markup to browsers, so every request
// carries a desktop Chrome User-Agent.
// =============================================================================

use std::sync::{Arc, Weak};
use std::time::Duration;

use reqwest::{Client, Proxy};
use tracing::{debug, info, warn};
use url::Url;

use super::error::SearchError;
use super::selectors::Selectors;
use super::stream::SearchStream;

pub const DEFAULT_ENDPOINT: &str = "https://www.google.com/search";

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                              (KHTML, like Gecko) Chrome/61.0.3163.100 Safari/537.36";

/// Total time allowed for one page request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// Username/password for a proxy that wants basic auth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyAuth {
    pub username: String,
    pub password: String,
}

// A paginated search, ready to run
//
// Example:
//   let stream = GoogleSearch::new("rust async")
//       .with_pages(2)
//       .search()?;
//
// Nothing is validated here; bad endpoint/proxy/selector values surface
// as errors from search().
#[derive(Debug, Clone)]
pub struct GoogleSearch {
    query: String,
    total_pages: u32,
    results_per_page: u32,
    language: String,
    proxy_url: Option<String>,
    proxy_auth: Option<ProxyAuth>,
    endpoint: String,
    selectors: Selectors,
}

impl GoogleSearch {
    // Spaces in the query are replaced with '+' up front
    pub fn new(query: &str) -> Self {
        Self {
            query: query.replace(' ', "+"),
            total_pages: 1,
            results_per_page: 10,
            language: "en".to_string(),
            proxy_url: None,
            proxy_auth: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            selectors: Selectors::default(),
        }
    }

    /// Number of result pages to fetch. 0 fetches nothing.
    pub fn with_pages(mut self, total_pages: u32) -> Self {
        self.total_pages = total_pages;
        self
    }

    pub fn with_results_per_page(mut self, results_per_page: u32) -> Self {
        self.results_per_page = results_per_page;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_proxy(mut self, proxy_url: impl Into<String>) -> Self {
        self.proxy_url = Some(proxy_url.into());
        self
    }

    pub fn with_proxy_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.proxy_auth = Some(ProxyAuth {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_selectors(mut self, selectors: Selectors) -> Self {
        self.selectors = selectors;
        self
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn results_per_page(&self) -> u32 {
        self.results_per_page
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    // Offset of the first result on a page
    pub fn start_offset(&self, page: u32) -> u64 {
        u64::from(page) * u64::from(self.results_per_page)
    }

    // Query parameters for one page, in the order they are sent
    pub fn page_params(&self, page: u32) -> Vec<(&'static str, String)> {
        vec![
            ("q", self.query.clone()),
            ("num", self.results_per_page.to_string()),
            ("hl", self.language.clone()),
            ("start", self.start_offset(page).to_string()),
        ]
    }

    // Starts the search
    //
    // Consumes the config: the returned stream owns the page counter, so a
    // finished or abandoned search can't be resumed. Build a new
    // GoogleSearch to search again.
    //
    // Returns: a lazy stream of results, or a setup error. No request is
    // sent until the stream is polled.
    pub fn search(self) -> Result<SearchStream, SearchError> {
        let endpoint = Url::parse(&self.endpoint).map_err(|source| SearchError::Endpoint {
            url: self.endpoint.clone(),
            source,
        })?;
        let selectors = self.selectors.compile()?;
        let session = Session::open(self.proxy_url.as_deref(), self.proxy_auth.as_ref())?;

        info!(
            query = %self.query,
            pages = self.total_pages,
            per_page = self.results_per_page,
            "Starting search"
        );

        Ok(SearchStream::new(self, endpoint, session, selectors))
    }
}

// The HTTP session of one search
//
// Dropping it releases the client and its connection pool. A SessionProbe
// can watch for that from outside.
#[derive(Debug)]
pub(crate) struct Session {
    client: Client,
    alive: Arc<()>,
}

impl Session {
    fn open(proxy_url: Option<&str>, proxy_auth: Option<&ProxyAuth>) -> Result<Self, SearchError> {
        let mut builder = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT);

        match (proxy_url, proxy_auth) {
            (Some(url), auth) => {
                let mut proxy = Proxy::all(url).map_err(|source| SearchError::Proxy {
                    url: url.to_string(),
                    source,
                })?;
                if let Some(auth) = auth {
                    proxy = proxy.basic_auth(&auth.username, &auth.password);
                }
                builder = builder.proxy(proxy);
            }
            // Only an explicit proxy is used, never one from the environment
            (None, auth) => {
                if auth.is_some() {
                    warn!("Proxy credentials given without a proxy URL, ignoring them");
                }
                builder = builder.no_proxy();
            }
        }

        let client = builder.build().map_err(SearchError::Client)?;
        debug!("Search session opened");

        Ok(Self {
            client,
            alive: Arc::new(()),
        })
    }

    pub(crate) fn probe(&self) -> SessionProbe {
        SessionProbe(Arc::downgrade(&self.alive))
    }

    // Fetches one results page and returns its body
    //
    // Any transport failure or non-2xx status is an error for the page.
    pub(crate) async fn fetch_page(
        &self,
        endpoint: &Url,
        params: &[(&'static str, String)],
        page: u32,
    ) -> Result<String, SearchError> {
        let response = self
            .client
            .get(endpoint.clone())
            .query(params)
            .send()
            .await
            .map_err(|source| SearchError::Request { page, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status { page, status });
        }

        response
            .text()
            .await
            .map_err(|source| SearchError::Request { page, source })
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        debug!("Search session released");
    }
}

/// Watches whether a search's HTTP session is still held
#[derive(Debug, Clone)]
pub struct SessionProbe(Weak<()>);

impl SessionProbe {
    pub fn is_released(&self) -> bool {
        self.0.strong_count() == 0
    }
}
