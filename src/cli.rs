// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// The flags map one-to-one onto GoogleSearch's settings; there is nothing
// else to configure. Proxy settings can also come from the environment so
// credentials don't have to sit in shell history.
// =============================================================================

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "async-google-search",
    version = "0.1.0",
    about = "Search Google and print the results, page by page",
    long_about = "async-google-search fetches one or more Google result pages for a query \
                  and prints each result's URL, origin and host as soon as its page arrives."
)]
pub struct Cli {
    /// Search query; several words are joined with spaces
    ///
    /// Example: async-google-search rust async streams --pages 2
    #[arg(required = true)]
    pub query: Vec<String>,

    /// Number of result pages to fetch
    #[arg(long, default_value_t = 1)]
    pub pages: u32,

    /// Results requested per page
    #[arg(long, default_value_t = 10)]
    pub num: u32,

    /// Interface language sent to the search endpoint
    #[arg(long, default_value = "en")]
    pub lang: String,

    /// Proxy URL used for every request (e.g. http://10.0.0.1:8000)
    #[arg(long, env = "GOOGLE_SEARCH_PROXY")]
    pub proxy: Option<String>,

    /// Username for proxy basic auth
    #[arg(long, requires = "proxy")]
    pub proxy_user: Option<String>,

    /// Password for proxy basic auth
    #[arg(long, env = "GOOGLE_SEARCH_PROXY_PASSWORD", hide_env_values = true, requires = "proxy_user")]
    pub proxy_password: Option<String>,

    /// Output results in JSON format instead of a table
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    pub fn query_string(&self) -> String {
        self.query.join(" ")
    }
}
